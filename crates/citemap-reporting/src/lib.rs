use thiserror::Error;

pub mod export;

pub use export::{render, export_to_path};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Json,
    Html,
}

impl ExportFormat {
    /// Conventional file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}
