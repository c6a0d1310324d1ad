use std::path::Path;

use thiserror::Error;

use crate::TextBlock;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract blocks: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for document ingestion backends.
///
/// Implementors turn a file into a page-ordered block stream; everything
/// downstream (segmentation, reference parsing, citation resolution) lives
/// in `citemap_parsing::DocumentStructurer` and is backend-agnostic.
pub trait BlockSource: Send + Sync {
    /// Extract the full block stream of a document file.
    fn extract_blocks(&self, path: &Path) -> Result<Vec<TextBlock>, SourceError>;
}
