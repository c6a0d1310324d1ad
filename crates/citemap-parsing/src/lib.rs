use thiserror::Error;

pub mod config;
pub mod markers;
pub mod references;
pub mod segmenter;

pub use config::{ConfigError, ParsingConfig, ParsingConfigBuilder};
pub use markers::detect_markers;
pub use references::parse_reference_list;
pub use segmenter::{classify_heading, segment_sections};
// Re-export domain types from core (canonical definitions live there)
pub use citemap_core::{
    CitationMarker, ContractViolation, MarkerStyle, ReferenceEntry, ResolutionStatus,
    ResolvedCitation, Section, SectionLabel, StructuredDocument, StyleHint, TextBlock,
};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("input contract violated: {0}")]
    Contract(#[from] citemap_core::ContractViolation),
}

/// The configurable document structuring pipeline.
///
/// Holds a [`ParsingConfig`] and exposes each stage as a method. The default
/// constructor uses built-in thresholds; use [`DocumentStructurer::with_config`]
/// to supply custom patterns and limits.
pub struct DocumentStructurer {
    config: ParsingConfig,
}

impl Default for DocumentStructurer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStructurer {
    /// Create a structurer with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParsingConfig::default(),
        }
    }

    /// Create a structurer with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Classify the block stream into labeled sections (stage 1).
    pub fn segment(&self, blocks: &[TextBlock]) -> Vec<Section> {
        segmenter::segment_sections_with_config(blocks, &self.config)
    }

    /// Parse a References section into entries (stage 2).
    pub fn parse_references(&self, section: &Section) -> Vec<ReferenceEntry> {
        references::parse_reference_list_with_config(section, &self.config)
    }

    /// Detect citation markers across body sections (stage 3).
    pub fn detect_markers(&self, sections: &[Section]) -> Vec<CitationMarker> {
        markers::detect_markers(sections)
    }

    /// Run the full pipeline on a block stream.
    ///
    /// Stages: contract validation (the only failure point) → section
    /// segmentation → reference-list parsing → marker detection →
    /// resolution → assembly. Everything after validation degrades per
    /// item instead of failing, so a malformed entry or marker never
    /// aborts the document.
    pub fn structure(&self, blocks: &[TextBlock]) -> Result<StructuredDocument, ParsingError> {
        citemap_core::validate_stream(blocks)?;

        let sections = self.segment(blocks);

        let entries = match sections
            .iter()
            .find(|s| s.label == SectionLabel::References)
        {
            Some(section) => self.parse_references(section),
            None => Vec::new(),
        };

        let found = self.detect_markers(&sections);
        let citations = citemap_core::resolve_citations(&found, &entries);

        tracing::debug!(
            sections = sections.len(),
            references = entries.len(),
            citations = citations.len(),
            "structured document"
        );

        Ok(StructuredDocument {
            sections,
            references: entries,
            citations,
        })
    }
}

/// Structure a block stream with default configuration.
///
/// Pipeline:
/// 1. Validate the input contract (non-empty, monotonic order)
/// 2. Segment blocks into labeled sections
/// 3. Parse the References section into entries (absent → empty list)
/// 4. Detect in-text citation markers across body sections
/// 5. Resolve each marker against the reference entries
pub fn structure_document(blocks: &[TextBlock]) -> Result<StructuredDocument, ParsingError> {
    DocumentStructurer::new().structure(blocks)
}
