use serde::Serialize;
use thiserror::Error;

pub mod backend;
pub mod resolver;

// Re-export for convenience
pub use backend::{BlockSource, SourceError};
pub use resolver::resolve_citations;

/// One reading-order fragment of extracted document text.
///
/// Produced by an external extraction backend (see [`BlockSource`]); the
/// engine never mutates blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    pub text: String,
    /// 0-based page the block came from.
    pub page: u32,
    /// Monotonic reading-order index within the document.
    pub order: u32,
    /// Block-level formatting flag from the upstream extractor: set when the
    /// block is rendered distinctly from surrounding body text (heading-like
    /// weight or size). Opaque to the engine — consumed, never computed.
    pub styled: bool,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, page: u32, order: u32, styled: bool) -> Self {
        Self {
            text: text.into(),
            page,
            order,
            styled,
        }
    }
}

/// Canonical label of a document section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    Title,
    Abstract,
    Background,
    Methods,
    Results,
    Conclusion,
    References,
    Other,
}

impl SectionLabel {
    /// Display name used by exports and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionLabel::Title => "Title",
            SectionLabel::Abstract => "Abstract",
            SectionLabel::Background => "Background",
            SectionLabel::Methods => "Methods",
            SectionLabel::Results => "Results",
            SectionLabel::Conclusion => "Conclusion",
            SectionLabel::References => "References",
            SectionLabel::Other => "Other",
        }
    }
}

/// A labeled contiguous span of the document.
///
/// Sections are non-overlapping, ordered by `start_order`, and together
/// cover the full block stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub label: SectionLabel,
    /// Order index of the first block in this section.
    pub start_order: u32,
    /// Order index of the last block in this section (inclusive).
    pub end_order: u32,
    pub text: String,
}

/// How a reference entry was formatted in the source list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleHint {
    Numeric,
    AuthorYear,
    Unknown,
}

/// One parsed item from the reference list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEntry {
    /// 1-based position in the reference list. This is the join key used by
    /// numeric citation markers; it is positional and stable, independent of
    /// whatever (possibly malformed) number the source printed.
    pub id: usize,
    pub raw_text: String,
    /// Author surnames in listed order. Empty when extraction found none.
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub style_hint: StyleHint,
}

/// Citation style of a detected in-text marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    /// `[12]`
    Numeric,
    /// `[3,7]` or `[4-6]` (ranges expanded)
    NumericMulti,
    /// `(Smith, 2020)` or `(Smith et al., 2020; Doe, 2019)`
    AuthorYear,
    /// `Smith (2020)` in running text
    Narrative,
}

/// One in-text occurrence of a citation.
///
/// Repeated citations of the same source produce distinct markers at
/// distinct offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationMarker {
    /// The matched text exactly as it appears in the section.
    pub surface_text: String,
    /// Label of the section the marker was found in.
    pub section_label: SectionLabel,
    /// Byte offset of the match within its section's text.
    pub char_offset: usize,
    pub style: MarkerStyle,
    /// Extracted citation keys: decimal id strings for numeric styles, one
    /// `"surname|year"` token per cited work otherwise.
    pub keys: Vec<String>,
}

/// Outcome of resolving one marker against the reference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Resolved,
    Ambiguous,
    Unresolved,
}

/// A marker joined to the reference entry(ies) it denotes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCitation {
    pub marker: CitationMarker,
    /// Ids of matched [`ReferenceEntry`] values, in reference-list order.
    /// Every id refers to an entry in [`StructuredDocument::references`].
    pub matched_ids: Vec<usize>,
    pub status: ResolutionStatus,
    /// Fraction of the marker's keys that matched, in `[0, 1]`.
    pub confidence: f64,
}

/// The fully structured result for one document.
///
/// Owns every nested entity; handed immutable to summarization and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredDocument {
    pub sections: Vec<Section>,
    pub references: Vec<ReferenceEntry>,
    pub citations: Vec<ResolvedCitation>,
}

impl StructuredDocument {
    /// Look up a reference entry by its 1-based id.
    pub fn reference(&self, id: usize) -> Option<&ReferenceEntry> {
        // ids are exactly 1..=N, so this is a direct index
        self.references.get(id.checked_sub(1)?)
    }

    /// First section carrying the given label, if any.
    pub fn section(&self, label: SectionLabel) -> Option<&Section> {
        self.sections.iter().find(|s| s.label == label)
    }

    /// Sections citation markers are drawn from (everything except the
    /// reference list itself).
    pub fn body_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(|s| s.label != SectionLabel::References)
    }
}

/// Input-contract failures. These abort the document; everything else in
/// the pipeline degrades per-item instead of failing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("input block stream is empty")]
    EmptyStream,
    #[error(
        "block stream is not in monotonic reading order at position {position} \
         (order {order} follows {previous})"
    )]
    NonMonotonicOrder {
        position: usize,
        order: u32,
        previous: u32,
    },
}

/// Validate the input contract for a block stream: non-empty and strictly
/// increasing `order`.
pub fn validate_stream(blocks: &[TextBlock]) -> Result<(), ContractViolation> {
    if blocks.is_empty() {
        return Err(ContractViolation::EmptyStream);
    }
    for (position, pair) in blocks.windows(2).enumerate() {
        if pair[1].order <= pair[0].order {
            return Err(ContractViolation::NonMonotonicOrder {
                position: position + 1,
                order: pair[1].order,
                previous: pair[0].order,
            });
        }
    }
    Ok(())
}
