//! Extractive per-section summaries.
//!
//! A deliberately simple baseline: the summary of a section is its first N
//! sentences. Sections the pipeline could not fill produce empty summaries,
//! never errors, so downstream rendering can treat the result uniformly.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use citemap_core::{SectionLabel, StructuredDocument};

/// Default number of sentences kept per section.
pub const DEFAULT_MAX_SENTENCES: usize = 3;

/// Sentence fragments at or below this length are dropped as noise
/// (stray initials, list bullets).
const MIN_FRAGMENT_LEN: usize = 2;

/// Summary of one body section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub label: SectionLabel,
    pub text: String,
}

/// Ordered per-section summaries for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub sections: Vec<SectionSummary>,
}

impl DocumentSummary {
    /// Summary text for the given label, if that section was summarized.
    pub fn section(&self, label: SectionLabel) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.text.as_str())
    }
}

/// Summarize every body section of a structured document.
///
/// Title and References are skipped: the former is not prose, the latter
/// is handled by citation rendering.
pub fn summarize(document: &StructuredDocument, max_sentences: usize) -> DocumentSummary {
    let sections = document
        .body_sections()
        .filter(|s| s.label != SectionLabel::Title)
        .map(|s| SectionSummary {
            label: s.label,
            text: extractive_summary(&s.text, max_sentences),
        })
        .collect();
    DocumentSummary { sections }
}

/// First-N-sentences extractive baseline.
///
/// A sentence ends at a run of terminal punctuation followed by
/// whitespace. Ultra-short fragments are dropped so stray initials do not
/// count against the budget.
pub fn extractive_summary(text: &str, max_sentences: usize) -> String {
    if text.trim().is_empty() || max_sentences == 0 {
        return String::new();
    }

    split_sentences(text)
        .into_iter()
        .take(max_sentences)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split text into trimmed sentences on terminal punctuation boundaries.
fn split_sentences(text: &str) -> Vec<String> {
    static BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s+").unwrap());

    let text = text.trim();
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in BOUNDARY_RE.find_iter(text) {
        push_fragment(&mut sentences, &text[start..m.start()], &text[m.start()..m.end()]);
        start = m.end();
    }
    if start < text.len() {
        push_fragment(&mut sentences, &text[start..], "");
    }
    sentences
}

fn push_fragment(sentences: &mut Vec<String>, body: &str, boundary: &str) {
    let body = body.trim();
    if body.len() <= MIN_FRAGMENT_LEN {
        return;
    }
    let punct = boundary.trim_end();
    sentences.push(format!("{body}{punct}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use citemap_core::Section;

    #[test]
    fn takes_first_n_sentences() {
        let text = "First sentence here. Second one follows. Third arrives. Fourth is dropped.";
        assert_eq!(
            extractive_summary(text, 3),
            "First sentence here. Second one follows. Third arrives."
        );
    }

    #[test]
    fn shorter_text_is_kept_whole() {
        let text = "Only one sentence exists.";
        assert_eq!(extractive_summary(text, 3), "Only one sentence exists.");
    }

    #[test]
    fn empty_text_yields_empty_summary() {
        assert_eq!(extractive_summary("", 3), "");
        assert_eq!(extractive_summary("   \n  ", 3), "");
    }

    #[test]
    fn zero_budget_yields_empty_summary() {
        assert_eq!(extractive_summary("A sentence.", 0), "");
    }

    #[test]
    fn question_and_exclamation_are_boundaries() {
        let text = "Does it work? It does! Everything else is extra.";
        assert_eq!(extractive_summary(text, 2), "Does it work? It does!");
    }

    #[test]
    fn short_fragments_are_dropped() {
        let text = "A. Real first sentence here. Real second sentence here.";
        assert_eq!(
            extractive_summary(text, 2),
            "Real first sentence here. Real second sentence here."
        );
    }

    #[test]
    fn trailing_text_without_punctuation_counts() {
        let text = "First sentence done. A trailing clause without a period";
        assert_eq!(
            extractive_summary(text, 2),
            "First sentence done. A trailing clause without a period"
        );
    }

    #[test]
    fn summarize_skips_title_and_references() {
        let section = |label: SectionLabel, text: &str| Section {
            label,
            start_order: 0,
            end_order: 0,
            text: text.to_string(),
        };
        let doc = StructuredDocument {
            sections: vec![
                section(SectionLabel::Title, "A Title"),
                section(SectionLabel::Abstract, "An abstract sentence."),
                section(SectionLabel::References, "[1] An entry."),
            ],
            references: vec![],
            citations: vec![],
        };
        let summary = summarize(&doc, 3);
        let labels: Vec<_> = summary.sections.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec![SectionLabel::Abstract]);
        assert_eq!(
            summary.section(SectionLabel::Abstract),
            Some("An abstract sentence.")
        );
    }

    #[test]
    fn summarize_is_stable_under_rerun() {
        let doc = StructuredDocument {
            sections: vec![Section {
                label: SectionLabel::Methods,
                start_order: 0,
                end_order: 0,
                text: "We measured carefully. We recorded everything. We checked twice."
                    .to_string(),
            }],
            references: vec![],
            citations: vec![],
        };
        assert_eq!(summarize(&doc, 2), summarize(&doc, 2));
    }
}
