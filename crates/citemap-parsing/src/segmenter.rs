use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use citemap_core::{Section, SectionLabel, TextBlock};

use crate::config::ParsingConfig;

/// Canonical section lexicon. Aliases are matched fuzzily against the
/// normalized heading text; the best-scoring alias at or above the
/// configured floor decides the label.
const LEXICON: &[(SectionLabel, &[&str])] = &[
    (SectionLabel::Abstract, &["abstract", "summary"]),
    (
        SectionLabel::Background,
        &[
            "background",
            "introduction",
            "related work",
            "literature review",
        ],
    ),
    (
        SectionLabel::Methods,
        &[
            "methods",
            "method",
            "methodology",
            "materials and methods",
            "approach",
        ],
    ),
    (
        SectionLabel::Results,
        &["results", "findings", "evaluation", "experiments"],
    ),
    (
        SectionLabel::Conclusion,
        &[
            "conclusion",
            "conclusions",
            "discussion",
            "concluding remarks",
        ],
    ),
    (
        SectionLabel::References,
        &["references", "bibliography", "works cited"],
    ),
];

/// Strip decimal / roman-numeral numbering prefixes like `1.`, `2)`,
/// `IV.` from a heading line.
static NUMBER_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d{1,3}(?:\.\d+)*|[IVXLCDM]+)[.)]?\s+").unwrap());

/// Normalize a candidate heading for lexicon matching: strip numbering
/// prefix and trailing punctuation, collapse whitespace, lowercase.
fn normalize_heading(text: &str) -> String {
    let text = NUMBER_PREFIX_RE.replace(text.trim(), "");
    let text = text.trim_end_matches(|c: char| c == '.' || c == ':' || c.is_whitespace());
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Map a candidate heading to a canonical section label.
///
/// Pure scoring function: the best fuzzy alias score at or above
/// `min_score` wins; below the floor the answer is `None`.
pub fn classify_heading(text: &str, min_score: f64) -> Option<SectionLabel> {
    let normalized = normalize_heading(text);
    if normalized.is_empty() {
        return None;
    }

    let mut best: Option<(SectionLabel, f64)> = None;
    for (label, aliases) in LEXICON {
        for alias in *aliases {
            let score = rapidfuzz::fuzz::ratio(normalized.chars(), alias.chars());
            if score >= min_score && best.is_none_or(|(_, b)| score > b) {
                best = Some((*label, score));
            }
        }
    }
    best.map(|(label, _)| label)
}

fn heading_label(block: &TextBlock, config: &ParsingConfig) -> Option<SectionLabel> {
    if !block.styled || block.text.trim().len() > config.heading_len_limit {
        return None;
    }
    classify_heading(&block.text, config.heading_min_score)
}

/// Classify the block stream into labeled, contiguous sections.
///
/// Sections partition the stream in order: every block lands in exactly one
/// section. A recognized References heading terminates body segmentation —
/// all subsequent blocks belong to the References section no matter how
/// heading-like they look (numbered reference entries must not open
/// sections). If no heading matches at all the whole stream becomes one
/// `Other` section; that is a valid degraded output, not an error.
pub fn segment_sections(blocks: &[TextBlock]) -> Vec<Section> {
    segment_sections_with_config(blocks, &ParsingConfig::default())
}

/// Config-aware version of [`segment_sections`].
pub(crate) fn segment_sections_with_config(
    blocks: &[TextBlock],
    config: &ParsingConfig,
) -> Vec<Section> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let headings: Vec<(usize, SectionLabel)> = blocks
        .iter()
        .enumerate()
        .filter_map(|(i, b)| heading_label(b, config).map(|label| (i, label)))
        .collect();

    let Some(&(first_heading, first_label)) = headings.first() else {
        return vec![section_from(SectionLabel::Other, blocks)];
    };

    let mut sections = Vec::new();
    if first_heading > 0 {
        sections.extend(preamble_sections(&blocks[..first_heading], config));
    }

    let heading_at: HashMap<usize, SectionLabel> = headings.iter().copied().collect();
    let mut run_start = first_heading;
    let mut current = first_label;
    let mut in_references = current == SectionLabel::References;

    for i in (first_heading + 1)..blocks.len() {
        if !in_references
            && let Some(&label) = heading_at.get(&i)
        {
            sections.push(section_from(current, &blocks[run_start..i]));
            run_start = i;
            current = label;
            if label == SectionLabel::References {
                in_references = true;
            }
        }
    }
    sections.push(section_from(current, &blocks[run_start..]));

    tracing::debug!(
        sections = sections.len(),
        references = in_references,
        "segmented block stream"
    );
    sections
}

/// Label the blocks before the first recognized heading.
///
/// Position heuristic: the first block is the Title when it fits a title
/// line; the remaining lead blocks are the Abstract when at least one is
/// paragraph-like. Anything ambiguous falls back to `Other`.
fn preamble_sections(lead: &[TextBlock], config: &ParsingConfig) -> Vec<Section> {
    let title_like = lead[0].text.trim().len() <= config.title_len_limit;
    if lead.len() == 1 {
        let label = if title_like {
            SectionLabel::Title
        } else {
            SectionLabel::Other
        };
        return vec![section_from(label, lead)];
    }

    let rest = &lead[1..];
    let has_paragraph = rest
        .iter()
        .any(|b| b.text.trim().len() >= config.paragraph_min_len);

    match (title_like, has_paragraph) {
        (true, true) => vec![
            section_from(SectionLabel::Title, &lead[..1]),
            section_from(SectionLabel::Abstract, rest),
        ],
        (true, false) => vec![
            section_from(SectionLabel::Title, &lead[..1]),
            section_from(SectionLabel::Other, rest),
        ],
        (false, true) => vec![
            section_from(SectionLabel::Other, &lead[..1]),
            section_from(SectionLabel::Abstract, rest),
        ],
        (false, false) => vec![section_from(SectionLabel::Other, lead)],
    }
}

fn section_from(label: SectionLabel, blocks: &[TextBlock]) -> Section {
    let text = blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    Section {
        label,
        start_order: blocks[0].order,
        end_order: blocks[blocks.len() - 1].order,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str, order: u32) -> TextBlock {
        TextBlock::new(text, 0, order, false)
    }

    fn heading(text: &str, order: u32) -> TextBlock {
        TextBlock::new(text, 0, order, true)
    }

    #[test]
    fn classify_canonical_names() {
        assert_eq!(
            classify_heading("Introduction", 0.8),
            Some(SectionLabel::Background)
        );
        assert_eq!(
            classify_heading("Related Work", 0.8),
            Some(SectionLabel::Background)
        );
        assert_eq!(
            classify_heading("Materials and Methods", 0.8),
            Some(SectionLabel::Methods)
        );
        assert_eq!(
            classify_heading("RESULTS", 0.8),
            Some(SectionLabel::Results)
        );
        assert_eq!(
            classify_heading("Bibliography", 0.8),
            Some(SectionLabel::References)
        );
    }

    #[test]
    fn classify_strips_numbering_prefixes() {
        assert_eq!(
            classify_heading("1. Introduction", 0.8),
            Some(SectionLabel::Background)
        );
        assert_eq!(
            classify_heading("IV. Results", 0.8),
            Some(SectionLabel::Results)
        );
        assert_eq!(
            classify_heading("3) Conclusion", 0.8),
            Some(SectionLabel::Conclusion)
        );
    }

    #[test]
    fn classify_tolerates_small_typos() {
        assert_eq!(classify_heading("Metods", 0.8), Some(SectionLabel::Methods));
        assert_eq!(
            classify_heading("Concluson", 0.8),
            Some(SectionLabel::Conclusion)
        );
    }

    #[test]
    fn classify_rejects_body_text() {
        assert_eq!(classify_heading("The quick brown fox jumps", 0.8), None);
        assert_eq!(classify_heading("Table 2", 0.8), None);
        assert_eq!(classify_heading("", 0.8), None);
    }

    #[test]
    fn segment_basic_paper() {
        let blocks = vec![
            body("A Study of Things", 0),
            body(
                "This paper studies things at length and reports what we found \
                 across a number of experiments.",
                1,
            ),
            heading("Introduction", 2),
            body("Things have long been studied [1].", 3),
            heading("Methods", 4),
            body("We did the thing carefully (Smith, 2020).", 5),
            heading("References", 6),
            body("[1] Smith, J. 2020. On things.", 7),
        ];
        let sections = segment_sections(&blocks);
        let labels: Vec<_> = sections.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![
                SectionLabel::Title,
                SectionLabel::Abstract,
                SectionLabel::Background,
                SectionLabel::Methods,
                SectionLabel::References,
            ]
        );
        assert_eq!(sections[0].start_order, 0);
        assert_eq!(sections[4].start_order, 6);
        assert_eq!(sections[4].end_order, 7);
    }

    #[test]
    fn references_heading_terminates_body_segmentation() {
        let blocks = vec![
            heading("Introduction", 0),
            body("Body text here.", 1),
            heading("References", 2),
            body("[1] First entry.", 3),
            // Heading-like block inside the reference list must not open a section
            heading("Discussion", 4),
            body("[2] Second entry.", 5),
        ];
        let sections = segment_sections(&blocks);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].label, SectionLabel::References);
        assert_eq!(sections[1].end_order, 5);
        assert!(sections[1].text.contains("Discussion"));
    }

    #[test]
    fn no_heading_yields_single_other_section() {
        let blocks = vec![
            body("Just some prose without any structure.", 0),
            body("More prose follows in another paragraph.", 1),
        ];
        let sections = segment_sections(&blocks);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].label, SectionLabel::Other);
        assert_eq!(sections[0].start_order, 0);
        assert_eq!(sections[0].end_order, 1);
    }

    #[test]
    fn unstyled_heading_text_is_not_a_heading() {
        // "Introduction" appearing as running text must not open a section
        let blocks = vec![body("Introduction", 0), body("Some other prose.", 1)];
        let sections = segment_sections(&blocks);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].label, SectionLabel::Other);
    }

    #[test]
    fn long_first_block_is_other_not_title() {
        let long_lead = "x".repeat(300);
        let blocks = vec![
            body(&long_lead, 0),
            heading("Methods", 1),
            body("Body.", 2),
        ];
        let sections = segment_sections(&blocks);
        assert_eq!(sections[0].label, SectionLabel::Other);
        assert_eq!(sections[1].label, SectionLabel::Methods);
    }

    #[test]
    fn short_lead_blocks_do_not_become_abstract() {
        let blocks = vec![
            body("A Title", 0),
            body("short line", 1),
            heading("Introduction", 2),
            body("Body.", 3),
        ];
        let sections = segment_sections(&blocks);
        let labels: Vec<_> = sections.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![
                SectionLabel::Title,
                SectionLabel::Other,
                SectionLabel::Background,
            ]
        );
    }

    #[test]
    fn sections_partition_the_stream() {
        let blocks = vec![
            body("Title line", 0),
            body(
                "An abstract paragraph that is comfortably long enough to count \
                 as real prose for the position heuristic.",
                1,
            ),
            heading("Introduction", 2),
            body("One.", 3),
            body("Two.", 4),
            heading("Conclusion", 5),
            body("Three.", 6),
        ];
        let sections = segment_sections(&blocks);
        // Full coverage, in order, no overlap
        assert_eq!(sections[0].start_order, blocks[0].order);
        assert_eq!(sections.last().unwrap().end_order, blocks.last().unwrap().order);
        for pair in sections.windows(2) {
            assert!(pair[0].end_order < pair[1].start_order);
        }
        // Round trip: concatenated section text reproduces every block's text
        let joined: String = sections
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        for b in &blocks {
            assert!(joined.contains(&b.text));
        }
    }

    #[test]
    fn heading_block_text_stays_in_its_section() {
        let blocks = vec![heading("Introduction", 0), body("Body text.", 1)];
        let sections = segment_sections(&blocks);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].text.contains("Introduction"));
        assert!(sections[0].text.contains("Body text."));
    }
}
