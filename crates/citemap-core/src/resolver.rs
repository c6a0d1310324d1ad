//! Marker-to-entry resolution.
//!
//! Resolution is a pure function of (markers, entries): no randomness, no
//! external lookups, identical input always yields identical output. Numeric
//! keys join directly against [`ReferenceEntry::id`]; `surname|year` keys
//! join against the first author surname (case-insensitive) plus year.

use crate::{
    CitationMarker, MarkerStyle, ReferenceEntry, ResolutionStatus, ResolvedCitation,
};

/// Resolve every marker against the reference list, one output per input
/// marker, in the same order.
pub fn resolve_citations(
    markers: &[CitationMarker],
    entries: &[ReferenceEntry],
) -> Vec<ResolvedCitation> {
    markers
        .iter()
        .map(|marker| resolve_marker(marker, entries))
        .collect()
}

fn resolve_marker(marker: &CitationMarker, entries: &[ReferenceEntry]) -> ResolvedCitation {
    let resolved = match marker.style {
        MarkerStyle::Numeric | MarkerStyle::NumericMulti => resolve_numeric(marker, entries),
        MarkerStyle::AuthorYear | MarkerStyle::Narrative => resolve_author_year(marker, entries),
    };
    if resolved.status == ResolutionStatus::Unresolved {
        tracing::debug!(
            surface = %marker.surface_text,
            section = marker.section_label.as_str(),
            "citation marker did not resolve"
        );
    }
    resolved
}

fn resolve_numeric(marker: &CitationMarker, entries: &[ReferenceEntry]) -> ResolvedCitation {
    let requested = marker.keys.len();
    let mut matched_ids = Vec::new();
    for key in &marker.keys {
        if let Ok(id) = key.parse::<usize>()
            && entries.iter().any(|e| e.id == id)
        {
            matched_ids.push(id);
        }
    }

    let status = if matched_ids.is_empty() {
        ResolutionStatus::Unresolved
    } else if matched_ids.len() == requested {
        ResolutionStatus::Resolved
    } else {
        // Only reachable for NumericMulti: some but not all ids matched.
        ResolutionStatus::Ambiguous
    };
    let confidence = if requested == 0 {
        0.0
    } else {
        matched_ids.len() as f64 / requested as f64
    };

    ResolvedCitation {
        marker: marker.clone(),
        matched_ids,
        status,
        confidence,
    }
}

fn resolve_author_year(marker: &CitationMarker, entries: &[ReferenceEntry]) -> ResolvedCitation {
    let total = marker.keys.len();
    let mut matched_ids = Vec::new();
    let mut exact = 0usize;
    let mut zero = 0usize;
    let mut any_duplicate = false;

    for key in &marker.keys {
        let hits = match key.split_once('|') {
            Some((surname, year)) => lookup_author_year(surname, year, entries),
            None => Vec::new(),
        };
        match hits.len() {
            0 => zero += 1,
            1 => {
                exact += 1;
                matched_ids.extend(hits);
            }
            // Duplicate author+year in the reference list: include every
            // candidate and surface the ambiguity rather than guessing.
            _ => {
                any_duplicate = true;
                matched_ids.extend(hits);
            }
        }
    }

    let status = if any_duplicate {
        ResolutionStatus::Ambiguous
    } else if total > 0 && exact == total {
        ResolutionStatus::Resolved
    } else if zero == total {
        ResolutionStatus::Unresolved
    } else {
        ResolutionStatus::Ambiguous
    };
    let confidence = if total == 0 {
        0.0
    } else {
        exact as f64 / total as f64
    };

    ResolvedCitation {
        marker: marker.clone(),
        matched_ids,
        status,
        confidence,
    }
}

/// Ids of entries whose first author surname matches `surname`
/// case-insensitively and whose year matches `year`.
fn lookup_author_year(surname: &str, year: &str, entries: &[ReferenceEntry]) -> Vec<usize> {
    let Ok(year) = year.parse::<i32>() else {
        return Vec::new();
    };
    let surname = surname.to_lowercase();
    entries
        .iter()
        .filter(|e| {
            e.year == Some(year)
                && e.authors
                    .first()
                    .is_some_and(|a| a.to_lowercase() == surname)
        })
        .map(|e| e.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SectionLabel, StyleHint};

    fn entry(id: usize, surname: &str, year: i32) -> ReferenceEntry {
        ReferenceEntry {
            id,
            raw_text: format!("{surname}, {year}. Some paper."),
            authors: vec![surname.to_string()],
            year: Some(year),
            style_hint: StyleHint::AuthorYear,
        }
    }

    fn numbered_entries(n: usize) -> Vec<ReferenceEntry> {
        (1..=n)
            .map(|id| ReferenceEntry {
                id,
                raw_text: format!("Reference number {id}."),
                authors: vec![],
                year: None,
                style_hint: StyleHint::Numeric,
            })
            .collect()
    }

    fn marker(style: MarkerStyle, keys: &[&str]) -> CitationMarker {
        CitationMarker {
            surface_text: "[x]".to_string(),
            section_label: SectionLabel::Background,
            char_offset: 0,
            style,
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn numeric_out_of_range_is_unresolved() {
        let entries = numbered_entries(10);
        let m = marker(MarkerStyle::Numeric, &["11"]);
        let r = &resolve_citations(&[m], &entries)[0];
        assert!(r.matched_ids.is_empty());
        assert_eq!(r.status, ResolutionStatus::Unresolved);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn numeric_single_match_is_resolved() {
        let entries = numbered_entries(10);
        let m = marker(MarkerStyle::Numeric, &["4"]);
        let r = &resolve_citations(&[m], &entries)[0];
        assert_eq!(r.matched_ids, vec![4]);
        assert_eq!(r.status, ResolutionStatus::Resolved);
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn numeric_multi_partial_match_is_ambiguous() {
        // [3,7] with entry 7 missing
        let entries = numbered_entries(5);
        let m = marker(MarkerStyle::NumericMulti, &["3", "7"]);
        let r = &resolve_citations(&[m], &entries)[0];
        assert_eq!(r.matched_ids, vec![3]);
        assert_eq!(r.status, ResolutionStatus::Ambiguous);
        assert_eq!(r.confidence, 0.5);
    }

    #[test]
    fn numeric_multi_full_match_is_resolved() {
        let entries = numbered_entries(10);
        let m = marker(MarkerStyle::NumericMulti, &["4", "5", "6"]);
        let r = &resolve_citations(&[m], &entries)[0];
        assert_eq!(r.matched_ids, vec![4, 5, 6]);
        assert_eq!(r.status, ResolutionStatus::Resolved);
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn numeric_no_keys_is_unresolved() {
        let entries = numbered_entries(3);
        let m = marker(MarkerStyle::Numeric, &[]);
        let r = &resolve_citations(&[m], &entries)[0];
        assert_eq!(r.status, ResolutionStatus::Unresolved);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn author_year_unique_match_is_resolved() {
        let entries = vec![entry(1, "Smith", 2020), entry(2, "Doe", 2019)];
        let m = marker(MarkerStyle::AuthorYear, &["Smith|2020"]);
        let r = &resolve_citations(&[m], &entries)[0];
        assert_eq!(r.matched_ids, vec![1]);
        assert_eq!(r.status, ResolutionStatus::Resolved);
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn author_year_is_case_insensitive() {
        let entries = vec![entry(1, "Smith", 2020)];
        let m = marker(MarkerStyle::Narrative, &["smith|2020"]);
        let r = &resolve_citations(&[m], &entries)[0];
        assert_eq!(r.status, ResolutionStatus::Resolved);
    }

    #[test]
    fn duplicate_author_year_forces_ambiguous() {
        // Two distinct Smith 2020 papers in the list
        let entries = vec![
            entry(1, "Smith", 2020),
            entry(2, "Smith", 2020),
            entry(3, "Doe", 2019),
        ];
        let m = marker(MarkerStyle::AuthorYear, &["Smith|2020", "Doe|2019"]);
        let r = &resolve_citations(&[m], &entries)[0];
        assert_eq!(r.matched_ids, vec![1, 2, 3]);
        assert_eq!(r.status, ResolutionStatus::Ambiguous);
    }

    #[test]
    fn author_year_all_unknown_is_unresolved() {
        let entries = vec![entry(1, "Smith", 2020)];
        let m = marker(MarkerStyle::AuthorYear, &["Jones|1999", "Brown|1998"]);
        let r = &resolve_citations(&[m], &entries)[0];
        assert!(r.matched_ids.is_empty());
        assert_eq!(r.status, ResolutionStatus::Unresolved);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn author_year_partial_match_is_ambiguous() {
        let entries = vec![entry(1, "Smith", 2020)];
        let m = marker(MarkerStyle::AuthorYear, &["Smith|2020", "Jones|1999"]);
        let r = &resolve_citations(&[m], &entries)[0];
        assert_eq!(r.matched_ids, vec![1]);
        assert_eq!(r.status, ResolutionStatus::Ambiguous);
        assert_eq!(r.confidence, 0.5);
    }

    #[test]
    fn year_must_match_not_just_surname() {
        let entries = vec![entry(1, "Smith", 2018)];
        let m = marker(MarkerStyle::AuthorYear, &["Smith|2020"]);
        let r = &resolve_citations(&[m], &entries)[0];
        assert_eq!(r.status, ResolutionStatus::Unresolved);
    }

    #[test]
    fn only_first_author_surname_matches() {
        let mut e = entry(1, "Smith", 2020);
        e.authors = vec!["Smith".into(), "Jones".into()];
        let entries = vec![e];
        let hit = marker(MarkerStyle::AuthorYear, &["Smith|2020"]);
        let miss = marker(MarkerStyle::AuthorYear, &["Jones|2020"]);
        let resolved = resolve_citations(&[hit, miss], &entries);
        assert_eq!(resolved[0].status, ResolutionStatus::Resolved);
        assert_eq!(resolved[1].status, ResolutionStatus::Unresolved);
    }

    #[test]
    fn output_order_follows_input_order() {
        let entries = numbered_entries(3);
        let markers = vec![
            marker(MarkerStyle::Numeric, &["2"]),
            marker(MarkerStyle::Numeric, &["9"]),
            marker(MarkerStyle::Numeric, &["1"]),
        ];
        let resolved = resolve_citations(&markers, &entries);
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].matched_ids, vec![2]);
        assert!(resolved[1].matched_ids.is_empty());
        assert_eq!(resolved[2].matched_ids, vec![1]);
    }

    #[test]
    fn resolution_is_deterministic() {
        let entries = vec![entry(1, "Smith", 2020), entry(2, "Smith", 2020)];
        let m = marker(MarkerStyle::AuthorYear, &["Smith|2020"]);
        let first = resolve_citations(std::slice::from_ref(&m), &entries);
        let second = resolve_citations(std::slice::from_ref(&m), &entries);
        assert_eq!(first, second);
    }
}
