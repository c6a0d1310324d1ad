use once_cell::sync::Lazy;
use regex::Regex;

use citemap_core::{CitationMarker, MarkerStyle, Section, SectionLabel};

/// Bracketed integer list: `[12]`, `[3,7]`, `[2-4, 9]`. The first character
/// must be a digit so prose in brackets never matches.
static BRACKET_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*([0-9][0-9,\s\u{2013}\-]*)\]").unwrap());

/// Parenthesized block containing a plausible publication year.
static PAREN_YEAR_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^()]*\b(?:19|20)\d{2}[a-z]?[^()]*)\)").unwrap());

/// One author-year pair: `Smith, 2020`, `Smith & Doe, 2019`,
/// `Smith et al., 2018`, `Smith, Jones, 2017`.
static SINGLE_AUTHORYEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*([A-Z][A-Za-z\-]+)(?:\s*&\s*[A-Z][A-Za-z\-]+|\s+et\s+al\.?|(?:\s*,\s*[A-Z][A-Za-z\-]+)*)\s*,\s*((?:19|20)\d{2})[a-z]?\s*$",
    )
    .unwrap()
});

/// A comma is a citation separator only when a fresh `Surname, YYYY` pair
/// starts right after it.
static PAIR_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[A-Z][A-Za-z\-]+\s*,\s*(?:19|20)\d{2}").unwrap());

/// Narrative citation: `Smith (2020)`, `Smith et al. (2020)`.
static NARRATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Z][A-Za-z\-]+)(?:\s+et\s+al\.?)?\s*\(((?:19|20)\d{2})[a-z]?\)").unwrap()
});

/// Capitalized sentence-starters that the narrative pattern would otherwise
/// mistake for surnames.
const NARRATIVE_STOPWORDS: &[&str] = &[
    "In", "The", "A", "An", "As", "At", "By", "For", "From", "On", "Of", "See", "Since",
    "Section", "Table", "Figure", "Equation",
];

/// Detect citation markers across every non-References section.
///
/// Three pattern passes run in a fixed order — numeric, author-year,
/// narrative — and a span claimed by an earlier pass is never reconsidered
/// by a later one (numeric first, so a bracketed number cannot be read as
/// part of a name). Output is ordered by section position, then offset.
pub fn detect_markers(sections: &[Section]) -> Vec<CitationMarker> {
    let mut markers = Vec::new();
    for section in sections {
        if section.label == SectionLabel::References {
            continue;
        }
        markers.extend(detect_in_section(section));
    }
    markers
}

fn detect_in_section(section: &Section) -> Vec<CitationMarker> {
    let text = section.text.as_str();
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut found = Vec::new();

    // Pass 1: numeric / numeric-multi
    for caps in BRACKET_BLOCK_RE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let ids = expand_bracket_block(caps.get(1).unwrap().as_str());
        if ids.is_empty() {
            continue;
        }
        let style = if ids.len() == 1 {
            MarkerStyle::Numeric
        } else {
            MarkerStyle::NumericMulti
        };
        claimed.push((whole.start(), whole.end()));
        found.push(CitationMarker {
            surface_text: whole.as_str().to_string(),
            section_label: section.label,
            char_offset: whole.start(),
            style,
            keys: ids.iter().map(|n| n.to_string()).collect(),
        });
    }

    // Pass 2: parenthesized author-year
    for caps in PAREN_YEAR_BLOCK_RE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        if overlaps(&claimed, whole.start(), whole.end()) {
            continue;
        }
        let keys = author_year_keys(caps.get(1).unwrap().as_str());
        if keys.is_empty() {
            continue;
        }
        claimed.push((whole.start(), whole.end()));
        found.push(CitationMarker {
            surface_text: whole.as_str().to_string(),
            section_label: section.label,
            char_offset: whole.start(),
            style: MarkerStyle::AuthorYear,
            keys,
        });
    }

    // Pass 3: narrative
    for caps in NARRATIVE_RE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        if overlaps(&claimed, whole.start(), whole.end()) {
            continue;
        }
        let surname = caps.get(1).unwrap().as_str();
        if NARRATIVE_STOPWORDS.contains(&surname) {
            continue;
        }
        let year = caps.get(2).unwrap().as_str();
        claimed.push((whole.start(), whole.end()));
        found.push(CitationMarker {
            surface_text: whole.as_str().to_string(),
            section_label: section.label,
            char_offset: whole.start(),
            style: MarkerStyle::Narrative,
            keys: vec![format!("{surname}|{year}")],
        });
    }

    found.sort_by_key(|m| m.char_offset);
    found
}

fn overlaps(claimed: &[(usize, usize)], start: usize, end: usize) -> bool {
    claimed.iter().any(|&(s, e)| start < e && s < end)
}

/// Expand the inside of a bracket block into individual reference numbers.
/// `"1,3, 5-7"` becomes `[1, 3, 5, 6, 7]`. Numbers are kept within 1..=999
/// and degenerate ranges fall back to their parsable endpoints.
fn expand_bracket_block(block: &str) -> Vec<usize> {
    fn in_range(n: usize) -> bool {
        (1..=999).contains(&n)
    }

    let block = block.replace('\u{2013}', "-");
    let mut ids = Vec::new();
    for piece in block.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        if let Some((a, b)) = piece.split_once('-') {
            let start = a.trim().parse::<usize>().ok();
            let end = b.trim().parse::<usize>().ok();
            match (start, end) {
                (Some(s), Some(e)) if s <= e && in_range(s) && in_range(e) && e - s < 500 => {
                    ids.extend(s..=e);
                }
                _ => {
                    for n in [start, end].into_iter().flatten().filter(|&n| in_range(n)) {
                        ids.push(n);
                    }
                }
            }
        } else if let Ok(n) = piece.parse::<usize>()
            && in_range(n)
        {
            ids.push(n);
        }
    }
    ids
}

/// Split the inner text of a year-bearing parenthesized block into
/// `surname|year` keys. Semicolons separate distinct citations; commas
/// only when a fresh pair starts right after.
fn author_year_keys(inner: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for part in inner.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        for cand in split_conservative_commas(part) {
            if let Some(key) = author_year_key(cand) {
                keys.push(key);
            }
        }
    }
    // Last chance: the whole block as one pair
    if keys.is_empty()
        && let Some(key) = author_year_key(inner.trim())
    {
        keys.push(key);
    }
    keys
}

fn split_conservative_commas(part: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, _) in part.match_indices(',') {
        if i > start && PAIR_START_RE.is_match(&part[i + 1..]) {
            pieces.push(part[start..i].trim());
            start = i + 1;
        }
    }
    pieces.push(part[start..].trim());
    pieces
}

fn author_year_key(cand: &str) -> Option<String> {
    let caps = SINGLE_AUTHORYEAR_RE.captures(cand)?;
    let surname = caps.get(1).unwrap().as_str();
    let year = caps.get(2).unwrap().as_str();
    Some(format!("{surname}|{year}"))
}
