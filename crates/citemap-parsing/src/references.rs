use once_cell::sync::Lazy;
use regex::Regex;

use citemap_core::{ReferenceEntry, Section, StyleHint};

use crate::config::ParsingConfig;

/// Line-start numeric entry markers: `[1]`, `1.`, `1)`. Limited to 1-3
/// digits so a 4-digit year at a line start can never split an entry.
static NUMERIC_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:\[(\d{1,3})\]|(\d{1,3})[.)])\s+").unwrap());

static BLANK_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Em-dash run meaning "same authors as the previous entry".
static EM_DASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\u{2014}\u{2013}\-]{2,}\s*[,.]?").unwrap());

static QUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["\u{201c}\u{201d}]"#).unwrap());

static PAREN_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*(?:19|20)\d{2}[a-z]?\s*\)").unwrap());

static ACM_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\s*(?:19|20)\d{2}\.\s*").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

/// Parse the References section into structured entries.
///
/// Splitting never fails: when neither numeric markers nor blank-line
/// boundaries are present the whole section becomes one entry. Entry `id`s
/// are 1-based sequence positions, deliberately decoupled from whatever
/// numbers the source printed (those may repeat or skip).
pub fn parse_reference_list(section: &Section) -> Vec<ReferenceEntry> {
    parse_reference_list_with_config(section, &ParsingConfig::default())
}

/// Config-aware version of [`parse_reference_list`].
pub(crate) fn parse_reference_list_with_config(
    section: &Section,
    config: &ParsingConfig,
) -> Vec<ReferenceEntry> {
    let (raw_entries, numeric) = split_entries(&section.text, config);
    tracing::debug!(
        entries = raw_entries.len(),
        strategy = if numeric { "numeric" } else { "boundary" },
        "split reference list"
    );

    let mut entries = Vec::with_capacity(raw_entries.len());
    let mut previous_authors: Vec<String> = Vec::new();

    for (i, raw) in raw_entries.into_iter().enumerate() {
        let raw_text = WS_RE.replace_all(raw.trim(), " ").into_owned();

        let authors = match extract_surnames(&raw_text, config.max_authors) {
            Surnames::SameAsPrevious => previous_authors.clone(),
            Surnames::Names(names) => names,
        };
        if !authors.is_empty() {
            previous_authors = authors.clone();
        }

        let year = YEAR_RE
            .captures(&raw_text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok());

        let style_hint = if numeric {
            StyleHint::Numeric
        } else if PAREN_YEAR_RE.is_match(&raw_text) {
            StyleHint::AuthorYear
        } else {
            StyleHint::Unknown
        };

        entries.push(ReferenceEntry {
            id: i + 1,
            raw_text,
            authors,
            year,
            style_hint,
        });
    }
    entries
}

/// Split the section text into raw entry strings.
///
/// Priority: line-start numeric markers, then blank-line boundaries, then
/// the whole section as a single degraded entry. Returns the raw strings
/// and whether the numeric strategy fired.
fn split_entries(text: &str, config: &ParsingConfig) -> (Vec<String>, bool) {
    let re = config.numeric_entry_re.as_ref().unwrap_or(&NUMERIC_ENTRY_RE);
    let matches: Vec<_> = re.find_iter(text).collect();
    if matches.len() >= config.min_numeric_entries {
        let mut parts = Vec::with_capacity(matches.len());
        for i in 0..matches.len() {
            let start = matches[i].end();
            let end = if i + 1 < matches.len() {
                matches[i + 1].start()
            } else {
                text.len()
            };
            let content = text[start..end].trim();
            if !content.is_empty() {
                parts.push(content.to_string());
            }
        }
        if !parts.is_empty() {
            return (parts, true);
        }
    }

    // Blank-line boundaries; short fragments (the section heading, stray
    // page numbers) are dropped.
    let parts: Vec<String> = BLANK_LINE_RE
        .split(text)
        .map(|p| p.trim())
        .filter(|p| p.len() > 20)
        .map(|p| p.to_string())
        .collect();
    if !parts.is_empty() {
        return (parts, false);
    }

    let whole = text.trim();
    if whole.is_empty() {
        (Vec::new(), false)
    } else {
        (vec![whole.to_string()], false)
    }
}

enum Surnames {
    Names(Vec<String>),
    SameAsPrevious,
}

/// Extract author surnames from the start of a reference entry.
///
/// The author run ends at the first quoted-title delimiter, parenthesized
/// year, ACM-style `. YYYY.` marker, or real sentence period — whichever
/// appears first in that priority order. An em-dash run delegates to the
/// previous entry's authors.
fn extract_surnames(text: &str, max_authors: usize) -> Surnames {
    if EM_DASH_RE.is_match(text) {
        return Surnames::SameAsPrevious;
    }

    let author_end = if let Some(m) = QUOTE_RE.find(text) {
        m.start()
    } else if let Some(m) = PAREN_YEAR_RE.find(text) {
        m.start()
    } else if let Some(m) = ACM_YEAR_RE.find(text) {
        m.start() + 1
    } else if let Some(pos) = find_first_real_period(text) {
        pos
    } else {
        text.len()
    };

    let section = text[..author_end].trim();
    let section = section.trim_end_matches([',', ';', ':', '.']).trim();
    if section.is_empty() {
        return Surnames::Names(Vec::new());
    }

    // Normalize separators so one comma split covers every style
    static SEMI_AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i);\s+and\s+").unwrap());
    static AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i),?\s+and\s+").unwrap());
    static AMP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*&\s*").unwrap());
    static ET_AL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i),?\s*et\s+al\.?").unwrap());

    let section = SEMI_AND_RE.replace_all(section, "; ");
    let section = AND_RE.replace_all(&section, ", ");
    let section = AMP_RE.replace_all(&section, ", ");
    let section = ET_AL_RE.replace_all(&section, "");
    let section = section.replace(';', ",");

    let mut surnames = Vec::new();
    for part in section.split(',') {
        if let Some(name) = surname_of(part) {
            surnames.push(name);
        }
    }
    surnames.truncate(max_authors);
    Surnames::Names(surnames)
}

/// Find the first period that ends a sentence rather than an initial
/// like `J.`.
fn find_first_real_period(text: &str) -> Option<usize> {
    static PERIOD_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\s").unwrap());

    for m in PERIOD_SPACE.find_iter(text) {
        let pos = m.start();
        if pos == 0 {
            continue;
        }
        let before = text.as_bytes()[pos - 1];
        if before.is_ascii_uppercase()
            && (pos == 1 || !text.as_bytes()[pos - 2].is_ascii_alphabetic())
        {
            // An initial — keep scanning
            continue;
        }
        return Some(pos);
    }
    None
}

/// Pull the surname out of one author fragment ("J. Smith", "Smith",
/// "Smith J", "van der Berg"). `None` when the fragment is not name-like.
fn surname_of(part: &str) -> Option<String> {
    const PARTICLES: &[&str] = &["de", "van", "von", "la", "del", "di", "der"];

    let part = part.trim();
    if part.len() < 2 || part.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let words: Vec<&str> = part.split_whitespace().collect();
    if words.is_empty() || words.len() > 5 {
        return None;
    }

    // Fragments with several lowercase non-particle words are title or
    // venue text, not a name
    let lowercase_words = words
        .iter()
        .filter(|w| {
            w.chars().next().is_some_and(|c| c.is_lowercase())
                && !PARTICLES.contains(&w.to_lowercase().as_str())
        })
        .count();
    if lowercase_words > 1 {
        return None;
    }

    for word in words.iter().rev() {
        let word = word.trim_matches(|c: char| matches!(c, '.' | ',' | ';' | ':'));
        if word.len() >= 2
            && word.chars().next().is_some_and(|c| c.is_uppercase())
            && word.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'')
        {
            return Some(word.to_string());
        }
    }
    None
}
