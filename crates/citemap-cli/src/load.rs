use std::path::Path;

use citemap_core::{BlockSource, SourceError, TextBlock};

/// Loads pre-extracted plain text as a block stream.
///
/// Conventions: form feeds (`\x0c`) separate pages, blank lines separate
/// blocks. The heading-style flag the engine treats as opaque is derived
/// here from line shape, since plain text carries no font information.
pub struct TextFileSource;

impl BlockSource for TextFileSource {
    fn extract_blocks(&self, path: &Path) -> Result<Vec<TextBlock>, SourceError> {
        let text = std::fs::read_to_string(path)?;
        Ok(blocks_from_text(&text))
    }
}

/// Split raw text into page-ordered blocks.
pub fn blocks_from_text(text: &str) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut order = 0u32;
    for (page, page_text) in text.split('\u{0c}').enumerate() {
        for para in split_paragraphs(page_text) {
            blocks.push(TextBlock::new(
                para,
                page as u32,
                order,
                looks_like_heading(para),
            ));
            order += 1;
        }
    }
    blocks
}

fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n")
        .flat_map(|chunk| chunk.split("\r\n\r\n"))
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// Heading heuristic for plain text: a single short line, starting with an
/// uppercase letter or a number, few words, no sentence-terminal period.
fn looks_like_heading(text: &str) -> bool {
    if text.contains('\n') || text.len() > 80 {
        return false;
    }
    if text.ends_with(['.', '!', '?', ':', ',']) {
        return false;
    }
    if text.split_whitespace().count() > 6 {
        return false;
    }
    text.chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(|c| c.is_uppercase())
}
