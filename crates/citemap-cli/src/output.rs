use std::io::Write;

use citemap_core::{ResolutionStatus, StructuredDocument};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the resolved citation map for one document.
pub fn print_citation_map(
    w: &mut dyn Write,
    doc: &StructuredDocument,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(
        w,
        "Found {} reference entries and {} citation markers",
        doc.references.len(),
        doc.citations.len()
    )?;
    writeln!(w)?;

    for citation in &doc.citations {
        let status = match citation.status {
            ResolutionStatus::Resolved => "RESOLVED",
            ResolutionStatus::Ambiguous => "AMBIGUOUS",
            ResolutionStatus::Unresolved => "UNRESOLVED",
        };
        let head = format!(
            "{} ({}, offset {})",
            citation.marker.surface_text,
            citation.marker.section_label.as_str(),
            citation.marker.char_offset,
        );
        if color.enabled() {
            match citation.status {
                ResolutionStatus::Resolved => {
                    writeln!(w, "{} -> {} ({:.2})", head, status.green(), citation.confidence)?
                }
                ResolutionStatus::Ambiguous => {
                    writeln!(w, "{} -> {} ({:.2})", head, status.yellow(), citation.confidence)?
                }
                ResolutionStatus::Unresolved => {
                    writeln!(w, "{} -> {} ({:.2})", head, status.red(), citation.confidence)?
                }
            }
        } else {
            writeln!(w, "{} -> {} ({:.2})", head, status, citation.confidence)?;
        }

        for &id in &citation.matched_ids {
            if let Some(entry) = doc.reference(id) {
                let line = format!("    [{}] {}", entry.id, entry.raw_text);
                if color.enabled() {
                    writeln!(w, "{}", line.dimmed())?;
                } else {
                    writeln!(w, "{}", line)?;
                }
            }
        }
    }

    let resolved = count_status(doc, ResolutionStatus::Resolved);
    let ambiguous = count_status(doc, ResolutionStatus::Ambiguous);
    let unresolved = count_status(doc, ResolutionStatus::Unresolved);
    writeln!(w)?;
    writeln!(
        w,
        "{} resolved, {} ambiguous, {} unresolved",
        resolved, ambiguous, unresolved
    )?;
    Ok(())
}

fn count_status(doc: &StructuredDocument, status: ResolutionStatus) -> usize {
    doc.citations.iter().filter(|c| c.status == status).count()
}
