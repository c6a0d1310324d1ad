use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use serde::Serialize;

use citemap_core::{ResolutionStatus, ResolvedCitation, SectionLabel, StructuredDocument};
use citemap_summarize::DocumentSummary;

use crate::{ExportFormat, ReportError};

/// Render a structured document to the given format.
///
/// When a summary is supplied, section bodies are replaced by their
/// summaries; the reference list and citation map always render in full.
/// Per-citation status and confidence are always visible so degraded
/// resolutions stay distinguishable from confident ones.
pub fn render(
    document: &StructuredDocument,
    summary: Option<&DocumentSummary>,
    format: ExportFormat,
) -> Result<String, ReportError> {
    match format {
        ExportFormat::Json => render_json(document, summary),
        ExportFormat::Markdown => Ok(render_markdown(document, summary)),
        ExportFormat::Html => Ok(render_html(document, summary)),
    }
}

/// Render and write to a file.
pub fn export_to_path(
    document: &StructuredDocument,
    summary: Option<&DocumentSummary>,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ReportError> {
    let content = render(document, summary, format)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn status_str(status: ResolutionStatus) -> &'static str {
    match status {
        ResolutionStatus::Resolved => "resolved",
        ResolutionStatus::Ambiguous => "ambiguous",
        ResolutionStatus::Unresolved => "unresolved",
    }
}

/// Document title line: the Title section's first line, if there is one.
fn title_of(document: &StructuredDocument) -> &str {
    document
        .section(SectionLabel::Title)
        .and_then(|s| s.text.lines().next())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Structured Document")
}

/// Sections rendered as prose: everything except Title and References.
fn prose_sections(document: &StructuredDocument) -> impl Iterator<Item = &citemap_core::Section> {
    document
        .sections
        .iter()
        .filter(|s| s.label != SectionLabel::Title && s.label != SectionLabel::References)
}

fn section_body<'a>(
    label: SectionLabel,
    full_text: &'a str,
    summary: Option<&'a DocumentSummary>,
) -> &'a str {
    match summary {
        Some(s) => s.section(label).unwrap_or(""),
        None => full_text,
    }
}

/// One line describing a resolved citation, shared by Markdown and HTML.
fn citation_line(citation: &ResolvedCitation, document: &StructuredDocument) -> String {
    let mut line = format!(
        "{} ({}) -> {} [{:.2}]",
        citation.marker.surface_text,
        citation.marker.section_label.as_str(),
        status_str(citation.status),
        citation.confidence,
    );
    let joined: Vec<String> = citation
        .matched_ids
        .iter()
        .filter_map(|&id| document.reference(id))
        .map(|e| format!("[{}] {}", e.id, e.raw_text))
        .collect();
    if !joined.is_empty() {
        let _ = write!(line, " -> {}", joined.join(" | "));
    }
    line
}

// ── JSON ──

#[derive(Serialize)]
struct Report<'a> {
    title: &'a str,
    #[serde(flatten)]
    document: &'a StructuredDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a DocumentSummary>,
}

fn render_json(
    document: &StructuredDocument,
    summary: Option<&DocumentSummary>,
) -> Result<String, ReportError> {
    let report = Report {
        title: title_of(document),
        document,
        summary,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

// ── Markdown ──

fn render_markdown(document: &StructuredDocument, summary: Option<&DocumentSummary>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", title_of(document));

    for section in prose_sections(document) {
        let body = section_body(section.label, &section.text, summary);
        let _ = writeln!(out, "\n## {}\n", section.label.as_str());
        let _ = writeln!(out, "{}", body.trim());
    }

    let _ = writeln!(out, "\n## References\n");
    if document.references.is_empty() {
        let _ = writeln!(out, "(none found)");
    }
    for entry in &document.references {
        let _ = writeln!(out, "{}. {}", entry.id, entry.raw_text);
    }

    let _ = writeln!(out, "\n## Citations\n");
    if document.citations.is_empty() {
        let _ = writeln!(out, "(none found)");
    }
    for citation in &document.citations {
        let _ = writeln!(out, "- {}", citation_line(citation, document));
    }
    out
}

// ── HTML ──

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn render_html(document: &StructuredDocument, summary: Option<&DocumentSummary>) -> String {
    let title = html_escape(title_of(document));
    let mut out = String::new();
    let _ = writeln!(out, "<html>");
    let _ = writeln!(out, "  <head><title>{title}</title></head>");
    let _ = writeln!(out, "  <body>");
    let _ = writeln!(out, "    <h1>{title}</h1>");

    for section in prose_sections(document) {
        let body = section_body(section.label, &section.text, summary);
        let _ = writeln!(out, "    <h2>{}</h2>", section.label.as_str());
        let _ = writeln!(out, "    <p>{}</p>", html_escape(body.trim()));
    }

    let _ = writeln!(out, "    <h2>References</h2>");
    let _ = writeln!(out, "    <ol>");
    for entry in &document.references {
        let _ = writeln!(out, "      <li>{}</li>", html_escape(&entry.raw_text));
    }
    let _ = writeln!(out, "    </ol>");

    let _ = writeln!(out, "    <h2>Citations</h2>");
    let _ = writeln!(out, "    <ul>");
    for citation in &document.citations {
        let _ = writeln!(
            out,
            "      <li>{}</li>",
            html_escape(&citation_line(citation, document))
        );
    }
    let _ = writeln!(out, "    </ul>");
    let _ = writeln!(out, "  </body>");
    let _ = writeln!(out, "</html>");
    out
}
