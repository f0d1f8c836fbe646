//! Rendering of transcript entries and the document list.
//!
//! Two targets share the same structure: HTML fragments (every interpolated
//! value escaped) and plain terminal text. Answer text is split into
//! paragraphs on blank lines; single newlines inside a paragraph become line
//! breaks.

use std::fmt::Write;

use crate::models::{Citation, DocumentRecord, Role, TranscriptEntry};
use crate::registry::DocumentListView;

/// Placeholder shown while the query service is working.
pub const THINKING: &str = "Thinking…";

/// Split `text` into paragraphs of lines.
///
/// A paragraph ends at a line that is empty or whitespace only; runs of
/// such lines never produce empty paragraphs.
pub fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ── HTML ──

pub fn entry_html(entry: &TranscriptEntry) -> String {
    let mut html = format!("<div class=\"message {}\">", entry.role.as_str());
    match entry.role {
        Role::Assistant => {
            html.push_str("<div class=\"message-body\">");
            for paragraph in paragraphs(&entry.body) {
                let lines: Vec<String> = paragraph.iter().map(|l| html_escape(l)).collect();
                let _ = write!(html, "<p>{}</p>", lines.join("<br>"));
            }
            html.push_str("</div>");
            html.push_str(&citations_html(&entry.citations));
        }
        Role::User | Role::Error => {
            let _ = write!(
                html,
                "<div class=\"message-body\">{}</div>",
                html_escape(&entry.body)
            );
        }
    }
    html.push_str("</div>");
    html
}

pub fn thinking_html() -> String {
    format!("<div class=\"message assistant thinking\">{}</div>", THINKING)
}

/// Citation block, or an empty string when there are no citations.
pub fn citations_html(citations: &[Citation]) -> String {
    if citations.is_empty() {
        return String::new();
    }
    let mut html = String::from("<div class=\"citations\">");
    for citation in citations {
        html.push_str(&citation_html(citation));
    }
    html.push_str("</div>");
    html
}

pub fn citation_html(citation: &Citation) -> String {
    let mut html = format!(
        "<div class=\"citation\"><div class=\"citation-doc\">{}</div>",
        html_escape(&citation.source_file)
    );
    if let Some(section) = &citation.section_title {
        let _ = write!(
            html,
            "<div class=\"citation-section\">{}</div>",
            html_escape(section)
        );
    }
    if let Some(page) = &citation.page_number {
        let _ = write!(
            html,
            "<div class=\"citation-page\">Page {}</div>",
            html_escape(page)
        );
    }
    html.push_str("</div>");
    html
}

pub fn documents_html(view: &DocumentListView) -> String {
    let mut html = format!(
        "<div class=\"documents\"><div class=\"doc-count\">{} indexed</div><ul>",
        view.indexed_count
    );
    for doc in &view.items {
        let _ = write!(
            html,
            "<li class=\"doc {status}\"><span class=\"doc-name\">{name}</span><span class=\"doc-status\">{status}</span></li>",
            name = html_escape(&doc.name),
            status = doc.status.as_str(),
        );
    }
    html.push_str("</ul></div>");
    html
}

// ── Terminal text ──

pub fn entry_text(entry: &TranscriptEntry) -> String {
    match entry.role {
        Role::User => format!("you> {}\n", entry.body),
        Role::Error => format!("error: {}\n", entry.body),
        Role::Assistant => {
            let body = paragraphs(&entry.body)
                .iter()
                .map(|p| p.join("\n"))
                .collect::<Vec<_>>()
                .join("\n\n");
            let mut out = format!("{}\n", body);
            if !entry.citations.is_empty() {
                out.push_str("\nSources:\n");
                for (i, citation) in entry.citations.iter().enumerate() {
                    let _ = writeln!(out, "  [{}] {}", i + 1, citation_text(citation));
                }
            }
            out
        }
    }
}

/// `a.pdf · Section 4 · Page 2`
pub fn citation_text(citation: &Citation) -> String {
    let mut parts = vec![citation.source_file.clone()];
    if let Some(section) = &citation.section_title {
        parts.push(section.clone());
    }
    if let Some(page) = &citation.page_number {
        parts.push(format!("Page {}", page));
    }
    parts.join(" · ")
}

pub fn documents_text(view: &DocumentListView) -> String {
    if view.items.is_empty() {
        return "No documents uploaded yet.\n".to_string();
    }
    let mut out = format!(
        "DOCUMENTS ({})  indexed: {}\n",
        view.items.len(),
        view.indexed_count
    );
    let _ = writeln!(out, "{:<12} {:<15} NAME", "STATUS", "ID");
    for DocumentRecord { id, name, status } in &view.items {
        let _ = writeln!(out, "{:<12} {:<15} {}", status.as_str(), id, name);
    }
    out
}
