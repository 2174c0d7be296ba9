//! Per-document text renderings used by the export archive. These are a
//! boundary contract only -- the spec explicitly keeps richer plaintext and
//! Markdown body formats (wikilinks, checklists, etc.) out of scope; this
//! module renders exactly the shape described in the External Interfaces
//! section and nothing more.

use std::collections::BTreeMap;

use crate::core::types::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    PlainText,
    Markdown,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::PlainText => "txt",
            ExportFormat::Markdown => "md",
        }
    }
}

/// Only the dimension map -- `uuid`/`created_at`/`updated_at` are structural,
/// not a "dimension", so they don't gate whether a frontmatter block exists.
fn dimension_metadata(doc: &Document) -> BTreeMap<String, String> {
    doc.dimensions
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect()
}

fn plaintext_header(doc: &Document) -> BTreeMap<String, String> {
    let mut map = dimension_metadata(doc);
    map.insert("uuid".to_string(), doc.uuid.to_string());
    map.insert("created_at".to_string(), doc.created_at.to_rfc3339());
    map.insert("updated_at".to_string(), doc.updated_at.to_rfc3339());
    map
}

/// `key: value\n...\n---\n\nTitle\n\nBody`
pub fn render_plaintext(doc: &Document) -> String {
    let mut out = String::new();
    for (key, value) in plaintext_header(doc) {
        out.push_str(&key);
        out.push_str(": ");
        out.push_str(&value);
        out.push('\n');
    }
    out.push_str("---\n\n");
    out.push_str(&doc.title);
    out.push_str("\n\n");
    out.push_str(&doc.body);
    out
}

/// `---\n<YAML>\n---\n\n# Title\n\nBody`. The YAML block (and its fences)
/// are omitted entirely when the document has no dimensions to carry.
pub fn render_markdown(doc: &Document) -> String {
    let meta = dimension_metadata(doc);
    let mut out = String::new();

    if !meta.is_empty() {
        let yaml = serde_yaml::to_string(&meta).unwrap_or_default();
        out.push_str("---\n");
        out.push_str(&yaml);
        out.push_str("---\n\n");
    }

    out.push_str("# ");
    out.push_str(&doc.title);
    out.push_str("\n\n");
    out.push_str(&doc.body);
    out
}

pub fn render(doc: &Document, format: ExportFormat) -> String {
    match format {
        ExportFormat::PlainText => render_plaintext(doc),
        ExportFormat::Markdown => render_markdown(doc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Document;

    #[test]
    fn plaintext_carries_title_and_body_after_the_fence() {
        let doc = Document::new("Buy milk");
        let rendered = render_plaintext(&doc);
        assert!(rendered.contains("---\n\nBuy milk\n\n"));
    }

    #[test]
    fn markdown_uses_atx_heading() {
        let doc = Document::new("Buy milk");
        let rendered = render_markdown(&doc);
        assert!(rendered.contains("# Buy milk"));
    }
}
