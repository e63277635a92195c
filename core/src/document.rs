use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One page of the site as the index sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique across the corpus; usually the page's URL path.
    pub id: String,
    pub title: String,
    pub body: String,
}

impl Document {
    /// Collapses whitespace in the title and body.
    pub fn new(id: impl Into<String>, title: impl AsRef<str>, body: impl AsRef<str>) -> Self {
        Self {
            id: id.into(),
            title: normalize_whitespace(title.as_ref()),
            body: normalize_whitespace(body.as_ref()),
        }
    }
}

/// What the result list shows for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStoreEntry {
    pub title: String,
    pub snippet: String,
}

impl DocumentStoreEntry {
    pub fn from_document(doc: &Document, snippet_chars: usize) -> Self {
        Self { title: doc.title.clone(), snippet: snippet(&doc.body, snippet_chars) }
    }
}

/// Document id -> display record. Ordered so serialization is stable.
pub type DocumentStore = BTreeMap<String, DocumentStoreEntry>;

pub const TRUNCATION_MARKER: &str = "...";

/// Runs of whitespace become a single space; leading and trailing whitespace
/// is dropped.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first `max_chars` characters of `body`, with [`TRUNCATION_MARKER`]
/// appended when anything was cut.
pub fn snippet(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", body[..cut].trim_end(), TRUNCATION_MARKER),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_collapses_whitespace() {
        let doc = Document::new("/a/", "  Getting\n Started ", "line one\n\n\tline   two ");
        assert_eq!(doc.title, "Getting Started");
        assert_eq!(doc.body, "line one line two");
    }

    #[test]
    fn snippet_counts_characters_not_bytes() {
        let body = "日本語のテキストです";
        assert_eq!(snippet(body, 3), "日本語...");
        assert_eq!(snippet(body, 10), body);
        assert_eq!(snippet(body, 50), body);
    }

    #[test]
    fn store_entry_uses_prefix() {
        let doc = Document::new("/a/", "T", "abcdef");
        let entry = DocumentStoreEntry::from_document(&doc, 4);
        assert_eq!(entry.snippet, "abcd...");
        assert_eq!(entry.title, "T");
    }
}
