use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::sync::Arc;

use crate::config::RenderConfig;
use crate::document::DocumentStore;
use crate::query::Query;
use crate::search::QueryResult;
use crate::tokenizer::{normalize, Tokenizer};

/// Upper bound on the compiled highlight pattern; long pasted queries fall
/// back to plain escaping instead of failing.
const HIGHLIGHT_SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedResult {
    /// Escaped for use inside an attribute.
    pub url: String,
    pub title_html: String,
    pub snippet_html: String,
    pub score: f64,
}

/// Everything the result area can show. All `*_html` strings are safe to
/// insert into markup as-is; plain `message`s still need escaping, which
/// [`RenderedPage::to_html`] does.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderedPage {
    Loading { message: String },
    Prompt { message: String },
    Unavailable { message: String },
    NoMatches { message_html: String },
    Results { items: Vec<RenderedResult> },
}

impl RenderedPage {
    pub fn to_html(&self) -> String {
        match self {
            RenderedPage::Loading { message }
            | RenderedPage::Prompt { message }
            | RenderedPage::Unavailable { message } => {
                format!("<p class=\"search-status\">{}</p>", escape_html(message))
            }
            RenderedPage::NoMatches { message_html } => {
                format!("<p class=\"search-status\">{message_html}</p>")
            }
            RenderedPage::Results { items } => {
                let mut html = String::from("<ul class=\"search-results\">");
                for item in items {
                    html.push_str(&format!(
                        "<li><a href=\"{}\"><h3>{}</h3><p>{}</p></a></li>",
                        item.url, item.title_html, item.snippet_html
                    ));
                }
                html.push_str("</ul>");
                html
            }
        }
    }

    pub fn is_results(&self) -> bool {
        matches!(self, RenderedPage::Results { .. })
    }
}

pub struct Renderer {
    config: RenderConfig,
    tokenizer: Arc<Tokenizer>,
}

impl Renderer {
    /// `tokenizer` decides which words of the query get highlighted and must
    /// be the one the engine searches with.
    pub fn new(config: RenderConfig, tokenizer: Arc<Tokenizer>) -> Self {
        Self { config, tokenizer }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn render(&self, results: &[QueryResult], store: &DocumentStore, query: &str) -> RenderedPage {
        if query.trim().is_empty() {
            return RenderedPage::Prompt { message: self.config.prompt_message.clone() };
        }

        let parsed = Query::parse(query, &self.tokenizer);
        let highlighter = Highlighter::new(&parsed.highlights, &self.config.highlight_class);
        let limit = if self.config.max_results == 0 { usize::MAX } else { self.config.max_results };

        let mut items = Vec::new();
        for result in results {
            if items.len() >= limit {
                break;
            }
            let Some(entry) = store.get(&result.reference) else {
                tracing::debug!(doc_id = %result.reference, "result has no document store entry");
                continue;
            };
            items.push(RenderedResult {
                url: escape_html(&result.reference),
                title_html: highlighter.apply(&entry.title),
                snippet_html: highlighter.apply(&entry.snippet),
                score: result.score,
            });
        }

        if items.is_empty() {
            RenderedPage::NoMatches { message_html: self.no_matches_html(query) }
        } else {
            RenderedPage::Results { items }
        }
    }

    pub fn loading(&self) -> RenderedPage {
        RenderedPage::Loading { message: self.config.loading_message.clone() }
    }

    pub fn unavailable(&self) -> RenderedPage {
        RenderedPage::Unavailable { message: self.config.unavailable_message.clone() }
    }

    /// The query is echoed back here, so it is escaped like everything else.
    fn no_matches_html(&self, query: &str) -> String {
        let escaped_query = escape_html(query.trim());
        self.config
            .no_results_message
            .split("{query}")
            .map(escape_html)
            .collect::<Vec<_>>()
            .join(&escaped_query)
    }
}

/// Wraps case-insensitive occurrences of terms in `<mark>`.
pub struct Highlighter {
    pattern: Option<Regex>,
    open: String,
}

impl Highlighter {
    pub fn new(terms: &[String], class: &str) -> Self {
        let open = if class.is_empty() {
            "<mark>".to_string()
        } else {
            format!("<mark class=\"{}\">", escape_html(class))
        };

        let mut terms: Vec<&str> = terms.iter().map(String::as_str).filter(|t| !t.is_empty()).collect();
        // Longest first so "installation" wins over "instal".
        terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        terms.dedup();
        if terms.is_empty() {
            return Self { pattern: None, open };
        }

        let alternation = terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
        let pattern = match RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .size_limit(HIGHLIGHT_SIZE_LIMIT)
            .build()
        {
            Ok(re) => Some(re),
            Err(err) => {
                tracing::warn!(%err, "highlighting disabled for this query");
                None
            }
        };
        Self { pattern, open }
    }

    /// Escape `text` and mark every match. Terms are normalized, so matching
    /// runs on a folded copy and each hit is mapped back to the raw
    /// characters it came from. Raw pieces are escaped on their own, so a
    /// term can never split an entity.
    pub fn apply(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else { return escape_html(text) };
        let folded = Folded::new(text);
        let mut out = String::with_capacity(text.len() + 16);
        let mut last = 0;
        for m in pattern.find_iter(&folded.text) {
            let (start, end) = folded.raw_span(m.start(), m.end());
            if start < last || start >= end {
                continue;
            }
            out.push_str(&escape_html(&text[last..start]));
            out.push_str(&self.open);
            out.push_str(&escape_html(&text[start..end]));
            out.push_str("</mark>");
            last = end;
        }
        out.push_str(&escape_html(&text[last..]));
        out
    }
}

/// `text` folded one character at a time the way the tokenizer folds it,
/// remembering which raw character every folded piece came from.
struct Folded {
    text: String,
    /// (folded offset, raw start, raw end) per raw character, in order.
    pieces: Vec<(usize, usize, usize)>,
}

impl Folded {
    fn new(raw: &str) -> Self {
        let mut text = String::with_capacity(raw.len());
        let mut pieces = Vec::with_capacity(raw.len());
        for (start, c) in raw.char_indices() {
            pieces.push((text.len(), start, start + c.len_utf8()));
            text.push_str(&normalize(c.encode_utf8(&mut [0; 4])));
        }
        Self { text, pieces }
    }

    /// Raw byte range covering the folded range `start..end`.
    fn raw_span(&self, start: usize, end: usize) -> (usize, usize) {
        let first = self.pieces.partition_point(|p| p.0 <= start).saturating_sub(1);
        let last = self.pieces.partition_point(|p| p.0 < end).saturating_sub(1);
        match (self.pieces.get(first), self.pieces.get(last)) {
            (Some(a), Some(b)) => (a.1, b.2),
            _ => (0, 0),
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
