use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use sitesearch_core::Document;
use thiserror::Error;

/// Elements whose text is never shown to readers.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg", "head", "iframe"];

/// Elements that start a new line when rendered. Text on either side of one
/// belongs to different words; inline elements (`a`, `em`, `span`, ...) do
/// not separate anything.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "summary", "table", "td", "th", "tr", "ul",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("page has no title")]
    MissingTitle,
    #[error("invalid CSS selector {0:?}")]
    Selector(String),
}

/// Pulls the title and visible body text out of a rendered page.
#[derive(Debug)]
pub struct Extractor {
    title: Selector,
    content: Vec<Selector>,
}

impl Extractor {
    pub fn new(title_selector: &str, content_selectors: &[String]) -> Result<Self, ExtractError> {
        let parse = |s: &str| Selector::parse(s).map_err(|_| ExtractError::Selector(s.to_string()));
        Ok(Self {
            title: parse(title_selector)?,
            content: content_selectors.iter().map(|s| parse(s)).collect::<Result<_, _>>()?,
        })
    }

    pub fn extract(&self, id: &str, html: &str) -> Result<Document, ExtractError> {
        let page = Html::parse_document(html);

        let title = page
            .select(&self.title)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();
        if title.trim().is_empty() {
            return Err(ExtractError::MissingTitle);
        }

        let mut body = String::new();
        if let Some(root) = self.content.iter().find_map(|sel| page.select(sel).next()) {
            visible_text(root, &mut body);
        }
        // Document::new collapses the whitespace.
        Ok(Document::new(id, title, body))
    }
}

fn visible_text(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_ELEMENTS.contains(&name) {
        return;
    }
    let block = BLOCK_ELEMENTS.contains(&name);
    if block {
        out.push(' ');
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    visible_text(child, out);
                }
            }
            _ => {}
        }
    }
    if block {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new("title", &["main".into(), "body".into()]).unwrap()
    }

    #[test]
    fn prefers_main_over_body() {
        let html = r#"<html><head><title> Rust  Notes </title></head>
            <body><nav>Menu</nav><main><h1>Ownership</h1><p>and   borrowing</p></main></body></html>"#;
        let doc = extractor().extract("/rust/", html).unwrap();
        assert_eq!(doc.title, "Rust Notes");
        assert_eq!(doc.body, "Ownership and borrowing");
    }

    #[test]
    fn falls_back_to_body_and_skips_scripts() {
        let html = r#"<html><head><title>T</title><style>p{}</style></head>
            <body><p>visible</p><script>var x = 1;</script><noscript>hidden</noscript></body></html>"#;
        let doc = extractor().extract("/t/", html).unwrap();
        assert_eq!(doc.body, "visible");
    }

    #[test]
    fn missing_title_is_reported() {
        let html = "<html><body><main>text</main></body></html>";
        assert_eq!(extractor().extract("/x/", html), Err(ExtractError::MissingTitle));
        let blank = "<html><head><title>  </title></head><body></body></html>";
        assert_eq!(extractor().extract("/x/", blank), Err(ExtractError::MissingTitle));
    }

    #[test]
    fn inline_markup_does_not_split_words() {
        let html = "<title>T</title><main><p>これは<a href=\"#\">リンク</a>です。<em>un</em>believable</p>\
            <ul><li>first</li><li>second<br>third</li></ul></main>";
        let doc = extractor().extract("/t/", html).unwrap();
        assert_eq!(doc.body, "これはリンクです。unbelievable first second third");
    }

    #[test]
    fn japanese_text_is_kept() {
        let html = "<title>全文検索</title><main><p>静的サイトに</p><p>検索を追加</p></main>";
        let doc = extractor().extract("/ja/", html).unwrap();
        assert_eq!(doc.body, "静的サイトに 検索を追加");
    }

    #[test]
    fn bad_selector_is_an_error() {
        assert!(matches!(Extractor::new("[[", &[]), Err(ExtractError::Selector(_))));
    }
}
