use serde::{Deserialize, Serialize};

use crate::index::Field;
use crate::tokenizer::TokenizerConfig;

/// Everything that shapes indexing and searching, loadable from JSON.
///
/// Missing keys fall back to the defaults below, so an empty `{}` is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub tokenizer: TokenizerConfig,
    pub fields: FieldWeights,
    /// Number of body characters kept as the display snippet.
    pub snippet_chars: usize,
    pub matching: MatchWeights,
    pub render: RenderConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            fields: FieldWeights::default(),
            snippet_chars: 150,
            matching: MatchWeights::default(),
            render: RenderConfig::default(),
        }
    }
}

impl SearchConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Relevance multiplier per field. A title hit is a much stronger signal than
/// a body hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub title: f64,
    pub body: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self { title: 10.0, body: 1.0 }
    }
}

impl FieldWeights {
    pub fn boost(&self, field: Field) -> f64 {
        match field {
            Field::Title => self.title,
            Field::Body => self.body,
        }
    }
}

/// Score multipliers for exact and trailing-wildcard matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    pub exact: f64,
    pub prefix: f64,
    /// Upper bound on indexed terms a single query term expands to.
    pub max_prefix_expansions: usize,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self { exact: 1.0, prefix: 0.5, max_prefix_expansions: 256 }
    }
}

impl MatchWeights {
    /// Exact hits must never be worth less than prefix hits.
    pub fn normalized(self) -> Self {
        let exact = self.exact.max(0.0);
        let prefix = self.prefix.clamp(0.0, exact);
        Self { exact, prefix, max_prefix_expansions: self.max_prefix_expansions }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// CSS class put on the `<mark>` wrapping highlighted terms.
    pub highlight_class: String,
    /// Shown while the query box is empty.
    pub prompt_message: String,
    /// `{query}` is replaced with the escaped query.
    pub no_results_message: String,
    pub unavailable_message: String,
    pub loading_message: String,
    /// Cap on rendered results; 0 renders everything.
    pub max_results: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            highlight_class: "bg-yellow-200 rounded-sm px-1".into(),
            prompt_message: "検索結果はここに表示されます。".into(),
            no_results_message: "「{query}」に一致する結果は見つかりませんでした。".into(),
            unavailable_message: "検索インデックスの読み込みに失敗しました。".into(),
            loading_message: "検索インデックスを読み込んでいます…".into(),
            max_results: 0,
        }
    }
}
