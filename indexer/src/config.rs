use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sitesearch_core::persist::{IndexPaths, DEFAULT_INDEX_FILE, DEFAULT_STORE_FILE};
use sitesearch_core::SearchConfig;
use std::path::{Path, PathBuf};

/// Where the site lives and how to read its pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site_root: PathBuf,
    /// Defaults to `site_root`, so the artifacts are served next to the pages.
    pub output_dir: Option<PathBuf>,
    /// Prefix for every page URL, e.g. `/SideNote/`.
    pub base_url: String,
    pub page_file_name: String,
    /// The top page is usually a listing, not content.
    pub exclude_root_page: bool,
    /// Paths relative to `site_root` whose pages are not indexed.
    pub exclude: Vec<String>,
    pub title_selector: String,
    /// Tried in order; the first one that matches supplies the body text.
    pub content_selectors: Vec<String>,
    pub index_file: String,
    pub store_file: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_root: PathBuf::from("."),
            output_dir: None,
            base_url: "/".into(),
            page_file_name: "index.html".into(),
            exclude_root_page: true,
            exclude: Vec::new(),
            title_selector: "title".into(),
            content_selectors: vec!["main".into(), "body".into()],
            index_file: DEFAULT_INDEX_FILE.into(),
            store_file: DEFAULT_STORE_FILE.into(),
        }
    }
}

impl SiteConfig {
    pub fn index_paths(&self) -> IndexPaths {
        let root = self.output_dir.clone().unwrap_or_else(|| self.site_root.clone());
        IndexPaths::new(root).with_file_names(&self.index_file, &self.store_file)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub site: SiteConfig,
    pub search: SearchConfig,
}

impl IndexerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_defaults() {
        let cfg: IndexerConfig = serde_json::from_str(r#"{"site":{"base_url":"/SideNote/"}}"#).unwrap();
        assert_eq!(cfg.site.base_url, "/SideNote/");
        assert_eq!(cfg.site.content_selectors, vec!["main", "body"]);
        assert_eq!(cfg.search.snippet_chars, 150);
    }

    #[test]
    fn artifacts_default_next_to_site() {
        let cfg = SiteConfig { site_root: "public".into(), ..Default::default() };
        assert_eq!(cfg.index_paths().index(), PathBuf::from("public/search-index.json"));
        assert_eq!(cfg.index_paths().store(), PathBuf::from("public/document-store.json"));
    }
}
