use anyhow::{Context, Result};
use rayon::prelude::*;
use sitesearch_core::persist::{save_artifacts, IndexPaths};
use sitesearch_core::{Document, IndexBuilder, SkippedDocument, Stemming, Tokenizer};

use crate::config::IndexerConfig;
use crate::extract::Extractor;
use crate::site::{discover_pages, PageFile};

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub pages_found: usize,
    pub indexed: usize,
    /// Documents the builder rejected.
    pub skipped: Vec<SkippedDocument>,
    /// Pages that could not be read or had no title.
    pub unreadable: usize,
    pub stemming: Stemming,
    pub paths: IndexPaths,
}

/// Read and extract every page. Pages that fail are logged and left out;
/// the order of `pages` is kept.
pub fn load_documents(pages: &[PageFile], extractor: &Extractor) -> (Vec<Document>, usize) {
    let loaded: Vec<Option<Document>> = pages
        .par_iter()
        .map(|page| {
            let html = match std::fs::read_to_string(&page.path) {
                Ok(html) => html,
                Err(err) => {
                    tracing::warn!(path = %page.path.display(), %err, "could not read page");
                    return None;
                }
            };
            match extractor.extract(&page.url, &html) {
                Ok(doc) => Some(doc),
                Err(err) => {
                    tracing::warn!(path = %page.path.display(), %err, "skipping page");
                    None
                }
            }
        })
        .collect();
    let failed = loaded.iter().filter(|d| d.is_none()).count();
    (loaded.into_iter().flatten().collect(), failed)
}

/// Discover, extract, index and write both artifacts. Any write failure
/// fails the whole build.
pub fn build_site(config: &IndexerConfig) -> Result<BuildReport> {
    let site = &config.site;
    let pages = discover_pages(site)?;
    let extractor = Extractor::new(&site.title_selector, &site.content_selectors)?;
    let (documents, unreadable) = load_documents(&pages, &extractor);

    let mut search = config.search.clone();
    let stemming = search
        .tokenizer
        .stemming
        .resolve(documents.iter().flat_map(|d| [d.title.as_str(), d.body.as_str()]));
    search.tokenizer.stemming = stemming;
    tracing::info!(?stemming, documents = documents.len(), "building index");

    let tokenizer = Tokenizer::new(search.tokenizer.clone());
    let out = IndexBuilder::new(&tokenizer, &search).build(&documents);

    let paths = site.index_paths();
    save_artifacts(&paths, &out.index, &out.store)
        .with_context(|| format!("writing search artifacts to {}", paths.root.display()))?;

    Ok(BuildReport {
        pages_found: pages.len(),
        indexed: out.index.num_docs(),
        skipped: out.skipped,
        unreadable,
        stemming,
        paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn unreadable_pages_are_counted_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.html");
        std::fs::write(&good, "<title>Good</title><main>text</main>").unwrap();
        let pages = vec![
            PageFile { path: good, relative: PathBuf::from("good/index.html"), url: "/good/".into() },
            PageFile {
                path: dir.path().join("missing.html"),
                relative: PathBuf::from("missing/index.html"),
                url: "/missing/".into(),
            },
        ];
        let extractor = Extractor::new("title", &["main".into()]).unwrap();
        let (docs, failed) = load_documents(&pages, &extractor);
        assert_eq!(failed, 1);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "/good/");
    }
}
