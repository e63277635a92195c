use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::config::SiteConfig;

/// A page on disk and the URL it is served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFile {
    pub path: PathBuf,
    pub relative: PathBuf,
    pub url: String,
}

/// Every page file under `site_root`, sorted by path so builds are
/// reproducible.
pub fn discover_pages(config: &SiteConfig) -> Result<Vec<PageFile>> {
    let root = &config.site_root;
    if !root.is_dir() {
        anyhow::bail!("site root {} is not a directory", root.display());
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() != config.page_file_name.as_str() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside the site root", entry.path().display()))?
            .to_path_buf();
        if config.exclude_root_page && relative.parent().map_or(true, |p| p.as_os_str().is_empty()) {
            continue;
        }
        if config.exclude.iter().any(|ex| relative.starts_with(ex)) {
            tracing::debug!(path = %relative.display(), "excluded");
            continue;
        }
        let url = page_url(&config.base_url, &relative);
        pages.push(PageFile { path: entry.path().to_path_buf(), relative, url });
    }
    tracing::info!(count = pages.len(), root = %root.display(), "found pages");
    Ok(pages)
}

/// `article/index.html` under base `/SideNote` becomes `/SideNote/article/`.
pub fn page_url(base_url: &str, relative: &Path) -> String {
    let mut url = String::from("/");
    for part in base_url.split('/').filter(|p| !p.is_empty()) {
        url.push_str(part);
        url.push('/');
    }
    if let Some(dir) = relative.parent() {
        for component in dir.components() {
            if let Component::Normal(part) = component {
                url.push_str(&part.to_string_lossy());
                url.push('/');
            }
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn url_from_relative_path() {
        assert_eq!(page_url("/SideNote/", Path::new("article/index.html")), "/SideNote/article/");
        assert_eq!(page_url("SideNote", Path::new("a/b/index.html")), "/SideNote/a/b/");
        assert_eq!(page_url("/", Path::new("index.html")), "/");
        assert_eq!(page_url("", Path::new("メモ/index.html")), "/メモ/");
    }

    #[test]
    fn discovers_nested_pages_and_skips_root() {
        let dir = tempfile::tempdir().unwrap();
        for p in ["index.html", "b/index.html", "a/index.html", "a/deep/index.html", "drafts/x/index.html", "a/other.html"] {
            let path = dir.path().join(p);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "<title>t</title>").unwrap();
        }
        let cfg = SiteConfig {
            site_root: dir.path().to_path_buf(),
            base_url: "/SideNote/".into(),
            exclude: vec!["drafts".into()],
            ..Default::default()
        };
        let urls: Vec<String> = discover_pages(&cfg).unwrap().into_iter().map(|p| p.url).collect();
        assert_eq!(urls, vec!["/SideNote/a/deep/", "/SideNote/a/", "/SideNote/b/"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let cfg = SiteConfig { site_root: "/definitely/not/here".into(), ..Default::default() };
        assert!(discover_pages(&cfg).is_err());
    }
}
