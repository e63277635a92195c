use anyhow::{Context, Result};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::document::DocumentStore;
use crate::error::FormatError;
use crate::index::InvertedIndex;

pub const DEFAULT_INDEX_FILE: &str = "search-index.json";
pub const DEFAULT_STORE_FILE: &str = "document-store.json";

/// Where the two search artifacts live.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
    pub index_file: String,
    pub store_file: String,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            store_file: DEFAULT_STORE_FILE.to_string(),
        }
    }

    pub fn with_file_names(mut self, index_file: impl Into<String>, store_file: impl Into<String>) -> Self {
        self.index_file = index_file.into();
        self.store_file = store_file.into();
        self
    }

    pub fn index(&self) -> PathBuf { self.root.join(&self.index_file) }
    pub fn store(&self) -> PathBuf { self.root.join(&self.store_file) }
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    write_json(&paths.index(), index)
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let path = paths.index();
    let bytes = read_file(&path)?;
    parse_index(&bytes).with_context(|| format!("invalid search index {}", path.display()))
}

pub fn save_store(paths: &IndexPaths, store: &DocumentStore) -> Result<()> {
    write_json(&paths.store(), store)
}

pub fn load_store(paths: &IndexPaths) -> Result<DocumentStore> {
    let path = paths.store();
    let bytes = read_file(&path)?;
    parse_store(&bytes).with_context(|| format!("invalid document store {}", path.display()))
}

/// Decode and validate a serialized index, e.g. one fetched over HTTP.
pub fn parse_index(bytes: &[u8]) -> Result<InvertedIndex> {
    let index: InvertedIndex = serde_json::from_slice(bytes)?;
    index.validate()?;
    Ok(index)
}

pub fn parse_store(bytes: &[u8]) -> Result<DocumentStore> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Every indexed document must have something to display.
pub fn check_consistency(index: &InvertedIndex, store: &DocumentStore) -> Result<(), FormatError> {
    match index.refs.iter().find(|r| !store.contains_key(r.as_str())) {
        Some(missing) => Err(FormatError::MissingStoreEntry(missing.clone())),
        None => Ok(()),
    }
}

/// Both artifacts or nothing; search stays off unless both load.
pub fn load_artifacts(paths: &IndexPaths) -> Result<(InvertedIndex, DocumentStore)> {
    let index = load_index(paths)?;
    let store = load_store(paths)?;
    if let Err(err) = check_consistency(&index, &store) {
        // Results without an entry are skipped at render time.
        tracing::warn!(%err, "index and document store are out of sync");
    }
    Ok((index, store))
}

pub fn save_artifacts(paths: &IndexPaths, index: &InvertedIndex, store: &DocumentStore) -> Result<()> {
    save_index(paths, index)?;
    save_store(paths, store)?;
    tracing::info!(index = %paths.index().display(), store = %paths.store().display(), "wrote search artifacts");
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, value)?;
    w.flush().with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}
