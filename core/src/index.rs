use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use crate::config::FieldWeights;
use crate::error::FormatError;
use crate::tokenizer::TokenizerConfig;

/// Bumped whenever the serialized layout changes.
pub const INDEX_FORMAT_VERSION: u32 = 2;

/// Position of a document in [`InvertedIndex::refs`], i.e. corpus order.
pub type DocId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Body,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Title, Field::Body];

    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Body => "body",
        }
    }

    pub fn parse(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc: DocId,
    /// Occurrences of the term in the field.
    pub tf: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    /// Distinct documents containing the term in any field.
    pub df: u32,
    /// Postings per field, sorted by doc.
    pub fields: BTreeMap<Field, Vec<Posting>>,
}

/// token -> field -> postings, plus everything needed to search it without
/// the source documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub version: u32,
    /// Resolved configuration the index was tokenized with.
    pub tokenizer: TokenizerConfig,
    pub fields: FieldWeights,
    /// Document ids in corpus order.
    pub refs: Vec<String>,
    pub terms: BTreeMap<String, TermEntry>,
    /// Words as written -> the term they were stemmed to, for words whose
    /// stem differs. Lets a half-typed word that is already longer than its
    /// stem still reach the term.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub surfaces: BTreeMap<String, String>,
}

impl InvertedIndex {
    pub fn new(tokenizer: TokenizerConfig, fields: FieldWeights) -> Self {
        Self {
            version: INDEX_FORMAT_VERSION,
            tokenizer,
            fields,
            refs: Vec::new(),
            terms: BTreeMap::new(),
            surfaces: BTreeMap::new(),
        }
    }

    pub fn num_docs(&self) -> usize {
        self.refs.len()
    }

    pub fn doc_ref(&self, doc: DocId) -> Option<&str> {
        self.refs.get(doc as usize).map(String::as_str)
    }

    pub fn term(&self, term: &str) -> Option<&TermEntry> {
        self.terms.get(term)
    }

    /// Indexed terms that start with `prefix`, excluding `prefix` itself, in
    /// lexicographic order.
    pub fn terms_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a TermEntry)> + 'a {
        self.terms
            .range::<str, _>((Bound::Excluded(prefix), Bound::Unbounded))
            .take_while(move |(term, _)| term.starts_with(prefix))
            .map(|(term, entry)| (term.as_str(), entry))
    }

    /// Terms reached through a surface form starting with `prefix`,
    /// deduplicated, in surface order.
    pub fn stems_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let mut seen = BTreeSet::new();
        self.surfaces
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(surface, _)| surface.starts_with(prefix))
            .map(|(_, term)| term.as_str())
            .filter(move |term| seen.insert(*term))
    }

    /// Checks the version and that every posting points at a known document.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.version != INDEX_FORMAT_VERSION {
            return Err(FormatError::UnsupportedVersion { found: self.version, expected: INDEX_FORMAT_VERSION });
        }
        let num_docs = self.refs.len();
        for (term, entry) in &self.terms {
            for posting in entry.fields.values().flatten() {
                if posting.doc as usize >= num_docs {
                    return Err(FormatError::DanglingPosting { term: term.clone(), doc: posting.doc, num_docs });
                }
            }
        }
        Ok(())
    }
}
