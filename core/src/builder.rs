use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::{FieldWeights, SearchConfig};
use crate::document::{Document, DocumentStore, DocumentStoreEntry};
use crate::error::SkipReason;
use crate::index::{DocId, Field, InvertedIndex, Posting};
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub index: InvertedIndex,
    pub store: DocumentStore,
    pub skipped: Vec<SkippedDocument>,
}

/// Term frequencies of one document, per field.
type FieldCounts = BTreeMap<Field, BTreeMap<String, u32>>;

/// Surface word -> stemmed term, only where the two differ.
type Surfaces = BTreeMap<String, String>;

pub struct IndexBuilder<'a> {
    tokenizer: &'a Tokenizer,
    fields: FieldWeights,
    snippet_chars: usize,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(tokenizer: &'a Tokenizer, config: &SearchConfig) -> Self {
        Self { tokenizer, fields: config.fields, snippet_chars: config.snippet_chars }
    }

    /// Index `documents` in order. Documents without a title, or reusing an
    /// id, are left out and reported in [`BuildOutput::skipped`].
    pub fn build(&self, documents: &[Document]) -> BuildOutput {
        let mut skipped = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut admitted: Vec<&Document> = Vec::with_capacity(documents.len());
        for doc in documents {
            let reason = if doc.title.trim().is_empty() {
                Some(SkipReason::MissingTitle)
            } else if !seen.insert(doc.id.as_str()) {
                Some(SkipReason::DuplicateId)
            } else {
                None
            };
            match reason {
                Some(reason) => {
                    tracing::warn!(doc_id = %doc.id, %reason, "skipping document");
                    skipped.push(SkippedDocument { id: doc.id.clone(), reason });
                }
                None => admitted.push(doc),
            }
        }

        // Tokenizing is independent per document; merging below is the only
        // point where results meet, and it runs in corpus order.
        let analyzed: Vec<(FieldCounts, Surfaces)> = admitted.par_iter().map(|doc| self.analyze(doc)).collect();

        let mut index = InvertedIndex::new(self.tokenizer.config().clone(), self.fields);
        let mut store = DocumentStore::new();
        for (doc_id, (doc, (counts, surfaces))) in admitted.iter().zip(analyzed).enumerate() {
            let doc_id = doc_id as DocId;
            let mut distinct: BTreeSet<&str> = BTreeSet::new();
            for (field, terms) in &counts {
                for (term, tf) in terms {
                    let entry = index.terms.entry(term.clone()).or_default();
                    entry.fields.entry(*field).or_default().push(Posting { doc: doc_id, tf: *tf });
                    if distinct.insert(term.as_str()) {
                        entry.df += 1;
                    }
                }
            }
            index.surfaces.extend(surfaces);
            index.refs.push(doc.id.clone());
            store.insert(doc.id.clone(), DocumentStoreEntry::from_document(doc, self.snippet_chars));
        }

        tracing::info!(
            num_docs = index.num_docs(),
            num_terms = index.terms.len(),
            skipped = skipped.len(),
            "built inverted index"
        );
        BuildOutput { index, store, skipped }
    }

    fn analyze(&self, doc: &Document) -> (FieldCounts, Surfaces) {
        let mut counts = FieldCounts::new();
        let mut surfaces = Surfaces::new();
        for (field, text) in [(Field::Title, &doc.title), (Field::Body, &doc.body)] {
            let terms = counts.entry(field).or_default();
            for (surface, token) in self.tokenizer.analyze(text) {
                if surface != token {
                    surfaces.insert(surface, token.clone());
                }
                *terms.entry(token).or_insert(0) += 1;
            }
        }
        (counts, surfaces)
    }
}
