use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::MatchWeights;
use crate::index::{DocId, Field, InvertedIndex, TermEntry};
use crate::query::{Clause, Presence, Query};
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "ref")]
    pub reference: String,
    pub score: f64,
}

/// What a search attempt produced. An index that never loaded is not the
/// same thing as a query with no hits.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Unavailable,
    Results(Vec<QueryResult>),
}

/// Scores queries against a loaded index. Cheap to share: the index and
/// tokenizer are read-only.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    index: Arc<InvertedIndex>,
    tokenizer: Arc<Tokenizer>,
    weights: MatchWeights,
}

impl QueryEngine {
    pub fn new(index: Arc<InvertedIndex>, tokenizer: Arc<Tokenizer>, weights: MatchWeights) -> Self {
        if tokenizer.config() != &index.tokenizer {
            tracing::warn!(
                index = ?index.tokenizer,
                query = ?tokenizer.config(),
                "query tokenizer differs from the one the index was built with"
            );
        }
        Self { index, tokenizer, weights: weights.normalized() }
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn tokenizer(&self) -> &Arc<Tokenizer> {
        &self.tokenizer
    }

    pub fn search(&self, query: &str) -> Vec<QueryResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        self.search_parsed(&Query::parse(query, &self.tokenizer))
    }

    pub fn search_parsed(&self, query: &Query) -> Vec<QueryResult> {
        if !query.has_positive() {
            return Vec::new();
        }

        let required = query.required();
        let mut scores: HashMap<DocId, f64> = HashMap::new();
        let mut required_hits: HashMap<DocId, usize> = HashMap::new();
        let mut prohibited: HashSet<DocId> = HashSet::new();

        for clause in &query.clauses {
            let matched = self.match_clause(clause);
            match clause.presence {
                Presence::Prohibited => prohibited.extend(matched.into_keys()),
                Presence::Required | Presence::Optional => {
                    for (doc, score) in matched {
                        *scores.entry(doc).or_insert(0.0) += score;
                        if clause.presence == Presence::Required {
                            *required_hits.entry(doc).or_insert(0) += 1;
                        }
                    }
                }
            }
        }

        let mut ranked: Vec<(DocId, f64)> = scores
            .into_iter()
            .filter(|(doc, _)| !prohibited.contains(doc))
            .filter(|(doc, _)| required == 0 || required_hits.get(doc) == Some(&required))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        tracing::debug!(clauses = query.clauses.len(), hits = ranked.len(), "search");
        ranked
            .into_iter()
            .filter_map(|(doc, score)| {
                self.index.doc_ref(doc).map(|r| QueryResult { reference: r.to_string(), score })
            })
            .collect()
    }

    /// Score every document the clause matches: the exact term plus the best
    /// single prefix expansion, scaled by the clause's idf.
    fn match_clause(&self, clause: &Clause) -> HashMap<DocId, f64> {
        let fields: &[Field] = match &clause.field {
            Some(field) => std::slice::from_ref(field),
            None => &Field::ALL,
        };

        let mut exact: HashMap<DocId, f64> = HashMap::new();
        if let Some(entry) = self.index.term(&clause.term) {
            self.accumulate(entry, fields, self.weights.exact, &mut exact);
        }

        let mut prefix: HashMap<DocId, f64> = HashMap::new();
        if self.weights.prefix > 0.0 {
            for entry in self.expansions(clause) {
                let mut expansion = HashMap::new();
                self.accumulate(entry, fields, self.weights.prefix, &mut expansion);
                for (doc, score) in expansion {
                    let best = prefix.entry(doc).or_insert(0.0);
                    *best = best.max(score);
                }
            }
        }

        let mut matched = exact;
        for (doc, score) in prefix {
            *matched.entry(doc).or_insert(0.0) += score;
        }
        if matched.is_empty() {
            return matched;
        }

        let n = self.index.num_docs() as f64;
        let idf = (1.0 + n / matched.len() as f64).ln();
        for score in matched.values_mut() {
            *score *= idf;
        }
        matched
    }

    /// Terms a clause reaches by prefix: indexed terms extending the stem,
    /// then terms whose surface word extends what was typed. The second set
    /// matters while a word is half typed and already longer than its stem.
    fn expansions<'a>(&'a self, clause: &'a Clause) -> Vec<&'a TermEntry> {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(clause.term.as_str());
        let by_term = self.index.terms_with_prefix(&clause.term).map(|(term, _)| term);
        let by_surface = self.index.stems_with_prefix(&clause.surface);
        by_term
            .chain(by_surface)
            .filter(|term| seen.insert(*term))
            .filter_map(|term| self.index.term(term))
            .take(self.weights.max_prefix_expansions)
            .collect()
    }

    fn accumulate(&self, entry: &TermEntry, fields: &[Field], weight: f64, into: &mut HashMap<DocId, f64>) {
        for field in fields {
            let Some(postings) = entry.fields.get(field) else { continue };
            let boost = self.index.fields.boost(*field);
            for posting in postings {
                let tf = 1.0 + (posting.tf.max(1) as f64).ln();
                *into.entry(posting.doc).or_insert(0.0) += boost * tf * weight;
            }
        }
    }
}
