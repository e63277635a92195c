//! Turns free text from the search box into match clauses.
//!
//! The syntax is deliberately small:
//!
//! - words are optional clauses, ORed together with summed scores;
//! - `+word` must match, `-word` must not;
//! - `title:word` / `body:word` restrict a word to one field.
//!
//! Everything else is handed to the tokenizer, which only keeps letters and
//! digits, so quotes, wildcards, stray colons and the like can never produce
//! an invalid query. Parsing has no failure mode.

use crate::index::Field;
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    Optional,
    Required,
    Prohibited,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    pub term: String,
    /// The word as typed (normalized, unstemmed). Equal to `term` when
    /// stemming is off.
    pub surface: String,
    /// `None` searches every field.
    pub field: Option<Field>,
    pub presence: Presence,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub clauses: Vec<Clause>,
    /// Forms to highlight in results; prohibited words are not included.
    pub highlights: Vec<String>,
}

impl Query {
    pub fn parse(input: &str, tokenizer: &Tokenizer) -> Query {
        let mut query = Query::default();
        for chunk in input.split_whitespace() {
            let (presence, rest) = split_presence(chunk);
            let (field, text) = split_field(rest);
            for (surface, term) in tokenizer.analyze(text) {
                let seen =
                    query.clauses.iter().any(|c| c.term == term && c.field == field && c.presence == presence);
                if !seen {
                    query.clauses.push(Clause { term, surface, field, presence });
                }
            }
            if presence != Presence::Prohibited {
                for term in tokenizer.highlight_terms(text) {
                    if !query.highlights.contains(&term) {
                        query.highlights.push(term);
                    }
                }
            }
        }
        query
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn required(&self) -> usize {
        self.clauses.iter().filter(|c| c.presence == Presence::Required).count()
    }

    /// True when some clause can contribute a result.
    pub fn has_positive(&self) -> bool {
        self.clauses.iter().any(|c| c.presence != Presence::Prohibited)
    }
}

fn split_presence(chunk: &str) -> (Presence, &str) {
    if chunk.len() > 1 {
        if let Some(rest) = chunk.strip_prefix('+') {
            return (Presence::Required, rest);
        }
        if let Some(rest) = chunk.strip_prefix('-') {
            return (Presence::Prohibited, rest);
        }
    }
    (Presence::Optional, chunk)
}

fn split_field(text: &str) -> (Option<Field>, &str) {
    match text.split_once(':') {
        Some((name, rest)) => match Field::parse(name) {
            Some(field) => (Some(field), rest),
            None => (None, text),
        },
        None => (None, text),
    }
}
