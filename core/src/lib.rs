//! Build-time full-text indexing and query-time search for static sites.
//!
//! The pipeline is split the same way at both ends: a [`Tokenizer`] built once
//! from a [`TokenizerConfig`] feeds the [`IndexBuilder`] when the site is
//! generated, and the very same configuration (recorded inside the serialized
//! index) drives the [`QueryEngine`] when a visitor types a query.

pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod render;
pub mod search;
pub mod segmenter;
pub mod session;
pub mod tokenizer;

pub use builder::{BuildOutput, IndexBuilder, SkippedDocument};
pub use config::{FieldWeights, MatchWeights, RenderConfig, SearchConfig};
pub use document::{Document, DocumentStore, DocumentStoreEntry};
pub use error::{FormatError, SessionError, SkipReason};
pub use index::{DocId, Field, InvertedIndex, Posting, TermEntry, INDEX_FORMAT_VERSION};
pub use render::{RenderedPage, RenderedResult, Renderer};
pub use search::{QueryEngine, QueryResult, SearchOutcome};
pub use session::{QueryTicket, SearchSession, SessionState};
pub use tokenizer::{Stemming, Tokenizer, TokenizerConfig};
