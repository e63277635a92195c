use thiserror::Error;

use crate::session::SessionState;

/// Why the index builder left a document out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("document has no title")]
    MissingTitle,
    #[error("document id already used by an earlier document")]
    DuplicateId,
}

/// Structural problems found while loading serialized artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unsupported index format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("term {term:?} references document {doc} but the index only has {num_docs}")]
    DanglingPosting { term: String, doc: u32, num_docs: usize },
    #[error("document {0:?} is in the index but missing from the document store")]
    MissingStoreEntry(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while the session is {from:?}")]
    InvalidTransition { from: SessionState, action: &'static str },
}
