//! Typed error for the herb-knowledge crate.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KnowledgeError>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// Corpus file could not be read.
    #[error("[Herb Knowledge] failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A corpus line is not a valid document.
    #[error("[Herb Knowledge] invalid document at {path}:{line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A document has an empty id.
    #[error("[Herb Knowledge] document at {path}:{line} has an empty id")]
    EmptyId { path: PathBuf, line: usize },
}
