//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use herb_knowledge::{CorpusSource, KnowledgeStore};

/// Config bag for the diagnosis service. All fields have defaults via `from_env`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainConfig {
    /// Augmented (retrieval) strategy when true, Direct otherwise.
    pub rag_enabled: bool,
    /// Documents retrieved for the augmented prompt.
    pub top_k: usize,
    /// Max summaries returned by `history`.
    pub history_limit: usize,
    /// Optional JSON-lines corpus appended after the built-in sources.
    pub extra_corpus: Option<PathBuf>,
}

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rag_enabled: true,
            top_k: DEFAULT_TOP_K,
            history_limit: DEFAULT_HISTORY_LIMIT,
            extra_corpus: None,
        }
    }
}

impl ChainConfig {
    /// Build from environment variables with sensible defaults.
    ///
    /// # Example
    /// ```
    /// # use herbal_chain::ChainConfig;
    /// let cfg = ChainConfig::from_env();
    /// assert!(cfg.top_k >= 1);
    /// ```
    pub fn from_env() -> Self {
        Self {
            rag_enabled: env("RAG_ENABLED", "true") == "true",
            top_k: parse("RAG_TOP_K", DEFAULT_TOP_K).max(1),
            history_limit: parse("HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT).max(1),
            extra_corpus: std::env::var("KNOWLEDGE_EXTRA_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Knowledge store over the built-in corpus plus the extra file, if any.
    pub fn make_store(&self) -> KnowledgeStore {
        match &self.extra_corpus {
            Some(path) => KnowledgeStore::with_extra([CorpusSource::JsonLines(path.clone())]),
            None => KnowledgeStore::default(),
        }
    }
}

fn env(k: &str, dflt: &str) -> String {
    std::env::var(k).unwrap_or_else(|_| dflt.to_string())
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(dflt)
}
