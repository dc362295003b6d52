//! One-shot corpus loading.
//!
//! [`KnowledgeStore::initialize`] runs the load exactly once. Concurrent first
//! callers all await the same in-flight load and observe the same fully
//! populated corpus; afterwards the corpus is read-only and needs no locking.
//!
//! A failing source is logged and contributes nothing; sources loaded before
//! or after it are kept. Documents whose id was already loaded are skipped.

use std::collections::HashSet;
use std::time::Instant;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::corpus::CorpusSource;
use crate::models::Document;

#[derive(Debug)]
pub struct KnowledgeStore {
    sources: Vec<CorpusSource>,
    documents: OnceCell<Vec<Document>>,
}

impl Default for KnowledgeStore {
    fn default() -> Self {
        Self::new(CorpusSource::builtin())
    }
}

impl KnowledgeStore {
    pub fn new(sources: Vec<CorpusSource>) -> Self {
        Self {
            sources,
            documents: OnceCell::new(),
        }
    }

    /// Built-in sources followed by `extra`.
    pub fn with_extra(extra: impl IntoIterator<Item = CorpusSource>) -> Self {
        let mut sources = CorpusSource::builtin();
        sources.extend(extra);
        Self::new(sources)
    }

    /// Loads the corpus on first call; later and concurrent calls return the
    /// same documents without loading again.
    pub async fn initialize(&self) -> &[Document] {
        self.documents
            .get_or_init(|| self.load_all())
            .await
            .as_slice()
    }

    /// The loaded corpus, or `None` before [`Self::initialize`] completed.
    pub fn documents(&self) -> Option<&[Document]> {
        self.documents.get().map(Vec::as_slice)
    }

    pub fn is_initialized(&self) -> bool {
        self.documents.initialized()
    }

    async fn load_all(&self) -> Vec<Document> {
        let started = Instant::now();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for source in &self.sources {
            match source.load().await {
                Ok(docs) => {
                    let mut added = 0usize;
                    for doc in docs {
                        if seen.insert(doc.id.clone()) {
                            out.push(doc);
                            added += 1;
                        } else {
                            warn!(source = %source.name(), id = %doc.id, "duplicate document id skipped");
                        }
                    }
                    debug!(source = %source.name(), added, "corpus source loaded");
                }
                Err(e) => {
                    warn!(source = %source.name(), error = %e, "corpus source failed; contributing no documents");
                }
            }
        }

        info!(
            documents = out.len(),
            sources = self.sources.len(),
            latency_ms = started.elapsed().as_millis(),
            "knowledge store initialized"
        );
        out
    }
}
