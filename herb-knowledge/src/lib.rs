//! Static herbal knowledge corpus and lexical retrieval.
//!
//! - [`KnowledgeStore`] loads the corpus once (idempotent, safe under
//!   concurrent first use) and serves it read-only afterwards.
//! - [`Retriever`] ranks documents by token overlap with a query.
//!
//! # Example
//! ```no_run
//! # use herb_knowledge::{KnowledgeStore, Retriever};
//! # #[tokio::main] async fn main() {
//! let store = KnowledgeStore::default();
//! let docs = store.initialize().await;
//! for hit in Retriever::new(docs).similarity_search("ginger cold fatigue", 3) {
//!     println!("{:.3} {}", hit.score, hit.document.id);
//! }
//! # }
//! ```

pub mod corpus;
mod error;
pub mod models;
pub mod retriever;
mod store;

pub use corpus::CorpusSource;
pub use error::{KnowledgeError, Result};
pub use models::{Document, DocumentKind, DocumentMetadata, RetrievalResult};
pub use retriever::{Retriever, token_overlap, tokenize};
pub use store::KnowledgeStore;
