//! Word-level full-text search: tokenizer, inverted-index storage, indexing and ranked retrieval.

pub mod engine;
pub mod error;
pub mod index;
pub mod indexer;
pub mod ingest;
pub mod memory;
pub mod persist;
pub mod query;
pub mod snippet;
pub mod store;
pub mod tokenizer;

pub use engine::SearchEngine;
pub use error::{SearchError, SearchResult};
pub use index::*;
pub use memory::MemoryStore;
pub use persist::SledStore;
pub use query::{SearchHit, SearchResults};
pub use store::IndexStore;
