use crate::DocId;

/// Result type returned by every fallible core operation.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors surfaced by indexing, retrieval and the storage layer.
///
/// Nothing in the core retries: a `Storage` fault aborts the current operation and is handed to the caller.
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    /// Required input was missing or empty.
    #[error("validation error: {0}")]
    Validation(String),
    /// A document id did not resolve to a stored document.
    #[error("document {0} not found")]
    NotFound(DocId),
    /// The underlying store was unavailable or a write failed.
    #[error("storage fault: {0}")]
    Storage(String),
}

impl SearchError {
    pub fn validation(msg: impl Into<String>) -> Self {
        SearchError::Validation(msg.into())
    }
}

impl From<sled::Error> for SearchError {
    fn from(e: sled::Error) -> Self {
        SearchError::Storage(e.to_string())
    }
}

impl From<bincode::Error> for SearchError {
    fn from(e: bincode::Error) -> Self {
        SearchError::Storage(e.to_string())
    }
}
