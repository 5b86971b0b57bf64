use crate::tokenizer::MIN_TERM_LEN;
use crate::{DocId, DocMatch, Document, Position, SearchError, SearchResult};
use std::collections::{BTreeMap, BTreeSet};
use time::format_description::well_known::Rfc3339;

/// Durable storage for documents and postings, queryable by exact term.
///
/// Implementations are shared between request handlers, so every method takes `&self`
/// and must be safe to call concurrently. Mutations are durable before they return.
pub trait IndexStore: Send + Sync {
    /// Persist a new document and return its freshly assigned id.
    fn create_document(&self, title: &str, content: &str, url: Option<&str>, category: &str) -> SearchResult<DocId>;

    /// Persist a new document together with one posting per entry of `postings`, as a single unit.
    ///
    /// Readers see either the document with every posting or nothing; on error nothing is written.
    fn create_document_with_postings(
        &self,
        title: &str,
        content: &str,
        url: Option<&str>,
        category: &str,
        postings: &BTreeMap<&str, Vec<Position>>,
    ) -> SearchResult<DocId>;

    /// Insert or fully replace the posting for `(term, doc_id)`.
    fn upsert_posting(&self, term: &str, doc_id: DocId, frequency: u32, positions: &[Position]) -> SearchResult<()>;

    fn get_document(&self, doc_id: DocId) -> SearchResult<Document>;

    /// For each document holding at least one of `terms`, the number of distinct matching terms and the sum of
    /// their frequencies. Keyed by id so ties downstream fall back to insertion order.
    fn postings_for_terms(&self, terms: &BTreeSet<String>) -> SearchResult<BTreeMap<DocId, DocMatch>>;

    fn count_documents(&self) -> SearchResult<u64>;

    fn count_distinct_terms(&self) -> SearchResult<u64>;
}

/// Shared argument checks for `upsert_posting`.
pub(crate) fn check_posting(term: &str, frequency: u32, positions: &[Position]) -> SearchResult<()> {
    if term.len() < MIN_TERM_LEN || !term.bytes().all(|b| b.is_ascii_lowercase()) {
        return Err(SearchError::validation(format!("invalid posting term {term:?}")));
    }
    if frequency as usize != positions.len() {
        return Err(SearchError::validation(format!(
            "posting for '{term}' has frequency {frequency} but {} positions",
            positions.len()
        )));
    }
    Ok(())
}

/// Check every posting of a batch before anything is written.
pub(crate) fn check_postings(postings: &BTreeMap<&str, Vec<Position>>) -> SearchResult<()> {
    for (term, positions) in postings {
        check_posting(term, positions.len() as u32, positions)?;
    }
    Ok(())
}

pub(crate) fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_must_be_lowercase_letters() {
        assert!(check_posting("rust", 1, &[0]).is_ok());
        for bad in ["", "a", "Rust", "a\0b", "c3po", "naïve"] {
            assert!(matches!(check_posting(bad, 1, &[0]), Err(SearchError::Validation(_))), "accepted {bad:?}");
        }
    }
}
