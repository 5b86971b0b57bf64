use crate::store::IndexStore;
use crate::tokenizer::tokenize;
use crate::{DocId, Position, SearchResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Group a term stream into `term -> positions`, positions in ascending order.
pub fn term_positions(terms: &[String]) -> BTreeMap<&str, Vec<Position>> {
    let mut grouped: BTreeMap<&str, Vec<Position>> = BTreeMap::new();
    for (pos, term) in terms.iter().enumerate() {
        grouped.entry(term.as_str()).or_default().push(pos as Position);
    }
    grouped
}

/// Writes documents and their postings into an [`IndexStore`].
pub struct Indexer<S: IndexStore + ?Sized> {
    store: Arc<S>,
}

impl<S: IndexStore + ?Sized> Clone for Indexer<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<S: IndexStore + ?Sized> Indexer<S> {
    pub fn new(store: Arc<S>) -> Self { Self { store } }

    /// Store the document together with one posting per distinct term of `title + " " + content`.
    ///
    /// The document and its postings are written as one unit, so a failed write leaves neither behind
    /// and the error goes straight back to the caller.
    pub fn index_document(&self, title: &str, content: &str, url: Option<&str>, category: &str) -> SearchResult<DocId> {
        let terms = tokenize(&format!("{title} {content}"));
        let grouped = term_positions(&terms);
        let doc_id = self.store.create_document_with_postings(title, content, url, category, &grouped)?;
        tracing::debug!(doc_id, tokens = terms.len(), distinct_terms = grouped.len(), "indexed document");
        Ok(doc_id)
    }
}
