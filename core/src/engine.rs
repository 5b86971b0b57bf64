use crate::indexer::Indexer;
use crate::query::{QueryEngine, SearchResults};
use crate::store::IndexStore;
use crate::{DocId, Document, IndexStats, NewDocument, SearchError, SearchResult, DEFAULT_CATEGORY};
use std::sync::Arc;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

/// The operations offered to the HTTP and CLI front ends, with input validation in front of them.
pub struct SearchEngine<S: IndexStore + ?Sized> {
    store: Arc<S>,
    indexer: Indexer<S>,
    query: QueryEngine<S>,
}

impl<S: IndexStore + ?Sized> Clone for SearchEngine<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), indexer: self.indexer.clone(), query: self.query.clone() }
    }
}

impl<S: IndexStore + ?Sized> SearchEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            indexer: Indexer::new(Arc::clone(&store)),
            query: QueryEngine::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn index_document(&self, doc: NewDocument) -> SearchResult<DocId> {
        if doc.title.trim().is_empty() || doc.content.trim().is_empty() {
            return Err(SearchError::validation("title and content are required"));
        }
        let url = doc.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
        let category = doc
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        self.indexer.index_document(&doc.title, &doc.content, url, category)
    }

    pub fn search(&self, query: &str, page: usize, limit: usize) -> SearchResult<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::validation("query cannot be empty"));
        }
        if page < 1 || limit < 1 {
            return Err(SearchError::validation("page and limit must be at least 1"));
        }
        self.query.search(query, page, limit)
    }

    pub fn stats(&self) -> SearchResult<IndexStats> {
        Ok(IndexStats {
            documents: self.store.count_documents()?,
            unique_words: self.store.count_distinct_terms()?,
        })
    }

    pub fn document(&self, doc_id: DocId) -> SearchResult<Document> {
        self.store.get_document(doc_id)
    }
}
