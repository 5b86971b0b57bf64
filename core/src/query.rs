use crate::snippet::{snippet, DEFAULT_SNIPPET_LEN};
use crate::store::IndexStore;
use crate::tokenizer::tokenize;
use crate::{DocId, DocMatch, SearchResult};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: DocId,
    pub title: String,
    pub snippet: String,
    pub url: Option<String>,
    pub category: String,
    pub score: u64,
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub results: Vec<SearchHit>,
    /// Number of ranked candidates before pagination.
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub elapsed: Duration,
}

/// Order candidates by matched term count, then total frequency, both descending.
/// The sort is stable, so equal candidates keep ascending id (insertion) order.
pub fn rank(candidates: impl IntoIterator<Item = (DocId, DocMatch)>) -> Vec<(DocId, DocMatch)> {
    let mut ranked: Vec<(DocId, DocMatch)> = candidates.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.matched_terms
            .cmp(&a.1.matched_terms)
            .then_with(|| b.1.total_frequency.cmp(&a.1.total_frequency))
    });
    ranked
}

/// Slice of `items` for 1-based `page`; pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, limit: usize) -> &[T] {
    let offset = page.saturating_sub(1).saturating_mul(limit);
    if offset >= items.len() {
        return &[];
    }
    let end = offset.saturating_add(limit).min(items.len());
    &items[offset..end]
}

/// Ranked keyword retrieval over an [`IndexStore`].
pub struct QueryEngine<S: IndexStore + ?Sized> {
    store: Arc<S>,
}

impl<S: IndexStore + ?Sized> Clone for QueryEngine<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<S: IndexStore + ?Sized> QueryEngine<S> {
    pub fn new(store: Arc<S>) -> Self { Self { store } }

    /// Run a query. A query with no usable terms yields an empty result, not an error.
    pub fn search(&self, query: &str, page: usize, limit: usize) -> SearchResult<SearchResults> {
        let start = Instant::now();

        // Keep first-occurrence order for snippets; the set drives the postings lookup.
        let mut seen = BTreeSet::new();
        let terms: Vec<String> = tokenize(query).into_iter().filter(|t| seen.insert(t.clone())).collect();
        if terms.is_empty() {
            return Ok(SearchResults { results: Vec::new(), total: 0, page, limit, elapsed: start.elapsed() });
        }

        let ranked = rank(self.store.postings_for_terms(&seen)?);
        let total = ranked.len();

        let mut results = Vec::new();
        for (doc_id, m) in paginate(&ranked, page, limit) {
            let doc = self.store.get_document(*doc_id)?;
            results.push(SearchHit {
                id: doc.id,
                snippet: snippet(&doc.content, &terms, DEFAULT_SNIPPET_LEN),
                title: doc.title,
                url: doc.url,
                category: doc.category,
                score: m.score(),
            });
        }

        let elapsed = start.elapsed();
        tracing::debug!(query, terms = terms.len(), total, returned = results.len(), ?elapsed, "search");
        Ok(SearchResults { results, total, page, limit, elapsed })
    }
}
