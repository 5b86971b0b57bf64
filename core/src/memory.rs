use crate::store::{check_posting, check_postings, now_rfc3339, IndexStore};
use crate::{DocId, DocMatch, Document, Position, Posting, SearchError, SearchResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Default)]
struct Inner {
    next_id: DocId,
    docs: BTreeMap<DocId, Document>,
    // term -> doc id -> posting
    postings: HashMap<String, BTreeMap<DocId, Posting>>,
}

/// In-process store, used by tests and by the server when no database path is given.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl Inner {
    fn insert_document(&mut self, title: &str, content: &str, url: Option<&str>, category: &str) -> DocId {
        self.next_id += 1;
        let id = self.next_id;
        self.docs.insert(id, Document {
            id,
            title: title.to_string(),
            content: content.to_string(),
            url: url.map(str::to_string),
            category: category.to_string(),
            created_at: now_rfc3339(),
        });
        id
    }

    fn insert_posting(&mut self, term: &str, doc_id: DocId, positions: &[Position]) {
        self.postings
            .entry(term.to_string())
            .or_default()
            .insert(doc_id, Posting { frequency: positions.len() as u32, positions: positions.to_vec() });
    }
}

impl IndexStore for MemoryStore {
    fn create_document(&self, title: &str, content: &str, url: Option<&str>, category: &str) -> SearchResult<DocId> {
        Ok(self.inner.write().insert_document(title, content, url, category))
    }

    fn create_document_with_postings(
        &self,
        title: &str,
        content: &str,
        url: Option<&str>,
        category: &str,
        postings: &BTreeMap<&str, Vec<Position>>,
    ) -> SearchResult<DocId> {
        check_postings(postings)?;
        let mut inner = self.inner.write();
        let id = inner.insert_document(title, content, url, category);
        for (term, positions) in postings {
            inner.insert_posting(term, id, positions);
        }
        Ok(id)
    }

    fn upsert_posting(&self, term: &str, doc_id: DocId, frequency: u32, positions: &[Position]) -> SearchResult<()> {
        check_posting(term, frequency, positions)?;
        let mut inner = self.inner.write();
        if !inner.docs.contains_key(&doc_id) {
            return Err(SearchError::NotFound(doc_id));
        }
        inner.insert_posting(term, doc_id, positions);
        Ok(())
    }

    fn get_document(&self, doc_id: DocId) -> SearchResult<Document> {
        self.inner.read().docs.get(&doc_id).cloned().ok_or(SearchError::NotFound(doc_id))
    }

    fn postings_for_terms(&self, terms: &BTreeSet<String>) -> SearchResult<BTreeMap<DocId, DocMatch>> {
        let inner = self.inner.read();
        let mut matches: BTreeMap<DocId, DocMatch> = BTreeMap::new();
        for term in terms {
            let Some(plist) = inner.postings.get(term) else { continue };
            for (doc_id, p) in plist {
                let m = matches.entry(*doc_id).or_default();
                m.matched_terms += 1;
                m.total_frequency += u64::from(p.frequency);
            }
        }
        Ok(matches)
    }

    fn count_documents(&self) -> SearchResult<u64> {
        Ok(self.inner.read().docs.len() as u64)
    }

    fn count_distinct_terms(&self) -> SearchResult<u64> {
        Ok(self.inner.read().postings.values().filter(|p| !p.is_empty()).count() as u64)
    }
}
