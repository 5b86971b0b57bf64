use crate::store::{check_posting, check_postings, now_rfc3339, IndexStore};
use crate::{DocId, DocMatch, Document, Position, Posting, SearchError, SearchResult};
use parking_lot::RwLock;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const DOCUMENTS_TREE: &str = "documents";
const POSTINGS_TREE: &str = "postings";
// Terms are ASCII letters, so a zero byte cleanly ends the term part of a posting key.
const TERM_SEP: u8 = 0;

/// sled-backed store.
///
/// `documents` maps a big-endian doc id to a bincode `Document`. `postings` maps
/// `term 0x00 doc_id` to a bincode `Posting`, which keeps every posting of a term
/// under one key prefix.
pub struct SledStore {
    db: sled::Db,
    documents: sled::Tree,
    postings: sled::Tree,
    // Held shared for a whole multi-term aggregation and exclusively while a batch commits,
    // so an aggregation never straddles a document's commit.
    gate: RwLock<()>,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(root: P) -> SearchResult<Self> {
        let root = root.as_ref();
        let db = sled::open(root)?;
        let documents = db.open_tree(DOCUMENTS_TREE)?;
        let postings = db.open_tree(POSTINGS_TREE)?;
        tracing::debug!(path = %root.display(), "opened sled store");
        Ok(Self { db, documents, postings, gate: RwLock::new(()) })
    }

    fn new_document(&self, title: &str, content: &str, url: Option<&str>, category: &str) -> SearchResult<Document> {
        Ok(Document {
            id: self.db.generate_id()? + 1,
            title: title.to_string(),
            content: content.to_string(),
            url: url.map(str::to_string),
            category: category.to_string(),
            created_at: now_rfc3339(),
        })
    }

    fn flush(&self) -> SearchResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn posting_prefix(term: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(term.len() + 1);
    key.extend_from_slice(term.as_bytes());
    key.push(TERM_SEP);
    key
}

fn posting_key(term: &str, doc_id: DocId) -> Vec<u8> {
    let mut key = posting_prefix(term);
    key.extend_from_slice(&doc_id.to_be_bytes());
    key
}

fn doc_id_from_posting_key(key: &[u8]) -> SearchResult<DocId> {
    let tail = key
        .len()
        .checked_sub(8)
        .and_then(|start| key.get(start..))
        .ok_or_else(|| SearchError::Storage("truncated posting key".into()))?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(tail);
    Ok(DocId::from_be_bytes(buf))
}

impl IndexStore for SledStore {
    fn create_document(&self, title: &str, content: &str, url: Option<&str>, category: &str) -> SearchResult<DocId> {
        let doc = self.new_document(title, content, url, category)?;
        self.documents.insert(doc.id.to_be_bytes(), bincode::serialize(&doc)?)?;
        self.flush()?;
        Ok(doc.id)
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
        let doc = self.new_document(title, content, url, category)?;
        let doc_key = doc.id.to_be_bytes();
        let doc_value = bincode::serialize(&doc)?;
        let mut entries: Vec<(Vec<u8>, Vec<u8>)> = Vec::with_capacity(postings.len());
        for (term, positions) in postings {
            let posting = Posting { frequency: positions.len() as u32, positions: positions.clone() };
            entries.push((posting_key(term, doc.id), bincode::serialize(&posting)?));
        }

        {
            let _commit = self.gate.write();
            (&self.documents, &self.postings)
                .transaction(|(docs_tx, postings_tx)| {
                    docs_tx.insert(&doc_key[..], doc_value.as_slice())?;
                    for (key, value) in &entries {
                        postings_tx.insert(key.as_slice(), value.as_slice())?;
                    }
                    Ok::<(), ConflictableTransactionError<()>>(())
                })
                .map_err(|e| match e {
                    TransactionError::Storage(e) => SearchError::from(e),
                    TransactionError::Abort(()) => SearchError::Storage("index transaction aborted".into()),
                })?;
        }
        self.flush()?;
        tracing::debug!(doc_id = doc.id, postings = entries.len(), "committed document batch");
        Ok(doc.id)
    }

    fn upsert_posting(&self, term: &str, doc_id: DocId, frequency: u32, positions: &[Position]) -> SearchResult<()> {
        check_posting(term, frequency, positions)?;
        if !self.documents.contains_key(doc_id.to_be_bytes())? {
            return Err(SearchError::NotFound(doc_id));
        }
        let posting = Posting { frequency, positions: positions.to_vec() };
        {
            let _commit = self.gate.write();
            self.postings.insert(posting_key(term, doc_id), bincode::serialize(&posting)?)?;
        }
        self.flush()
    }

    fn get_document(&self, doc_id: DocId) -> SearchResult<Document> {
        match self.documents.get(doc_id.to_be_bytes())? {
            Some(bytes) => Ok(bincode::deserialize(&bytes)?),
            None => Err(SearchError::NotFound(doc_id)),
        }
    }

    fn postings_for_terms(&self, terms: &BTreeSet<String>) -> SearchResult<BTreeMap<DocId, DocMatch>> {
        let _view = self.gate.read();
        let mut matches: BTreeMap<DocId, DocMatch> = BTreeMap::new();
        for term in terms {
            for entry in self.postings.scan_prefix(posting_prefix(term)) {
                let (key, value) = entry?;
                let doc_id = doc_id_from_posting_key(&key)?;
                let posting: Posting = bincode::deserialize(&value)?;
                let m = matches.entry(doc_id).or_default();
                m.matched_terms += 1;
                m.total_frequency += u64::from(posting.frequency);
            }
        }
        Ok(matches)
    }

    fn count_documents(&self) -> SearchResult<u64> {
        Ok(self.documents.len() as u64)
    }

    fn count_distinct_terms(&self) -> SearchResult<u64> {
        // Keys are sorted, so each term's postings are contiguous.
        let mut count = 0u64;
        let mut last: Option<Vec<u8>> = None;
        for key in self.postings.iter().keys() {
            let key = key?;
            let term = key.split(|b| *b == TERM_SEP).next().unwrap_or_default();
            if last.as_deref() != Some(term) {
                count += 1;
                last = Some(term.to_vec());
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn documents_survive_reopen() {
        let dir = tempdir().unwrap();
        let id = {
            let store = SledStore::open(dir.path()).unwrap();
            let id = store.create_document("Title", "Body text", Some("https://example.com"), "General").unwrap();
            store.upsert_posting("body", id, 1, &[1]).unwrap();
            id
        };
        let store = SledStore::open(dir.path()).unwrap();
        let doc = store.get_document(id).unwrap();
        assert_eq!(doc.title, "Title");
        assert_eq!(doc.url.as_deref(), Some("https://example.com"));
        assert_eq!(store.count_documents().unwrap(), 1);
        assert_eq!(store.count_distinct_terms().unwrap(), 1);
    }

    #[test]
    fn prefix_scan_does_not_bleed_into_longer_terms() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        let id = store.create_document("t", "c", None, "General").unwrap();
        store.upsert_posting("java", id, 1, &[0]).unwrap();
        store.upsert_posting("javascript", id, 2, &[1, 2]).unwrap();
        let terms: BTreeSet<String> = ["java".to_string()].into_iter().collect();
        let m = store.postings_for_terms(&terms).unwrap();
        assert_eq!(m[&id], DocMatch { matched_terms: 1, total_frequency: 1 });
        assert_eq!(store.count_distinct_terms().unwrap(), 2);
    }

    #[test]
    fn upsert_overwrites_existing_posting() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        let id = store.create_document("t", "c", None, "General").unwrap();
        store.upsert_posting("rust", id, 2, &[0, 5]).unwrap();
        store.upsert_posting("rust", id, 1, &[7]).unwrap();
        let raw = store.postings.get(posting_key("rust", id)).unwrap().unwrap();
        let p: Posting = bincode::deserialize(&raw).unwrap();
        assert_eq!(p, Posting { frequency: 1, positions: vec![7] });
    }

    #[test]
    fn batch_write_lands_in_both_trees() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        let mut postings: BTreeMap<&str, Vec<Position>> = BTreeMap::new();
        postings.insert("sled", vec![0, 3]);
        postings.insert("tree", vec![1]);
        let id = store.create_document_with_postings("Sled tree", "sled", None, "General", &postings).unwrap();

        assert_eq!(store.get_document(id).unwrap().title, "Sled tree");
        let terms: BTreeSet<String> = ["sled".to_string(), "tree".to_string()].into_iter().collect();
        let m = store.postings_for_terms(&terms).unwrap();
        assert_eq!(m[&id], DocMatch { matched_terms: 2, total_frequency: 3 });
    }

    #[test]
    fn rejected_batch_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        let mut postings: BTreeMap<&str, Vec<Position>> = BTreeMap::new();
        postings.insert("fine", vec![0]);
        postings.insert("a\0b", vec![1]);
        let err = store.create_document_with_postings("t", "c", None, "General", &postings).unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
        assert_eq!(store.count_documents().unwrap(), 0);
        assert_eq!(store.count_distinct_terms().unwrap(), 0);
    }

    #[test]
    fn missing_document_is_not_found() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        assert!(matches!(store.get_document(9), Err(SearchError::NotFound(9))));
        assert!(matches!(store.upsert_posting("rust", 9, 1, &[0]), Err(SearchError::NotFound(9))));
    }
}
