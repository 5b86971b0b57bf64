use serde::{Deserialize, Serialize};

pub type DocId = u64;
/// Zero-based index into a document's combined title+body term stream.
pub type Position = u32;

pub const DEFAULT_CATEGORY: &str = "General";

/// A stored document. Ids are assigned by the store and only ever increase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub category: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Input for creating a document; the store fills in id and timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    #[serde(alias = "body")]
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewDocument {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into(), url: None, category: None }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Per-document posting payload. `frequency == positions.len()` always holds for stored postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub frequency: u32,
    pub positions: Vec<Position>,
}

/// Aggregate of one document's postings over a set of query terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocMatch {
    pub matched_terms: u32,
    pub total_frequency: u64,
}

impl DocMatch {
    /// Ranking score: ten points per distinct matched term plus the summed frequency.
    pub fn score(&self) -> u64 {
        u64::from(self.matched_terms) * 10 + self.total_frequency
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: u64,
    pub unique_words: u64,
}
