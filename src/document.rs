//! The `Document` record and the append-only, deduplicated content store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// A single ingested page. `heuristic_score` is computed once at ingestion
/// and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub body: String,
    pub word_count: usize,
    pub publish_date: Option<DateTime<Utc>>,
    pub heuristic_score: f64,
    pub outbound_links: Vec<String>,
    pub content_hash: String,
}

/// Insertion-ordered, append-only sequence of [`Document`]s plus the
/// content-hash dedup witness set.
#[derive(Debug, Default)]
pub struct ContentStore {
    documents: Vec<Document>,
    hashes: HashSet<String>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(documents: Vec<Document>, hashes: HashSet<String>) -> Self {
        Self { documents, hashes }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn hashes(&self) -> &HashSet<String> {
        &self.hashes
    }

    /// sha256 hex digest of a document body, UTF-8 with replacement for
    /// invalid sequences (the input is always a `String`, so this never
    /// actually hits the replacement path; kept explicit because the
    /// contract calls it out).
    pub fn hash_body(body: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(body.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Rejects empty/whitespace bodies and content-hash duplicates; otherwise
    /// inserts the hash and appends the document. Returns whether it was admitted.
    pub fn admit(&mut self, mut doc: Document) -> bool {
        if doc.body.trim().is_empty() {
            return false;
        }
        let hash = Self::hash_body(&doc.body);
        if self.hashes.contains(&hash) {
            return false;
        }
        doc.content_hash = hash.clone();
        self.hashes.insert(hash);
        self.documents.push(doc);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Document {
        Document {
            url: "https://example.com/a".to_string(),
            domain: "example.com".to_string(),
            title: "A".to_string(),
            body: body.to_string(),
            word_count: body.split_whitespace().count(),
            publish_date: None,
            heuristic_score: 0.5,
            outbound_links: vec![],
            content_hash: String::new(),
        }
    }

    #[test]
    fn rejects_empty_body() {
        let mut store = ContentStore::new();
        assert!(!store.admit(doc("   ")));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn dedups_by_content_hash() {
        let mut store = ContentStore::new();
        assert!(store.admit(doc("same content here")));
        assert!(!store.admit(doc("same content here")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.hashes().len(), 1);
    }

    #[test]
    fn distinct_bodies_both_admitted() {
        let mut store = ContentStore::new();
        assert!(store.admit(doc("first body")));
        assert!(store.admit(doc("second body")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut store = ContentStore::new();
        store.admit(doc("alpha content"));
        store.admit(doc("beta content"));
        let urls: Vec<_> = store.iter().map(|d| d.body.clone()).collect();
        assert_eq!(urls, vec!["alpha content", "beta content"]);
    }
}
