//! Snapshot/restore of `{visited set, content-hash set, content store}` to a
//! state directory, three files, write-to-temp-then-rename for atomicity.
//!
//! A missing or corrupt file on load yields empty state for that file rather
//! than a hard failure — the orchestrator always gets a usable (if cold)
//! starting point.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::document::{ContentStore, Document};

const VISITED_FILE: &str = "visited_urls.json";
const HASHES_FILE: &str = "content_hashes.json";
const STORE_FILE: &str = "content_store.json";

pub struct PersistedState {
    pub visited: HashSet<String>,
    pub store: ContentStore,
}

/// Load the three files from `dir`. Each is independent: a missing or
/// unparseable file degrades to empty state for just that file, logged, and
/// does not block loading the others.
pub fn load(dir: &Path) -> PersistedState {
    let visited = load_json(&dir.join(VISITED_FILE)).unwrap_or_default();
    let hashes: HashSet<String> = load_json(&dir.join(HASHES_FILE)).unwrap_or_default();
    let documents: Vec<Document> = load_json(&dir.join(STORE_FILE)).unwrap_or_default();
    PersistedState {
        visited,
        store: ContentStore::from_parts(documents, hashes),
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("persistence: failed to parse {}: {} — starting fresh", path.display(), e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Write all three files atomically. Each write failure is logged and does
/// not abort the others or the caller's request.
pub fn save(dir: &Path, visited: &HashSet<String>, store: &ContentStore) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!("persistence: failed to create state dir {}: {}", dir.display(), e);
        return;
    }
    write_atomic(&dir.join(VISITED_FILE), visited);
    write_atomic(&dir.join(HASHES_FILE), store.hashes());
    write_atomic(&dir.join(STORE_FILE), store.documents());
}

fn write_atomic<T: serde::Serialize>(path: &Path, value: &T) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("persistence: failed to serialize {}: {}", path.display(), e);
            return;
        }
    };
    let tmp: PathBuf = path.with_extension("tmp");
    if let Err(e) = std::fs::write(&tmp, &json) {
        tracing::warn!("persistence: failed to write temp file {}: {}", tmp.display(), e);
        return;
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        tracing::warn!("persistence: failed to rename {} -> {}: {}", tmp.display(), path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn doc(body: &str) -> Document {
        Document {
            url: "https://example.com/a".to_string(),
            domain: "example.com".to_string(),
            title: "A".to_string(),
            body: body.to_string(),
            word_count: 2,
            publish_date: None,
            heuristic_score: 0.5,
            outbound_links: vec![],
            content_hash: String::new(),
        }
    }

    #[test]
    fn missing_directory_yields_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let nonexistent = dir.path().join("nope");
        let state = load(&nonexistent);
        assert!(state.visited.is_empty());
        assert!(state.store.is_empty());
    }

    #[test]
    fn round_trip_preserves_visited_and_store() {
        let dir = tempfile::tempdir().unwrap();

        let mut visited = HashSet::new();
        visited.insert("https://example.com/a".to_string());
        visited.insert("https://example.com/b".to_string());

        let mut store = ContentStore::new();
        store.admit(doc("first document body"));
        store.admit(doc("second document body"));

        save(dir.path(), &visited, &store);

        let restored = load(dir.path());
        assert_eq!(restored.visited, visited);
        assert_eq!(restored.store.len(), store.len());
        assert_eq!(restored.store.hashes(), store.hashes());
        let restored_bodies: Vec<_> = restored.store.iter().map(|d| d.body.clone()).collect();
        let original_bodies: Vec<_> = store.iter().map(|d| d.body.clone()).collect();
        assert_eq!(restored_bodies, original_bodies);
    }

    #[test]
    fn corrupt_file_degrades_to_empty_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(VISITED_FILE), "not json").unwrap();
        let state = load(dir.path());
        assert!(state.visited.is_empty());
    }
}
