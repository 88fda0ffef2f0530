//! TF-IDF + cosine ranking engine, blended with each document's frozen
//! heuristic score.
//!
//! Rebuilt fresh on every query call (O(N·V) over the store's current
//! bodies and vocabulary) — stateless by design, acceptable for the stores
//! this core targets. Not shared or cached across calls.

use std::collections::HashMap;

use crate::document::ContentStore;
use crate::keywords::stop_words;

/// A document augmented with the three scores computed at query time.
#[derive(Debug, Clone)]
pub struct RankedResult {
    pub index: usize,
    pub heuristic_score: f64,
    pub cosine_similarity_score: f64,
    pub weighted_score: f64,
}

/// Lowercase, split on non-alphanumeric boundaries, drop stop-words and
/// empty tokens. Same analyzer for documents and the query, matching
/// scikit-learn's default `TfidfVectorizer(stop_words='english', lowercase=True)`.
fn analyze(text: &str) -> Vec<String> {
    let stops = stop_words();
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .filter(|s| !stops.contains(s.as_str()))
        .collect()
}

struct TfIdfSpace {
    vocab: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfSpace {
    fn fit(corpus: &[Vec<String>]) -> Self {
        let n_docs = corpus.len() as f64;
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for tokens in corpus {
            let mut seen_in_doc = std::collections::HashSet::new();
            for t in tokens {
                if seen_in_doc.insert(t.clone()) {
                    *doc_freq.entry(t.clone()).or_default() += 1;
                }
            }
        }
        let mut vocab = HashMap::new();
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (term, df) in doc_freq {
            let idx = vocab.len();
            vocab.insert(term, idx);
            // Smooth IDF, as sklearn's default: ln((1+n)/(1+df)) + 1.
            idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
        }
        TfIdfSpace { vocab, idf }
    }

    fn vectorize(&self, tokens: &[String]) -> Vec<f64> {
        let mut tf: HashMap<usize, f64> = HashMap::new();
        for t in tokens {
            if let Some(&idx) = self.vocab.get(t) {
                *tf.entry(idx).or_default() += 1.0;
            }
        }
        let mut vec = vec![0.0; self.idf.len()];
        for (idx, count) in tf {
            vec[idx] = count * self.idf[idx];
        }
        l2_normalize(&mut vec);
        vec
    }
}

fn l2_normalize(v: &mut [f64]) {
    let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > f64::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn cosine(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Rebuild the TF-IDF space over `store`'s bodies, score against `query`,
/// blend with each document's heuristic score, and return the top `k` by
/// `weighted_score` descending (stable on ties — store order wins).
///
/// Empty store, a store with no non-empty bodies, or `k == 0` all yield `[]`.
pub fn query(store: &ContentStore, query: &str, k: usize, w_heuristic: f64, w_cosine: f64) -> Vec<RankedResult> {
    if store.is_empty() || k == 0 {
        return Vec::new();
    }

    let corpus: Vec<Vec<String>> = store.iter().map(|d| analyze(&d.body)).collect();
    if corpus.iter().all(|tokens| tokens.is_empty()) {
        return Vec::new();
    }

    let space = TfIdfSpace::fit(&corpus);
    let query_vec = space.vectorize(&analyze(query));

    let mut results: Vec<RankedResult> = corpus
        .iter()
        .enumerate()
        .map(|(i, tokens)| {
            let doc_vec = space.vectorize(tokens);
            let cosine_similarity_score = cosine(&query_vec, &doc_vec);
            let heuristic_score = store.documents()[i].heuristic_score;
            let weighted_score = w_heuristic * heuristic_score + w_cosine * cosine_similarity_score;
            RankedResult {
                index: i,
                heuristic_score,
                cosine_similarity_score,
                weighted_score,
            }
        })
        .collect();

    // Stable sort: ties keep ascending-index (insertion) order, matching a
    // deterministic rebuild for a fixed store and query.
    results.sort_by(|a, b| b.weighted_score.partial_cmp(&a.weighted_score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn doc(body: &str, heuristic: f64) -> Document {
        Document {
            url: format!("https://example.com/{}", body.len()),
            domain: "example.com".to_string(),
            title: "T".to_string(),
            body: body.to_string(),
            word_count: body.split_whitespace().count(),
            publish_date: None,
            heuristic_score: heuristic,
            outbound_links: vec![],
            content_hash: String::new(),
        }
    }

    #[test]
    fn empty_store_returns_empty() {
        let store = ContentStore::new();
        assert!(query(&store, "rust crawler", 3, 0.6, 0.4).is_empty());
    }

    #[test]
    fn zero_k_returns_empty() {
        let mut store = ContentStore::new();
        store.admit(doc("rust programming language", 0.5));
        assert!(query(&store, "rust", 0, 0.6, 0.4).is_empty());
    }

    #[test]
    fn store_with_no_meaningful_tokens_returns_empty() {
        let mut store = ContentStore::new();
        store.admit(doc("the a an is", 0.5));
        assert!(query(&store, "the a", 3, 0.6, 0.4).is_empty());
    }

    #[test]
    fn ranks_more_similar_document_higher() {
        let mut store = ContentStore::new();
        store.admit(doc("rust programming language crawler guide", 0.1));
        store.admit(doc("cooking recipes for dinner tonight", 0.1));
        let results = query(&store, "rust crawler", 2, 0.0, 1.0);
        assert_eq!(results[0].index, 0);
    }

    #[test]
    fn deterministic_for_fixed_store_and_query() {
        let mut store = ContentStore::new();
        store.admit(doc("rust programming language crawler guide", 0.4));
        store.admit(doc("another rust crawler article", 0.3));
        let r1 = query(&store, "rust crawler", 2, 0.6, 0.4);
        let r2 = query(&store, "rust crawler", 2, 0.6, 0.4);
        let idx1: Vec<_> = r1.iter().map(|r| r.index).collect();
        let idx2: Vec<_> = r2.iter().map(|r| r.index).collect();
        assert_eq!(idx1, idx2);
    }

    #[test]
    fn weighted_score_blends_heuristic_and_cosine() {
        let mut store = ContentStore::new();
        store.admit(doc("rust crawler guide content", 1.0));
        let results = query(&store, "rust crawler", 1, 0.6, 0.4);
        let r = &results[0];
        let expected = 0.6 * r.heuristic_score + 0.4 * r.cosine_similarity_score;
        assert!((r.weighted_score - expected).abs() < 1e-9);
    }
}
