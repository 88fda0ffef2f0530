//! Prompt context construction and the keyword-normalization pipeline.
//!
//! `normalize_phrases` is the pure function: lowercase, tokenize, drop
//! stop-words and short/non-alphanumeric tokens, stem, de-duplicate in
//! first-seen order. Everything downstream (the URL filter, the heuristic
//! scorer) consumes the resulting `keywords` set, never the raw prompt.

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};

/// Per-request, immutable once built.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub original_text: String,
    /// Quoted, OR-joined phrase list handed to the seed provider.
    pub search_phrase: String,
    /// Whitespace-joined keyword string handed to the ranking engine.
    pub query_text: String,
    /// Ordered, de-duplicated single-token stems used by URL and content heuristics.
    pub keywords: Vec<String>,
}

impl PromptContext {
    /// Build from a prompt and the enricher's expanded phrases (or, absent an
    /// enricher, the raw prompt as a single degenerate phrase).
    pub fn build(original_text: &str, phrases: &[String]) -> Self {
        let keywords = normalize_phrases(phrases);
        let search_phrase = phrases
            .iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(" OR ");
        let query_text = keywords.join(" ");
        PromptContext {
            original_text: original_text.to_string(),
            search_phrase,
            query_text,
            keywords,
        }
    }
}

/// English stop-words, also reused as the ranking engine's analyzer stop list.
pub fn stop_words() -> &'static HashSet<&'static str> {
    static WORDS: std::sync::OnceLock<HashSet<&'static str>> = std::sync::OnceLock::new();
    WORDS.get_or_init(|| {
        [
            "a", "an", "the", "and", "or", "but", "is", "are", "was", "were", "be", "been",
            "being", "in", "on", "at", "to", "for", "with", "by", "about", "if", "of", "it",
            "you", "me", "my", "he", "she", "they", "what", "which", "who", "whom", "this",
            "that", "these", "those", "how", "when", "where", "why", "i", "we", "do", "does",
            "did", "will", "can", "could", "should", "would", "so", "then", "just",
        ]
        .into_iter()
        .collect()
    })
}

/// Lowercase -> tokenize on word boundaries -> drop stop-words and tokens of
/// length <= 2 or non-alphanumeric -> stem -> de-duplicate (first-seen order,
/// keeping both the original token and its stem when they differ).
pub fn normalize_phrases(phrases: &[String]) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    let stops = stop_words();
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for phrase in phrases {
        for raw in phrase.split(|c: char| !c.is_alphanumeric()) {
            if raw.is_empty() {
                continue;
            }
            let lower = raw.to_lowercase();
            if lower.len() <= 2 || !lower.chars().all(|c| c.is_alphanumeric()) {
                continue;
            }
            if stops.contains(lower.as_str()) {
                continue;
            }
            let stem = stemmer.stem(&lower).into_owned();
            if seen.insert(lower.clone()) {
                out.push(lower.clone());
            }
            if stem != lower && seen.insert(stem.clone()) {
                out.push(stem);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stopwords_and_short_tokens() {
        let got = normalize_phrases(&["the cat is on a mat".to_string()]);
        assert!(!got.contains(&"is".to_string()));
        assert!(!got.contains(&"on".to_string()));
        assert!(got.contains(&"cat".to_string()));
        assert!(got.contains(&"mat".to_string()));
    }

    #[test]
    fn empty_input_yields_empty_set() {
        assert!(normalize_phrases(&[]).is_empty());
        assert!(normalize_phrases(&["".to_string()]).is_empty());
    }

    #[test]
    fn dedups_preserving_first_seen_order() {
        let got = normalize_phrases(&["running runner".to_string(), "running".to_string()]);
        let mut seen = HashSet::new();
        for k in &got {
            assert!(seen.insert(k.clone()), "duplicate keyword {k}");
        }
    }

    #[test]
    fn prompt_context_builds_query_and_search_phrase() {
        let ctx = PromptContext::build("rust web crawler", &["rust crawler".to_string()]);
        assert!(ctx.search_phrase.starts_with('"'));
        assert!(!ctx.query_text.is_empty());
        assert!(ctx.keywords.contains(&"crawl".to_string()) || ctx.keywords.contains(&"crawler".to_string()));
    }
}
