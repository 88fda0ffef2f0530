//! Injected external collaborators. The core never raises into these
//! directly — it calls them and treats failure (errors, empty returns) as a
//! normal outcome to be folded into the orchestrator's error list.

pub mod enricher;
pub mod extractor;
pub mod fetcher;
pub mod seed_provider;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::ranking::RankedResult;
use crate::document::Document;

/// Supplies seed URLs when the caller didn't provide enough of its own.
#[async_trait]
pub trait SeedProvider: Send + Sync {
    /// May return fewer than `n` URLs, or none. Default implementations
    /// never return `Err` (a blocked or unreachable search engine degrades
    /// to an empty result, not a failure) — `Err` is reserved for
    /// collaborators that genuinely cannot source seeds and want that
    /// surfaced as a crawl-phase error rather than silently treated as "no
    /// seeds found".
    async fn search(&self, query: &str, n: usize) -> Result<Vec<String>, String>;
}

/// Retrieves a URL's body, following redirects.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// `None` on non-HTML content-type or transport error. `final_url` is the
    /// post-redirect URL.
    async fn get(&self, url: &str, timeout: Duration) -> Option<FetchedPage>;
}

pub struct FetchedPage {
    pub body: String,
    pub final_url: String,
}

/// Turns raw HTML into the fields the pipeline needs.
pub trait Extractor: Send + Sync {
    /// `None` when the page yields no usable content. Body is plain text,
    /// whitespace-normalized, with URLs/emails stripped. Outbound links are
    /// same-host, absolute, fragment-stripped, de-duplicated.
    fn parse(&self, html: &str, url: &str) -> Option<ExtractedPage>;
}

pub struct ExtractedPage {
    pub title: String,
    pub body: String,
    pub publish_date: Option<DateTime<Utc>>,
    pub outbound_links: Vec<String>,
    pub word_count: usize,
}

/// Expands a raw prompt into keyword phrases.
#[async_trait]
pub trait QueryEnricher: Send + Sync {
    /// Comma-separated single-word or multi-word phrases; never empty for
    /// non-empty input.
    async fn expand(&self, prompt: &str, n_keywords: usize) -> Vec<String>;
}

/// A ranked document paired with its scores, handed to the synthesizer/judge.
pub struct ScoredDocument<'a> {
    pub document: &'a Document,
    pub scores: &'a RankedResult,
}

/// Optional: generates a natural-language answer from the ranked results.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    async fn generate(&self, prompt: &str, results: &[ScoredDocument<'_>]) -> anyhow::Result<String>;
}

/// Optional: scores the results (and, if present, the synthesized answer).
#[async_trait]
pub trait Judge: Send + Sync {
    async fn evaluate(
        &self,
        prompt: &str,
        results: &[ScoredDocument<'_>],
        answer: Option<&str>,
    ) -> anyhow::Result<JudgeEvaluation>;
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct JudgeEvaluation {
    pub raw_results_evaluation: f64,
    pub llm_response_evaluation: Option<f64>,
}
