//! Response and metadata shapes returned by [`crate::orchestrator::crawl_and_query`].

use serde::Serialize;

use crate::collaborators::JudgeEvaluation;
use crate::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    PartialSuccess,
    Error,
}

/// A document plus the three scores computed by the ranking engine.
#[derive(Debug, Clone, Serialize)]
pub struct RankedDocument {
    #[serde(flatten)]
    pub document: Document,
    pub heuristic_score: f64,
    pub cosine_similarity_score: f64,
    pub weighted_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlMetadata {
    pub visited_total: usize,
    pub seed_urls_used: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub urls: UrlMetadata,
    pub content_collected_total: usize,
    pub from_cache: bool,
    /// `<phase>_error` keys, e.g. `crawl_error`, `synthesis_error`.
    #[serde(flatten)]
    pub phase_errors: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeMetrics {
    pub total_duration_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestMetrics {
    pub by_depth: std::collections::BTreeMap<usize, HarvestBucketMetrics>,
    pub cumulative_ratio: f64,
    pub cache_ratio: f64,
    pub overall_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestBucketMetrics {
    pub processed: usize,
    pub relevant: usize,
    pub ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationMetrics {
    pub time_metrics: TimeMetrics,
    pub harvest_metrics: HarvestMetrics,
    pub generative_ai_scoring_metrics: Option<JudgeEvaluation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlResponse {
    pub status: Status,
    pub prompt: String,
    pub results: Vec<RankedDocument>,
    pub metadata: Metadata,
    pub llm_response: String,
    pub evaluation_metrics: EvaluationMetrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub error: Vec<String>,
}
