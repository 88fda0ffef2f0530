//! Request-scope orchestrator (§4.9): builds the prompt context, tries the
//! cache path, falls back to the scheduler, and assembles the response.
//!
//! Each phase failure is folded into an error list rather than unwinding —
//! `status` is a reduction over that list (DESIGN NOTE §9, "exception-driven
//! control flow" replaced by an explicit result-plus-error-list pattern).
//! No error in a phase after the scheduler has produced documents discards
//! those documents: `results` is always rebuilt from whatever the store holds.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;

use crate::collaborators::{AnswerSynthesizer, Extractor, Fetcher, Judge, QueryEnricher, ScoredDocument, SeedProvider};
use crate::config::Config;
use crate::document::ContentStore;
use crate::harvest::HarvestMeter;
use crate::keywords::PromptContext;
use crate::ranking::{self, RankedResult};
use crate::scheduler::{self, SchedulerDeps};
use crate::types::{CrawlResponse, EvaluationMetrics, HarvestBucketMetrics, HarvestMetrics, Metadata, RankedDocument, Status, TimeMetrics, UrlMetadata};

/// Number of keyword phrases requested from the enricher (§4.1's "prompt ->
/// phrases" fan-out; the default unused when no enricher is injected).
const ENRICHER_N_KEYWORDS: usize = 6;

/// Request shape mirroring the entry point in spec §6: `crawl_and_query(prompt,
/// urls?, n?, num_seed?, max_depth?, force_crawl?, base_threshold?, use_llm?)`.
#[derive(Debug, Clone, Default)]
pub struct CrawlRequest {
    pub prompt: String,
    pub urls: Vec<String>,
    pub n: Option<usize>,
    pub num_seed: Option<usize>,
    pub max_depth: Option<usize>,
    pub force_crawl: Option<bool>,
    pub base_threshold: Option<f64>,
    pub use_llm: Option<bool>,
}

/// Injected collaborators for one request. `synthesizer`/`judge` are
/// optional — absent means the LLM pipeline is disabled entirely.
pub struct Collaborators<'a> {
    pub seed_provider: &'a dyn SeedProvider,
    pub fetcher: &'a dyn Fetcher,
    pub extractor: &'a dyn Extractor,
    pub enricher: &'a dyn QueryEnricher,
    pub synthesizer: Option<&'a dyn AnswerSynthesizer>,
    pub judge: Option<&'a dyn Judge>,
}

fn effective_config(base: &Config, request: &CrawlRequest) -> Config {
    let mut config = base.clone();
    if let Some(n) = request.n {
        config.num_results = n;
    }
    if let Some(n) = request.num_seed {
        config.num_seed_urls = n;
    }
    if let Some(d) = request.max_depth {
        config.max_depth = d;
    }
    if let Some(f) = request.force_crawl {
        config.force_crawl = f;
    }
    if let Some(t) = request.base_threshold {
        config.base_relevance_threshold = t;
    }
    config
}

fn empty_response(prompt: String, status: Status, elapsed_ms: u128, error: Vec<String>) -> CrawlResponse {
    CrawlResponse {
        status,
        prompt,
        results: Vec::new(),
        metadata: Metadata {
            urls: UrlMetadata {
                visited_total: 0,
                seed_urls_used: 0,
            },
            content_collected_total: 0,
            from_cache: false,
            phase_errors: BTreeMap::new(),
        },
        llm_response: "N/A".to_string(),
        evaluation_metrics: EvaluationMetrics {
            time_metrics: TimeMetrics { total_duration_ms: elapsed_ms },
            harvest_metrics: harvest_metrics_from(&HarvestMeter::new()),
            generative_ai_scoring_metrics: None,
        },
        error,
    }
}

fn harvest_metrics_from(meter: &HarvestMeter) -> HarvestMetrics {
    let by_depth = meter
        .by_depth()
        .iter()
        .map(|(&depth, bucket)| {
            (
                depth,
                HarvestBucketMetrics {
                    processed: bucket.processed,
                    relevant: bucket.relevant,
                    ratio: bucket.ratio(),
                },
            )
        })
        .collect();
    HarvestMetrics {
        by_depth,
        cumulative_ratio: meter.cumulative_ratio(),
        cache_ratio: meter.cache_ratio(),
        overall_ratio: meter.overall_ratio(),
    }
}

fn ranked_documents(store: &ContentStore, ranked: &[RankedResult]) -> Vec<RankedDocument> {
    ranked
        .iter()
        .map(|r| RankedDocument {
            document: store.documents()[r.index].clone(),
            heuristic_score: r.heuristic_score,
            cosine_similarity_score: r.cosine_similarity_score,
            weighted_score: r.weighted_score,
        })
        .collect()
}

/// The entry point. Never panics on collaborator failure — every phase
/// failure becomes a `(phase, message)` pair folded into `metadata` and
/// `error`, downgrading `status` from `success` to `partial_success`.
pub async fn crawl_and_query(request: CrawlRequest, base_config: &Config, collaborators: &Collaborators<'_>) -> CrawlResponse {
    let start = Instant::now();

    if request.prompt.trim().is_empty() {
        return empty_response(
            request.prompt,
            Status::Error,
            start.elapsed().as_millis(),
            vec!["invalid input: prompt must not be empty".to_string()],
        );
    }

    let config = effective_config(base_config, &request);
    let state_dir = PathBuf::from(&config.state_dir);

    let persisted = crate::persistence::load(&state_dir);
    let mut store: ContentStore = persisted.store;
    let mut visited: HashSet<String> = persisted.visited;
    let mut harvest = HarvestMeter::new();
    let mut errors: Vec<(&'static str, String)> = Vec::new();

    let phrases = collaborators.enricher.expand(&request.prompt, ENRICHER_N_KEYWORDS).await;
    let phrases = if phrases.is_empty() {
        vec![request.prompt.clone()]
    } else {
        phrases
    };
    let prompt_ctx = PromptContext::build(&request.prompt, &phrases);

    let mut from_cache = false;
    let mut ranked: Vec<RankedResult> = Vec::new();
    let mut seed_urls_used = 0usize;

    if !config.force_crawl {
        let cache_candidate = ranking::query(
            &store,
            &prompt_ctx.query_text,
            config.num_results,
            config.heuristic_score_weight,
            config.cosine_similarity_score_weight,
        );
        let satisfied = cache_candidate.len() >= config.num_results
            && cache_candidate.iter().all(|r| r.weighted_score >= config.base_relevance_threshold);
        if satisfied {
            // §9 Open Question: cache-relevant bucket uses base_relevance_threshold,
            // never the depth-adjusted one, even though nothing here has a depth.
            let relevant = cache_candidate
                .iter()
                .filter(|r| r.weighted_score >= config.base_relevance_threshold)
                .count();
            harvest.record_cache_hit(cache_candidate.len(), relevant);
            from_cache = true;
            ranked = cache_candidate;
        }
    }

    if !from_cache {
        let deps = SchedulerDeps {
            fetcher: collaborators.fetcher,
            extractor: collaborators.extractor,
            seed_provider: collaborators.seed_provider,
        };
        match scheduler::run(&prompt_ctx, &request.urls, &config, &mut store, &mut visited, &mut harvest, &deps, &state_dir).await {
            Ok(outcome) => {
                seed_urls_used = outcome.seed_urls_used;
                if !outcome.any_work {
                    from_cache = true;
                }
            }
            Err(e) => {
                // Seed sourcing is part of the crawl phase (§7 "Crawl phase
                // failure") — tag every scheduler failure as `crawl`, not the
                // finer-grained `CoreError::phase()` label.
                errors.push(("crawl", e.to_string()));
            }
        }

        // Emergency re-query even on crawl-phase failure: whatever the store
        // already holds (from this run or a prior one) is never discarded.
        ranked = ranking::query(
            &store,
            &prompt_ctx.query_text,
            config.num_results,
            config.heuristic_score_weight,
            config.cosine_similarity_score_weight,
        );
    }

    let results = ranked_documents(&store, &ranked);

    let use_llm = request.use_llm.unwrap_or(false);
    let mut llm_response = "N/A".to_string();
    if use_llm && !results.is_empty() {
        if let Some(synth) = collaborators.synthesizer {
            let scored: Vec<ScoredDocument> = results
                .iter()
                .zip(&ranked)
                .map(|(doc, scores)| ScoredDocument {
                    document: &doc.document,
                    scores,
                })
                .collect();
            match synth.generate(&request.prompt, &scored).await {
                Ok(text) => llm_response = text,
                Err(e) => {
                    llm_response = format!("synthesis error: {e}");
                    errors.push(("synthesis", e.to_string()));
                }
            }
        }
    }

    let mut generative_ai_scoring_metrics = None;
    if !results.is_empty() {
        if let Some(judge) = collaborators.judge {
            let scored: Vec<ScoredDocument> = results
                .iter()
                .zip(&ranked)
                .map(|(doc, scores)| ScoredDocument {
                    document: &doc.document,
                    scores,
                })
                .collect();
            let answer = (llm_response != "N/A").then_some(llm_response.as_str());
            match judge.evaluate(&request.prompt, &scored, answer).await {
                Ok(eval) => generative_ai_scoring_metrics = Some(eval),
                Err(e) => errors.push(("evaluation", e.to_string())),
            }
        }
    }

    let elapsed_ms = start.elapsed().as_millis();

    let status = if errors.is_empty() { Status::Success } else { Status::PartialSuccess };
    let phase_errors: BTreeMap<String, String> = errors
        .iter()
        .map(|(phase, msg)| (format!("{phase}_error"), msg.clone()))
        .collect();
    let error_list: Vec<String> = errors.into_iter().map(|(phase, msg)| format!("{phase}: {msg}")).collect();

    CrawlResponse {
        status,
        prompt: request.prompt,
        results,
        metadata: Metadata {
            urls: UrlMetadata {
                visited_total: visited.len(),
                seed_urls_used,
            },
            content_collected_total: store.len(),
            from_cache,
            phase_errors,
        },
        llm_response,
        evaluation_metrics: EvaluationMetrics {
            time_metrics: TimeMetrics { total_duration_ms: elapsed_ms },
            harvest_metrics: harvest_metrics_from(&harvest),
            generative_ai_scoring_metrics,
        },
        error: error_list,
    }
}
