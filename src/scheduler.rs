//! Crawl scheduler (C10): seed sourcing, depth-bounded BFS, batched parallel
//! dispatch, per-batch early-stop, depth-adaptive threshold.
//!
//! The scheduler is the only thread of control that mutates the visited
//! set, content store, and harvest meter — workers return values and this
//! function merges them after each batch barrier (§5).

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::collaborators::{Extractor, Fetcher, SeedProvider};
use crate::config::Config;
use crate::document::ContentStore;
use crate::error::CoreError;
use crate::harvest::HarvestMeter;
use crate::keywords::PromptContext;
use crate::pipeline::{self, ProcessOutcome};
use crate::{persistence, ranking, url_utils};

pub struct SchedulerDeps<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub extractor: &'a dyn Extractor,
    pub seed_provider: &'a dyn SeedProvider,
}

/// What the scheduler accomplished, reported back to the orchestrator.
pub struct SchedulerOutcome {
    /// `false` means the caller should downgrade the response to
    /// `from_cache=true` — the scheduler never dispatched a single URL.
    pub any_work: bool,
    /// Seed URLs that survived filtering and became the depth-0 frontier.
    pub seed_urls_used: usize,
}

/// Runs the depth loop. A [`CoreError::Seed`] means seed sourcing itself
/// failed (not merely "found nothing") and is surfaced as a crawl-phase
/// error by the orchestrator.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    prompt: &PromptContext,
    user_urls: &[String],
    config: &Config,
    store: &mut ContentStore,
    visited: &mut HashSet<String>,
    harvest: &mut HarvestMeter,
    deps: &SchedulerDeps<'_>,
    state_dir: &Path,
) -> Result<SchedulerOutcome, CoreError> {
    let seeds = source_seeds(user_urls, prompt, config, deps.seed_provider).await?;
    let filtered_seeds = url_utils::filter_batch(&seeds, &prompt.keywords, config.min_keyword_matches);
    if filtered_seeds.is_empty() {
        tracing::info!("scheduler: no seeds survived filtering, nothing to crawl");
        return Ok(SchedulerOutcome {
            any_work: false,
            seed_urls_used: 0,
        });
    }
    let seed_urls_used = filtered_seeds.len();

    let mut frontier = filtered_seeds;
    let mut global_seen: HashSet<String> = frontier.iter().cloned().collect();
    global_seen.extend(visited.iter().cloned());

    let mut any_work = false;

    for depth in 0..=config.max_depth {
        if frontier.is_empty() {
            break;
        }
        let threshold = config.depth_threshold(depth);
        let pending: Vec<String> = frontier.iter().filter(|u| !visited.contains(*u)).cloned().collect();

        let mut discovered: HashSet<String> = HashSet::new();
        let mut early_stop = false;

        for batch in pending.chunks(config.batch_size.max(1)) {
            any_work = true;
            let visited_snapshot = visited.clone();
            let timeout = Duration::from_secs(config.fetch_timeout_secs);

            let results = stream::iter(batch.iter().cloned())
                .map(|url| {
                    let snapshot = &visited_snapshot;
                    let keywords = &prompt.keywords;
                    async move {
                        let outcome =
                            pipeline::process(&url, keywords, threshold, snapshot, deps.fetcher, deps.extractor, timeout)
                                .await;
                        (url, outcome)
                    }
                })
                .buffer_unordered(config.max_parallel_requests.max(1))
                .collect::<Vec<_>>()
                .await;

            for (url, outcome) in results {
                visited.insert(url);
                match outcome {
                    ProcessOutcome::Skipped => {}
                    ProcessOutcome::Scored {
                        page_score,
                        outbound_links,
                        candidate,
                    } => {
                        harvest.record(depth, page_score, threshold);
                        if let Some(doc) = candidate {
                            store.admit(doc);
                        }
                        discovered.extend(outbound_links);
                    }
                }
            }

            let ranked = ranking::query(
                store,
                &prompt.query_text,
                config.num_results,
                config.heuristic_score_weight,
                config.cosine_similarity_score_weight,
            );
            if ranked.len() >= config.num_results && ranked.iter().all(|r| r.weighted_score >= threshold) {
                early_stop = true;
                break;
            }
        }

        tracing::info!(depth, ratio = harvest.depth_ratio(depth), "depth harvest ratio");

        if early_stop {
            break;
        }

        let mut next_frontier: Vec<String> = discovered.into_iter().filter(|u| !global_seen.contains(u)).collect();
        next_frontier = url_utils::filter_batch(&next_frontier, &prompt.keywords, config.min_keyword_matches);
        global_seen.extend(next_frontier.iter().cloned());
        frontier = next_frontier;

        if config.save_frequency > 0 && (depth + 1) % config.save_frequency == 0 {
            persistence::save(state_dir, visited, store);
        }
    }

    persistence::save(state_dir, visited, store);
    Ok(SchedulerOutcome {
        any_work,
        seed_urls_used,
    })
}

/// If the caller supplied URLs: union of those (filtered through [`url_utils::is_valid`])
/// with a fresh search-provider query. Otherwise: the search provider alone.
async fn source_seeds(
    user_urls: &[String],
    prompt: &PromptContext,
    config: &Config,
    seed_provider: &dyn SeedProvider,
) -> Result<Vec<String>, CoreError> {
    let searched = seed_provider
        .search(&prompt.search_phrase, config.num_seed_urls)
        .await
        .map_err(CoreError::Seed)?;

    let candidates: Vec<String> = if user_urls.is_empty() {
        searched
    } else {
        let valid_user = user_urls.iter().filter(|u| url_utils::is_valid(u)).cloned();
        valid_user.chain(searched).collect()
    };

    // Dedup by canonical identity — a SeedProvider may hand back the same
    // destination twice (e.g. duplicate search hits), and a user-supplied URL
    // may coincide with one the search provider also returns.
    let mut seen: HashSet<String> = HashSet::new();
    let mut deduped = Vec::new();
    for u in candidates {
        if seen.insert(url_utils::canonicalize(&u)) {
            deduped.push(u);
        }
    }
    Ok(deduped)
}
