//! Configuration surface for a crawl-and-query request: an optional JSON
//! file, falling back field-by-field to environment variables, falling
//! back to literal defaults.
//!
//! No module-level config reads happen outside [`Config::load`] — every
//! other component receives a fully-resolved `Config` value at construction.

use serde::{Deserialize, Serialize};

/// Immutable configuration for a crawl-and-query request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub num_results: usize,
    pub max_depth: usize,
    pub num_seed_urls: usize,
    pub force_crawl: bool,
    pub base_relevance_threshold: f64,
    pub minimum_relevance_threshold: f64,
    pub depth_relevance_step: f64,
    pub max_parallel_requests: usize,
    pub batch_size: usize,
    pub save_frequency: usize,
    pub heuristic_score_weight: f64,
    pub cosine_similarity_score_weight: f64,
    /// Minimum number of prompt keywords that must appear in a URL's decoded
    /// path+query for the URL filter to admit it.
    pub min_keyword_matches: usize,
    /// Fetch timeout per URL, in seconds.
    pub fetch_timeout_secs: u64,
    /// Directory holding the persisted visited/hash/content-store state.
    pub state_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_results: 3,
            max_depth: 3,
            num_seed_urls: 5,
            force_crawl: false,
            base_relevance_threshold: 0.4,
            minimum_relevance_threshold: 0.15,
            depth_relevance_step: 0.05,
            max_parallel_requests: 8,
            batch_size: 20,
            save_frequency: 3,
            heuristic_score_weight: 0.6,
            cosine_similarity_score_weight: 0.4,
            min_keyword_matches: 1,
            fetch_timeout_secs: 10,
            state_dir: default_state_dir(),
        }
    }
}

fn default_state_dir() -> String {
    dirs::home_dir()
        .map(|h| h.join(".crawl-core").join("state"))
        .unwrap_or_else(|| std::path::PathBuf::from("./crawl-core-state"))
        .to_string_lossy()
        .to_string()
}

impl Config {
    /// Depth-adaptive relevance threshold: `max(min_relevance, base - depth*step)`.
    pub fn depth_threshold(&self, depth: usize) -> f64 {
        (self.base_relevance_threshold - depth as f64 * self.depth_relevance_step)
            .max(self.minimum_relevance_threshold)
    }

    /// Load from `crawl-core.json` (cwd, then parent dir, then `CRAWL_CORE_CONFIG`
    /// env var path), env-var overrides per field, falling back to defaults.
    /// Missing file or parse error both yield field-by-field env/default
    /// resolution — never a hard failure.
    pub fn load() -> Self {
        let candidates = [
            std::path::PathBuf::from("crawl-core.json"),
            std::path::PathBuf::from("../crawl-core.json"),
        ];

        let mut file_cfg: Option<PartialConfig> = None;
        if let Ok(env_path) = std::env::var("CRAWL_CORE_CONFIG") {
            file_cfg = read_partial(&std::path::PathBuf::from(env_path));
        }
        if file_cfg.is_none() {
            for path in &candidates {
                if let Some(c) = read_partial(path) {
                    file_cfg = Some(c);
                    break;
                }
            }
        }

        let base = Config::default();
        let file_cfg = file_cfg.unwrap_or_default();
        Config {
            num_results: file_cfg.num_results.or(env_usize("CRAWL_NUM_RESULTS")).unwrap_or(base.num_results),
            max_depth: file_cfg.max_depth.or(env_usize("CRAWL_MAX_DEPTH")).unwrap_or(base.max_depth),
            num_seed_urls: file_cfg
                .num_seed_urls
                .or(env_usize("CRAWL_NUM_SEED_URLS"))
                .unwrap_or(base.num_seed_urls),
            force_crawl: file_cfg.force_crawl.or(env_bool("CRAWL_FORCE_CRAWL")).unwrap_or(base.force_crawl),
            base_relevance_threshold: file_cfg
                .base_relevance_threshold
                .or(env_f64("CRAWL_BASE_RELEVANCE_THRESHOLD"))
                .unwrap_or(base.base_relevance_threshold),
            minimum_relevance_threshold: file_cfg
                .minimum_relevance_threshold
                .or(env_f64("CRAWL_MIN_RELEVANCE_THRESHOLD"))
                .unwrap_or(base.minimum_relevance_threshold),
            depth_relevance_step: file_cfg
                .depth_relevance_step
                .or(env_f64("CRAWL_DEPTH_RELEVANCE_STEP"))
                .unwrap_or(base.depth_relevance_step),
            max_parallel_requests: file_cfg
                .max_parallel_requests
                .or(env_usize("CRAWL_MAX_PARALLEL_REQUESTS"))
                .unwrap_or(base.max_parallel_requests),
            batch_size: file_cfg.batch_size.or(env_usize("CRAWL_BATCH_SIZE")).unwrap_or(base.batch_size),
            save_frequency: file_cfg
                .save_frequency
                .or(env_usize("CRAWL_SAVE_FREQUENCY"))
                .unwrap_or(base.save_frequency),
            heuristic_score_weight: file_cfg
                .heuristic_score_weight
                .or(env_f64("CRAWL_HEURISTIC_WEIGHT"))
                .unwrap_or(base.heuristic_score_weight),
            cosine_similarity_score_weight: file_cfg
                .cosine_similarity_score_weight
                .or(env_f64("CRAWL_COSINE_WEIGHT"))
                .unwrap_or(base.cosine_similarity_score_weight),
            min_keyword_matches: file_cfg
                .min_keyword_matches
                .or(env_usize("CRAWL_MIN_KEYWORD_MATCHES"))
                .unwrap_or(base.min_keyword_matches),
            fetch_timeout_secs: file_cfg
                .fetch_timeout_secs
                .or(env_u64("CRAWL_FETCH_TIMEOUT_SECS"))
                .unwrap_or(base.fetch_timeout_secs),
            state_dir: file_cfg
                .state_dir
                .or_else(|| std::env::var("CRAWL_STATE_DIR").ok())
                .unwrap_or(base.state_dir),
        }
    }
}

/// Mirrors `Config` but every field is optional — this is what a partial
/// `crawl-core.json` deserializes into (unset keys simply fall through).
#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    num_results: Option<usize>,
    max_depth: Option<usize>,
    num_seed_urls: Option<usize>,
    force_crawl: Option<bool>,
    base_relevance_threshold: Option<f64>,
    minimum_relevance_threshold: Option<f64>,
    depth_relevance_step: Option<f64>,
    max_parallel_requests: Option<usize>,
    batch_size: Option<usize>,
    save_frequency: Option<usize>,
    heuristic_score_weight: Option<f64>,
    cosine_similarity_score_weight: Option<f64>,
    min_keyword_matches: Option<usize>,
    fetch_timeout_secs: Option<u64>,
    state_dir: Option<String>,
}

fn read_partial(path: &std::path::Path) -> Option<PartialConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(cfg) => {
            tracing::info!("crawl-core config loaded from {}", path.display());
            Some(cfg)
        }
        Err(e) => {
            tracing::warn!(
                "crawl-core config parse error at {}: {} — falling back to env/defaults",
                path.display(),
                e
            );
            None
        }
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = Config::default();
        assert_eq!(c.num_results, 3);
        assert_eq!(c.max_depth, 3);
        assert_eq!(c.num_seed_urls, 5);
        assert!(!c.force_crawl);
        assert_eq!(c.base_relevance_threshold, 0.4);
        assert_eq!(c.minimum_relevance_threshold, 0.15);
        assert_eq!(c.depth_relevance_step, 0.05);
        assert_eq!(c.max_parallel_requests, 8);
        assert_eq!(c.batch_size, 20);
        assert_eq!(c.save_frequency, 3);
        assert_eq!(c.heuristic_score_weight, 0.6);
        assert_eq!(c.cosine_similarity_score_weight, 0.4);
        assert_eq!(c.min_keyword_matches, 1);
    }

    #[test]
    fn depth_threshold_floors_at_minimum() {
        let c = Config::default();
        assert!((c.depth_threshold(0) - 0.4).abs() < 1e-9);
        assert!((c.depth_threshold(1) - 0.35).abs() < 1e-9);
        // Way past base: floors at minimum_relevance_threshold, never below.
        assert_eq!(c.depth_threshold(100), c.minimum_relevance_threshold);
    }
}
