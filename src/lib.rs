//! Adaptive, query-driven web crawler core.
//!
//! [`orchestrator::crawl_and_query`] is the single entry point: it builds a
//! prompt context, tries the local content store as a cache, and otherwise
//! drives [`scheduler::run`]'s depth-bounded, batched crawl before
//! re-ranking the store with [`ranking::query`]. See `SPEC_FULL.md` for the
//! full module map.

pub mod collaborators;
pub mod config;
pub mod document;
pub mod error;
pub mod harvest;
pub mod heuristic;
pub mod keywords;
pub mod orchestrator;
pub mod persistence;
pub mod pipeline;
pub mod ranking;
pub mod scheduler;
pub mod types;
pub mod url_utils;

pub use collaborators::{AnswerSynthesizer, Extractor, Fetcher, Judge, QueryEnricher, SeedProvider};
pub use config::Config;
pub use document::{ContentStore, Document};
pub use error::CoreError;
pub use orchestrator::{crawl_and_query, Collaborators, CrawlRequest};
pub use types::CrawlResponse;
