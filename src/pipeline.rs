//! Per-URL pipeline: fetch -> extract -> heuristic-score -> candidate
//! document, emitting outbound links regardless of the score decision.
//!
//! Side-effect free by design: the scheduler owns the visited set, content
//! store, and harvest meter, and merges each worker's return value after the
//! batch barrier (§5 concurrency model).

use std::collections::HashSet;
use std::time::Duration;

use url::Url;

use crate::collaborators::{Extractor, Fetcher};
use crate::document::Document;
use crate::heuristic::{self, Scorable};
use crate::url_utils;

/// What a worker reports back to the scheduler for one dispatched URL.
pub enum ProcessOutcome {
    /// Transport/non-HTML error, redirect to an already-visited URL, or a
    /// body under the 30-word floor. No harvest record, no links.
    Skipped,
    /// Extraction succeeded and the page cleared the word-count floor.
    Scored {
        page_score: f64,
        outbound_links: Vec<String>,
        /// `Some` only when `page_score >= content_threshold` — the
        /// scheduler still needs to run content-hash dedup via
        /// [`crate::document::ContentStore::admit`].
        candidate: Option<Document>,
    },
}

/// `process(url, keywords, depth, content_threshold)`. `visited_snapshot` is
/// the visited set as observed at the start of the owning batch — workers
/// never see mutations made mid-batch by sibling workers.
pub async fn process(
    url: &str,
    keywords: &[String],
    content_threshold: f64,
    visited_snapshot: &HashSet<String>,
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
    fetch_timeout: Duration,
) -> ProcessOutcome {
    let Some(fetched) = fetcher.get(url, fetch_timeout).await else {
        return ProcessOutcome::Skipped;
    };

    // `url` and `visited_snapshot` are already canonical (the scheduler builds
    // the frontier and visited set from `url_utils::filter_batch`); canonicalize
    // the redirect target the same way so the comparison is apples-to-apples.
    let final_canonical = url_utils::canonicalize(&fetched.final_url);
    if final_canonical != url && visited_snapshot.contains(&final_canonical) {
        return ProcessOutcome::Skipped;
    }

    let Some(extracted) = extractor.parse(&fetched.body, &fetched.final_url) else {
        return ProcessOutcome::Skipped;
    };
    if extracted.word_count < 30 {
        return ProcessOutcome::Skipped;
    }

    let page_score = heuristic::score(
        &Scorable {
            title: &extracted.title,
            body: &extracted.body,
            word_count: extracted.word_count,
            publish_date: extracted.publish_date,
        },
        keywords,
    );

    let domain = Url::parse(&final_canonical)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();

    let candidate = (page_score >= content_threshold).then(|| Document {
        url: final_canonical.clone(),
        domain,
        title: extracted.title.clone(),
        body: extracted.body.clone(),
        word_count: extracted.word_count,
        publish_date: extracted.publish_date,
        heuristic_score: page_score,
        outbound_links: extracted.outbound_links.clone(),
        content_hash: String::new(),
    });

    ProcessOutcome::Scored {
        page_score,
        outbound_links: extracted.outbound_links,
        candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{ExtractedPage, FetchedPage};
    use async_trait::async_trait;

    struct StubFetcher {
        page: Option<FetchedPage>,
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn get(&self, _url: &str, _timeout: Duration) -> Option<FetchedPage> {
            self.page.as_ref().map(|p| FetchedPage {
                body: p.body.clone(),
                final_url: p.final_url.clone(),
            })
        }
    }

    struct StubExtractor {
        page: Option<(String, usize)>,
    }

    impl Extractor for StubExtractor {
        fn parse(&self, _html: &str, _url: &str) -> Option<ExtractedPage> {
            self.page.as_ref().map(|(body, word_count)| ExtractedPage {
                title: "Stub Title".to_string(),
                body: body.clone(),
                publish_date: None,
                outbound_links: vec!["https://example.com/next".to_string()],
                word_count: *word_count,
            })
        }
    }

    #[tokio::test]
    async fn transport_failure_is_skipped() {
        let fetcher = StubFetcher { page: None };
        let extractor = StubExtractor { page: None };
        let outcome = process(
            "https://example.com/a",
            &["rust".to_string()],
            0.3,
            &HashSet::new(),
            &fetcher,
            &extractor,
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(outcome, ProcessOutcome::Skipped));
    }

    #[tokio::test]
    async fn redirect_to_visited_url_is_skipped() {
        let fetcher = StubFetcher {
            page: Some(FetchedPage {
                body: "<html></html>".to_string(),
                final_url: "https://example.com/already-visited".to_string(),
            }),
        };
        let extractor = StubExtractor { page: None };
        let mut visited = HashSet::new();
        visited.insert("https://example.com/already-visited".to_string());
        let outcome = process(
            "https://example.com/a",
            &["rust".to_string()],
            0.3,
            &visited,
            &fetcher,
            &extractor,
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(outcome, ProcessOutcome::Skipped));
    }

    #[tokio::test]
    async fn sparse_body_is_skipped() {
        let fetcher = StubFetcher {
            page: Some(FetchedPage {
                body: "<html></html>".to_string(),
                final_url: "https://example.com/a".to_string(),
            }),
        };
        let extractor = StubExtractor {
            page: Some(("too short".to_string(), 10)),
        };
        let outcome = process(
            "https://example.com/a",
            &["rust".to_string()],
            0.3,
            &HashSet::new(),
            &fetcher,
            &extractor,
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(outcome, ProcessOutcome::Skipped));
    }

    #[tokio::test]
    async fn below_threshold_page_still_returns_links() {
        let fetcher = StubFetcher {
            page: Some(FetchedPage {
                body: "<html></html>".to_string(),
                final_url: "https://example.com/a".to_string(),
            }),
        };
        let extractor = StubExtractor {
            page: Some(("off topic content ".repeat(20), 40)),
        };
        let outcome = process(
            "https://example.com/a",
            &["rust".to_string(), "crawler".to_string()],
            0.9,
            &HashSet::new(),
            &fetcher,
            &extractor,
            Duration::from_secs(5),
        )
        .await;
        match outcome {
            ProcessOutcome::Scored { candidate, outbound_links, .. } => {
                assert!(candidate.is_none());
                assert!(!outbound_links.is_empty());
            }
            ProcessOutcome::Skipped => panic!("expected Scored outcome"),
        }
    }

    #[tokio::test]
    async fn above_threshold_page_yields_candidate() {
        let fetcher = StubFetcher {
            page: Some(FetchedPage {
                body: "<html></html>".to_string(),
                final_url: "https://example.com/a".to_string(),
            }),
        };
        let extractor = StubExtractor {
            page: Some(("rust crawler rust crawler ".repeat(50), 300)),
        };
        let outcome = process(
            "https://example.com/a",
            &["rust".to_string(), "crawler".to_string()],
            0.01,
            &HashSet::new(),
            &fetcher,
            &extractor,
            Duration::from_secs(5),
        )
        .await;
        match outcome {
            ProcessOutcome::Scored { candidate, .. } => assert!(candidate.is_some()),
            ProcessOutcome::Skipped => panic!("expected Scored outcome"),
        }
    }
}
