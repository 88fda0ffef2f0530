//! Default [`SeedProvider`]: scrapes DuckDuckGo's HTML result page.
//!
//! Single-engine, no API key. Bounded by its own timeout so a slow or
//! blocking search page cannot stall seed sourcing.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::SeedProvider;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub struct DuckDuckGoSeedProvider {
    client: reqwest::Client,
}

impl DuckDuckGoSeedProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("reqwest client builds with static config"),
        }
    }
}

impl Default for DuckDuckGoSeedProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// DuckDuckGo's HTML results wrap the real destination behind a `/l/?uddg=`
/// redirect; unwrap it, otherwise accept protocol-relative/absolute hrefs.
fn normalize_href(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let candidate = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else if let Some(rest) = href.strip_prefix('/') {
        format!("https://duckduckgo.com/{rest}")
    } else {
        href.to_string()
    };

    if let Ok(url) = url::Url::parse(&candidate) {
        if matches!(url.host_str(), Some("duckduckgo.com")) && url.path().starts_with("/l/") {
            for (k, v) in url.query_pairs() {
                if k == "uddg" && !v.trim().is_empty() {
                    return Some(v.to_string());
                }
            }
        }
    }

    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        Some(candidate)
    } else {
        None
    }
}

fn parse_result_urls(html: &str, max_results: usize) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(sel_item) = Selector::parse("div.results_links") else {
        return Vec::new();
    };
    let Ok(sel_link) = Selector::parse("a.result__a") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for item in doc.select(&sel_item) {
        if out.len() >= max_results {
            break;
        }
        let Some(link) = item.select(&sel_link).next() else {
            continue;
        };
        let href_raw = link.value().attr("href").unwrap_or("");
        if let Some(href) = normalize_href(href_raw) {
            out.push(href);
        }
    }
    out
}

#[async_trait]
impl SeedProvider for DuckDuckGoSeedProvider {
    async fn search(&self, query: &str, n: usize) -> Result<Vec<String>, String> {
        let Ok(mut url) = reqwest::Url::parse("https://duckduckgo.com/html/") else {
            return Ok(Vec::new());
        };
        url.query_pairs_mut().append_pair("q", query);

        let fetch = async {
            let resp = self.client.get(url).send().await.ok()?;
            resp.text().await.ok()
        };

        match tokio::time::timeout(DEFAULT_TIMEOUT, fetch).await {
            Ok(Some(body)) => Ok(parse_result_urls(&body, n)),
            _ => Ok(Vec::new()),
        }
    }
}
