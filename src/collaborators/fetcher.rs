//! Default [`Fetcher`]: a `reqwest` client with a small `moka` response
//! cache keyed by URL.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use super::{FetchedPage, Fetcher};

pub struct HttpFetcher {
    client: reqwest::Client,
    cache: Cache<String, FetchedPageCached>,
}

#[derive(Clone)]
struct FetchedPageCached {
    body: String,
    final_url: String,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client builds with static config");
        Self {
            client,
            cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(60 * 30))
                .build(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Option<FetchedPage> {
        if let Some(cached) = self.cache.get(url).await {
            return Some(FetchedPage {
                body: cached.body,
                final_url: cached.final_url,
            });
        }

        let response = tokio::time::timeout(timeout, self.client.get(url).send())
            .await
            .ok()?
            .ok()?;

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html") || ct.contains("application/xhtml"));
        if !is_html {
            return None;
        }

        let final_url = response.url().to_string();
        let body = tokio::time::timeout(timeout, response.text()).await.ok()?.ok()?;

        self.cache
            .insert(
                url.to_string(),
                FetchedPageCached {
                    body: body.clone(),
                    final_url: final_url.clone(),
                },
            )
            .await;

        Some(FetchedPage { body, final_url })
    }
}
