//! Default [`QueryEnricher`]: no LLM. Treats the raw prompt as a single
//! degenerate phrase, per §4.1's "or the raw prompt" fallback.

use async_trait::async_trait;

use super::QueryEnricher;

#[derive(Default)]
pub struct IdentityEnricher;

impl IdentityEnricher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryEnricher for IdentityEnricher {
    async fn expand(&self, prompt: &str, _n_keywords: usize) -> Vec<String> {
        if prompt.trim().is_empty() {
            Vec::new()
        } else {
            vec![prompt.to_string()]
        }
    }
}
