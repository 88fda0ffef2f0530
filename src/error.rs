use thiserror::Error;

/// Typed errors for each phase of a crawl-and-query request.
///
/// Most call sites don't match on the variant — they just want a phase label
/// and a message to fold into the orchestrator's error list (see
/// [`crate::orchestrator`]) — but keeping the taxonomy typed documents the
/// contract and lets tests assert on phase.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("seed sourcing failed: {0}")]
    Seed(String),

    #[error("crawl failed: {0}")]
    Crawl(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("synthesis failed: {0}")]
    Synthesis(String),

    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

impl CoreError {
    /// Phase name used as the metadata key / error-list tag (e.g. `"crawl_error"`).
    ///
    /// Note: the orchestrator does not use this for a [`CoreError`] returned
    /// by `scheduler::run` — seed sourcing is part of the crawl phase (§7
    /// "Crawl phase failure"), so every scheduler failure, `Seed` included,
    /// is tagged `crawl` at that call site regardless of what `phase()`
    /// reports here. `phase()` still applies as-is to errors raised and
    /// tagged directly by the orchestrator itself.
    pub fn phase(&self) -> &'static str {
        match self {
            CoreError::InvalidInput(_) => "input",
            CoreError::Seed(_) => "seed",
            CoreError::Crawl(_) => "crawl",
            CoreError::Persistence(_) => "persistence",
            CoreError::Synthesis(_) => "synthesis",
            CoreError::Evaluation(_) => "evaluation",
        }
    }
}
