//! Weighted heuristic relevance scorer (title match, body density, freshness,
//! length), run once per page at ingestion.

use chrono::{DateTime, Utc};

/// Extracted page fields the scorer needs, decoupled from [`crate::document::Document`]
/// so it can run before a document is fully assembled.
pub struct Scorable<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub word_count: usize,
    pub publish_date: Option<DateTime<Utc>>,
}

/// `score in [0,1]`. Returns 0 if `keywords` is empty.
pub fn score(page: &Scorable, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let title_lower = page.title.to_lowercase();
    let body_lower = page.body.to_lowercase();
    let n = keywords.len() as f64;

    let title_matches = keywords.iter().filter(|k| title_lower.contains(k.as_str())).count() as f64;
    let title_score = title_matches / n;

    let body_matches = keywords.iter().filter(|k| body_lower.contains(k.as_str())).count() as f64;
    let density = (body_matches / (page.word_count as f64 + 1e-6)) / n;
    let body_score = (1000.0 * density).sqrt().min(1.0);

    let freshness = page
        .publish_date
        .map(|d| {
            let days_old = (Utc::now() - d).num_days();
            if days_old < 0 {
                0.0
            } else if days_old < 30 {
                0.15
            } else if days_old < 180 {
                0.10
            } else if days_old < 365 {
                0.05
            } else {
                0.0
            }
        })
        .unwrap_or(0.0);

    let length_bonus = if page.word_count > 1500 {
        0.15
    } else if page.word_count > 750 {
        0.10
    } else if page.word_count > 300 {
        0.05
    } else {
        0.0
    };

    let mut total = title_score * 0.30 + body_score * 0.40 + freshness + length_bonus;
    if page.title.len() < 10 {
        total *= 0.9;
    }
    total.clamp(0.0, 1.0)
}
