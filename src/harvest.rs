//! Per-depth and cache harvest-ratio telemetry.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct Bucket {
    pub processed: usize,
    pub relevant: usize,
}

impl Bucket {
    pub fn ratio(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.relevant as f64 / self.processed as f64
        }
    }
}

/// `depth -> {processed, relevant}` plus a separate `cache` bucket.
#[derive(Debug, Default)]
pub struct HarvestMeter {
    by_depth: BTreeMap<usize, Bucket>,
    cache: Bucket,
}

impl HarvestMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one `process` completion at `depth`: always increments
    /// `processed`, increments `relevant` iff `page_score >= threshold`.
    pub fn record(&mut self, depth: usize, page_score: f64, threshold: f64) {
        let bucket = self.by_depth.entry(depth).or_default();
        bucket.processed += 1;
        if page_score >= threshold {
            bucket.relevant += 1;
        }
    }

    /// Record a cache hit: `total` results retrieved, `relevant` of them at
    /// or above `base_relevance_threshold` (never the depth-adjusted one).
    pub fn record_cache_hit(&mut self, total: usize, relevant: usize) {
        self.cache.processed += total;
        self.cache.relevant += relevant;
    }

    pub fn depth_bucket(&self, depth: usize) -> Bucket {
        self.by_depth.get(&depth).copied().unwrap_or_default()
    }

    pub fn depth_ratio(&self, depth: usize) -> f64 {
        self.depth_bucket(depth).ratio()
    }

    pub fn cache_bucket(&self) -> Bucket {
        self.cache
    }

    pub fn cache_ratio(&self) -> f64 {
        self.cache.ratio()
    }

    /// Sum across all depths (excludes the cache bucket).
    pub fn cumulative_bucket(&self) -> Bucket {
        self.by_depth.values().fold(Bucket::default(), |mut acc, b| {
            acc.processed += b.processed;
            acc.relevant += b.relevant;
            acc
        })
    }

    pub fn cumulative_ratio(&self) -> f64 {
        self.cumulative_bucket().ratio()
    }

    /// Depths + cache combined.
    pub fn overall_ratio(&self) -> f64 {
        let cum = self.cumulative_bucket();
        let processed = cum.processed + self.cache.processed;
        let relevant = cum.relevant + self.cache.relevant;
        if processed == 0 {
            0.0
        } else {
            relevant as f64 / processed as f64
        }
    }

    pub fn by_depth(&self) -> &BTreeMap<usize, Bucket> {
        &self.by_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_processed_and_relevant() {
        let mut meter = HarvestMeter::new();
        meter.record(0, 0.5, 0.4);
        meter.record(0, 0.2, 0.4);
        let b = meter.depth_bucket(0);
        assert_eq!(b.processed, 2);
        assert_eq!(b.relevant, 1);
        assert!((meter.depth_ratio(0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn unrecorded_depth_has_zero_ratio() {
        let meter = HarvestMeter::new();
        assert_eq!(meter.depth_ratio(5), 0.0);
    }

    #[test]
    fn cache_hit_tracked_separately_from_depths() {
        let mut meter = HarvestMeter::new();
        meter.record(0, 0.9, 0.4);
        meter.record_cache_hit(3, 3);
        assert_eq!(meter.cache_bucket().processed, 3);
        assert!((meter.cache_ratio() - 1.0).abs() < 1e-9);
        assert_eq!(meter.cumulative_bucket().processed, 1);
    }

    #[test]
    fn overall_ratio_combines_depths_and_cache() {
        let mut meter = HarvestMeter::new();
        meter.record(0, 0.9, 0.4);
        meter.record(0, 0.1, 0.4);
        meter.record_cache_hit(2, 1);
        // 1 relevant depth + 1 relevant cache over 2 depth + 2 cache = 2/4
        assert!((meter.overall_ratio() - 0.5).abs() < 1e-9);
    }
}
