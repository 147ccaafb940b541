//! Process-wide compression counters

use crate::MetricsSnapshot;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for request volume and CCR activity
///
/// One instance is created at startup and shared by handle; all updates are
/// lock-free atomic increments.
#[derive(Debug)]
pub struct Metrics {
    requests_total: AtomicU64,
    compressions_applied: AtomicU64,
    compressions_skipped: AtomicU64,
    errors: AtomicU64,
    ccr_stores: AtomicU64,
    ccr_retrievals: AtomicU64,
    total_tokens_before: AtomicU64,
    total_tokens_after: AtomicU64,
    start_time: DateTime<Utc>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    pub fn started_at(start_time: DateTime<Utc>) -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            compressions_applied: AtomicU64::new(0),
            compressions_skipped: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            ccr_stores: AtomicU64::new(0),
            ccr_retrievals: AtomicU64::new(0),
            total_tokens_before: AtomicU64::new(0),
            total_tokens_after: AtomicU64::new(0),
            start_time,
        }
    }

    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_applied(&self) {
        self.compressions_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.compressions_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ccr_store(&self) {
        self.ccr_stores.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ccr_retrieval(&self) {
        self.ccr_retrievals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_tokens_before(&self, tokens: usize) {
        self.total_tokens_before
            .fetch_add(tokens as u64, Ordering::Relaxed);
    }

    pub fn add_tokens_after(&self, tokens: usize) {
        self.total_tokens_after
            .fetch_add(tokens as u64, Ordering::Relaxed);
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// `total_tokens_after / total_tokens_before`, or 1.0 before any traffic
    pub fn average_compression_ratio(&self) -> f64 {
        let before = self.total_tokens_before.load(Ordering::Relaxed);
        let after = self.total_tokens_after.load(Ordering::Relaxed);
        if before == 0 {
            return 1.0;
        }
        (after as f64 / before as f64 * 1000.0).round() / 1000.0
    }

    pub fn uptime_seconds(&self, now: DateTime<Utc>) -> f64 {
        (now - self.start_time).num_milliseconds() as f64 / 1000.0
    }

    /// Point-in-time copy of every counter plus derived values
    pub fn snapshot(&self, ccr_entries: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            compressions_applied: self.compressions_applied.load(Ordering::Relaxed),
            compressions_skipped: self.compressions_skipped.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            ccr_stores: self.ccr_stores.load(Ordering::Relaxed),
            ccr_retrievals: self.ccr_retrievals.load(Ordering::Relaxed),
            total_tokens_before: self.total_tokens_before.load(Ordering::Relaxed),
            total_tokens_after: self.total_tokens_after.load(Ordering::Relaxed),
            start_time: self.start_time,
            average_compression_ratio: self.average_compression_ratio(),
            ccr_entries,
            uptime_seconds: self.uptime_seconds(Utc::now()),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    #[test]
    fn test_ratio_defaults_to_one() {
        let metrics = Metrics::new();
        assert_eq!(metrics.average_compression_ratio(), 1.0);
    }

    #[test]
    fn test_ratio_rounds_to_three_places() {
        let metrics = Metrics::new();
        metrics.add_tokens_before(3000);
        metrics.add_tokens_after(1000);
        assert_eq!(metrics.average_compression_ratio(), 0.333);
    }

    #[test]
    fn test_uptime() {
        let start = Utc::now();
        let metrics = Metrics::started_at(start);
        let uptime = metrics.uptime_seconds(start + Duration::seconds(90));
        assert!((uptime - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = Metrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_applied();
        metrics.record_skipped();
        metrics.record_ccr_store();
        metrics.record_error();

        let snap = metrics.snapshot(4);
        assert_eq!(snap.requests_total, 2);
        assert_eq!(snap.compressions_applied, 1);
        assert_eq!(snap.compressions_skipped, 1);
        assert_eq!(snap.ccr_stores, 1);
        assert_eq!(snap.ccr_retrievals, 0);
        assert_eq!(snap.errors, 1);
        assert_eq!(snap.ccr_entries, 4);
    }

    #[test]
    fn test_concurrent_increments() {
        let metrics = Arc::new(Metrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        m.record_request();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(metrics.snapshot(0).requests_total, 8000);
    }
}
