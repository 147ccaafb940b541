//! Telemetry record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Serialized view of the process metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub compressions_applied: u64,
    pub compressions_skipped: u64,
    pub errors: u64,
    pub ccr_stores: u64,
    pub ccr_retrievals: u64,
    pub total_tokens_before: u64,
    pub total_tokens_after: u64,
    pub start_time: DateTime<Utc>,
    pub average_compression_ratio: f64,
    #[serde(default)]
    pub ccr_entries: usize,
    pub uptime_seconds: f64,
}
