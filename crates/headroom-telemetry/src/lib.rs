//! Telemetry types and utilities for tracking compression performance

mod io;
mod json;
mod metrics;
mod paths;
mod tokens;
mod types;

pub use io::{atomic_write, read_json};
pub use json::{to_ascii_json, to_spaced_json, SpacedFormatter};
pub use metrics::Metrics;
pub use paths::Paths;
pub use tokens::{estimate_tokens, estimate_value_tokens};
pub use types::MetricsSnapshot;
