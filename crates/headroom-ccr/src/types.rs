use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label used when an offloaded payload has no known origin
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Relevance attached to every keyword expansion hint
pub const KEYWORD_RELEVANCE: f64 = 0.8;

/// Maximum expansion hints returned by a keyword scan
pub const MAX_EXPANSIONS: usize = 5;

/// An immutable, content-addressed payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub address: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub source_label: String,
}

/// Result of inserting a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutcome {
    pub address: String,
    /// False when an identical payload was already stored
    pub inserted: bool,
}

/// Content returned by a lookup, optionally filtered by a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retrieval {
    pub content: Value,
    pub items_retrieved: usize,
    pub was_search: bool,
}

/// A stored payload that mentions a keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expansion {
    #[serde(rename = "hash")]
    pub address: String,
    #[serde(rename = "tool_name")]
    pub source_label: String,
    pub relevance: f64,
}
