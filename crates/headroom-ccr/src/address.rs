//! Content addressing: canonical serialization and digest

use headroom_telemetry::{to_ascii_json, to_spaced_json};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Length of an address in hex characters
pub const ADDRESS_LEN: usize = 12;

/// Rebuild `value` with every object's keys in sorted order
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Key-sorted, spaced, ASCII-escaped JSON text of a payload
pub fn canonical_json(value: &Value) -> serde_json::Result<String> {
    to_ascii_json(&canonicalize(value))
}

/// Text that queries are matched against; non-ASCII stays readable so
/// queries in any script can match
pub fn searchable_text(value: &Value) -> serde_json::Result<String> {
    to_spaced_json(value)
}

/// First 12 hex digits of the SHA-256 of the canonical serialization
pub fn content_address(value: &Value) -> serde_json::Result<String> {
    let text = canonical_json(value)?;
    let digest = Sha256::digest(text.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(ADDRESS_LEN);
    Ok(hex)
}
