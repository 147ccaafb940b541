//! Token estimation utilities

use crate::json::to_ascii_json;
use serde::Serialize;

/// Approximate characters per BPE token.
const CHARS_PER_TOKEN: usize = 4;

/// Estimate token count from text
///
/// A flat ~4 chars/token heuristic. Counts Unicode scalar values rather
/// than bytes so multi-byte text is not over-counted.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN
}

/// Estimate token count of any serializable value
///
/// Strings are measured as-is; everything else is rendered with
/// [`to_ascii_json`] first, so separators and escapes count toward the total.
pub fn estimate_value_tokens<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<usize> {
    let json = serde_json::to_value(value)?;
    match json {
        serde_json::Value::String(s) => Ok(estimate_tokens(&s)),
        other => Ok(estimate_tokens(&to_ascii_json(&other)?)),
    }
}
