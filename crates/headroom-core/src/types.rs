//! Conversation and compression wire types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MODEL_LIMIT: u64 = 200_000;

/// Message content: plain text or an ordered list of typed blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<Value>),
    /// Any other JSON shape, carried through untouched
    Other(Value),
}

/// A single conversation message; unknown fields are preserved verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    /// `None` only when the field is absent; an explicit `null` is kept as
    /// `MessageContent::Other(Value::Null)`
    #[serde(
        default,
        deserialize_with = "present_content",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<MessageContent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn present_content<'de, D>(deserializer: D) -> Result<Option<MessageContent>, D::Error>
where
    D: Deserializer<'de>,
{
    MessageContent::deserialize(deserializer).map(Some)
}

impl Message {
    pub fn user(content: MessageContent) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content),
            extra: Map::new(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(MessageContent::Text(text.into())),
            extra: Map::new(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == "user"
    }

    /// Content blocks, when the content is a block list
    pub fn blocks(&self) -> Option<&[Value]> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => Some(blocks),
            _ => None,
        }
    }
}

/// Tool definitions are opaque to the sidecar
pub type ToolDefinition = Value;

/// Inbound compression request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressRequest {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_model_limit")]
    pub model_limit: u64,
    // Accepted for compatibility; the orchestrator does not act on these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_budget: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_recent_turns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ratio: Option<f64>,
}

impl CompressRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: None,
            model: default_model(),
            model_limit: DEFAULT_MODEL_LIMIT,
            mode: None,
            token_budget: None,
            query_context: None,
            preserve_recent_turns: None,
            target_ratio: None,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_model_limit() -> u64 {
    DEFAULT_MODEL_LIMIT
}

/// Per-request compression statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionStats {
    pub tokens_before: usize,
    pub tokens_after: usize,
    pub tokens_saved: i64,
    pub savings_percent: f64,
    pub transforms_applied: Vec<String>,
    pub latency_ms: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CompressionStats {
    pub fn new(tokens_before: usize, tokens_after: usize, transforms_applied: Vec<String>) -> Self {
        Self {
            tokens_before,
            tokens_after,
            tokens_saved: tokens_before as i64 - tokens_after as i64,
            savings_percent: savings_percent(tokens_before, tokens_after),
            transforms_applied,
            latency_ms: 0.0,
            skipped: false,
            reason: None,
        }
    }

    /// Stats for a request that fell below the gate threshold
    pub fn skipped(tokens_before: usize, min_tokens: usize) -> Self {
        Self {
            skipped: true,
            reason: Some(format!(
                "Below threshold ({} < {})",
                tokens_before, min_tokens
            )),
            ..Self::new(tokens_before, tokens_before, Vec::new())
        }
    }

    pub fn with_latency_ms(mut self, latency_ms: f64) -> Self {
        self.latency_ms = (latency_ms * 10.0).round() / 10.0;
        self
    }
}

/// `round(100 * (1 - after/before), 1)`, or 0 for an empty input
pub fn savings_percent(tokens_before: usize, tokens_after: usize) -> f64 {
    if tokens_before == 0 {
        return 0.0;
    }
    let pct = (1.0 - tokens_after as f64 / tokens_before as f64) * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Outbound compression response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressResponse {
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolDefinition>>,
    pub compressed: bool,
    pub stats: CompressionStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_preserves_unknown_fields() {
        let raw = json!({"role": "user", "content": "hi", "name": "alice", "cache_control": {"type": "ephemeral"}});
        let msg: Message = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(msg.extra.get("name"), Some(&json!("alice")));
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }

    #[test]
    fn test_null_and_missing_content_pass_through() {
        let with_null = json!({"role": "assistant", "content": null, "tool_calls": []});
        let msg: Message = serde_json::from_value(with_null.clone()).unwrap();
        assert_eq!(serde_json::to_value(&msg).unwrap(), with_null);

        let without = json!({"role": "assistant", "tool_calls": []});
        let msg: Message = serde_json::from_value(without.clone()).unwrap();
        assert_eq!(serde_json::to_value(&msg).unwrap(), without);
    }

    #[test]
    fn test_message_content_shapes() {
        let text: Message = serde_json::from_value(json!({"role": "user", "content": "plain"})).unwrap();
        assert_eq!(text.content, Some(MessageContent::Text("plain".to_string())));

        let blocks: Message = serde_json::from_value(json!({
            "role": "user",
            "content": [{"type": "tool_result", "tool_use_id": "t1", "content": "out"}]
        }))
        .unwrap();
        assert_eq!(blocks.blocks().map(|b| b.len()), Some(1));

        let missing: Message = serde_json::from_value(json!({"role": "assistant"})).unwrap();
        assert!(missing.content.is_none());

        let null: Message = serde_json::from_value(json!({"role": "assistant", "content": null})).unwrap();
        assert_eq!(null.content, Some(MessageContent::Other(Value::Null)));
        assert_eq!(serde_json::to_value(&missing).unwrap(), json!({"role": "assistant"}));
    }

    #[test]
    fn test_request_defaults() {
        let req: CompressRequest = serde_json::from_value(json!({"messages": []})).unwrap();
        assert_eq!(req.model, DEFAULT_MODEL);
        assert_eq!(req.model_limit, 200_000);
        assert!(req.tools.is_none());
    }

    #[test]
    fn test_savings_percent() {
        assert_eq!(savings_percent(0, 0), 0.0);
        assert_eq!(savings_percent(1000, 250), 75.0);
        assert_eq!(savings_percent(3, 2), 33.3);
    }

    #[test]
    fn test_skipped_stats() {
        let stats = CompressionStats::skipped(12, 200);
        assert!(stats.skipped);
        assert_eq!(stats.reason.as_deref(), Some("Below threshold (12 < 200)"));
        assert_eq!(stats.tokens_after, 12);
        assert_eq!(stats.tokens_saved, 0);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["skipped"], true);
    }

    #[test]
    fn test_applied_stats_omit_skip_fields() {
        let stats = CompressionStats::new(100, 40, vec!["basic_ccr".to_string()]).with_latency_ms(1.26);
        assert_eq!(stats.tokens_saved, 60);
        assert_eq!(stats.latency_ms, 1.3);
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("skipped").is_none());
        assert!(json.get("reason").is_none());
    }
}
