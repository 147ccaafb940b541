#![allow(dead_code)]

use headroom_ccr::CcrStore;
use headroom_core::{CompressRequest, HeadroomConfig, Message, MessageContent};
use headroom_telemetry::Metrics;
use serde_json::json;
use std::sync::Arc;

pub fn sample_config(min_tokens: usize) -> HeadroomConfig {
    let mut config = HeadroomConfig::new();
    config.smart_crusher.min_tokens = min_tokens;
    config
}

pub fn sample_store(ttl_secs: u64) -> CcrStore {
    CcrStore::new(ttl_secs, Arc::new(Metrics::new()))
}

pub fn tool_result(tool_use_id: &str, content: &str) -> Message {
    Message::user(MessageContent::Blocks(vec![json!({
        "type": "tool_result",
        "tool_use_id": tool_use_id,
        "content": content,
    })]))
}

/// A short exchange whose last turn carries one large tool result
pub fn conversation_with_tool_output(chars: usize) -> CompressRequest {
    CompressRequest::new(vec![
        Message::user(MessageContent::Text("why is the build failing?".to_string())),
        Message::assistant("Let me run the build."),
        tool_result("toolu_build", &"e".repeat(chars)),
    ])
}

/// Address embedded in a `[CCR:<addr>] ...` reference
pub fn address_in(reference: &str) -> String {
    let start = reference.find("[CCR:").map(|i| i + 5).unwrap_or(0);
    reference[start..start + headroom_ccr::ADDRESS_LEN].to_string()
}
