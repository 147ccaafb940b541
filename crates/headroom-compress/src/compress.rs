//! Basic compression: offload oversized tool results to the CCR store

use crate::error::CompressError;
use headroom_ccr::{CcrStore, UNKNOWN_SOURCE};
use headroom_core::{CompressionStats, Message, MessageContent, ToolDefinition};
use headroom_telemetry::estimate_value_tokens;
use serde_json::Value;
use std::sync::Arc;

/// Tool results longer than this many characters are offloaded
pub const OFFLOAD_THRESHOLD_CHARS: usize = 2000;

/// Transform name reported when the fallback strategy compressed anything
pub const FALLBACK_TRANSFORM: &str = "basic_ccr";

#[derive(Debug, Clone)]
pub struct FallbackOutcome {
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolDefinition>>,
    pub compressed: bool,
    pub stats: CompressionStats,
}

/// Deterministic minimal compressor used when no transform engine is
/// available or the engine fails
pub struct FallbackCompressor {
    store: Option<Arc<CcrStore>>,
    threshold_chars: usize,
}

impl FallbackCompressor {
    pub fn new(store: Arc<CcrStore>) -> Self {
        Self {
            store: Some(store),
            threshold_chars: OFFLOAD_THRESHOLD_CHARS,
        }
    }

    /// A compressor with nowhere to park content; passes everything through
    pub fn disabled() -> Self {
        Self {
            store: None,
            threshold_chars: OFFLOAD_THRESHOLD_CHARS,
        }
    }

    /// Returns a rewritten copy of `messages`; the input is never modified
    pub fn compress(
        &self,
        messages: &[Message],
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<FallbackOutcome, CompressError> {
        let tokens_before = estimate_value_tokens(messages)?;

        let compressed_messages = match &self.store {
            Some(store) => messages
                .iter()
                .map(|msg| self.compress_message(store, msg))
                .collect::<Result<Vec<_>, _>>()?,
            None => messages.to_vec(),
        };

        let tokens_after = estimate_value_tokens(&compressed_messages)?;
        let compressed = tokens_after < tokens_before;
        let transforms = if compressed {
            vec![FALLBACK_TRANSFORM.to_string()]
        } else {
            Vec::new()
        };

        Ok(FallbackOutcome {
            messages: compressed_messages,
            tools,
            compressed,
            stats: CompressionStats::new(tokens_before, tokens_after, transforms),
        })
    }

    fn compress_message(&self, store: &CcrStore, msg: &Message) -> Result<Message, CompressError> {
        let mut out = msg.clone();
        if !msg.is_user() {
            return Ok(out);
        }
        let Some(blocks) = msg.blocks() else {
            return Ok(out);
        };

        let new_blocks = blocks
            .iter()
            .map(|block| self.compress_block(store, block))
            .collect::<Result<Vec<_>, _>>()?;
        out.content = Some(MessageContent::Blocks(new_blocks));
        Ok(out)
    }

    fn compress_block(&self, store: &CcrStore, block: &Value) -> Result<Value, CompressError> {
        if block.get("type").and_then(Value::as_str) != Some("tool_result") {
            return Ok(block.clone());
        }
        let Some(content) = block.get("content").and_then(Value::as_str) else {
            return Ok(block.clone());
        };

        let char_len = content.chars().count();
        if char_len <= self.threshold_chars {
            return Ok(block.clone());
        }

        let label = block
            .get("tool_use_id")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_SOURCE);
        let outcome = store.put(Value::String(content.to_string()), label)?;

        let mut replaced = block.clone();
        replaced["content"] = Value::String(reference_text(&outcome.address, char_len));
        Ok(replaced)
    }
}

/// Placeholder left in place of offloaded content
pub fn reference_text(address: &str, original_chars: usize) -> String {
    format!(
        "[CCR:{}] Content compressed ({} chars). Use ccr_retrieve to access full content.",
        address, original_chars
    )
}
