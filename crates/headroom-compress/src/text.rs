//! Prompt-level text compression behind an optional engine

use crate::error::CompressError;
use async_trait::async_trait;
use headroom_telemetry::estimate_tokens;
use serde::{Deserialize, Serialize};

/// Name reported in "not enabled / not installed" failures
pub const TEXT_COMPRESSOR_NAME: &str = "LLMLingua";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextCompressRequest {
    pub text: String,
    #[serde(default = "default_target_ratio")]
    pub target_ratio: f64,
    /// Tokens the compressor must keep verbatim
    #[serde(default)]
    pub force_tokens: Option<Vec<String>>,
}

fn default_target_ratio() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCompressResponse {
    pub compressed: String,
    pub original_tokens: usize,
    pub compressed_tokens: usize,
    pub ratio: f64,
}

/// Raw engine output; missing counts are estimated
#[derive(Debug, Clone, Default)]
pub struct TextCompression {
    pub compressed_prompt: String,
    pub origin_tokens: Option<usize>,
    pub compressed_tokens: Option<usize>,
    pub rate: Option<f64>,
}

impl TextCompression {
    pub fn into_response(self, original: &str, target_ratio: f64) -> TextCompressResponse {
        TextCompressResponse {
            original_tokens: self
                .origin_tokens
                .unwrap_or_else(|| estimate_tokens(original)),
            compressed_tokens: self
                .compressed_tokens
                .unwrap_or_else(|| estimate_tokens(&self.compressed_prompt)),
            ratio: self.rate.unwrap_or(target_ratio),
            compressed: self.compressed_prompt,
        }
    }
}

#[async_trait]
pub trait TextCompressor: Send + Sync {
    async fn compress_prompt(
        &self,
        text: &str,
        rate: f64,
        force_tokens: &[String],
    ) -> Result<TextCompression, CompressError>;
}
