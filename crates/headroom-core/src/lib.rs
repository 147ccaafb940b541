//! Shared configuration and conversation types for the compression sidecar

mod config;
mod error;
mod types;

pub use config::{
    str_to_bool, CcrConfig, HeadroomConfig, LlmLinguaConfig, PipelineConfig, Provider,
    RollingWindowConfig, SmartCrusherConfig, ToggleConfig,
};
pub use error::ConfigError;
pub use types::{
    savings_percent, CompressRequest, CompressResponse, CompressionStats, Message,
    MessageContent, ToolDefinition, DEFAULT_MODEL, DEFAULT_MODEL_LIMIT,
};
