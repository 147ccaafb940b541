use headroom_ccr::CcrError;
use headroom_core::ConfigError;
use thiserror::Error;

/// Failures of the external transform engine; always absorbed by falling
/// back to basic compression
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("transform engine failed: {0}")]
    Engine(String),
    #[error("transform engine returned an unrecognized result: {0}")]
    UnrecognizedShape(String),
    #[error("transform engine timed out after {0} ms")]
    Timeout(u64),
    #[error("transform engine task aborted: {0}")]
    Aborted(String),
    #[error("transform engine request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Request-level compression failures surfaced to the caller
#[derive(Debug, Error)]
pub enum CompressError {
    #[error("failed to serialize content: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] CcrError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("text compression failed: {0}")]
    TextCompression(String),
}

impl CompressError {
    /// Short machine-readable category
    pub fn kind(&self) -> &'static str {
        match self {
            CompressError::Serialization(_) => "serialization",
            CompressError::Store(CcrError::Serialization(_)) => "serialization",
            CompressError::Store(_) => "store",
            CompressError::Config(ConfigError::NotEnabled(_)) => "not_enabled",
            CompressError::Config(ConfigError::NotInstalled(_)) => "not_installed",
            CompressError::TextCompression(_) => "text_compression",
        }
    }
}
