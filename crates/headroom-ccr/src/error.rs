use thiserror::Error;

#[derive(Debug, Error)]
pub enum CcrError {
    #[error("Hash {0} not found or expired")]
    NotFound(String),
    #[error("Query not found in content")]
    QueryNotFound,
    #[error("failed to canonicalize payload: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CcrError>;
