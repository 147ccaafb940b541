use thiserror::Error;

/// An optional capability was requested but cannot be served
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not enabled")]
    NotEnabled(&'static str),
    #[error("{0} not installed")]
    NotInstalled(&'static str),
}
