//! Error types for MaruNav

use thiserror::Error;

/// MaruNav error type
#[derive(Error, Debug)]
pub enum MaruError {
    #[error("Connection failed: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for MaruError {
    fn from(e: serde_json::Error) -> Self {
        MaruError::Protocol(e.to_string())
    }
}

impl From<toml::de::Error> for MaruError {
    fn from(e: toml::de::Error) -> Self {
        MaruError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MaruError>;
