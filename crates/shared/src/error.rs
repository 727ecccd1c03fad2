//! Error types shared across the workspace

use thiserror::Error;

/// Error thrown when a string is not a valid identity literal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{literal}' is not a valid identity")]
pub struct InvalidIdentityError {
    pub literal: String,
}

/// General error type
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidIdentity(#[from] InvalidIdentityError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid file pattern: {0}")]
    Pattern(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
