use std::fmt;

use thiserror::Error;

/// High-level error type shared across docgen components.
#[derive(Debug, Error)]
pub enum DocgenError {
    #[error("invalid {kind} '{value}': {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: String,
    },
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("maximum number of documents ({limit}) reached")]
    LimitExceeded { limit: usize },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DocgenError>;

impl From<serde_yaml::Error> for DocgenError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl DocgenError {
    pub fn invalid(kind: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            kind,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    pub fn context<T: fmt::Display>(self, ctx: T) -> Self {
        match self {
            DocgenError::ValidationFailed(msg) => {
                DocgenError::ValidationFailed(format!("{ctx}: {msg}"))
            }
            DocgenError::Config(msg) => DocgenError::Config(format!("{ctx}: {msg}")),
            DocgenError::Storage(msg) => DocgenError::Storage(format!("{ctx}: {msg}")),
            DocgenError::Serialization(msg) => {
                DocgenError::Serialization(format!("{ctx}: {msg}"))
            }
            other => other,
        }
    }
}
