use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("membership write failed: {0}")]
    WriteFailed(String),
}

impl From<regex::Error> for FilterError {
    fn from(err: regex::Error) -> Self {
        FilterError::InvalidPattern(err.to_string())
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::InvalidConfig(err.to_string())
    }
}
