//! Error types for Sage.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SageError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid performance table: {0}")]
    InvalidPerformance(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
