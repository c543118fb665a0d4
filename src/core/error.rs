//! Error types for gaitwheel

use thiserror::Error;

/// Main error type for the crate.
///
/// Only loading and validation can fail; a running session never returns one.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
