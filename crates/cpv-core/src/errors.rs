//! Cross-cutting error types for cpview.
//!
//! Errors raised while validating or decoding backend data. Transport and
//! controller errors live in `cpv-client` and `cpv-review`.

use thiserror::Error;

/// Errors that can be raised while handling checkplot data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The checkplot bundle did not have the expected shape.
    #[error("Invalid checkplot bundle: {0}")]
    InvalidCheckplot(String),

    /// A method block for a known tag could not be parsed.
    #[error("Invalid {method} block: {reason}")]
    InvalidMethodBlock { method: String, reason: String },

    /// An identifier token could not be decoded.
    #[error("Invalid identifier token '{token}': {reason}")]
    InvalidToken { token: String, reason: String },

    /// An unknown analysis method tag was requested.
    #[error("Unknown analysis method: {0}")]
    UnknownMethod(String),

    /// Underlying JSON error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
