//! Client error types.

use thiserror::Error;

/// Errors that can occur when talking to the checkplot server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the server.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// Server answered 2xx but reported a non-`ok` status.
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: String, message: String },

    /// Failed to parse a server response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The returned checkplot bundle failed validation.
    #[error(transparent)]
    InvalidBundle(#[from] cpv_core::CoreError),
}
