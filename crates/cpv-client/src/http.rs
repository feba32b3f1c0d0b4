//! Shared HTTP response helpers.
//!
//! Centralizes the status-code check so the fetch and save paths stay
//! focused on request construction and envelope mapping.

use crate::error::ClientError;

/// Longest response body kept in an [`ClientError::Api`] message.
const MAX_ERROR_BODY: usize = 512;

/// Check an HTTP response for a non-success status.
///
/// Returns the response unchanged on success, otherwise
/// [`ClientError::Api`] carrying the status code and a truncated body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let mut message = resp.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| message.is_char_boundary(*i))
            .unwrap_or(0);
        message.truncate(cut);
        message.push('…');
    }
    Err(ClientError::Api { status, message })
}
