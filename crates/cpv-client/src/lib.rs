//! # cpv-client
//!
//! HTTP client for the checkplot server.
//!
//! The server exposes one resource per checkplot file:
//! - `GET  {base}/cp/{token}` returns `{"result": <checkplot>}`
//! - `POST {base}/cp/{token}` with form fields `cpfile` and `cpcontents`
//!   stores reviewer edits and returns `{"status", "message", "result"}`
//!
//! `{token}` is the identifier encoded by [`cpv_core::codec::encode_identifier`].

mod error;
mod http;

pub use error::ClientError;

use cpv_config::ServerConfig;
use cpv_core::Checkplot;
use cpv_core::codec::encode_identifier;
use serde::Deserialize;
use serde_json::Value;

use crate::http::check_response;

// ── Envelopes ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FetchEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SaveEnvelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Option<SaveResult>,
}

#[derive(Debug, Default, Deserialize)]
struct SaveResult {
    #[serde(default)]
    checkplot: Option<Value>,
    #[serde(default)]
    changes: Value,
    #[serde(default)]
    unixtime: Option<f64>,
}

/// What the server reported after accepting an update.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReceipt {
    pub message: String,
    /// The fields the server recorded as changed.
    pub changes: Value,
    /// Server acceptance time in fractional Unix seconds.
    pub unixtime: Option<f64>,
    /// Checkplot file the server wrote to.
    pub checkplot: Option<Value>,
}

fn checkplot_from_envelope(envelope: FetchEnvelope) -> Result<Checkplot, ClientError> {
    match envelope.result {
        Some(result) if !result.is_null() => Ok(Checkplot::from_value(result)?),
        _ => Err(ClientError::Rejected {
            status: envelope.status.unwrap_or_else(|| "missing".to_string()),
            message: envelope
                .message
                .unwrap_or_else(|| "response has no checkplot result".to_string()),
        }),
    }
}

fn receipt_from_envelope(envelope: SaveEnvelope) -> Result<SaveReceipt, ClientError> {
    if envelope.status != "ok" {
        return Err(ClientError::Rejected {
            status: envelope.status,
            message: envelope.message,
        });
    }
    let result = envelope.result.unwrap_or_default();
    Ok(SaveReceipt {
        message: envelope.message,
        changes: result.changes,
        unixtime: result.unixtime,
        checkplot: result.checkplot,
    })
}

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for one checkplot server.
#[derive(Debug, Clone)]
pub struct CheckplotClient {
    http: reqwest::Client,
    base_url: String,
    xsrf_token: Option<String>,
}

impl CheckplotClient {
    /// Create a client from the server configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// fails to build.
    pub fn new(config: &ServerConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            xsrf_token: config.xsrf_token().map(str::to_string),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the checkplot resource for `identifier`.
    #[must_use]
    pub fn endpoint(&self, identifier: &str) -> String {
        format!("{}/cp/{}", self.base_url, encode_identifier(identifier))
    }

    /// Fetch and validate the checkplot stored under `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails, the server returns a
    /// non-success status, the envelope has no `result`, or the bundle does
    /// not validate.
    pub async fn fetch(&self, identifier: &str) -> Result<Checkplot, ClientError> {
        let url = self.endpoint(identifier);
        tracing::debug!(identifier, %url, "fetching checkplot");
        let resp = check_response(self.http.get(&url).send().await?).await?;
        let envelope: FetchEnvelope = resp
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        checkplot_from_envelope(envelope)
    }

    /// Send the editable parts of `checkplot` to the server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails, the server returns a
    /// non-success status, or the reply status is anything but `ok`.
    pub async fn save(
        &self,
        identifier: &str,
        checkplot: &Checkplot,
    ) -> Result<SaveReceipt, ClientError> {
        let url = self.endpoint(identifier);
        let contents = serde_json::to_string(&checkplot.save_contents())
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        let mut form = vec![("cpfile", identifier.to_string()), ("cpcontents", contents)];
        let mut request = self.http.post(&url);
        if let Some(token) = &self.xsrf_token {
            form.push(("_xsrf", token.clone()));
            request = request.header("X-Xsrftoken", token);
        }

        tracing::debug!(identifier, %url, "saving checkplot");
        let resp = check_response(request.form(&form).send().await?).await?;
        let envelope: SaveEnvelope = resp
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        receipt_from_envelope(envelope)
    }
}
