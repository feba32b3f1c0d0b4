//! Update records.
//!
//! One record is produced for every save the backend accepts. Records are
//! append-only; see `cpv-review::update_log` for the log that holds them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An accepted edit to one checkplot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecord {
    /// Identifier of the checkplot file the edit was saved to.
    pub object_identifier: String,
    /// When the backend accepted the edit.
    pub accepted_at: DateTime<Utc>,
    /// The backend's description of what changed.
    pub changed_fields: serde_json::Value,
}

impl UpdateRecord {
    /// Build a record from the backend's `unixtime` (fractional seconds).
    ///
    /// Falls back to the current time if `unixtime` is absent or out of
    /// range.
    #[must_use]
    pub fn from_unixtime(
        object_identifier: impl Into<String>,
        unixtime: Option<f64>,
        changed_fields: serde_json::Value,
    ) -> Self {
        let accepted_at = unixtime
            .filter(|t| t.is_finite())
            .and_then(|t| {
                #[allow(clippy::cast_possible_truncation)]
                let micros = (t * 1_000_000.0).round() as i64;
                DateTime::from_timestamp_micros(micros)
            })
            .unwrap_or_else(Utc::now);

        Self {
            object_identifier: object_identifier.into(),
            accepted_at,
            changed_fields,
        }
    }
}
