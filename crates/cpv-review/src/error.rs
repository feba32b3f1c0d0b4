//! Review error types.

use thiserror::Error;

/// Failures the controller can run into.
///
/// The controller converts every one of these into an outcome (and, for
/// fetch/save failures, a user-visible notice) instead of returning it.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Loading a checkplot failed; the previous one stays current.
    #[error("could not load {identifier}: {reason}")]
    FetchFailure { identifier: String, reason: String },

    /// The backend did not accept a save; edits stay in memory.
    #[error("could not save {identifier}: {reason}")]
    SaveRejected { identifier: String, reason: String },

    /// An edit or save was attempted with nothing loaded.
    #[error("no checkplot is loaded")]
    NoCurrentCheckplot,

    /// Navigation past either end of the review queue.
    #[error("no checkplot at queue position {requested} (queue has {len})")]
    QueueBoundary { requested: i64, len: usize },

    /// Identifier is not part of the review queue.
    #[error("{0} is not in the review queue")]
    NotInQueue(String),

    /// The requested candidate does not exist in the loaded checkplot.
    #[error("no candidate {slot} for method {method}")]
    NoSuchCandidate { method: String, slot: usize },
}

/// Errors from the checkplot store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no checkplot is loaded")]
    NoCurrentCheckplot,

    #[error("no candidate {slot} for method {method}")]
    NoSuchCandidate { method: String, slot: usize },
}

impl From<StoreError> for ControllerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NoCurrentCheckplot => Self::NoCurrentCheckplot,
            StoreError::NoSuchCandidate { method, slot } => Self::NoSuchCandidate { method, slot },
        }
    }
}

/// Errors from the update log's file mirror.
#[derive(Debug, Error)]
pub enum UpdateLogError {
    #[error("update log I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
