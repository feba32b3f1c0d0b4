//! Append-only log of accepted edits.
//!
//! Records are grouped by checkplot identifier and kept in acceptance order.
//! When a mirror path is configured every record is also appended to a JSONL
//! file, one record per line, so the session's edits can be audited later.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use cpv_core::UpdateRecord;

use crate::error::UpdateLogError;

#[derive(Debug, Default)]
pub struct UpdateLog {
    records: BTreeMap<String, Vec<UpdateRecord>>,
    mirror: Option<PathBuf>,
}

impl UpdateLog {
    /// In-memory log without a file mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log that also appends every record to the JSONL file at `path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateLogError`] if the directory cannot be created.
    pub fn with_mirror(path: PathBuf) -> Result<Self, UpdateLogError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| UpdateLogError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        Ok(Self {
            records: BTreeMap::new(),
            mirror: Some(path),
        })
    }

    #[must_use]
    pub fn mirror_path(&self) -> Option<&Path> {
        self.mirror.as_deref()
    }

    /// Append a record.
    ///
    /// The in-memory log always takes the record; a mirror write failure is
    /// reported but does not undo it.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateLogError`] if the mirror file cannot be written.
    pub fn append(&mut self, record: UpdateRecord) -> Result<(), UpdateLogError> {
        let mirrored = match &self.mirror {
            Some(path) => serde_jsonlines::append_json_lines(path, [&record]).map_err(|source| {
                UpdateLogError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }),
            None => Ok(()),
        };
        self.records
            .entry(record.object_identifier.clone())
            .or_default()
            .push(record);
        mirrored
    }

    /// Records for one checkplot, oldest first.
    #[must_use]
    pub fn for_object(&self, identifier: &str) -> &[UpdateRecord] {
        self.records.get(identifier).map_or(&[], Vec::as_slice)
    }

    /// The record accepted at exactly `at` for `identifier`.
    #[must_use]
    pub fn get(&self, identifier: &str, at: DateTime<Utc>) -> Option<&UpdateRecord> {
        self.for_object(identifier)
            .iter()
            .find(|r| r.accepted_at == at)
    }

    /// Identifiers with at least one accepted edit, sorted.
    pub fn objects(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Every record, grouped by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &UpdateRecord> {
        self.records.values().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read every record from a JSONL mirror file.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateLogError`] if the file cannot be opened or a line is
    /// not a valid record.
    pub fn read_mirror(path: &Path) -> Result<Vec<UpdateRecord>, UpdateLogError> {
        let io_err = |source| UpdateLogError::Io {
            path: path.display().to_string(),
            source,
        };
        serde_jsonlines::json_lines(path)
            .map_err(io_err)?
            .collect::<std::io::Result<Vec<UpdateRecord>>>()
            .map_err(io_err)
    }
}
