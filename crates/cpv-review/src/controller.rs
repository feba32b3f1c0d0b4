//! Load/save controller.
//!
//! Drives the review of one checkplot at a time: fetches it, rebuilds its
//! panels, takes edits, and saves it back. Navigation away from a loaded
//! checkplot always goes through a save, and the next checkplot is only
//! fetched once the server has accepted that save.
//!
//! Every operation resolves its own failures. Callers get an [`Outcome`];
//! anything the reviewer needs to see is queued as a [`Notice`].

use std::time::Duration;

use cpv_config::CpvConfig;
use cpv_core::codec::DEFAULT_IMAGE_MIME;
use cpv_core::panels::build_panels;
use cpv_core::{Checkplot, MethodTag, PanelLayout, UpdateRecord, Variability};
use serde::Serialize;

use crate::backend::Backend;
use crate::error::ControllerError;
use crate::queue::{QueueNavigator, ReviewQueue};
use crate::state::Phase;
use crate::store::{CheckplotStore, Edit};
use crate::update_log::UpdateLog;

// ── Options ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Upper bound on each fetch and save.
    pub timeout: Duration,
    pub method_priority: Vec<MethodTag>,
    pub image_mime: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            method_priority: MethodTag::ALL.to_vec(),
            image_mime: DEFAULT_IMAGE_MIME.to_string(),
        }
    }
}

impl From<&CpvConfig> for ControllerOptions {
    fn from(config: &CpvConfig) -> Self {
        Self {
            timeout: config.server.timeout(),
            method_priority: config.review.method_priority.clone(),
            image_mime: config.review.image_mime.clone(),
        }
    }
}

// ── Edit form ──────────────────────────────────────────────────────

/// The editable fields as the reviewer sees them.
///
/// The flag and period/epoch are written through to the store as they
/// change; tags and comments are captured into the store when a save is
/// issued.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditForm {
    pub variability: Variability,
    pub period: Option<f64>,
    pub epoch: Option<f64>,
    pub vartags: String,
    pub objecttags: String,
    pub comments: String,
}

impl From<&Checkplot> for EditForm {
    fn from(cp: &Checkplot) -> Self {
        Self {
            variability: cp.varinfo.objectisvar,
            period: cp.varinfo.varperiod,
            epoch: cp.varinfo.varepoch,
            vartags: cp.varinfo.vartags.clone(),
            objecttags: cp.objectinfo.objecttags.clone(),
            comments: cp.objectcomments.clone(),
        }
    }
}

// ── Notices and outcomes ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Result of one controller operation.
#[derive(Debug)]
pub enum Outcome {
    /// A checkplot was fetched and is now current.
    Loaded {
        identifier: String,
        index: Option<usize>,
    },
    /// The current checkplot was saved and stays current.
    Saved { identifier: String },
    /// One field of the current checkplot or the edit form changed.
    Edited { field: &'static str },
    /// Nothing to do; the reason is logged, not shown.
    Skipped(ControllerError),
    /// The operation failed and a notice was queued.
    Failed(ControllerError),
}

impl Outcome {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone)]
struct Target {
    identifier: String,
    index: Option<usize>,
}

/// Await `fut`, giving up after `limit`.
async fn bounded<T, E: std::fmt::Display>(
    limit: Duration,
    fut: impl std::future::Future<Output = Result<T, E>>,
) -> Result<T, String> {
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {}s", limit.as_secs_f64())),
    }
}

// ── Controller ─────────────────────────────────────────────────────

pub struct Controller<B, Q = ReviewQueue> {
    backend: B,
    queue: Q,
    store: CheckplotStore,
    updates: UpdateLog,
    form: EditForm,
    panels: PanelLayout,
    phase: Phase,
    options: ControllerOptions,
    notices: Vec<Notice>,
}

impl<B: Backend, Q: QueueNavigator> Controller<B, Q> {
    #[must_use]
    pub fn new(backend: B, queue: Q, updates: UpdateLog, options: ControllerOptions) -> Self {
        Self {
            backend,
            queue,
            store: CheckplotStore::new(),
            updates,
            form: EditForm::default(),
            panels: PanelLayout::default(),
            phase: Phase::Idle,
            options,
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn store(&self) -> &CheckplotStore {
        &self.store
    }

    #[must_use]
    pub const fn form(&self) -> &EditForm {
        &self.form
    }

    #[must_use]
    pub const fn panels(&self) -> &PanelLayout {
        &self.panels
    }

    #[must_use]
    pub const fn updates(&self) -> &UpdateLog {
        &self.updates
    }

    #[must_use]
    pub const fn queue(&self) -> &Q {
        &self.queue
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Drain the notices queued since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ── Navigation ─────────────────────────────────────────────────

    /// Load `identifier`, saving the current checkplot first.
    pub async fn request(&mut self, identifier: &str) -> Outcome {
        self.recover_abandoned();
        let target = Target {
            identifier: identifier.to_string(),
            index: self.queue.index_of(identifier),
        };
        self.navigate(target).await
    }

    /// Load the queue entry at `index`, saving the current checkplot first.
    pub async fn request_index(&mut self, index: usize) -> Outcome {
        self.recover_abandoned();
        let Some(identifier) = self.queue.identifier_at(index) else {
            return self.skip(ControllerError::QueueBoundary {
                requested: i64::try_from(index).unwrap_or(i64::MAX),
                len: self.queue.len(),
            });
        };
        let target = Target {
            identifier: identifier.to_string(),
            index: Some(index),
        };
        self.navigate(target).await
    }

    /// Move to the next queue entry. With nothing loaded, starts at the
    /// first entry.
    pub async fn next(&mut self) -> Outcome {
        self.recover_abandoned();
        if !self.store.is_loaded() {
            return self.request_index(0).await;
        }
        match self.current_queue_index() {
            Ok(index) => self.request_index(index + 1).await,
            Err(error) => self.skip(error),
        }
    }

    /// Move to the previous queue entry.
    pub async fn previous(&mut self) -> Outcome {
        self.recover_abandoned();
        match self.current_queue_index() {
            Ok(0) => self.skip(ControllerError::QueueBoundary {
                requested: -1,
                len: self.queue.len(),
            }),
            Ok(index) => self.request_index(index - 1).await,
            Err(error) => self.skip(error),
        }
    }

    fn current_queue_index(&self) -> Result<usize, ControllerError> {
        let identifier = self
            .store
            .identifier()
            .ok_or(ControllerError::NoCurrentCheckplot)?;
        self.store
            .index()
            .ok_or_else(|| ControllerError::NotInQueue(identifier.to_string()))
    }

    async fn navigate(&mut self, target: Target) -> Outcome {
        if self.store.is_loaded() {
            self.transition(Phase::NavigationPending);
            self.save_then(Some(target)).await
        } else {
            self.transition(Phase::Loading);
            self.fetch_into(target).await
        }
    }

    // ── Saving ─────────────────────────────────────────────────────

    /// Save the current checkplot and stay on it.
    pub async fn save(&mut self) -> Outcome {
        self.recover_abandoned();
        if !self.store.is_loaded() {
            return self.skip(ControllerError::NoCurrentCheckplot);
        }
        self.save_then(None).await
    }

    /// Save before the session ends. A no-op when nothing is loaded.
    pub async fn close(&mut self) -> Outcome {
        self.recover_abandoned();
        if !self.store.is_loaded() {
            return self.skip(ControllerError::NoCurrentCheckplot);
        }
        tracing::debug!("saving before close");
        self.save_then(None).await
    }

    /// Copy the form's free-text fields into the store so the save carries
    /// the reviewer's latest input.
    fn capture_form(&mut self) -> Result<(), ControllerError> {
        self.store
            .apply_edit(Edit::VarTags(self.form.vartags.clone()))?;
        self.store
            .apply_edit(Edit::ObjectTags(self.form.objecttags.clone()))?;
        self.store
            .apply_edit(Edit::Comments(self.form.comments.clone()))?;
        Ok(())
    }

    async fn save_then(&mut self, next: Option<Target>) -> Outcome {
        if let Err(error) = self.capture_form() {
            return self.skip(error);
        }
        self.transition(Phase::Saving);

        let Some(identifier) = self.store.identifier().map(str::to_string) else {
            self.transition(Phase::Loaded);
            return self.skip(ControllerError::NoCurrentCheckplot);
        };
        let result = if let Some(cp) = self.store.checkplot() {
            bounded(self.options.timeout, self.backend.save(&identifier, cp)).await
        } else {
            Err(ControllerError::NoCurrentCheckplot.to_string())
        };

        let receipt = match result {
            Ok(receipt) => receipt,
            Err(reason) => {
                self.transition(Phase::Loaded);
                let message = match &next {
                    Some(target) => format!(
                        "Could not save {identifier} ({reason}); staying here instead of opening {}",
                        target.identifier
                    ),
                    None => format!("Could not save {identifier}: {reason}"),
                };
                self.notify(NoticeLevel::Error, message);
                return Outcome::Failed(ControllerError::SaveRejected { identifier, reason });
            }
        };

        tracing::info!(%identifier, message = %receipt.message, "checkplot saved");
        let record = UpdateRecord::from_unixtime(&identifier, receipt.unixtime, receipt.changes);
        if let Err(error) = self.updates.append(record) {
            tracing::warn!(%error, "update accepted but not mirrored");
        }

        match next {
            Some(target) => {
                self.transition(Phase::Loading);
                self.fetch_into(target).await
            }
            None => {
                self.transition(Phase::Loaded);
                self.notify(NoticeLevel::Info, format!("Saved {identifier}"));
                Outcome::Saved { identifier }
            }
        }
    }

    // ── Loading ────────────────────────────────────────────────────

    async fn fetch_into(&mut self, target: Target) -> Outcome {
        let result = bounded(self.options.timeout, self.backend.fetch(&target.identifier)).await;
        match result {
            Ok(checkplot) => {
                self.store
                    .replace(checkplot, target.identifier.clone(), target.index);
                if let Some(cp) = self.store.checkplot() {
                    self.form = EditForm::from(cp);
                }
                self.rebuild_panels();
                self.queue.highlight(target.index);
                self.transition(Phase::Loaded);
                tracing::info!(
                    identifier = %target.identifier,
                    index = ?target.index,
                    methods = self.panels.groups.len(),
                    "checkplot loaded"
                );
                Outcome::Loaded {
                    identifier: target.identifier,
                    index: target.index,
                }
            }
            Err(reason) => {
                let fallback = if self.store.is_loaded() {
                    Phase::Loaded
                } else {
                    Phase::Idle
                };
                self.transition(fallback);
                self.notify(
                    NoticeLevel::Error,
                    format!("Could not load {}: {reason}", target.identifier),
                );
                Outcome::Failed(ControllerError::FetchFailure {
                    identifier: target.identifier,
                    reason,
                })
            }
        }
    }

    fn rebuild_panels(&mut self) {
        self.panels = match self.store.checkplot() {
            Some(cp) => build_panels(
                cp,
                self.store.best(),
                &self.options.method_priority,
                &self.options.image_mime,
            ),
            None => PanelLayout::default(),
        };
    }

    // ── Edit handlers ──────────────────────────────────────────────

    /// Set the variability flag; written straight into the checkplot.
    pub fn set_variability(&mut self, flag: Variability) -> Outcome {
        let edit = Edit::Variability(flag);
        let field = edit.field_path();
        match self.store.apply_edit(edit) {
            Ok(()) => {
                self.form.variability = flag;
                Outcome::Edited { field }
            }
            Err(error) => self.skip(error.into()),
        }
    }

    /// Adopt candidate `slot` of `method` as the object's period and epoch.
    pub fn select_candidate(&mut self, method: MethodTag, slot: usize) -> Outcome {
        match self.store.select_candidate(method, slot) {
            Ok((period, epoch)) => {
                self.form.period = Some(period);
                self.form.epoch = Some(epoch);
                self.rebuild_panels();
                Outcome::Edited {
                    field: "varinfo.varperiod",
                }
            }
            Err(error) => {
                let error = ControllerError::from(error);
                if matches!(error, ControllerError::NoSuchCandidate { .. }) {
                    self.notify(NoticeLevel::Warning, error.to_string());
                }
                self.skip(error)
            }
        }
    }

    /// Type a period by hand. Clears the current-best mark.
    pub fn set_period(&mut self, period: Option<f64>) -> Outcome {
        let outcome = self.apply_manual(Edit::VarPeriod(period));
        if matches!(outcome, Outcome::Edited { .. }) {
            self.form.period = period;
        }
        outcome
    }

    /// Type an epoch by hand. Clears the current-best mark.
    pub fn set_epoch(&mut self, epoch: Option<f64>) -> Outcome {
        let outcome = self.apply_manual(Edit::VarEpoch(epoch));
        if matches!(outcome, Outcome::Edited { .. }) {
            self.form.epoch = epoch;
        }
        outcome
    }

    fn apply_manual(&mut self, edit: Edit) -> Outcome {
        let field = edit.field_path();
        if let Err(error) = self.store.apply_edit(edit) {
            return self.skip(error.into());
        }
        self.store.clear_best();
        self.rebuild_panels();
        Outcome::Edited { field }
    }

    pub fn set_vartags(&mut self, tags: &str) -> Outcome {
        self.edit_form("varinfo.vartags", |form| form.vartags = tags.to_string())
    }

    pub fn set_objecttags(&mut self, tags: &str) -> Outcome {
        self.edit_form("objectinfo.objecttags", |form| {
            form.objecttags = tags.to_string();
        })
    }

    pub fn set_comments(&mut self, text: &str) -> Outcome {
        self.edit_form("objectcomments", |form| form.comments = text.to_string())
    }

    fn edit_form(&mut self, field: &'static str, apply: impl FnOnce(&mut EditForm)) -> Outcome {
        if !self.store.is_loaded() {
            return self.skip(ControllerError::NoCurrentCheckplot);
        }
        apply(&mut self.form);
        Outcome::Edited { field }
    }

    // ── Internals ──────────────────────────────────────────────────

    fn transition(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid controller transition {} -> {next}",
            self.phase
        );
        tracing::debug!(from = %self.phase, to = %next, "controller transition");
        self.phase = next;
    }

    /// Settle a phase left behind by an operation whose future was dropped
    /// before it completed.
    fn recover_abandoned(&mut self) {
        if self.phase.is_transient() {
            let settled = if self.store.is_loaded() {
                Phase::Loaded
            } else {
                Phase::Idle
            };
            tracing::warn!(from = %self.phase, to = %settled, "previous operation was abandoned");
            self.phase = settled;
        }
    }

    fn skip(&self, error: ControllerError) -> Outcome {
        tracing::info!(%error, "nothing to do");
        Outcome::Skipped(error)
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Error => tracing::error!("{message}"),
            NoticeLevel::Warning => tracing::warn!("{message}"),
            NoticeLevel::Info => tracing::debug!("{message}"),
        }
        self.notices.push(Notice { level, message });
    }
}
