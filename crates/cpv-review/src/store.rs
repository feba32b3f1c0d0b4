//! The checkplot store.
//!
//! Owns the one checkplot currently under review together with the
//! identifier it was loaded from and its queue position. All three are held
//! in a single optional value, so a reader sees either everything from one
//! load or nothing.

use cpv_core::{BestCandidate, Checkplot, MethodTag, Variability};

use crate::error::StoreError;

/// One addressable edit to the current checkplot.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Variability(Variability),
    VarPeriod(Option<f64>),
    VarEpoch(Option<f64>),
    VarTags(String),
    ObjectTags(String),
    Comments(String),
}

impl Edit {
    /// Bundle path of the field this edit writes.
    #[must_use]
    pub const fn field_path(&self) -> &'static str {
        match self {
            Self::Variability(_) => "varinfo.objectisvar",
            Self::VarPeriod(_) => "varinfo.varperiod",
            Self::VarEpoch(_) => "varinfo.varepoch",
            Self::VarTags(_) => "varinfo.vartags",
            Self::ObjectTags(_) => "objectinfo.objecttags",
            Self::Comments(_) => "objectcomments",
        }
    }
}

#[derive(Debug, Clone)]
struct Current {
    checkplot: Checkplot,
    identifier: String,
    index: Option<usize>,
    best: Option<BestCandidate>,
}

#[derive(Debug, Default)]
pub struct CheckplotStore {
    current: Option<Current>,
}

impl CheckplotStore {
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn checkplot(&self) -> Option<&Checkplot> {
        self.current.as_ref().map(|c| &c.checkplot)
    }

    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.identifier.as_str())
    }

    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.current.as_ref().and_then(|c| c.index)
    }

    /// The candidate currently marked as the adopted period.
    #[must_use]
    pub fn best(&self) -> Option<BestCandidate> {
        self.current.as_ref().and_then(|c| c.best)
    }

    /// Swap in a freshly loaded checkplot.
    ///
    /// The current-best mark starts on the candidate matching the stored
    /// `varperiod`/`varepoch`, if any.
    pub fn replace(&mut self, checkplot: Checkplot, identifier: String, index: Option<usize>) {
        let best = checkplot
            .candidate_matching_varinfo()
            .map(|(method, slot)| BestCandidate { method, slot });
        self.current = Some(Current {
            checkplot,
            identifier,
            index,
            best,
        });
    }

    /// Write one field of the current checkplot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoCurrentCheckplot`] if nothing is loaded.
    pub fn apply_edit(&mut self, edit: Edit) -> Result<(), StoreError> {
        let current = self.current.as_mut().ok_or(StoreError::NoCurrentCheckplot)?;
        let cp = &mut current.checkplot;
        tracing::trace!(identifier = %current.identifier, field = edit.field_path(), "apply edit");
        match edit {
            Edit::Variability(flag) => cp.varinfo.objectisvar = flag,
            Edit::VarPeriod(period) => cp.varinfo.varperiod = period,
            Edit::VarEpoch(epoch) => cp.varinfo.varepoch = epoch,
            Edit::VarTags(tags) => cp.varinfo.vartags = tags,
            Edit::ObjectTags(tags) => cp.objectinfo.objecttags = tags,
            Edit::Comments(text) => cp.objectcomments = text,
        }
        Ok(())
    }

    /// Adopt a candidate: copy its period/epoch into `varinfo` and make it
    /// the only current-best candidate. Returns the adopted `(period, epoch)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if nothing is loaded or the candidate does not
    /// exist.
    pub fn select_candidate(
        &mut self,
        method: MethodTag,
        slot: usize,
    ) -> Result<(f64, f64), StoreError> {
        let current = self.current.as_mut().ok_or(StoreError::NoCurrentCheckplot)?;
        let candidate = current
            .checkplot
            .method(method)
            .and_then(|block| block.candidate(slot))
            .ok_or_else(|| StoreError::NoSuchCandidate {
                method: method.to_string(),
                slot,
            })?;
        let (period, epoch) = (candidate.period, candidate.epoch);

        current.checkplot.varinfo.varperiod = Some(period);
        current.checkplot.varinfo.varepoch = Some(epoch);
        current.best = Some(BestCandidate { method, slot });
        Ok((period, epoch))
    }

    /// Drop the current-best mark (after a manual period/epoch edit).
    pub fn clear_best(&mut self) {
        if let Some(current) = self.current.as_mut() {
            current.best = None;
        }
    }
}
