//! Panel builder.
//!
//! Turns a loaded checkplot into a description of the periodogram and
//! phased light-curve panels to display. One panel-group per method block
//! present in the bundle, ordered by method priority. The builder is pure:
//! rendering the description is the caller's business.

use serde::Serialize;

use crate::checkplot::Checkplot;
use crate::codec::{ImageSurface, decode_image};
use crate::method::MethodTag;

/// Width of the layout grid the panel columns share.
pub const GRID_UNITS: f64 = 12.0;

/// The candidate currently adopted as the object's period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BestCandidate {
    pub method: MethodTag,
    pub slot: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodogramPanel {
    pub method: MethodTag,
    pub title: &'static str,
    pub image: Option<ImageSurface>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatePanel {
    pub method: MethodTag,
    pub candidate_index: usize,
    pub period: f64,
    pub epoch: f64,
    pub image: Option<ImageSurface>,
    pub is_current_best: bool,
}

/// One method's column: its periodogram followed by its candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelGroup {
    pub method: MethodTag,
    /// Share of [`GRID_UNITS`]; may be fractional.
    pub column_width: f64,
    pub periodogram: PeriodogramPanel,
    pub candidates: Vec<CandidatePanel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelLayout {
    pub column_width: f64,
    pub groups: Vec<PanelGroup>,
}

impl PanelLayout {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every candidate panel across all groups, in display order.
    pub fn candidates(&self) -> impl Iterator<Item = &CandidatePanel> {
        self.groups.iter().flat_map(|g| g.candidates.iter())
    }

    /// The candidate panel marked as current best, if any.
    #[must_use]
    pub fn current_best(&self) -> Option<&CandidatePanel> {
        self.candidates().find(|c| c.is_current_best)
    }
}

/// Resolve the display order of the methods present in `cp`.
///
/// Follows `priority` first (duplicates ignored), then appends any present
/// method the priority list does not name, in default order.
#[must_use]
pub fn method_order(cp: &Checkplot, priority: &[MethodTag]) -> Vec<MethodTag> {
    let mut order: Vec<MethodTag> = Vec::with_capacity(cp.methods.len());
    for tag in priority {
        if cp.methods.contains_key(tag) && !order.contains(tag) {
            order.push(*tag);
        }
    }
    for tag in cp.present_methods() {
        if !order.contains(&tag) {
            order.push(tag);
        }
    }
    order
}

/// Build the panel description for `cp`.
#[must_use]
pub fn build_panels(
    cp: &Checkplot,
    best: Option<BestCandidate>,
    priority: &[MethodTag],
    image_mime: &str,
) -> PanelLayout {
    let order = method_order(cp, priority);
    if order.is_empty() {
        return PanelLayout::default();
    }

    #[allow(clippy::cast_precision_loss)]
    let column_width = GRID_UNITS / order.len() as f64;

    let groups = order
        .into_iter()
        .filter_map(|method| cp.method(method).map(|block| (method, block)))
        .map(|(method, block)| PanelGroup {
            method,
            column_width,
            periodogram: PeriodogramPanel {
                method,
                title: method.label(),
                image: block
                    .periodogram
                    .as_deref()
                    .map(|p| decode_image(p, image_mime)),
            },
            candidates: block
                .candidates
                .iter()
                .map(|c| CandidatePanel {
                    method,
                    candidate_index: c.slot,
                    period: c.period,
                    epoch: c.epoch,
                    image: c.plot.as_deref().map(|p| decode_image(p, image_mime)),
                    is_current_best: best == Some(BestCandidate { method, slot: c.slot }),
                })
                .collect(),
        })
        .collect();

    PanelLayout {
        column_width,
        groups,
    }
}
