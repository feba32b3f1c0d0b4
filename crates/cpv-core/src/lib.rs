//! # cpv-core
//!
//! Core types for cpview, the checkplot review client.
//!
//! This crate provides the pieces shared by every other cpview crate:
//! - The checkplot data model, validated once at load time
//! - The closed analysis-method vocabulary with its default priority order
//! - The identifier/image codec used for URL embedding and display
//! - The pure panel builder (checkplot → panel description)
//! - Update records appended after every accepted save
//! - Cross-cutting error types

pub mod checkplot;
pub mod codec;
pub mod errors;
pub mod method;
pub mod panels;
pub mod update;

pub use checkplot::{CandidatePeriod, Checkplot, MethodBlock, ObjectInfo, VarInfo, Variability};
pub use errors::CoreError;
pub use method::MethodTag;
pub use panels::{BestCandidate, CandidatePanel, PanelGroup, PanelLayout, PeriodogramPanel};
pub use update::UpdateRecord;
