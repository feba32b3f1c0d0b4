//! # cpv-review
//!
//! Review-session state for cpview.
//!
//! - [`store`]: the single owned checkplot under review
//! - [`update_log`]: append-only record of accepted saves
//! - [`queue`]: index ⇄ identifier navigation of the review queue
//! - [`controller`]: the load/save state machine that ties them together
//!   and guarantees a checkplot is saved before the next one is loaded

pub mod backend;
pub mod controller;
pub mod error;
pub mod queue;
pub mod state;
pub mod store;
pub mod update_log;

pub use backend::Backend;
pub use controller::{Controller, ControllerOptions, EditForm, Notice, NoticeLevel, Outcome};
pub use error::{ControllerError, StoreError, UpdateLogError};
pub use queue::{QueueNavigator, ReviewQueue};
pub use state::Phase;
pub use store::{CheckplotStore, Edit};
pub use update_log::UpdateLog;
