//! Controller phases.
//!
//! ```text
//! idle ──request──▶ loading ──ok──▶ loaded
//!   ▲                  │               │ request
//!   └───fetch failed───┤               ▼
//!                      │        navigation_pending
//!    loaded ◀──failed──┘               │
//!                                      ▼
//!    loaded ◀──rejected / no next── saving ──accepted + next──▶ loading
//! ```

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Saving,
    NavigationPending,
}

impl Phase {
    /// Valid next phases from the current phase.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Idle => &[Self::Loading],
            Self::Loading => &[Self::Loaded, Self::Idle],
            Self::Loaded => &[Self::NavigationPending, Self::Saving],
            Self::NavigationPending => &[Self::Saving],
            Self::Saving => &[Self::Loaded, Self::Loading],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Phases a controller only passes through inside a single operation.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Loading | Self::Saving | Self::NavigationPending)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Saving => "saving",
            Self::NavigationPending => "navigation_pending",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Phase::Idle, Phase::Loading, true)]
    #[case(Phase::Idle, Phase::Saving, false)]
    #[case(Phase::Loaded, Phase::Loading, false)]
    #[case(Phase::Loaded, Phase::NavigationPending, true)]
    #[case(Phase::NavigationPending, Phase::Loading, false)]
    #[case(Phase::NavigationPending, Phase::Saving, true)]
    #[case(Phase::Saving, Phase::Loading, true)]
    #[case(Phase::Saving, Phase::Idle, false)]
    #[case(Phase::Loading, Phase::Idle, true)]
    fn transitions(#[case] from: Phase, #[case] to: Phase, #[case] allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn loaded_cannot_skip_the_save_gate() {
        // The only way from loaded to loading is through saving.
        assert!(!Phase::Loaded.can_transition_to(Phase::Loading));
        assert!(!Phase::NavigationPending.can_transition_to(Phase::Loading));
    }

    #[test]
    fn stable_phases() {
        assert!(!Phase::Idle.is_transient());
        assert!(!Phase::Loaded.is_transient());
        assert!(Phase::Saving.is_transient());
    }
}
