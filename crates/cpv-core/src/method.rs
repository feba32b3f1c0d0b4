//! Analysis-method vocabulary.
//!
//! Checkplot bundles carry at most one block per period-search method. The
//! vocabulary is closed: anything else in the bundle is not a method block.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Period-search method that produced a periodogram block.
///
/// Variant order is the default panel priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodTag {
    /// Phase dispersion minimization.
    Pdm,
    /// Generalized Lomb-Scargle.
    Gls,
    /// Box least squares.
    Bls,
    /// Analysis of variance.
    Aov,
}

impl MethodTag {
    /// Every known tag, in default priority order.
    pub const ALL: [Self; 4] = [Self::Pdm, Self::Gls, Self::Bls, Self::Aov];

    /// Return the key used for this method in the checkplot bundle.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdm => "pdm",
            Self::Gls => "gls",
            Self::Bls => "bls",
            Self::Aov => "aov",
        }
    }

    /// Human-readable method name for panel headings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pdm => "Stellingwerf PDM",
            Self::Gls => "Generalized Lomb-Scargle",
            Self::Bls => "Box Least Squares",
            Self::Aov => "Schwarzenberg-Czerny AoV",
        }
    }
}

impl fmt::Display for MethodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdm" => Ok(Self::Pdm),
            "gls" => Ok(Self::Gls),
            "bls" => Ok(Self::Bls),
            "aov" => Ok(Self::Aov),
            other => Err(CoreError::UnknownMethod(other.to_string())),
        }
    }
}
