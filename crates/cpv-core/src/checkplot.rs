//! The checkplot bundle.
//!
//! A checkplot arrives from the backend as a loosely-typed JSON object whose
//! method blocks (`pdm`, `gls`, ...) may or may not be present. It is
//! validated once by [`Checkplot::from_value`] into a typed model; nothing
//! downstream probes the raw JSON again.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::CoreError;
use crate::method::MethodTag;

/// Maximum number of candidate periods a method block may carry.
pub const MAX_CANDIDATES: usize = 5;

/// Backend values are occasionally `null` where a string is expected.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Variability
// ---------------------------------------------------------------------------

/// Reviewer verdict on whether the object is variable.
///
/// Serialized as JSON `true` / `false` / `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Variability {
    Variable,
    NotVariable,
    #[default]
    Unknown,
}

impl Variability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Variable => "true",
            Self::NotVariable => "false",
            Self::Unknown => "unknown",
        }
    }
}

impl From<Option<bool>> for Variability {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Variable,
            Some(false) => Self::NotVariable,
            None => Self::Unknown,
        }
    }
}

impl From<Variability> for Option<bool> {
    fn from(value: Variability) -> Self {
        match value {
            Variability::Variable => Some(true),
            Variability::NotVariable => Some(false),
            Variability::Unknown => None,
        }
    }
}

impl fmt::Display for Variability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variability {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "var" | "variable" => Ok(Self::Variable),
            "false" | "no" | "notvar" | "not-variable" => Ok(Self::NotVariable),
            "unknown" | "maybe" | "null" | "?" => Ok(Self::Unknown),
            other => Err(CoreError::InvalidCheckplot(format!(
                "unrecognized variability flag '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Object and variability info
// ---------------------------------------------------------------------------

/// Astrometric and photometric catalog fields.
///
/// Keys this client does not edit are kept in `extra` and written back
/// unchanged on save. Absent catalog fields stay absent in the save payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ra: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decl: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmra: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmdecl: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmag: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmag: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdssg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdssr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdssi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jmag: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmag: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kmag: Option<f64>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub objecttags: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Variability classification and the adopted period/epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VarInfo {
    #[serde(default)]
    pub objectisvar: Variability,
    /// Adopted period in days.
    #[serde(default)]
    pub varperiod: Option<f64>,
    #[serde(default)]
    pub varepoch: Option<f64>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub vartags: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Method blocks
// ---------------------------------------------------------------------------

/// One period/epoch hypothesis and its phased light curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatePeriod {
    /// Position assigned by the analysis; slot 0 is the top candidate.
    pub slot: usize,
    pub period: f64,
    pub epoch: f64,
    /// Base64 phased light-curve image.
    pub plot: Option<String>,
}

#[derive(Deserialize)]
struct RawCandidate {
    period: f64,
    epoch: f64,
    #[serde(default)]
    plot: Option<String>,
}

/// Periodogram and candidate periods produced by one method.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MethodBlock {
    /// Base64 periodogram image.
    pub periodogram: Option<String>,
    /// Candidates in slot order, at most [`MAX_CANDIDATES`].
    pub candidates: Vec<CandidatePeriod>,
}

impl MethodBlock {
    /// Candidate stored in `slot`, if the analysis reported one there.
    #[must_use]
    pub fn candidate(&self, slot: usize) -> Option<&CandidatePeriod> {
        self.candidates.iter().find(|c| c.slot == slot)
    }

    /// Parse a method block from its bundle value.
    ///
    /// Candidate slots are the keys `"0"` through `"4"`. Missing or `null`
    /// slots are normal. A slot that is present but malformed is skipped
    /// with a warning so that one bad candidate does not hide the object.
    fn from_value(tag: MethodTag, value: Value) -> Result<Self, CoreError> {
        let Value::Object(mut fields) = value else {
            return Err(CoreError::InvalidMethodBlock {
                method: tag.to_string(),
                reason: "expected a JSON object".to_string(),
            });
        };

        let periodogram = match fields.remove("periodogram") {
            Some(Value::String(image)) => Some(image),
            _ => None,
        };

        let mut candidates = Vec::new();
        for slot in 0..MAX_CANDIDATES {
            let Some(raw) = fields.remove(&slot.to_string()) else {
                continue;
            };
            if raw.is_null() {
                continue;
            }
            match serde_json::from_value::<RawCandidate>(raw) {
                Ok(c) => candidates.push(CandidatePeriod {
                    slot,
                    period: c.period,
                    epoch: c.epoch,
                    plot: c.plot,
                }),
                Err(e) => {
                    tracing::warn!(method = %tag, slot, %e, "skipping malformed candidate");
                }
            }
        }

        Ok(Self {
            periodogram,
            candidates,
        })
    }
}

// ---------------------------------------------------------------------------
// Checkplot
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawCheckplot {
    objectid: String,
    #[serde(default)]
    objectinfo: ObjectInfo,
    #[serde(default)]
    varinfo: VarInfo,
    #[serde(default, deserialize_with = "nullable_string")]
    objectcomments: String,
    #[serde(default)]
    finderchart: Option<String>,
    #[serde(default)]
    magseries: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// The per-object review bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checkplot {
    pub objectid: String,
    pub objectinfo: ObjectInfo,
    pub varinfo: VarInfo,
    pub objectcomments: String,
    pub finderchart: Option<String>,
    pub magseries: Option<String>,
    pub methods: BTreeMap<MethodTag, MethodBlock>,
}

/// Body of the `cpcontents` form field sent on save.
#[derive(Debug, Serialize)]
pub struct SaveContents<'a> {
    pub objectid: &'a str,
    pub objectinfo: &'a ObjectInfo,
    pub varinfo: &'a VarInfo,
    pub comments: &'a str,
}

impl Checkplot {
    /// Validate a raw bundle into a typed checkplot.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] if the bundle is not an object, lacks an
    /// `objectid`, or a known method key holds something other than an
    /// object.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        if !value.is_object() {
            return Err(CoreError::InvalidCheckplot(
                "expected a JSON object".to_string(),
            ));
        }
        let raw: RawCheckplot =
            serde_json::from_value(value).map_err(|e| CoreError::InvalidCheckplot(e.to_string()))?;
        let mut rest = raw.rest;

        let mut methods = BTreeMap::new();
        for tag in MethodTag::ALL {
            match rest.remove(tag.as_str()) {
                None | Some(Value::Null) => {}
                Some(block) => {
                    methods.insert(tag, MethodBlock::from_value(tag, block)?);
                }
            }
        }

        if !rest.is_empty() {
            tracing::debug!(
                objectid = %raw.objectid,
                keys = ?rest.keys().collect::<Vec<_>>(),
                "ignoring unrecognized checkplot keys"
            );
        }

        Ok(Self {
            objectid: raw.objectid,
            objectinfo: raw.objectinfo,
            varinfo: raw.varinfo,
            objectcomments: raw.objectcomments,
            finderchart: raw.finderchart,
            magseries: raw.magseries,
            methods,
        })
    }

    #[must_use]
    pub fn method(&self, tag: MethodTag) -> Option<&MethodBlock> {
        self.methods.get(&tag)
    }

    /// Tags of the method blocks present, in default order.
    pub fn present_methods(&self) -> impl Iterator<Item = MethodTag> + '_ {
        self.methods.keys().copied()
    }

    /// First candidate (in default method order) whose period and epoch
    /// equal the adopted `varperiod`/`varepoch` exactly.
    #[must_use]
    pub fn candidate_matching_varinfo(&self) -> Option<(MethodTag, usize)> {
        let (period, epoch) = (self.varinfo.varperiod?, self.varinfo.varepoch?);
        self.methods.iter().find_map(|(tag, block)| {
            block
                .candidates
                .iter()
                .find(|c| {
                    c.period.to_bits() == period.to_bits() && c.epoch.to_bits() == epoch.to_bits()
                })
                .map(|c| (*tag, c.slot))
        })
    }

    /// Snapshot of the editable parts, shaped for the backend update call.
    #[must_use]
    pub fn save_contents(&self) -> SaveContents<'_> {
        SaveContents {
            objectid: &self.objectid,
            objectinfo: &self.objectinfo,
            varinfo: &self.varinfo,
            comments: &self.objectcomments,
        }
    }
}
