//! Review session settings.

use std::path::PathBuf;

use cpv_core::MethodTag;
use cpv_core::codec::DEFAULT_IMAGE_MIME;
use serde::{Deserialize, Serialize};

fn default_method_priority() -> Vec<MethodTag> {
    MethodTag::ALL.to_vec()
}

fn default_image_mime() -> String {
    DEFAULT_IMAGE_MIME.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewConfig {
    /// Column order for periodogram panels.
    #[serde(default = "default_method_priority")]
    pub method_priority: Vec<MethodTag>,

    /// MIME type used when wrapping image payloads.
    #[serde(default = "default_image_mime")]
    pub image_mime: String,

    /// JSONL file mirroring the update log. Empty = in-memory only.
    #[serde(default)]
    pub update_log_path: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            method_priority: default_method_priority(),
            image_mime: default_image_mime(),
            update_log_path: String::new(),
        }
    }
}

impl ReviewConfig {
    #[must_use]
    pub fn update_log_path(&self) -> Option<PathBuf> {
        (!self.update_log_path.is_empty()).then(|| PathBuf::from(&self.update_log_path))
    }
}
