//! Timeline and recording options with TOML preset support.
//!
//! Options serialize to/from TOML so a host can keep presets on disk. All
//! sections use `#[serde(default)]`, so a file overriding only
//! `[recording]` leaves the timeline settings at their defaults.

mod recording;
mod timeline;

use std::path::Path;

pub use recording::RecordingOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use timeline::TimelineOptions;

use crate::error::SceneError;

/// Top-level options container.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Frame rate and length bounds.
    pub timeline: TimelineOptions,
    /// Movie recording defaults.
    pub recording: RecordingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path).map_err(SceneError::Io)?;
        Self::from_toml(&content)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, SceneError> {
        toml::from_str(content)
            .map_err(|e| SceneError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SceneError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SceneError::Io)?;
        }
        std::fs::write(path, content).map_err(SceneError::Io)
    }
}
