use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::recording::ResetMode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Recording", inline)]
#[serde(default)]
/// Defaults for movie recording; `record` arguments override them.
pub struct RecordingOptions {
    /// Movie frame rate.
    #[schemars(title = "Frame Rate", range(min = 1.0, max = 120.0), extend("step" = 1.0))]
    pub framerate: f32,
    /// Supersampling factor per axis for captured frames.
    #[schemars(title = "Supersample", range(min = 1, max = 4))]
    pub supersample: u32,
    /// Container/codec name; unset uses the recorder's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Named quality preset; unset uses the recorder's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Append reversed frames so movies end where they start.
    #[schemars(title = "Round Trip")]
    pub round_trip: bool,
    /// What the recorder does with frames after encoding.
    #[schemars(skip)]
    pub reset_mode: ResetMode,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            framerate: 25.0,
            supersample: 3,
            format: None,
            quality: None,
            round_trip: false,
            reset_mode: ResetMode::Clear,
        }
    }
}
