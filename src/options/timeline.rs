use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Timeline", inline)]
#[serde(default)]
/// Frame rate and length bounds for new timelines.
pub struct TimelineOptions {
    /// Frames per second of the interpolation schedule.
    #[schemars(title = "Frame Rate", range(min = 1, max = 240))]
    pub fps: u32,
    /// Length in seconds of a new, empty timeline.
    #[schemars(title = "Default Length", range(min = 0.1, max = 300.0), extend("step" = 0.5))]
    pub default_length: f64,
    /// Hard upper bound on timeline length in seconds.
    #[schemars(skip)]
    pub max_length: f64,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            default_length: 5.0,
            max_length: 300.0,
        }
    }
}
