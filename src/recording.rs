//! The movie-recording collaborator.
//!
//! The animation manager starts a recorder when a recording begins,
//! reports each played frame, and stops and encodes when playback reaches
//! its last frame. Codec and container work happen behind
//! [`MovieRecorder`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::options::RecordingOptions;

/// What happens to the captured frames after encoding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ResetMode {
    /// Discard captured frames and stop capturing.
    #[default]
    Clear,
    /// Keep captured frames so a later encode can reuse them.
    Keep,
    /// Leave the recorder exactly as it is.
    None,
}

impl fmt::Display for ResetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clear => "clear",
            Self::Keep => "keep",
            Self::None => "none",
        })
    }
}

impl FromStr for ResetMode {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clear" => Ok(Self::Clear),
            "keep" => Ok(Self::Keep),
            "none" => Ok(Self::None),
            other => Err(SceneError::Command(format!(
                "unknown reset mode {other:?} (expected clear, keep, or none)"
            ))),
        }
    }
}

/// Frame capture settings passed to [`MovieRecorder::start`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordParams {
    /// Output image size; `None` uses the window size.
    pub size: Option<(u32, u32)>,
    /// Supersampling factor per axis.
    pub supersample: u32,
    /// Stop capturing after this many frames.
    pub limit: Option<u32>,
}

impl RecordParams {
    /// Capture settings from the configured defaults.
    pub fn from_options(options: &RecordingOptions) -> Self {
        Self {
            size: None,
            supersample: options.supersample,
            limit: None,
        }
    }
}

/// Encoding settings passed to [`MovieRecorder::encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    /// Output files; empty means the recorder's default name.
    pub output: Vec<PathBuf>,
    /// Container/codec name, e.g. `h264`.
    pub format: Option<String>,
    /// Named quality preset.
    pub quality: Option<String>,
    /// Codec quantizer scale.
    pub qscale: Option<u32>,
    /// Target bit rate in Kbit/s.
    pub bitrate: Option<f32>,
    /// Movie frame rate.
    pub framerate: f32,
    /// Append the frames in reverse so the movie ends where it started.
    pub round_trip: bool,
    /// What to do with captured frames afterwards.
    pub reset_mode: ResetMode,
    /// Block until encoding finishes.
    pub wait: bool,
    /// Log encoder output.
    pub verbose: bool,
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self::from_options(&RecordingOptions::default())
    }
}

impl EncodeParams {
    /// Encoding settings from the configured defaults.
    pub fn from_options(options: &RecordingOptions) -> Self {
        Self {
            output: Vec::new(),
            format: options.format.clone(),
            quality: options.quality.clone(),
            qscale: None,
            bitrate: None,
            framerate: options.framerate,
            round_trip: options.round_trip,
            reset_mode: options.reset_mode,
            wait: false,
            verbose: false,
        }
    }
}

/// Captures rendered frames and encodes them into a movie.
pub trait MovieRecorder {
    /// Begin capturing frames.
    fn start(&mut self, params: &RecordParams) -> SceneResult<()>;

    /// Called after each frame drawn while recording.
    fn capture_frame(&mut self) -> SceneResult<()> {
        Ok(())
    }

    /// Stop capturing.
    fn stop(&mut self) -> SceneResult<()>;

    /// Write captured frames to a movie file.
    fn encode(&mut self, params: &EncodeParams) -> SceneResult<()>;
}

/// A recorder that logs calls and counts frames without writing anything.
#[derive(Debug, Default)]
pub struct LoggingRecorder {
    capturing: bool,
    frames: usize,
    starts: usize,
    encodes: Vec<EncodeParams>,
}

impl LoggingRecorder {
    /// A recorder that has never been started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether frames are currently being captured.
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Frames captured since the last reset.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// How many times capture was started.
    pub fn starts(&self) -> usize {
        self.starts
    }

    /// Every encode request received, oldest first.
    pub fn encodes(&self) -> &[EncodeParams] {
        &self.encodes
    }
}

impl MovieRecorder for LoggingRecorder {
    fn start(&mut self, params: &RecordParams) -> SceneResult<()> {
        if self.capturing {
            return Err(SceneError::Recorder("already capturing".to_owned()));
        }
        log::info!(
            "movie capture started (supersample {}, size {:?})",
            params.supersample,
            params.size
        );
        self.capturing = true;
        self.starts += 1;
        Ok(())
    }

    fn capture_frame(&mut self) -> SceneResult<()> {
        if self.capturing {
            self.frames += 1;
        }
        Ok(())
    }

    fn stop(&mut self) -> SceneResult<()> {
        log::info!("movie capture stopped after {} frames", self.frames);
        self.capturing = false;
        Ok(())
    }

    fn encode(&mut self, params: &EncodeParams) -> SceneResult<()> {
        if self.frames == 0 {
            return Err(SceneError::Recorder("no frames to encode".to_owned()));
        }
        let frames = if params.round_trip {
            self.frames * 2
        } else {
            self.frames
        };
        log::info!(
            "encoding {frames} frames at {} fps to {:?} (format {}, reset {})",
            params.framerate,
            params.output,
            params.format.as_deref().unwrap_or("default"),
            params.reset_mode
        );
        if params.reset_mode == ResetMode::Clear {
            self.frames = 0;
        }
        self.encodes.push(params.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_mode_parses_and_displays() {
        for mode in [ResetMode::Clear, ResetMode::Keep, ResetMode::None] {
            assert_eq!(mode.to_string().parse::<ResetMode>().unwrap(), mode);
        }
        assert!("sometimes".parse::<ResetMode>().is_err());
    }

    #[test]
    fn encode_defaults_follow_options() {
        let params = EncodeParams::default();
        assert_eq!(params.framerate, 25.0);
        assert_eq!(params.reset_mode, ResetMode::Clear);
        assert!(!params.round_trip);
        assert!(params.output.is_empty());
    }

    #[test]
    fn logging_recorder_counts_frames() {
        let mut recorder = LoggingRecorder::new();
        recorder.capture_frame().unwrap();
        assert_eq!(recorder.frames(), 0);

        recorder.start(&RecordParams::default()).unwrap();
        assert!(recorder.start(&RecordParams::default()).is_err());
        recorder.capture_frame().unwrap();
        recorder.capture_frame().unwrap();
        recorder.stop().unwrap();
        assert!(!recorder.is_capturing());
        assert_eq!(recorder.frames(), 2);

        recorder.encode(&EncodeParams::default()).unwrap();
        assert_eq!(recorder.frames(), 0);
        assert_eq!(recorder.encodes().len(), 1);
        assert!(recorder.encode(&EncodeParams::default()).is_err());
    }

    #[test]
    fn keep_mode_retains_frames() {
        let mut recorder = LoggingRecorder::new();
        recorder.start(&RecordParams::default()).unwrap();
        recorder.capture_frame().unwrap();
        recorder.stop().unwrap();
        let params = EncodeParams {
            reset_mode: ResetMode::Keep,
            ..EncodeParams::default()
        };
        recorder.encode(&params).unwrap();
        assert_eq!(recorder.frames(), 1);
    }
}
