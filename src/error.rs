//! Crate-level error types.

use std::fmt;

/// Errors produced by the viso-scenes crate.
///
/// Validation variants reject a mutation outright: whenever one of them is
/// returned, timeline and scene state are exactly as they were before the
/// call.
#[derive(Debug)]
pub enum SceneError {
    /// A time value was negative, non-finite, or outside the allowed range.
    InvalidTime {
        /// The offending time in seconds.
        time: f64,
        /// Human-readable description of the allowed range.
        reason: String,
    },
    /// Another keyframe already sits at this time.
    TimeOccupied {
        /// The contested time in seconds.
        time: f64,
        /// Name of the keyframe already holding it.
        holder: String,
    },
    /// A keyframe with this name is already on the timeline.
    KeyframeExists(String),
    /// No keyframe with this name is on the timeline.
    KeyframeNotFound(String),
    /// No scene with this name is stored.
    SceneNotFound(String),
    /// A requested timeline length is not allowed.
    LengthOutOfRange {
        /// The requested length in seconds.
        length: f64,
        /// Why the length was rejected.
        reason: String,
    },
    /// A time-removal window contains a keyframe.
    TimeBlocked {
        /// Start of the removal window.
        start: f64,
        /// End of the removal window.
        end: f64,
        /// Name of the blocking keyframe.
        keyframe: String,
    },
    /// The operation needs at least one keyframe.
    NoKeyframes,
    /// Playback or recording is in progress.
    Busy(&'static str),
    /// Two scenes do not reference the same models and cannot be blended.
    NotInterpolatable(String),
    /// A stored record was written by a different format version.
    VersionMismatch {
        /// What kind of record was being read.
        record: &'static str,
        /// Version found in the record.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },
    /// The movie-recording collaborator failed.
    Recorder(String),
    /// Malformed command input.
    Command(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// JSON scene or timeline serialization failure.
    Serialization(serde_json::Error),
    /// Generic I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTime { time, reason } => {
                write!(f, "invalid time {time}: {reason}")
            }
            Self::TimeOccupied { time, holder } => {
                write!(f, "time {time} is already taken by keyframe {holder}")
            }
            Self::KeyframeExists(name) => {
                write!(f, "keyframe {name} already exists")
            }
            Self::KeyframeNotFound(name) => {
                write!(f, "keyframe {name} does not exist")
            }
            Self::SceneNotFound(name) => write!(f, "scene {name} does not exist"),
            Self::LengthOutOfRange { length, reason } => {
                write!(f, "invalid timeline length {length}: {reason}")
            }
            Self::TimeBlocked {
                start,
                end,
                keyframe,
            } => write!(
                f,
                "cannot remove time {start}..{end}: keyframe {keyframe} is in the way"
            ),
            Self::NoKeyframes => write!(f, "the timeline has no keyframes"),
            Self::Busy(what) => write!(f, "busy: {what}"),
            Self::NotInterpolatable(msg) => {
                write!(f, "scenes are not interpolatable: {msg}")
            }
            Self::VersionMismatch {
                record,
                found,
                expected,
            } => write!(
                f,
                "{record} format version {found} does not match supported version {expected}"
            ),
            Self::Recorder(msg) => write!(f, "movie recorder error: {msg}"),
            Self::Command(msg) => write!(f, "command error: {msg}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Serialization(e) => write!(f, "serialization error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Shorthand for results carrying a [`SceneError`].
pub type SceneResult<T> = Result<T, SceneError>;
