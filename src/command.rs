//! The session's complete command vocabulary.
//!
//! Every user-facing operation is a [`Command`]. Commands are built
//! directly or parsed from one line of text with [`Command::parse`], then
//! passed to [`Session::execute`](crate::session::Session::execute).
//!
//! Text form: a command word followed by positional arguments and
//! `key=value` keywords, separated by whitespace. Double quotes group a
//! name containing spaces.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{SceneError, SceneResult};
use crate::options::RecordingOptions;
use crate::recording::{EncodeParams, RecordParams, ResetMode};

/// One user-level operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ── Scenes ───────────────────────────────────────────────────────────
    /// Save the current view as a named scene.
    SaveScene(String),
    /// Show a saved scene.
    RestoreScene(String),
    /// Delete a saved scene (and its keyframe).
    DeleteScene(String),
    /// List saved scenes.
    ListScenes,
    /// Delete every saved scene.
    ClearScenes,

    // ── Keyframes ────────────────────────────────────────────────────────
    /// Save a scene and place a keyframe for it.
    AddKeyframe {
        /// Scene and keyframe name.
        name: String,
        /// Time in seconds; after the last keyframe when omitted.
        time: Option<f64>,
    },
    /// Move a keyframe.
    EditKeyframe {
        /// Keyframe name.
        name: String,
        /// New time in seconds.
        time: f64,
    },
    /// Remove a keyframe.
    DeleteKeyframe(String),
    /// List keyframes with their times.
    ListKeyframes,
    /// Remove every keyframe.
    Clear,

    // ── Timeline ─────────────────────────────────────────────────────────
    /// Change the timeline length.
    SetLength(f64),
    /// Open empty time.
    InsertTime {
        /// Where the new time starts.
        target: f64,
        /// Seconds to insert.
        amount: f64,
    },
    /// Cut the time between two points.
    RemoveTime {
        /// Start of the removed window.
        start: f64,
        /// End of the removed window.
        end: f64,
    },

    // ── Playback ─────────────────────────────────────────────────────────
    /// Show the timeline at one time.
    Preview(f64),
    /// Start playback.
    Play {
        /// Where to start; the start (or end when reversed) if omitted.
        start_time: Option<f64>,
        /// Play toward the start.
        reverse: bool,
    },
    /// Stop playback (not recording).
    Stop,
    /// Record the timeline to a movie.
    Record {
        /// Capture settings.
        record: RecordParams,
        /// Encoding settings.
        encode: EncodeParams,
    },
    /// Stop a recording and encode what was captured.
    StopRecording,
}

/// Split a command line into words, keeping double-quoted runs together.
fn tokenize(line: &str) -> SceneResult<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_word = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err(SceneError::Command("unterminated quote".to_owned()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Positional arguments and keywords of one command line.
struct Args<'a> {
    command: &'a str,
    positional: Vec<&'a str>,
    keywords: Vec<(&'a str, &'a str)>,
}

impl<'a> Args<'a> {
    fn new(command: &'a str, words: &'a [String]) -> Self {
        let mut positional = Vec::new();
        let mut keywords = Vec::new();
        for word in words {
            match word.split_once('=') {
                Some((key, value)) if !key.is_empty() => keywords.push((key, value)),
                _ => positional.push(word.as_str()),
            }
        }
        Self {
            command,
            positional,
            keywords,
        }
    }

    fn error(&self, msg: &str) -> SceneError {
        SceneError::Command(format!("{}: {msg}", self.command))
    }

    fn expect_positional(&self, count: usize, usage: &str) -> SceneResult<()> {
        if self.positional.len() == count {
            Ok(())
        } else {
            Err(self.error(&format!("usage: {usage}")))
        }
    }

    fn name(&self, index: usize) -> SceneResult<String> {
        self.positional
            .get(index)
            .map(|s| (*s).to_owned())
            .ok_or_else(|| self.error("missing name"))
    }

    fn number(&self, index: usize) -> SceneResult<f64> {
        let raw = self
            .positional
            .get(index)
            .ok_or_else(|| self.error("missing number"))?;
        self.parse(raw)
    }

    fn parse<T: FromStr>(&self, raw: &str) -> SceneResult<T> {
        raw.parse()
            .map_err(|_| self.error(&format!("cannot parse {raw:?}")))
    }

    fn keyword<T: FromStr>(&self, key: &str) -> SceneResult<Option<T>> {
        self.keywords
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| self.parse(v))
            .transpose()
    }

    fn flag(&self, key: &str) -> SceneResult<Option<bool>> {
        self.keywords
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| match v.to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "1" => Ok(true),
                "false" | "f" | "no" | "0" => Ok(false),
                _ => Err(self.error(&format!("{key} expects true or false"))),
            })
            .transpose()
    }

    fn only_keywords(&self, allowed: &[&str]) -> SceneResult<()> {
        match self.keywords.iter().find(|(k, _)| !allowed.contains(k)) {
            Some((k, _)) => Err(self.error(&format!("unknown keyword {k}"))),
            None => Ok(()),
        }
    }
}

const RECORD_KEYWORDS: &[&str] = &[
    "output",
    "format",
    "quality",
    "qscale",
    "bitrate",
    "framerate",
    "round_trip",
    "reset_mode",
    "wait",
    "verbose",
    "supersample",
    "width",
    "height",
    "limit",
];

impl Command {
    /// Parse one command line, using `recording` for unspecified movie
    /// settings.
    pub fn parse(line: &str, recording: &RecordingOptions) -> SceneResult<Self> {
        let words = tokenize(line)?;
        let Some((head, rest)) = words.split_first() else {
            return Err(SceneError::Command("empty command".to_owned()));
        };
        let args = Args::new(head, rest);

        match head.as_str() {
            "scene" => Self::parse_scene(&args),
            "scenes" => {
                args.only_keywords(&[])?;
                match args.positional.as_slice() {
                    [] => Ok(Self::ListScenes),
                    ["clear"] => Ok(Self::ClearScenes),
                    _ => Err(args.error("usage: scenes [clear]")),
                }
            }
            "keyframe" => Self::parse_keyframe(&args),
            "timeline" => {
                args.expect_positional(0, "timeline")?;
                Ok(Self::ListKeyframes)
            }
            "clear" => {
                args.expect_positional(0, "clear")?;
                Ok(Self::Clear)
            }
            "setLength" => {
                args.expect_positional(1, "setLength <seconds>")?;
                Ok(Self::SetLength(args.number(0)?))
            }
            "insertTime" => {
                args.expect_positional(2, "insertTime <target> <amount>")?;
                Ok(Self::InsertTime {
                    target: args.number(0)?,
                    amount: args.number(1)?,
                })
            }
            "removeTime" => {
                args.expect_positional(2, "removeTime <start> <end>")?;
                let (start, end) = (args.number(0)?, args.number(1)?);
                if end < start {
                    return Err(args.error("end must not be before start"));
                }
                Ok(Self::RemoveTime { start, end })
            }
            "preview" => {
                args.expect_positional(1, "preview <seconds>")?;
                Ok(Self::Preview(args.number(0)?))
            }
            "play" => {
                args.expect_positional(0, "play [start_time=<s>] [reverse=<bool>]")?;
                args.only_keywords(&["start_time", "reverse"])?;
                Ok(Self::Play {
                    start_time: args.keyword("start_time")?,
                    reverse: args.flag("reverse")?.unwrap_or(false),
                })
            }
            "stop" => {
                args.expect_positional(0, "stop")?;
                Ok(Self::Stop)
            }
            "record" => Self::parse_record(&args, recording),
            "stopRecording" => {
                args.expect_positional(0, "stopRecording")?;
                Ok(Self::StopRecording)
            }
            other => Err(SceneError::Command(format!("unknown command {other:?}"))),
        }
    }

    fn parse_scene(args: &Args<'_>) -> SceneResult<Self> {
        args.expect_positional(2, "scene save|restore|delete <name>")?;
        args.only_keywords(&[])?;
        let name = args.name(1)?;
        match args.positional[0] {
            "save" => Ok(Self::SaveScene(name)),
            "restore" => Ok(Self::RestoreScene(name)),
            "delete" => Ok(Self::DeleteScene(name)),
            action => Err(args.error(&format!(
                "action {action} not recognized; options are save, restore, delete"
            ))),
        }
    }

    fn parse_keyframe(args: &Args<'_>) -> SceneResult<Self> {
        args.expect_positional(2, "keyframe add|edit|delete <name> [time=<s>]")?;
        args.only_keywords(&["time"])?;
        let name = args.name(1)?;
        let time: Option<f64> = args.keyword("time")?;
        match args.positional[0] {
            "add" => Ok(Self::AddKeyframe { name, time }),
            "edit" => {
                let time = time.ok_or_else(|| args.error("edit needs time=<seconds>"))?;
                Ok(Self::EditKeyframe { name, time })
            }
            "delete" => Ok(Self::DeleteKeyframe(name)),
            action => Err(args.error(&format!(
                "action {action} not recognized; options are add, edit, delete"
            ))),
        }
    }

    fn parse_record(args: &Args<'_>, recording: &RecordingOptions) -> SceneResult<Self> {
        args.only_keywords(RECORD_KEYWORDS)?;
        let mut encode = EncodeParams::from_options(recording);
        let mut record = RecordParams::from_options(recording);

        encode.output = args
            .positional
            .iter()
            .map(PathBuf::from)
            .chain(
                args.keywords
                    .iter()
                    .filter(|(k, _)| *k == "output")
                    .map(|(_, v)| PathBuf::from(v)),
            )
            .collect();
        if let Some(format) = args.keyword::<String>("format")? {
            encode.format = Some(format);
        }
        if let Some(quality) = args.keyword::<String>("quality")? {
            encode.quality = Some(quality);
        }
        encode.qscale = args.keyword("qscale")?;
        encode.bitrate = args.keyword("bitrate")?;
        if let Some(framerate) = args.keyword::<f32>("framerate")? {
            if !(framerate.is_finite() && framerate > 0.0) {
                return Err(args.error("framerate must be positive"));
            }
            encode.framerate = framerate;
        }
        if let Some(mode) = args.keyword::<String>("reset_mode")? {
            encode.reset_mode = mode.parse::<ResetMode>()?;
        }
        encode.round_trip = args.flag("round_trip")?.unwrap_or(encode.round_trip);
        encode.wait = args.flag("wait")?.unwrap_or(false);
        encode.verbose = args.flag("verbose")?.unwrap_or(false);

        if let Some(supersample) = args.keyword::<u32>("supersample")? {
            record.supersample = supersample.max(1);
        }
        record.size = match (args.keyword("width")?, args.keyword("height")?) {
            (Some(w), Some(h)) => Some((w, h)),
            (None, None) => None,
            _ => return Err(args.error("width and height go together")),
        };
        record.limit = args.keyword("limit")?;

        Ok(Self::Record { record, encode })
    }
}
