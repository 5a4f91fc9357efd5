//! Keyframes on a bounded timeline.
//!
//! A [`Timeline`] owns keyframes sorted by time, the timeline length, and
//! the frame rate. Every mutator validates first and changes nothing on
//! failure. The per-frame [`Schedule`] is derived lazily and dropped by
//! every mutation.

mod schedule;

use serde::{Deserialize, Serialize};

pub use schedule::{LerpStep, Schedule};

use crate::error::{SceneError, SceneResult};
use crate::options::TimelineOptions;
use crate::scene::Thumbnail;
use crate::util::cached::Cached;

/// Two keyframe times closer than this are the same time.
const TIME_EPSILON: f64 = 1e-9;

fn same_time(a: f64, b: f64) -> bool {
    (a - b).abs() < TIME_EPSILON
}

/// A scene placed on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    /// Name of the scene this keyframe shows.
    pub name: String,
    /// Position on the timeline in seconds.
    pub time: f64,
    /// Copy of the scene's thumbnail for timeline display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
}

impl Keyframe {
    /// A keyframe without a thumbnail.
    pub fn new(name: impl Into<String>, time: f64) -> Self {
        Self {
            name: name.into(),
            time,
            thumbnail: None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TimelineSnapshot {
    version: u32,
    keyframes: Vec<Keyframe>,
    length: f64,
}

/// Format seconds as `m:ss.cc`.
pub fn format_time(seconds: f64) -> String {
    let centis = (seconds.max(0.0) * 100.0).round() as u64;
    format!(
        "{}:{:02}.{:02}",
        centis / 6000,
        (centis / 100) % 60,
        centis % 100
    )
}

/// Ordered keyframes over a bounded length at a fixed frame rate.
#[derive(Debug, Clone)]
pub struct Timeline {
    keyframes: Vec<Keyframe>,
    length: f64,
    fps: u32,
    max_length: f64,
    schedule: Cached<Schedule>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::from_options(&TimelineOptions::default())
    }
}

impl Timeline {
    /// Persisted timeline format version.
    pub const FORMAT_VERSION: u32 = 1;

    /// An empty timeline.
    pub fn new(fps: u32, length: f64, max_length: f64) -> Self {
        Self {
            keyframes: Vec::new(),
            length,
            fps: fps.max(1),
            max_length,
            schedule: Cached::new(),
        }
    }

    /// An empty timeline configured from options.
    pub fn from_options(options: &TimelineOptions) -> Self {
        Self::new(options.fps, options.default_length, options.max_length)
    }

    /// Length in seconds.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Frames per second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Hard upper bound on the length.
    pub fn max_length(&self) -> f64 {
        self.max_length
    }

    /// Number of frame intervals in the timeline, `round(fps * length)`.
    pub fn frame_count(&self) -> usize {
        self.frames_in(self.length)
    }

    fn frames_in(&self, seconds: f64) -> usize {
        (seconds * f64::from(self.fps)).round().max(0.0) as usize
    }

    /// Keyframes sorted by time.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// The keyframe with this name.
    pub fn keyframe(&self, name: &str) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.name == name)
    }

    /// Whether a keyframe with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.keyframe(name).is_some()
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the timeline has no keyframes.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// One `name: m:ss.cc` line per keyframe, in time order.
    pub fn list_keyframes(&self) -> Vec<String> {
        self.keyframes
            .iter()
            .map(|k| format!("{}: {}", k.name, format_time(k.time)))
            .collect()
    }

    /// Whether `time` lies within `[0, length]`.
    pub fn time_in_range(&self, time: f64) -> bool {
        (0.0..=self.length).contains(&time)
    }

    /// Check that a keyframe may be placed at `time`, which may run past
    /// the length but not past the maximum length. `moving` names a keyframe
    /// whose own current time does not count as a collision.
    fn validate_time(&self, time: f64, moving: Option<&str>) -> SceneResult<()> {
        if !time.is_finite() || time < 0.0 || time > self.max_length {
            return Err(SceneError::InvalidTime {
                time,
                reason: format!("must be between 0 and {}", self.max_length),
            });
        }
        if let Some(holder) = self
            .keyframes
            .iter()
            .find(|k| Some(k.name.as_str()) != moving && same_time(k.time, time))
        {
            return Err(SceneError::TimeOccupied {
                time,
                holder: holder.name.clone(),
            });
        }
        Ok(())
    }

    fn extend_to(&mut self, time: f64) {
        if time > self.length {
            log::info!(
                "extending timeline from {} to {time} seconds",
                self.length
            );
            self.length = time;
        }
    }

    fn sort(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Time a new keyframe gets when none is given: one second after the
    /// last keyframe, or the start of an empty timeline.
    pub fn next_default_time(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.time + 1.0)
    }

    /// Place a keyframe for scene `name`. Returns the time it was placed
    /// at.
    ///
    /// Without a `time` the keyframe goes one second after the last. A time
    /// past the end extends the timeline, up to the maximum length.
    ///
    /// Callers check that the scene exists; the timeline only knows names.
    pub fn add_keyframe(
        &mut self,
        name: &str,
        time: Option<f64>,
        thumbnail: Option<Thumbnail>,
    ) -> SceneResult<f64> {
        if self.contains(name) {
            return Err(SceneError::KeyframeExists(name.to_owned()));
        }
        let time = time.unwrap_or_else(|| self.next_default_time());
        self.validate_time(time, None)?;

        self.extend_to(time);
        self.keyframes.push(Keyframe {
            name: name.to_owned(),
            time,
            thumbnail,
        });
        self.sort();
        self.schedule.invalidate();
        Ok(time)
    }

    /// Move a keyframe to a new time, extending the timeline like
    /// [`Timeline::add_keyframe`].
    pub fn edit_keyframe_time(&mut self, name: &str, time: f64) -> SceneResult<()> {
        if !self.contains(name) {
            return Err(SceneError::KeyframeNotFound(name.to_owned()));
        }
        self.validate_time(time, Some(name))?;

        self.extend_to(time);
        if let Some(keyframe) = self.keyframes.iter_mut().find(|k| k.name == name) {
            keyframe.time = time;
        }
        self.sort();
        self.schedule.invalidate();
        Ok(())
    }

    /// Replace the thumbnail copy held by a keyframe.
    pub fn set_thumbnail(&mut self, name: &str, thumbnail: Option<Thumbnail>) -> bool {
        match self.keyframes.iter_mut().find(|k| k.name == name) {
            Some(keyframe) => {
                keyframe.thumbnail = thumbnail;
                true
            }
            None => false,
        }
    }

    /// Remove one keyframe.
    pub fn delete_keyframe(&mut self, name: &str) -> SceneResult<Keyframe> {
        let index = self
            .keyframes
            .iter()
            .position(|k| k.name == name)
            .ok_or_else(|| SceneError::KeyframeNotFound(name.to_owned()))?;
        self.schedule.invalidate();
        Ok(self.keyframes.remove(index))
    }

    /// Remove every keyframe, returning them in time order.
    pub fn delete_all(&mut self) -> Vec<Keyframe> {
        self.schedule.invalidate();
        std::mem::take(&mut self.keyframes)
    }

    /// Change the timeline length.
    pub fn set_length(&mut self, length: f64) -> SceneResult<()> {
        self.validate_length(length)?;
        if let Some(last) = self.keyframes.last() {
            if last.time > length {
                return Err(SceneError::LengthOutOfRange {
                    length,
                    reason: format!(
                        "keyframe {} is at {}; move it first",
                        last.name,
                        format_time(last.time)
                    ),
                });
            }
        }
        self.length = length;
        self.schedule.invalidate();
        Ok(())
    }

    fn validate_length(&self, length: f64) -> SceneResult<()> {
        if !length.is_finite() || length > self.max_length {
            return Err(SceneError::LengthOutOfRange {
                length,
                reason: format!("maximum is {} seconds", self.max_length),
            });
        }
        if self.frames_in(length) < 1 {
            return Err(SceneError::LengthOutOfRange {
                length,
                reason: format!("shorter than one frame at {} fps", self.fps),
            });
        }
        Ok(())
    }

    fn validate_amount(amount: f64) -> SceneResult<()> {
        if amount.is_finite() && amount >= 0.0 {
            Ok(())
        } else {
            Err(SceneError::InvalidTime {
                time: amount,
                reason: "amount must be a non-negative number of seconds"
                    .to_owned(),
            })
        }
    }

    /// Open `amount` seconds of empty time at `target`, pushing later
    /// keyframes back and lengthening the timeline.
    pub fn insert_time(&mut self, target: f64, amount: f64) -> SceneResult<()> {
        Self::validate_amount(amount)?;
        if !self.time_in_range(target) {
            return Err(SceneError::InvalidTime {
                time: target,
                reason: format!("must be between 0 and {}", self.length),
            });
        }
        self.validate_length(self.length + amount)?;

        // Latest first, so no keyframe passes through one not yet moved.
        for keyframe in self.keyframes.iter_mut().rev() {
            if keyframe.time <= target {
                break;
            }
            keyframe.time += amount;
        }
        self.length += amount;
        self.schedule.invalidate();
        Ok(())
    }

    /// Cut `amount` seconds starting at `target`, pulling later keyframes
    /// forward and shortening the timeline.
    ///
    /// Fails if a keyframe sits inside the removed window.
    pub fn remove_time(&mut self, target: f64, amount: f64) -> SceneResult<()> {
        Self::validate_amount(amount)?;
        let end = target + amount;
        if !target.is_finite() || target < 0.0 || end > self.length + TIME_EPSILON {
            return Err(SceneError::InvalidTime {
                time: target,
                reason: format!(
                    "removal window must lie within 0 to {}",
                    self.length
                ),
            });
        }
        if self.frames_in(self.length - amount) < 1 {
            return Err(SceneError::LengthOutOfRange {
                length: self.length - amount,
                reason: format!("shorter than one frame at {} fps", self.fps),
            });
        }
        let anchored = self.keyframes.iter().any(|k| same_time(k.time, target));
        let blocker = self.keyframes.iter().find(|k| {
            let inside = k.time > target + TIME_EPSILON && k.time < end - TIME_EPSILON;
            // Pulling this one back would land it on the keyframe at target.
            let lands_on_other = amount > 0.0 && anchored && same_time(k.time, end);
            inside || lands_on_other
        });
        if let Some(blocker) = blocker {
            return Err(SceneError::TimeBlocked {
                start: target,
                end,
                keyframe: blocker.name.clone(),
            });
        }

        for keyframe in &mut self.keyframes {
            if keyframe.time > target + TIME_EPSILON {
                keyframe.time = (keyframe.time - amount).max(target);
            }
        }
        self.length = (self.length - amount).max(0.0);
        self.schedule.invalidate();
        Ok(())
    }

    /// The interpolation schedule, regenerated if anything changed since
    /// the last call.
    pub fn schedule(&mut self) -> SceneResult<&Schedule> {
        let (keyframes, length, fps) = (&self.keyframes, self.length, self.fps);
        self.schedule
            .get_or_try_compute(|| {
                let schedule = Schedule::build(keyframes, length, fps)?;
                log::debug!("generated {} interpolation steps", schedule.len());
                Ok(schedule)
            })
            .inspect_err(|e| log::warn!("cannot generate interpolation steps: {e}"))
    }

    /// Whether the cached schedule is current.
    pub fn schedule_is_current(&self) -> bool {
        self.schedule.is_valid()
    }

    /// Frame index for a time, clamped to the schedule.
    pub fn frame_index(&mut self, time: f64) -> SceneResult<usize> {
        let fps = f64::from(self.fps);
        let last = self.schedule()?.last_index();
        Ok(((time.max(0.0) * fps).round() as usize).min(last))
    }

    /// The step shown at `time`, with its frame index.
    pub fn step_at(&mut self, time: f64) -> SceneResult<(usize, LerpStep)> {
        if !time.is_finite() || !self.time_in_range(time) {
            return Err(SceneError::InvalidTime {
                time,
                reason: format!("must be between 0 and {}", self.length),
            });
        }
        let index = self.frame_index(time)?;
        let step = self
            .schedule()?
            .step(index)
            .cloned()
            .ok_or(SceneError::NoKeyframes)?;
        Ok((index, step))
    }

    /// Serialize keyframes and length to JSON.
    pub fn to_json(&self) -> SceneResult<String> {
        let snapshot = TimelineSnapshot {
            version: Self::FORMAT_VERSION,
            keyframes: self.keyframes.clone(),
            length: self.length,
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Replace keyframes and length with ones read from JSON.
    ///
    /// The record must carry the current format version and satisfy every
    /// timeline invariant; otherwise nothing changes.
    pub fn load_json(&mut self, json: &str) -> SceneResult<()> {
        let snapshot: TimelineSnapshot = serde_json::from_str(json)?;
        if snapshot.version != Self::FORMAT_VERSION {
            return Err(SceneError::VersionMismatch {
                record: "timeline",
                found: snapshot.version,
                expected: Self::FORMAT_VERSION,
            });
        }

        let mut staged = Self::new(self.fps, self.length, self.max_length);
        staged.set_length(snapshot.length)?;
        for keyframe in snapshot.keyframes {
            if keyframe.time > snapshot.length {
                return Err(SceneError::InvalidTime {
                    time: keyframe.time,
                    reason: format!(
                        "keyframe {} lies past the stored length {}",
                        keyframe.name, snapshot.length
                    ),
                });
            }
            let _ = staged.add_keyframe(
                &keyframe.name,
                Some(keyframe.time),
                keyframe.thumbnail,
            )?;
        }
        *self = staged;
        Ok(())
    }
}
