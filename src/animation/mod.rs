//! Keyframe animation: editing, preview, playback, and recording.
//!
//! [`Animation`] wraps a [`Timeline`] with the play/record state machine:
//!
//! ```text
//! Idle ──play──▶ Playing ──last frame / stop──▶ Idle
//! Idle ──record─▶ Recording ──last frame / stop(recording)──▶ Idle
//! ```
//!
//! Playback is frame driven. After [`play`](Animation::play) or
//! [`record`](Animation::record) the host calls
//! [`on_frame_drawn`](Animation::on_frame_drawn) once per drawn frame.
//! Every state change is announced through the manager's own
//! [`EventEmitter`].

use std::fmt;

use crate::error::{SceneError, SceneResult};
use crate::event::{EventEmitter, SubscriptionId};
use crate::options::TimelineOptions;
use crate::playback::{CancellationToken, FrameRange, FrameTick, PlaybackDriver};
use crate::recording::{EncodeParams, MovieRecorder, RecordParams};
use crate::scene::{Scene, SceneStore};
use crate::state;
use crate::timeline::{LerpStep, Timeline};
use crate::viewer::Viewer;

/// Notifications emitted by an [`Animation`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    /// A keyframe was placed on the timeline.
    KeyframeAdded {
        /// Keyframe (and scene) name.
        name: String,
        /// Where it was placed, in seconds.
        time: f64,
    },
    /// A keyframe moved.
    KeyframeEdited {
        /// Keyframe name.
        name: String,
        /// New time in seconds.
        time: f64,
    },
    /// A keyframe was removed.
    KeyframeDeleted(String),
    /// The timeline length changed; carries the new length.
    LengthChanged(f64),
    /// A single time was previewed.
    Previewed(f64),
    /// A frame was shown during playback; carries its time.
    FramePlayed(f64),
    /// Playback began.
    PlaybackStarted {
        /// Whether frames run toward the start.
        reverse: bool,
    },
    /// Playback ended or was stopped.
    PlaybackStopped,
    /// Movie capture began.
    RecordingStarted,
    /// Movie capture ended and encoding was requested.
    RecordingStopped,
}

/// Where the play/record state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing running.
    Idle,
    /// Frames are being played.
    Playing,
    /// Frames are being played and captured into a movie.
    Recording,
}

struct ActivePlayback {
    driver: PlaybackDriver,
    token: CancellationToken,
    reverse: bool,
    /// Set while recording.
    encode: Option<EncodeParams>,
}

/// Timeline plus play/record state for one session.
pub struct Animation {
    timeline: Timeline,
    playback: Option<ActivePlayback>,
    events: EventEmitter<AnimationEvent>,
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("keyframes", &self.timeline.len())
            .field("length", &self.timeline.length())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(Timeline::default())
    }
}

impl Animation {
    /// Manage an existing timeline.
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            playback: None,
            events: EventEmitter::new(),
        }
    }

    /// Manage a new, empty timeline.
    pub fn from_options(options: &TimelineOptions) -> Self {
        Self::new(Timeline::from_options(options))
    }

    /// The underlying timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Subscribe to this manager's events.
    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&AnimationEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(handler)
    }

    /// Remove a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Current play/record state.
    pub fn state(&self) -> PlaybackState {
        match &self.playback {
            None => PlaybackState::Idle,
            Some(p) if p.encode.is_some() => PlaybackState::Recording,
            Some(_) => PlaybackState::Playing,
        }
    }

    /// Whether frames are being played (including while recording).
    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// Whether a recording is in progress.
    pub fn is_recording(&self) -> bool {
        self.state() == PlaybackState::Recording
    }

    /// Token that cancels the running playback, if any.
    ///
    /// Recordings hand out no token; only
    /// [`stop_playing`](Animation::stop_playing) with `stop_recording` set
    /// ends one early.
    pub fn cancellation_token(&self) -> Option<CancellationToken> {
        self.playback
            .as_ref()
            .filter(|p| p.encode.is_none())
            .map(|p| p.token.clone())
    }

    fn emit_length_change(&mut self, before: f64) {
        let after = self.timeline.length();
        if after != before {
            self.events.emit(&AnimationEvent::LengthChanged(after));
        }
    }

    // ── Keyframe editing ─────────────────────────────────────────────────

    /// Check that a keyframe for `name` could be added at `time` without
    /// adding it. Returns the time it would get.
    pub fn check_new_keyframe(&self, name: &str, time: Option<f64>) -> SceneResult<f64> {
        let mut staged = self.timeline.clone();
        staged.add_keyframe(name, time, None)
    }

    /// Place a keyframe for an existing scene.
    ///
    /// With no `time` the keyframe goes one second after the last one,
    /// extending the timeline if it runs past the end.
    pub fn add_keyframe(
        &mut self,
        name: &str,
        time: Option<f64>,
        scenes: &SceneStore,
    ) -> SceneResult<f64> {
        let scene = scenes.require(name)?;
        let before = self.timeline.length();
        let time = self
            .timeline
            .add_keyframe(name, time, scene.thumbnail().cloned())?;
        log::info!("added keyframe {name} at {time}");
        self.events.emit(&AnimationEvent::KeyframeAdded {
            name: name.to_owned(),
            time,
        });
        self.emit_length_change(before);
        Ok(time)
    }

    /// Move a keyframe. A time past the end extends the timeline.
    pub fn edit_keyframe_time(&mut self, name: &str, time: f64) -> SceneResult<()> {
        let before = self.timeline.length();
        self.timeline.edit_keyframe_time(name, time)?;
        self.events.emit(&AnimationEvent::KeyframeEdited {
            name: name.to_owned(),
            time,
        });
        self.emit_length_change(before);
        Ok(())
    }

    /// Remove a keyframe. The scene it showed is kept.
    pub fn delete_keyframe(&mut self, name: &str) -> SceneResult<()> {
        let _ = self.timeline.delete_keyframe(name)?;
        log::info!("deleted keyframe {name}");
        self.events.emit(&AnimationEvent::KeyframeDeleted(name.to_owned()));
        Ok(())
    }

    /// Remove every keyframe.
    pub fn delete_all(&mut self) {
        for keyframe in self.timeline.delete_all() {
            self.events.emit(&AnimationEvent::KeyframeDeleted(keyframe.name));
        }
    }

    /// Drop the keyframe of a scene that no longer exists.
    pub fn on_scene_deleted(&mut self, name: &str) {
        if self.timeline.contains(name) {
            log::info!("scene {name} was deleted; removing its keyframe");
            if self.timeline.delete_keyframe(name).is_ok() {
                self.events.emit(&AnimationEvent::KeyframeDeleted(name.to_owned()));
            }
        }
    }

    /// Refresh the thumbnail copy held by the keyframe of a re-saved scene.
    pub fn on_scene_saved(&mut self, scene: &Scene) {
        if self
            .timeline
            .set_thumbnail(scene.name(), scene.thumbnail().cloned())
        {
            log::debug!("updated thumbnail of keyframe {}", scene.name());
        }
    }

    /// Change the timeline length.
    pub fn set_length(&mut self, length: f64) -> SceneResult<()> {
        let before = self.timeline.length();
        self.timeline.set_length(length)?;
        self.emit_length_change(before);
        Ok(())
    }

    /// Open empty time at `target`, pushing later keyframes back.
    pub fn insert_time(&mut self, target: f64, amount: f64) -> SceneResult<()> {
        let before = self.timeline.length();
        self.timeline.insert_time(target, amount)?;
        self.emit_length_change(before);
        Ok(())
    }

    /// Cut time starting at `target`, pulling later keyframes forward.
    pub fn remove_time(&mut self, target: f64, amount: f64) -> SceneResult<()> {
        let before = self.timeline.length();
        self.timeline.remove_time(target, amount)?;
        self.emit_length_change(before);
        Ok(())
    }

    /// Replace the timeline with one read from JSON. Every keyframe must
    /// name a scene in `scenes`; otherwise nothing changes.
    pub fn load_json(&mut self, json: &str, scenes: &SceneStore) -> SceneResult<()> {
        if self.is_playing() {
            return Err(SceneError::Busy("playback in progress"));
        }
        let mut loaded = self.timeline.clone();
        loaded.load_json(json)?;
        for keyframe in loaded.keyframes() {
            let _ = scenes.require(&keyframe.name)?;
        }

        let before = self.timeline.length();
        let old: Vec<String> =
            self.timeline.keyframes().iter().map(|k| k.name.clone()).collect();
        self.timeline = loaded;

        for name in old {
            self.events.emit(&AnimationEvent::KeyframeDeleted(name));
        }
        let added: Vec<(String, f64)> = self
            .timeline
            .keyframes()
            .iter()
            .map(|k| (k.name.clone(), k.time))
            .collect();
        for (name, time) in added {
            self.events.emit(&AnimationEvent::KeyframeAdded { name, time });
        }
        self.emit_length_change(before);
        Ok(())
    }

    // ── Preview and playback ─────────────────────────────────────────────

    fn apply_step(
        step: &LerpStep,
        scenes: &SceneStore,
        viewer: &mut dyn Viewer,
    ) -> SceneResult<()> {
        if step.from == step.to {
            return state::restore(viewer, scenes.require(&step.from)?.state());
        }
        scenes.interpolate_scenes(&step.from, &step.to, step.fraction, viewer)
    }

    /// Show the interpolated state at `time` without starting playback.
    pub fn preview(
        &mut self,
        time: f64,
        scenes: &SceneStore,
        viewer: &mut dyn Viewer,
    ) -> SceneResult<()> {
        if self.is_playing() {
            return Err(SceneError::Busy("playback in progress"));
        }
        let (index, step) = self.timeline.step_at(time)?;
        log::debug!(
            "previewing frame {index}: {} -> {} at {:.3}",
            step.from,
            step.to,
            step.fraction
        );
        Self::apply_step(&step, scenes, viewer)?;
        self.events.emit(&AnimationEvent::Previewed(time));
        Ok(())
    }

    /// Start playing from `start_time` (the start, or the end when
    /// reversed, if omitted).
    ///
    /// Returns `Ok(false)` and changes nothing if already playing.
    pub fn play(&mut self, start_time: Option<f64>, reverse: bool) -> SceneResult<bool> {
        if self.is_playing() {
            log::debug!("play ignored: already playing");
            return Ok(false);
        }
        let range = self.frame_range(start_time, reverse)?;
        self.begin(range, None);
        Ok(true)
    }

    fn frame_range(&mut self, start_time: Option<f64>, reverse: bool) -> SceneResult<FrameRange> {
        let last = self.timeline.schedule()?.last_index();
        let start_time = start_time.unwrap_or(if reverse {
            self.timeline.length()
        } else {
            0.0
        });
        if !start_time.is_finite() || !self.timeline.time_in_range(start_time) {
            return Err(SceneError::InvalidTime {
                time: start_time,
                reason: format!("must be between 0 and {}", self.timeline.length()),
            });
        }
        let start = self.timeline.frame_index(start_time)?;
        Ok(if reverse {
            FrameRange::reverse(start)
        } else {
            FrameRange::forward(start, last)
        })
    }

    fn begin(&mut self, range: FrameRange, encode: Option<EncodeParams>) {
        let (driver, token) = PlaybackDriver::new(range);
        let reverse = range.is_reverse();
        log::info!(
            "playing frames {} to {}{}",
            range.start(),
            range.end(),
            if encode.is_some() { " (recording)" } else { "" }
        );
        self.playback = Some(ActivePlayback {
            driver,
            token,
            reverse,
            encode,
        });
        self.events.emit(&AnimationEvent::PlaybackStarted { reverse });
    }

    /// Start a recording: begin movie capture and play the whole timeline
    /// forward. The movie is encoded when the last frame has been drawn.
    pub fn record(
        &mut self,
        record: &RecordParams,
        encode: EncodeParams,
        recorder: &mut dyn MovieRecorder,
    ) -> SceneResult<()> {
        if self.is_playing() {
            return Err(SceneError::Busy("playback in progress"));
        }
        let range = self.frame_range(Some(0.0), false)?;
        recorder.start(record)?;
        self.events.emit(&AnimationEvent::RecordingStarted);
        self.begin(range, Some(encode));
        Ok(())
    }

    /// Per-frame callback. Shows the next frame of the running playback.
    ///
    /// Returns the frame shown, or `None` when nothing is playing. After
    /// the last frame, or once cancelled, playback returns to idle and a
    /// recording is stopped and encoded. A frame that cannot be shown ends
    /// playback and the error is returned.
    pub fn on_frame_drawn(
        &mut self,
        scenes: &SceneStore,
        viewer: &mut dyn Viewer,
        recorder: &mut dyn MovieRecorder,
    ) -> SceneResult<Option<FrameTick>> {
        let Some(playback) = self.playback.as_mut() else {
            return Ok(None);
        };
        let Some(tick) = playback.driver.tick() else {
            self.finish(recorder)?;
            return Ok(None);
        };
        let recording = playback.encode.is_some();

        if let Err(e) = self.show_frame(tick.index, scenes, viewer) {
            log::warn!("stopping playback at frame {}: {e}", tick.index);
            self.finish(recorder)?;
            return Err(e);
        }
        if recording {
            if let Err(e) = recorder.capture_frame() {
                self.finish(recorder)?;
                return Err(e);
            }
        }
        if tick.last {
            self.finish(recorder)?;
        }
        Ok(Some(tick))
    }

    fn show_frame(
        &mut self,
        index: usize,
        scenes: &SceneStore,
        viewer: &mut dyn Viewer,
    ) -> SceneResult<()> {
        let schedule = self.timeline.schedule()?;
        // Edits during playback can shorten the schedule.
        let index = index.min(schedule.last_index());
        let step = schedule
            .step(index)
            .cloned()
            .ok_or(SceneError::NoKeyframes)?;
        Self::apply_step(&step, scenes, viewer)?;
        let time = index as f64 / f64::from(self.timeline.fps());
        self.events.emit(&AnimationEvent::FramePlayed(time));
        Ok(())
    }

    /// Stop playback.
    ///
    /// A recording keeps running unless `stop_recording` is set; stopping
    /// one encodes what was captured so far. Returns whether anything was
    /// stopped. Stopping when idle does nothing.
    pub fn stop_playing(
        &mut self,
        stop_recording: bool,
        recorder: &mut dyn MovieRecorder,
    ) -> SceneResult<bool> {
        let Some(playback) = &self.playback else {
            return Ok(false);
        };
        if playback.encode.is_some() && !stop_recording {
            log::warn!("recording in progress; use stopRecording to end it");
            return Ok(false);
        }
        playback.token.cancel();
        self.finish(recorder)?;
        Ok(true)
    }

    /// Return to idle, closing out a recording if one was running.
    fn finish(&mut self, recorder: &mut dyn MovieRecorder) -> SceneResult<()> {
        let Some(playback) = self.playback.take() else {
            return Ok(());
        };
        log::debug!(
            "playback finished ({})",
            if playback.reverse { "reverse" } else { "forward" }
        );
        let result = match playback.encode {
            Some(encode) => {
                let result = recorder.stop().and_then(|()| recorder.encode(&encode));
                self.events.emit(&AnimationEvent::RecordingStopped);
                result
            }
            None => Ok(()),
        };
        self.events.emit(&AnimationEvent::PlaybackStopped);
        result
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::recording::LoggingRecorder;
    use crate::state::ModelId;
    use crate::viewer::{HeadlessViewer, ModelShape};

    struct Fixture {
        animation: Animation,
        scenes: SceneStore,
        viewer: HeadlessViewer,
        recorder: LoggingRecorder,
        events: Rc<RefCell<Vec<AnimationEvent>>>,
    }

    /// Length 5 s at 10 fps with scenes `A` and `B` keyed at 1 s and 3 s.
    fn fixture() -> Fixture {
        let mut viewer = HeadlessViewer::new();
        viewer.add_model(ModelId(1), ModelShape::new(2, 1, 1, 0));
        let mut scenes = SceneStore::new();
        scenes.save("A", &viewer);
        viewer.set_atom_colors(ModelId(1), [0, 0, 0, 255]);
        scenes.save("B", &viewer);

        let mut animation = Animation::new(Timeline::new(10, 5.0, 300.0));
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let _ = animation.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        let _ = animation.add_keyframe("A", Some(1.0), &scenes).unwrap();
        let _ = animation.add_keyframe("B", Some(3.0), &scenes).unwrap();
        events.borrow_mut().clear();

        Fixture {
            animation,
            scenes,
            viewer,
            recorder: LoggingRecorder::new(),
            events,
        }
    }

    impl Fixture {
        fn tick(&mut self) -> SceneResult<Option<FrameTick>> {
            self.animation
                .on_frame_drawn(&self.scenes, &mut self.viewer, &mut self.recorder)
        }

        fn run_to_end(&mut self) -> Vec<usize> {
            let mut shown = Vec::new();
            while let Some(tick) = self.tick().unwrap() {
                shown.push(tick.index);
            }
            shown
        }

        fn atom_color(&self) -> [u8; 4] {
            self.viewer.state().scene_colors[&ModelId(1)].atoms[0]
        }
    }

    #[test]
    fn keyframe_for_missing_scene_is_rejected() {
        let mut f = fixture();
        assert!(matches!(
            f.animation.add_keyframe("C", Some(4.0), &f.scenes),
            Err(SceneError::SceneNotFound(_))
        ));
        assert_eq!(f.animation.timeline().len(), 2);
        assert!(f.events.borrow().is_empty());
    }

    #[test]
    fn edits_emit_events() {
        let mut f = fixture();
        f.scenes.save("C", &f.viewer);
        f.scenes.save("D", &f.viewer);
        assert_eq!(f.animation.add_keyframe("C", None, &f.scenes).unwrap(), 4.0);
        f.animation.edit_keyframe_time("C", 4.5).unwrap();
        assert_eq!(f.animation.add_keyframe("D", None, &f.scenes).unwrap(), 5.5);
        f.animation.delete_keyframe("C").unwrap();
        f.animation.set_length(8.0).unwrap();

        assert_eq!(
            *f.events.borrow(),
            vec![
                AnimationEvent::KeyframeAdded {
                    name: "C".to_owned(),
                    time: 4.0
                },
                AnimationEvent::KeyframeEdited {
                    name: "C".to_owned(),
                    time: 4.5
                },
                AnimationEvent::KeyframeAdded {
                    name: "D".to_owned(),
                    time: 5.5
                },
                AnimationEvent::LengthChanged(5.5),
                AnimationEvent::KeyframeDeleted("C".to_owned()),
                AnimationEvent::LengthChanged(8.0),
            ]
        );
    }

    #[test]
    fn editing_past_the_end_extends_the_timeline() {
        let mut f = fixture();
        f.animation.edit_keyframe_time("B", 6.0).unwrap();
        assert_eq!(f.animation.timeline().length(), 6.0);
        assert_eq!(
            *f.events.borrow(),
            vec![
                AnimationEvent::KeyframeEdited {
                    name: "B".to_owned(),
                    time: 6.0
                },
                AnimationEvent::LengthChanged(6.0),
            ]
        );
    }

    #[test]
    fn failed_edit_emits_nothing() {
        let mut f = fixture();
        assert!(f.animation.edit_keyframe_time("A", 3.0).is_err());
        assert!(f.animation.remove_time(0.5, 1.0).is_err());
        assert!(f.events.borrow().is_empty());
    }

    #[test]
    fn preview_blends_neighbouring_keyframes() {
        let mut f = fixture();
        f.animation.preview(2.0, &f.scenes, &mut f.viewer).unwrap();
        // 178 toward 0 at fraction 10/19.
        let expected = (178.0_f32 * (1.0 - 10.0 / 19.0)).round() as u8;
        assert_eq!(f.atom_color()[0], expected);
        assert_eq!(*f.events.borrow(), vec![AnimationEvent::Previewed(2.0)]);

        f.animation.preview(0.5, &f.scenes, &mut f.viewer).unwrap();
        assert_eq!(f.atom_color(), [178, 178, 178, 255]);
        f.animation.preview(4.5, &f.scenes, &mut f.viewer).unwrap();
        assert_eq!(f.atom_color(), [0, 0, 0, 255]);
    }

    #[test]
    fn preview_rejects_out_of_range_and_empty() {
        let mut f = fixture();
        assert!(f.animation.preview(5.1, &f.scenes, &mut f.viewer).is_err());
        f.animation.delete_all();
        assert!(matches!(
            f.animation.preview(1.0, &f.scenes, &mut f.viewer),
            Err(SceneError::NoKeyframes)
        ));
    }

    #[test]
    fn play_runs_every_frame_then_idles() {
        let mut f = fixture();
        assert!(f.animation.play(None, false).unwrap());
        assert_eq!(f.animation.state(), PlaybackState::Playing);
        assert!(!f.animation.play(None, false).unwrap());

        let shown = f.run_to_end();
        assert_eq!(shown, (0..=50).collect::<Vec<_>>());
        assert_eq!(f.animation.state(), PlaybackState::Idle);
        assert_eq!(f.atom_color(), [0, 0, 0, 255]);
        assert_eq!(f.viewer.frames_rendered(), 51);

        let events = f.events.borrow();
        assert_eq!(
            events.first(),
            Some(&AnimationEvent::PlaybackStarted { reverse: false })
        );
        assert_eq!(events.last(), Some(&AnimationEvent::PlaybackStopped));
        let played = events
            .iter()
            .filter(|e| matches!(e, AnimationEvent::FramePlayed(_)))
            .count();
        assert_eq!(played, 51);
    }

    #[test]
    fn reverse_play_ends_on_first_keyframe() {
        let mut f = fixture();
        assert!(f.animation.play(Some(2.0), true).unwrap());
        let shown = f.run_to_end();
        assert_eq!(shown.first(), Some(&20));
        assert_eq!(shown.last(), Some(&0));
        assert_eq!(f.atom_color(), [178, 178, 178, 255]);
    }

    #[test]
    fn play_rejects_bad_start_and_empty_timeline() {
        let mut f = fixture();
        assert!(f.animation.play(Some(9.0), false).is_err());
        assert!(!f.animation.is_playing());
        f.animation.delete_all();
        assert!(matches!(
            f.animation.play(None, false),
            Err(SceneError::NoKeyframes)
        ));
    }

    #[test]
    fn stop_cancels_before_next_frame() {
        let mut f = fixture();
        let _ = f.animation.play(None, false).unwrap();
        let _ = f.tick().unwrap();
        assert!(f.animation.stop_playing(false, &mut f.recorder).unwrap());
        assert!(!f.animation.is_playing());
        assert_eq!(f.tick().unwrap(), None);
        assert!(!f.animation.stop_playing(false, &mut f.recorder).unwrap());
    }

    #[test]
    fn external_cancellation_ends_playback() {
        let mut f = fixture();
        let _ = f.animation.play(None, false).unwrap();
        let token = f.animation.cancellation_token().unwrap();
        let _ = f.tick().unwrap();
        token.cancel();
        assert_eq!(f.tick().unwrap(), None);
        assert_eq!(f.animation.state(), PlaybackState::Idle);
    }

    #[test]
    fn recording_captures_and_encodes() {
        let mut f = fixture();
        f.animation
            .record(&RecordParams::default(), EncodeParams::default(), &mut f.recorder)
            .unwrap();
        assert_eq!(f.animation.state(), PlaybackState::Recording);
        assert!(f.recorder.is_capturing());
        assert!(matches!(
            f.animation.record(
                &RecordParams::default(),
                EncodeParams::default(),
                &mut f.recorder
            ),
            Err(SceneError::Busy(_))
        ));

        let shown = f.run_to_end();
        assert_eq!(shown.len(), 51);
        assert!(!f.recorder.is_capturing());
        assert_eq!(f.recorder.encodes().len(), 1);
        assert_eq!(f.animation.state(), PlaybackState::Idle);
        assert!(f.events.borrow().contains(&AnimationEvent::RecordingStopped));
    }

    #[test]
    fn recording_cannot_be_cancelled_by_token() {
        let mut f = fixture();
        let _ = f.animation.play(None, false).unwrap();
        let token = f.animation.cancellation_token().unwrap();
        assert!(f.animation.stop_playing(false, &mut f.recorder).unwrap());

        f.animation
            .record(&RecordParams::default(), EncodeParams::default(), &mut f.recorder)
            .unwrap();
        assert!(f.animation.cancellation_token().is_none());
        // A token left over from earlier playback has no hold on the recording.
        token.cancel();
        let _ = f.tick().unwrap();
        assert!(f.animation.is_recording());

        let shown = f.run_to_end();
        assert_eq!(shown.len(), 50);
        assert_eq!(f.recorder.encodes().len(), 1);
        assert_eq!(f.animation.state(), PlaybackState::Idle);
    }

    #[test]
    fn plain_stop_does_not_interrupt_recording() {
        let mut f = fixture();
        f.animation
            .record(&RecordParams::default(), EncodeParams::default(), &mut f.recorder)
            .unwrap();
        let _ = f.tick().unwrap();
        assert!(!f.animation.stop_playing(false, &mut f.recorder).unwrap());
        assert!(f.animation.is_recording());

        assert!(f.animation.stop_playing(true, &mut f.recorder).unwrap());
        assert!(!f.animation.is_playing());
        assert_eq!(f.recorder.encodes().len(), 1);
    }

    #[test]
    fn deleting_a_scene_removes_its_keyframe() {
        let mut f = fixture();
        let _ = f.scenes.delete("B");
        f.animation.on_scene_deleted("B");
        assert!(!f.animation.timeline().contains("B"));
        assert_eq!(
            *f.events.borrow(),
            vec![AnimationEvent::KeyframeDeleted("B".to_owned())]
        );
        f.animation.on_scene_deleted("B");
        assert_eq!(f.events.borrow().len(), 1);
    }

    #[test]
    fn resaving_a_scene_refreshes_its_keyframe_thumbnail() {
        let mut f = fixture();
        let mut viewer = HeadlessViewer::new().with_thumbnails(2, 2);
        viewer.add_model(ModelId(1), ModelShape::new(2, 1, 1, 0));
        f.scenes.save("A", &viewer);
        f.animation.on_scene_saved(f.scenes.get("A").unwrap());

        let keyframe = f.animation.timeline().keyframe("A").unwrap();
        assert_eq!(keyframe.thumbnail.as_ref().unwrap().pixels.len(), 4);
    }

    #[test]
    fn missing_scene_during_playback_stops_it() {
        let mut f = fixture();
        let _ = f.animation.play(None, false).unwrap();
        let _ = f.scenes.delete("A");
        assert!(matches!(f.tick(), Err(SceneError::SceneNotFound(_))));
        assert!(!f.animation.is_playing());
    }

    #[test]
    fn timeline_json_reload_emits_events() {
        let mut f = fixture();
        let json = f.animation.timeline().to_json().unwrap();
        f.animation.load_json(&json, &f.scenes).unwrap();
        let events = f.events.borrow();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], AnimationEvent::KeyframeDeleted("A".to_owned()));
        assert_eq!(
            events[3],
            AnimationEvent::KeyframeAdded {
                name: "B".to_owned(),
                time: 3.0
            }
        );
    }

    #[test]
    fn timeline_json_with_unknown_scene_is_rejected() {
        let mut f = fixture();
        let mut other = Timeline::new(10, 5.0, 300.0);
        let _ = other.add_keyframe("A", Some(0.5), None).unwrap();
        let _ = other.add_keyframe("ghost", Some(2.0), None).unwrap();
        let json = other.to_json().unwrap();

        assert!(matches!(
            f.animation.load_json(&json, &f.scenes),
            Err(SceneError::SceneNotFound(ref name)) if name == "ghost"
        ));
        assert_eq!(f.animation.timeline().len(), 2);
        assert_eq!(f.animation.timeline().keyframe("A").unwrap().time, 1.0);
        assert!(f.events.borrow().is_empty());
    }
}
