//! A viewer, its scenes, its animation, and a movie recorder, driven by
//! [`Command`]s.

use std::fmt;

use crate::animation::Animation;
use crate::command::Command;
use crate::error::{SceneError, SceneResult};
use crate::options::Options;
use crate::playback::FrameTick;
use crate::recording::{LoggingRecorder, MovieRecorder};
use crate::scene::SceneStore;
use crate::state::ModelId;
use crate::viewer::Viewer;

/// Everything one viewer needs for scenes and keyframe animation.
pub struct Session<V: Viewer> {
    viewer: V,
    scenes: SceneStore,
    animation: Animation,
    recorder: Box<dyn MovieRecorder>,
    options: Options,
}

impl<V: Viewer> fmt::Debug for Session<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("scenes", &self.scenes.len())
            .field("animation", &self.animation)
            .finish_non_exhaustive()
    }
}

impl<V: Viewer> Session<V> {
    /// A session recording through a [`LoggingRecorder`].
    pub fn new(viewer: V, options: Options) -> Self {
        Self::with_recorder(viewer, options, Box::new(LoggingRecorder::new()))
    }

    /// A session recording through `recorder`.
    pub fn with_recorder(
        viewer: V,
        options: Options,
        recorder: Box<dyn MovieRecorder>,
    ) -> Self {
        Self {
            viewer,
            scenes: SceneStore::new(),
            animation: Animation::from_options(&options.timeline),
            recorder,
            options,
        }
    }

    /// The viewer.
    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    /// Mutable access to the viewer.
    pub fn viewer_mut(&mut self) -> &mut V {
        &mut self.viewer
    }

    /// Saved scenes.
    pub fn scenes(&self) -> &SceneStore {
        &self.scenes
    }

    /// Mutable access to saved scenes, e.g. to subscribe to their events.
    pub fn scenes_mut(&mut self) -> &mut SceneStore {
        &mut self.scenes
    }

    /// The animation manager.
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Mutable access to the animation manager.
    pub fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animation
    }

    /// Options this session was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Parse and run one command line.
    ///
    /// Failures are logged as warnings and never panic. Returns the
    /// command's output lines, which are also logged.
    pub fn run_line(&mut self, line: &str) -> Vec<String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Vec::new();
        }
        let result = Command::parse(line, &self.options.recording)
            .and_then(|command| self.execute(command));
        match result {
            Ok(output) => {
                for out in &output {
                    log::info!("{out}");
                }
                output
            }
            Err(e) => {
                log::warn!("{e}");
                Vec::new()
            }
        }
    }

    /// Run one command. Returns its output lines.
    pub fn execute(&mut self, command: Command) -> SceneResult<Vec<String>> {
        let recorder = self.recorder.as_mut();
        match command {
            // ── Scenes ───────────────────────────────────────────────────
            Command::SaveScene(name) => {
                self.scenes.save(&name, &self.viewer);
                if let Some(scene) = self.scenes.get(&name) {
                    self.animation.on_scene_saved(scene);
                }
            }
            Command::RestoreScene(name) => {
                if !self.scenes.restore(&name, &mut self.viewer)? {
                    return Err(SceneError::SceneNotFound(name));
                }
            }
            Command::DeleteScene(name) => {
                if self.scenes.delete(&name).is_none() {
                    return Err(SceneError::SceneNotFound(name));
                }
                self.animation.on_scene_deleted(&name);
            }
            Command::ListScenes => return Ok(self.scenes.names()),
            Command::ClearScenes => {
                for name in self.scenes.names() {
                    let _ = self.scenes.delete(&name);
                    self.animation.on_scene_deleted(&name);
                }
            }

            // ── Keyframes ────────────────────────────────────────────────
            Command::AddKeyframe { name, time } => {
                // Validate before saving so a rejected keyframe leaves any
                // existing scene of that name untouched.
                let _ = self.animation.check_new_keyframe(&name, time)?;
                self.scenes.save(&name, &self.viewer);
                let _ = self.animation.add_keyframe(&name, time, &self.scenes)?;
            }
            Command::EditKeyframe { name, time } => {
                self.animation.edit_keyframe_time(&name, time)?;
            }
            Command::DeleteKeyframe(name) => self.animation.delete_keyframe(&name)?,
            Command::ListKeyframes => {
                return Ok(self.animation.timeline().list_keyframes());
            }
            Command::Clear => self.animation.delete_all(),

            // ── Timeline ─────────────────────────────────────────────────
            Command::SetLength(length) => self.animation.set_length(length)?,
            Command::InsertTime { target, amount } => {
                self.animation.insert_time(target, amount)?;
            }
            Command::RemoveTime { start, end } => {
                self.animation.remove_time(start, end - start)?;
            }

            // ── Playback ─────────────────────────────────────────────────
            Command::Preview(time) => {
                self.animation.preview(time, &self.scenes, &mut self.viewer)?;
            }
            Command::Play {
                start_time,
                reverse,
            } => {
                let _ = self.animation.play(start_time, reverse)?;
            }
            Command::Stop => {
                let _ = self.animation.stop_playing(false, recorder)?;
            }
            Command::Record { record, encode } => {
                self.animation.record(&record, encode, recorder)?;
            }
            Command::StopRecording => {
                if !self.animation.is_recording() {
                    return Err(SceneError::Command("not recording".to_owned()));
                }
                let _ = self.animation.stop_playing(true, recorder)?;
            }
        }
        Ok(Vec::new())
    }

    /// Host frame callback: show the next playback frame, if playing.
    ///
    /// Returns whether playback continues. Errors end playback and are
    /// logged.
    pub fn tick(&mut self) -> bool {
        let result = self.animation.on_frame_drawn(
            &self.scenes,
            &mut self.viewer,
            self.recorder.as_mut(),
        );
        match result {
            Ok(Some(FrameTick { last, .. })) => !last,
            Ok(None) => false,
            Err(e) => {
                log::warn!("playback stopped: {e}");
                false
            }
        }
    }

    /// Tell the session that models were closed, so stored scenes forget
    /// them.
    pub fn models_closed(&mut self, ids: &[ModelId]) {
        self.scenes.models_removed(ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::PlaybackState;
    use crate::options::TimelineOptions;
    use crate::viewer::{HeadlessViewer, ModelShape};

    fn session() -> Session<HeadlessViewer> {
        let mut viewer = HeadlessViewer::new();
        viewer.add_model(ModelId(1), ModelShape::new(3, 2, 1, 0));
        let options = Options {
            timeline: TimelineOptions {
                fps: 10,
                ..TimelineOptions::default()
            },
            ..Options::default()
        };
        Session::new(viewer, options)
    }

    fn run(s: &mut Session<HeadlessViewer>, lines: &[&str]) {
        for line in lines {
            let _ = s.run_line(line);
        }
    }

    #[test]
    fn keyframe_add_saves_a_scene() {
        let mut s = session();
        run(&mut s, &["keyframe add start time=1"]);
        assert!(s.scenes().exists("start"));
        assert_eq!(s.animation().timeline().keyframe("start").unwrap().time, 1.0);
    }

    #[test]
    fn rejected_keyframe_does_not_overwrite_scene() {
        let mut s = session();
        run(&mut s, &["keyframe add a time=2"]);
        let saved = s.scenes().get("a").unwrap().clone();

        s.viewer_mut().set_atom_colors(ModelId(1), [9, 9, 9, 255]);
        run(&mut s, &["keyframe add a time=3", "keyframe add b time=2"]);
        assert_eq!(s.scenes().get("a"), Some(&saved));
        assert!(!s.scenes().exists("b"));
        assert_eq!(s.animation().timeline().len(), 1);
    }

    #[test]
    fn timeline_lists_keyframes() {
        let mut s = session();
        run(
            &mut s,
            &["keyframe add a", "keyframe add b", "setLength 70", "keyframe add c time=65.5"],
        );
        assert_eq!(
            s.run_line("timeline"),
            vec![
                "a: 0:00.00".to_owned(),
                "b: 0:01.00".to_owned(),
                "c: 1:05.50".to_owned()
            ]
        );
        assert_eq!(s.animation().timeline().length(), 70.0);

        run(&mut s, &["keyframe add d time=71"]);
        assert_eq!(s.animation().timeline().length(), 71.0);
        run(&mut s, &["keyframe add e time=301"]);
        assert!(!s.animation().timeline().contains("e"));
        assert!(!s.scenes().exists("e"));
    }

    #[test]
    fn malformed_lines_are_warnings() {
        let mut s = session();
        assert!(s.run_line("keyframe fly a").is_empty());
        assert!(s.run_line("preview soon").is_empty());
        assert!(s.run_line("preview 1").is_empty());
        assert!(s.run_line("# comment").is_empty());
        assert!(s.execute(Command::Preview(1.0)).is_err());
    }

    #[test]
    fn play_through_to_the_end() {
        let mut s = session();
        run(&mut s, &["keyframe add a time=0"]);
        s.viewer_mut().set_atom_colors(ModelId(1), [0, 0, 0, 255]);
        run(&mut s, &["keyframe add b time=1", "setLength 1", "play"]);
        assert_eq!(s.animation().state(), PlaybackState::Playing);

        let mut frames = 1;
        while s.tick() {
            frames += 1;
        }
        assert_eq!(frames, 11);
        assert_eq!(s.animation().state(), PlaybackState::Idle);
        assert_eq!(
            s.viewer().state().scene_colors[&ModelId(1)].atoms[0],
            [0, 0, 0, 255]
        );
    }

    #[test]
    fn record_then_stop_recording() {
        let mut s = session();
        run(&mut s, &["keyframe add a", "keyframe add b", "record out.mp4"]);
        assert!(s.animation().is_recording());

        run(&mut s, &["stop"]);
        assert!(s.animation().is_recording());
        assert!(s.tick());
        run(&mut s, &["stopRecording"]);
        assert!(!s.animation().is_playing());
        assert!(s.execute(Command::StopRecording).is_err());
    }

    #[test]
    fn deleting_a_scene_drops_its_keyframe() {
        let mut s = session();
        run(&mut s, &["keyframe add a", "keyframe add b", "scene delete a"]);
        assert!(!s.scenes().exists("a"));
        assert!(!s.animation().timeline().contains("a"));
        assert!(s.animation().timeline().contains("b"));

        run(&mut s, &["scenes clear"]);
        assert!(s.scenes().is_empty());
        assert!(s.animation().timeline().is_empty());
    }

    #[test]
    fn insert_and_remove_time_commands() {
        let mut s = session();
        run(&mut s, &["keyframe add a time=1", "keyframe add b time=2"]);
        run(&mut s, &["insertTime 1.5 2"]);
        assert_eq!(s.animation().timeline().keyframe("b").unwrap().time, 4.0);
        assert_eq!(s.animation().timeline().length(), 7.0);

        run(&mut s, &["removeTime 1.5 3.5"]);
        assert_eq!(s.animation().timeline().keyframe("b").unwrap().time, 2.0);
        assert_eq!(s.animation().timeline().length(), 5.0);

        // Blocked by b at 2.
        run(&mut s, &["removeTime 1.5 2.5"]);
        assert_eq!(s.animation().timeline().length(), 5.0);
    }

    #[test]
    fn closed_models_are_pruned_from_scenes() {
        let mut s = session();
        s.viewer_mut().add_model(ModelId(2), ModelShape::new(1, 0, 0, 0));
        run(&mut s, &["scene save both"]);
        assert!(s.viewer_mut().remove_model(ModelId(2)));
        s.models_closed(&[ModelId(2)]);

        let ids = s.scenes().get("both").unwrap().state().model_ids();
        assert!(!ids.contains(&ModelId(2)));
        assert!(s.execute(Command::RestoreScene("both".to_owned())).is_ok());
        assert!(s.execute(Command::RestoreScene("none".to_owned())).is_err());
    }
}
