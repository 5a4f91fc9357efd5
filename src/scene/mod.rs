//! Named scenes: saved visual states that keyframes refer to.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::event::{EventEmitter, SubscriptionId};
use crate::interpolate;
use crate::state::{self, ModelId, Rgba8, VisualState};
use crate::viewer::Viewer;

/// Small RGBA preview image of a scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thumbnail {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major pixels, `width * height` entries.
    pub pixels: Vec<Rgba8>,
}

impl Thumbnail {
    /// An image of a single color.
    pub fn filled(width: u32, height: u32, color: Rgba8) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }
}

/// A saved visual state plus an optional preview image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    name: String,
    state: VisualState,
    thumbnail: Option<Thumbnail>,
}

impl Scene {
    /// Wrap a captured state.
    pub fn new(
        name: impl Into<String>,
        state: VisualState,
        thumbnail: Option<Thumbnail>,
    ) -> Self {
        Self {
            name: name.into(),
            state,
            thumbnail,
        }
    }

    /// Scene name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The saved visual state.
    pub fn state(&self) -> &VisualState {
        &self.state
    }

    /// The preview image, if one was captured.
    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }
}

/// Change notifications from a [`SceneStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    /// A scene was saved under this name.
    Added(String),
    /// The scene with this name was removed or replaced.
    Deleted(String),
}

#[derive(Serialize, Deserialize)]
struct StoreSnapshot {
    version: u32,
    scenes: Vec<Scene>,
}

/// Name → scene mapping for one session.
#[derive(Debug, Default)]
pub struct SceneStore {
    scenes: FxHashMap<String, Scene>,
    events: EventEmitter<SceneEvent>,
}

impl SceneStore {
    /// Persisted store format version.
    pub const SNAPSHOT_VERSION: u32 = 1;

    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to added/deleted notifications from this store.
    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&SceneEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(handler)
    }

    /// Remove a subscription made with [`subscribe`](Self::subscribe).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Capture the viewer's current state as `name`, replacing any scene
    /// already saved under that name.
    pub fn save(&mut self, name: &str, viewer: &dyn Viewer) {
        if self.scenes.contains_key(name) {
            let _ = self.delete(name);
        }
        let scene = Scene::new(name, state::capture(viewer), viewer.thumbnail());
        let _ = self.scenes.insert(name.to_owned(), scene);
        log::info!("saved scene {name}");
        self.events.emit(&SceneEvent::Added(name.to_owned()));
    }

    /// Restore a saved scene into the viewer.
    ///
    /// Returns `Ok(false)` without touching the viewer when no scene has
    /// this name.
    pub fn restore(&self, name: &str, viewer: &mut dyn Viewer) -> SceneResult<bool> {
        let Some(scene) = self.scenes.get(name) else {
            log::debug!("no scene named {name} to restore");
            return Ok(false);
        };
        state::restore(viewer, scene.state())?;
        Ok(true)
    }

    /// Blend two saved scenes and show the result.
    pub fn interpolate_scenes(
        &self,
        from: &str,
        to: &str,
        fraction: f32,
        viewer: &mut dyn Viewer,
    ) -> SceneResult<()> {
        let a = self.require(from)?;
        let b = self.require(to)?;
        let blended = interpolate::interpolate(a.state(), b.state(), fraction)?;
        state::restore(viewer, &blended)
    }

    /// Remove one scene. Returns it if it existed.
    pub fn delete(&mut self, name: &str) -> Option<Scene> {
        let scene = self.scenes.remove(name)?;
        self.events.emit(&SceneEvent::Deleted(name.to_owned()));
        Some(scene)
    }

    /// Remove every scene, emitting one deletion per scene.
    pub fn clear(&mut self) {
        for name in self.names() {
            let _ = self.delete(&name);
        }
    }

    /// The scene with this name.
    pub fn get(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    /// Like [`get`](Self::get), but a missing scene is an error.
    pub fn require(&self, name: &str) -> SceneResult<&Scene> {
        self.get(name)
            .ok_or_else(|| SceneError::SceneNotFound(name.to_owned()))
    }

    /// Whether a scene with this name exists.
    pub fn exists(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    /// All scene names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scenes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of stored scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether no scenes are stored.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Forget closed models in every stored scene so later restores and
    /// interpolations only see models that can still be addressed.
    pub fn models_removed(&mut self, ids: &[ModelId]) {
        for scene in self.scenes.values_mut() {
            if scene.state.remove_models(ids) {
                log::debug!("pruned closed models from scene {}", scene.name);
            }
        }
    }

    /// Serialize every scene to JSON.
    pub fn to_json(&self) -> SceneResult<String> {
        let mut scenes: Vec<Scene> = self.scenes.values().cloned().collect();
        scenes.sort_by(|a, b| a.name.cmp(&b.name));
        let snapshot = StoreSnapshot {
            version: Self::SNAPSHOT_VERSION,
            scenes,
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Replace the store's contents with scenes read from JSON.
    ///
    /// Fails without modifying the store if the store or any scene was
    /// written with a different format version.
    pub fn load_json(&mut self, json: &str) -> SceneResult<()> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)?;
        if snapshot.version != Self::SNAPSHOT_VERSION {
            return Err(SceneError::VersionMismatch {
                record: "scene store",
                found: snapshot.version,
                expected: Self::SNAPSHOT_VERSION,
            });
        }
        for scene in &snapshot.scenes {
            scene.state.check_version()?;
        }

        self.clear();
        for scene in snapshot.scenes {
            let name = scene.name.clone();
            let _ = self.scenes.insert(name.clone(), scene);
            self.events.emit(&SceneEvent::Added(name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::viewer::{HeadlessViewer, ModelShape};

    fn viewer() -> HeadlessViewer {
        let mut viewer = HeadlessViewer::new().with_thumbnails(4, 2);
        viewer.add_model(ModelId(1), ModelShape::new(3, 2, 1, 0));
        viewer
    }

    fn recorded_events(store: &mut SceneStore) -> Rc<RefCell<Vec<SceneEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let _ = store.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    #[test]
    fn save_captures_state_and_thumbnail() {
        let viewer = viewer();
        let mut store = SceneStore::new();
        store.save("start", &viewer);

        let scene = store.get("start").unwrap();
        assert_eq!(scene.name(), "start");
        assert_eq!(scene.state(), viewer.state());
        assert_eq!(scene.thumbnail().unwrap().pixels.len(), 8);
        assert!(store.exists("start"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn save_overwrites_existing_scene() {
        let mut viewer = viewer();
        let mut store = SceneStore::new();
        let events = recorded_events(&mut store);

        store.save("s", &viewer);
        viewer.set_atom_colors(ModelId(1), [1, 2, 3, 4]);
        store.save("s", &viewer);

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("s").unwrap().state().scene_colors[&ModelId(1)].atoms[0],
            [1, 2, 3, 4]
        );
        assert_eq!(
            *events.borrow(),
            vec![
                SceneEvent::Added("s".to_owned()),
                SceneEvent::Deleted("s".to_owned()),
                SceneEvent::Added("s".to_owned()),
            ]
        );
    }

    #[test]
    fn restore_missing_scene_is_a_no_op() {
        let mut viewer = viewer();
        let store = SceneStore::new();
        assert!(!store.restore("nope", &mut viewer).unwrap());
        assert_eq!(viewer.frames_rendered(), 0);
    }

    #[test]
    fn restore_applies_saved_state() {
        let mut viewer = viewer();
        let mut store = SceneStore::new();
        store.save("s", &viewer);
        let saved = viewer.state().clone();

        viewer.set_atoms_shown(ModelId(1), false);
        assert!(store.restore("s", &mut viewer).unwrap());
        assert_eq!(viewer.state(), &saved);
    }

    #[test]
    fn clear_emits_one_deletion_per_scene() {
        let viewer = viewer();
        let mut store = SceneStore::new();
        store.save("a", &viewer);
        store.save("b", &viewer);
        let events = recorded_events(&mut store);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(
            *events.borrow(),
            vec![
                SceneEvent::Deleted("a".to_owned()),
                SceneEvent::Deleted("b".to_owned()),
            ]
        );
    }

    #[test]
    fn delete_returns_removed_scene() {
        let viewer = viewer();
        let mut store = SceneStore::new();
        store.save("a", &viewer);
        assert_eq!(store.delete("a").unwrap().name(), "a");
        assert!(store.delete("a").is_none());
    }

    #[test]
    fn models_removed_prunes_scenes() {
        let mut viewer = viewer();
        viewer.add_model(ModelId(2), ModelShape::new(1, 0, 0, 0));
        let mut store = SceneStore::new();
        store.save("a", &viewer);

        store.models_removed(&[ModelId(2)]);
        let ids = store.get("a").unwrap().state().model_ids();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![ModelId(1)]);
    }

    #[test]
    fn json_round_trip_keeps_scenes() {
        let viewer = viewer();
        let mut store = SceneStore::new();
        store.save("a", &viewer);
        store.save("b", &viewer);
        let json = store.to_json().unwrap();

        let mut loaded = SceneStore::new();
        loaded.load_json(&json).unwrap();
        assert_eq!(loaded.names(), vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(loaded.get("a"), store.get("a"));
    }

    #[test]
    fn load_rejects_version_mismatch() {
        let viewer = viewer();
        let mut store = SceneStore::new();
        store.save("a", &viewer);
        let json = store.to_json().unwrap().replacen(
            "\"version\": 1",
            "\"version\": 99",
            1,
        );

        let mut loaded = SceneStore::new();
        let err = loaded.load_json(&json).unwrap_err();
        assert!(matches!(err, SceneError::VersionMismatch { found: 99, .. }));
        assert!(loaded.is_empty());
    }
}
