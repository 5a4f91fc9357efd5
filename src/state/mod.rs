//! Versioned snapshots of a viewer's full visual state.
//!
//! A [`VisualState`] is captured from a [`Viewer`] and later restored into
//! it. The record is split into explicit sub-states so that serialization
//! and interpolation work on typed fields rather than loose dictionaries:
//!
//! - `main_view_data`: projection, lighting, material, background
//! - `named_view`: camera placement, clip planes, model positions
//! - `scene_colors` / `scene_visibility`: per-model object arrays

mod model;
mod named_view;
mod view;

use std::collections::BTreeSet;
use std::fmt;

pub use model::{ModelColors, ModelVisibility, PseudobondVisibility, Rgba8};
pub use named_view::{ClipPlane, NamedView};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
pub use view::{
    CameraProjection, LightingState, MaterialState, ProjectionMode, ViewData,
};

use crate::error::{SceneError, SceneResult};
use crate::viewer::Viewer;

/// Identifier of a model (structure, surface, ...) shown in the viewer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ModelId(pub u32);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Full renderable state of one viewer at one moment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisualState {
    /// Format version this record was written with.
    pub version: u32,
    /// Projection, lighting, material, and background.
    pub main_view_data: ViewData,
    /// Camera, clip plane, and model placement.
    pub named_view: NamedView,
    /// Per-model object colors.
    pub scene_colors: FxHashMap<ModelId, ModelColors>,
    /// Per-model object visibility.
    pub scene_visibility: FxHashMap<ModelId, ModelVisibility>,
}

impl Default for VisualState {
    fn default() -> Self {
        Self::new(ViewData::default(), NamedView::default())
    }
}

impl VisualState {
    /// Current snapshot format. Records with any other version are
    /// rejected on restore rather than migrated.
    pub const FORMAT_VERSION: u32 = 1;

    /// A state with no models, stamped with the current format version.
    pub fn new(main_view_data: ViewData, named_view: NamedView) -> Self {
        Self {
            version: Self::FORMAT_VERSION,
            main_view_data,
            named_view,
            scene_colors: FxHashMap::default(),
            scene_visibility: FxHashMap::default(),
        }
    }

    /// Fail with [`SceneError::VersionMismatch`] unless this record uses
    /// the current format.
    pub fn check_version(&self) -> SceneResult<()> {
        if self.version == Self::FORMAT_VERSION {
            Ok(())
        } else {
            Err(SceneError::VersionMismatch {
                record: "scene",
                found: self.version,
                expected: Self::FORMAT_VERSION,
            })
        }
    }

    /// Every model referenced anywhere in the record, sorted.
    pub fn model_ids(&self) -> BTreeSet<ModelId> {
        self.named_view
            .positions
            .keys()
            .chain(self.scene_colors.keys())
            .chain(self.scene_visibility.keys())
            .copied()
            .collect()
    }

    /// Drop every model for which `keep` returns `false`.
    pub fn retain_models(&mut self, mut keep: impl FnMut(ModelId) -> bool) {
        self.named_view.positions.retain(|id, _| keep(*id));
        self.named_view.motion_centers.retain(|id, _| keep(*id));
        self.scene_colors.retain(|id, _| keep(*id));
        self.scene_visibility.retain(|id, _| keep(*id));
    }

    /// Drop the given models. Returns `true` if anything was removed.
    pub fn remove_models(&mut self, ids: &[ModelId]) -> bool {
        let before = self.model_ids().len();
        self.retain_models(|id| !ids.contains(&id));
        self.model_ids().len() != before
    }
}

/// Read the viewer's current visual state. The viewer is not modified.
pub fn capture(viewer: &dyn Viewer) -> VisualState {
    let state = viewer.capture_visual_state();
    log::debug!(
        "captured visual state with {} model(s)",
        state.model_ids().len()
    );
    state
}

/// Write a captured state back into the viewer and redraw.
///
/// Models in `state` that the viewer no longer has are skipped; everything
/// else is restored exactly as captured.
pub fn restore(viewer: &mut dyn Viewer, state: &VisualState) -> SceneResult<()> {
    state.check_version()?;

    let present: FxHashSet<ModelId> = viewer.model_ids().into_iter().collect();
    let missing: Vec<ModelId> = state
        .model_ids()
        .into_iter()
        .filter(|id| !present.contains(id))
        .collect();

    if missing.is_empty() {
        viewer.apply_visual_state(state);
    } else {
        log::debug!(
            "skipping {} model(s) no longer open: {missing:?}",
            missing.len()
        );
        let mut pruned = state.clone();
        pruned.retain_models(|id| present.contains(&id));
        viewer.apply_visual_state(&pruned);
    }
    viewer.render_frame();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::{HeadlessViewer, ModelShape};

    fn viewer_with_two_models() -> HeadlessViewer {
        let mut viewer = HeadlessViewer::new();
        viewer.add_model(ModelId(1), ModelShape::new(4, 3, 2, 0));
        viewer.add_model(ModelId(2), ModelShape::new(2, 1, 0, 1));
        viewer
    }

    #[test]
    fn capture_does_not_touch_viewer() {
        let viewer = viewer_with_two_models();
        let before = viewer.state().clone();
        let state = capture(&viewer);
        assert_eq!(viewer.state(), &before);
        assert_eq!(viewer.frames_rendered(), 0);
        assert_eq!(
            state.model_ids().into_iter().collect::<Vec<_>>(),
            vec![ModelId(1), ModelId(2)]
        );
        assert_eq!(state.version, VisualState::FORMAT_VERSION);
    }

    #[test]
    fn restore_round_trips_and_renders() {
        let mut viewer = viewer_with_two_models();
        let saved = capture(&viewer);

        viewer.set_atom_colors(ModelId(1), [255, 0, 0, 255]);
        viewer.state_mut().main_view_data.lighting.shadows = true;
        assert_ne!(viewer.state(), &saved);

        restore(&mut viewer, &saved).unwrap();
        assert_eq!(viewer.state(), &saved);
        assert_eq!(viewer.frames_rendered(), 1);
    }

    #[test]
    fn restore_skips_closed_models() {
        let mut viewer = viewer_with_two_models();
        let saved = capture(&viewer);

        assert!(viewer.remove_model(ModelId(2)));
        viewer.set_atom_colors(ModelId(1), [0, 0, 255, 255]);
        restore(&mut viewer, &saved).unwrap();

        assert_eq!(viewer.model_ids(), vec![ModelId(1)]);
        assert_eq!(
            viewer.state().scene_colors[&ModelId(1)],
            saved.scene_colors[&ModelId(1)]
        );
        assert!(!viewer.state().scene_colors.contains_key(&ModelId(2)));
    }

    #[test]
    fn restore_rejects_other_versions() {
        let mut viewer = viewer_with_two_models();
        let mut saved = capture(&viewer);
        saved.version = VisualState::FORMAT_VERSION + 1;

        let err = restore(&mut viewer, &saved).unwrap_err();
        assert!(matches!(err, SceneError::VersionMismatch { .. }));
        assert_eq!(viewer.frames_rendered(), 0);
    }

    #[test]
    fn remove_models_prunes_every_section() {
        let viewer = viewer_with_two_models();
        let mut state = capture(&viewer);
        assert!(state.remove_models(&[ModelId(1)]));
        assert!(!state.remove_models(&[ModelId(1)]));
        assert!(!state.named_view.positions.contains_key(&ModelId(1)));
        assert!(!state.named_view.motion_centers.contains_key(&ModelId(1)));
        assert!(!state.scene_visibility.contains_key(&ModelId(1)));
        assert_eq!(state.model_ids().len(), 1);
    }

    #[test]
    fn state_serializes_through_json() {
        let viewer = viewer_with_two_models();
        let state = capture(&viewer);
        let json = serde_json::to_string(&state).unwrap();
        let parsed: VisualState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }
}
