//! The viewer collaborator: the only way the engine touches rendering.

use glam::{Affine3A, Vec3};

use crate::scene::Thumbnail;
use crate::state::{
    ModelColors, ModelId, ModelVisibility, PseudobondVisibility, Rgba8,
    VisualState,
};

/// A 3D viewer whose visual state can be read and written.
///
/// The engine never draws pixels itself. It captures state, applies
/// (possibly interpolated) state, and asks the viewer to redraw.
pub trait Viewer {
    /// Snapshot everything needed to redraw the current image.
    fn capture_visual_state(&self) -> VisualState;

    /// Overwrite the viewer's visual state with `state`. Only models the
    /// viewer currently has are present in `state`.
    fn apply_visual_state(&mut self, state: &VisualState);

    /// Schedule a redraw.
    fn render_frame(&mut self);

    /// Models currently open in the viewer.
    fn model_ids(&self) -> Vec<ModelId>;

    /// Small preview image of the current view, if the viewer can render
    /// one.
    fn thumbnail(&self) -> Option<Thumbnail> {
        None
    }
}

/// Object counts of a model added to a [`HeadlessViewer`].
#[derive(Debug, Clone, Default)]
pub struct ModelShape {
    /// Number of atoms.
    pub atoms: usize,
    /// Number of bonds.
    pub bonds: usize,
    /// Number of residue ribbon segments.
    pub ribbons: usize,
    /// Number of rings.
    pub rings: usize,
    /// Pseudobond groups as `(name, count)`.
    pub pseudobonds: Vec<(String, usize)>,
    /// Bounds center in model coordinates.
    pub center: Vec3,
}

impl ModelShape {
    /// Shape with the given object counts and no pseudobonds.
    pub fn new(atoms: usize, bonds: usize, ribbons: usize, rings: usize) -> Self {
        Self {
            atoms,
            bonds,
            ribbons,
            rings,
            pseudobonds: Vec::new(),
            center: Vec3::ZERO,
        }
    }

    /// Add a pseudobond group.
    #[must_use]
    pub fn with_pseudobonds(mut self, group: &str, count: usize) -> Self {
        self.pseudobonds.push((group.to_owned(), count));
        self
    }

    /// Set the bounds center used as the model's motion center.
    #[must_use]
    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }
}

const DEFAULT_COLOR: Rgba8 = [178, 178, 178, 255];

/// In-memory [`Viewer`] with no renderer behind it.
///
/// Holds its visual state directly and counts redraw requests. Used by the
/// command-line runner and by tests.
#[derive(Debug, Clone, Default)]
pub struct HeadlessViewer {
    state: VisualState,
    frames_rendered: usize,
    thumbnail_size: Option<(u32, u32)>,
}

impl HeadlessViewer {
    /// A viewer with no models and default view settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce solid-background thumbnails of the given size.
    #[must_use]
    pub fn with_thumbnails(mut self, width: u32, height: u32) -> Self {
        self.thumbnail_size = Some((width, height));
        self
    }

    /// Open a model with default colors, everything shown, at the identity
    /// position.
    pub fn add_model(&mut self, id: ModelId, shape: ModelShape) {
        let colors = ModelColors {
            atoms: vec![DEFAULT_COLOR; shape.atoms],
            bonds: vec![DEFAULT_COLOR; shape.bonds],
            ribbons: vec![DEFAULT_COLOR; shape.ribbons],
            rings: vec![DEFAULT_COLOR; shape.rings],
            pseudobonds: shape
                .pseudobonds
                .iter()
                .map(|(name, n)| (name.clone(), vec![DEFAULT_COLOR; *n]))
                .collect(),
        };
        let visibility = ModelVisibility {
            display: true,
            atoms: vec![true; shape.atoms],
            bonds: vec![true; shape.bonds],
            halfbonds: vec![true; shape.bonds],
            ribbons: vec![true; shape.ribbons],
            rings: vec![false; shape.rings],
            pseudobonds: shape
                .pseudobonds
                .iter()
                .map(|(name, n)| {
                    (
                        name.clone(),
                        PseudobondVisibility {
                            display: vec![true; *n],
                            halfbonds: vec![false; *n],
                        },
                    )
                })
                .collect(),
        };

        let view = &mut self.state.named_view;
        let _ = view.positions.insert(id, Affine3A::IDENTITY);
        let _ = view.motion_centers.insert(id, shape.center);
        let _ = self.state.scene_colors.insert(id, colors);
        let _ = self.state.scene_visibility.insert(id, visibility);
    }

    /// Close a model. Returns `false` if it was not open.
    pub fn remove_model(&mut self, id: ModelId) -> bool {
        self.state.remove_models(&[id])
    }

    /// Current visual state.
    pub fn state(&self) -> &VisualState {
        &self.state
    }

    /// Mutable access to the current visual state.
    pub fn state_mut(&mut self) -> &mut VisualState {
        &mut self.state
    }

    /// Color every atom of a model.
    pub fn set_atom_colors(&mut self, id: ModelId, color: Rgba8) {
        if let Some(colors) = self.state.scene_colors.get_mut(&id) {
            colors.atoms.fill(color);
        }
    }

    /// Show or hide every atom of a model.
    pub fn set_atoms_shown(&mut self, id: ModelId, shown: bool) {
        if let Some(vis) = self.state.scene_visibility.get_mut(&id) {
            vis.atoms.fill(shown);
        }
    }

    /// Move a model.
    pub fn set_model_position(&mut self, id: ModelId, position: Affine3A) {
        if let Some(p) = self.state.named_view.positions.get_mut(&id) {
            *p = position;
        }
    }

    /// Move the camera.
    pub fn set_camera_position(&mut self, position: Affine3A) {
        self.state.named_view.camera_position = position;
    }

    /// Number of redraws requested so far.
    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }
}

impl Viewer for HeadlessViewer {
    fn capture_visual_state(&self) -> VisualState {
        self.state.clone()
    }

    fn apply_visual_state(&mut self, state: &VisualState) {
        self.state.version = state.version;
        self.state.main_view_data = state.main_view_data.clone();

        let view = &mut self.state.named_view;
        view.camera_position = state.named_view.camera_position;
        view.center_of_rotation = state.named_view.center_of_rotation;
        view.clip_planes = state.named_view.clip_planes.clone();
        for (id, position) in &state.named_view.positions {
            if let Some(p) = view.positions.get_mut(id) {
                *p = *position;
            }
        }
        for (id, colors) in &state.scene_colors {
            if let Some(c) = self.state.scene_colors.get_mut(id) {
                *c = colors.clone();
            }
        }
        for (id, vis) in &state.scene_visibility {
            if let Some(v) = self.state.scene_visibility.get_mut(id) {
                *v = vis.clone();
            }
        }
    }

    fn render_frame(&mut self) {
        self.frames_rendered += 1;
    }

    fn model_ids(&self) -> Vec<ModelId> {
        let mut ids: Vec<ModelId> =
            self.state.named_view.positions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn thumbnail(&self) -> Option<Thumbnail> {
        let (width, height) = self.thumbnail_size?;
        let bg = self.state.main_view_data.background_color;
        let pixel = bg.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        Some(Thumbnail::filled(width, height, pixel))
    }
}
