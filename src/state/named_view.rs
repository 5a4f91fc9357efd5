use glam::{Affine3A, Vec3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ModelId;

/// A named clipping plane in scene coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipPlane {
    /// Plane name (`near`, `far`, `front`, `back`, or user-defined).
    pub name: String,
    /// A point on the plane.
    pub point: Vec3,
    /// Unit normal; the clipped side is the one the normal points away
    /// from.
    pub normal: Vec3,
}

/// Camera, clip-plane, and model placement record used for geometric
/// interpolation.
///
/// Each model carries a motion center (its bounds center in model
/// coordinates). Interpolated model positions rotate about that point so a
/// spinning model does not swing wide while it turns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedView {
    /// Camera-to-scene rigid transform.
    pub camera_position: Affine3A,
    /// Scene-coordinate point the camera orbits.
    pub center_of_rotation: Vec3,
    /// Active clip planes.
    pub clip_planes: Vec<ClipPlane>,
    /// Model-to-scene rigid transforms.
    pub positions: FxHashMap<ModelId, Affine3A>,
    /// Bounds center of each model, in model coordinates.
    pub motion_centers: FxHashMap<ModelId, Vec3>,
}

impl Default for NamedView {
    fn default() -> Self {
        Self {
            camera_position: Affine3A::from_translation(Vec3::new(
                0.0, 0.0, 100.0,
            )),
            center_of_rotation: Vec3::ZERO,
            clip_planes: Vec::new(),
            positions: FxHashMap::default(),
            motion_centers: FxHashMap::default(),
        }
    }
}

impl NamedView {
    /// The clip plane with the given name, if active.
    pub fn clip_plane(&self, name: &str) -> Option<&ClipPlane> {
        self.clip_planes.iter().find(|p| p.name == name)
    }

    /// Motion center for a model, defaulting to its local origin.
    pub fn motion_center(&self, id: ModelId) -> Vec3 {
        self.motion_centers.get(&id).copied().unwrap_or(Vec3::ZERO)
    }
}
