use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How the camera projects the scene.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Perspective projection with a horizontal field of view.
    #[default]
    Perspective,
    /// Orthographic projection with a fixed field width.
    Orthographic,
}

/// Camera projection parameters. The camera's placement lives in
/// [`NamedView`](super::NamedView).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraProjection {
    /// Projection mode.
    pub mode: ProjectionMode,
    /// Horizontal field of view in degrees (perspective).
    pub field_of_view: f32,
    /// Visible width in scene units (orthographic).
    pub field_width: f32,
}

impl Default for CameraProjection {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::Perspective,
            field_of_view: 30.0,
            field_width: 100.0,
        }
    }
}

/// Directional, ambient, depth-cue, and shadow lighting parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LightingState {
    /// Key light direction in camera coordinates (unit length).
    pub key_light_direction: Vec3,
    /// Key light RGB color.
    pub key_light_color: [f32; 3],
    /// Key light intensity.
    pub key_light_intensity: f32,
    /// Fill light direction in camera coordinates (unit length).
    pub fill_light_direction: Vec3,
    /// Fill light RGB color.
    pub fill_light_color: [f32; 3],
    /// Fill light intensity.
    pub fill_light_intensity: f32,
    /// Ambient light RGB color.
    pub ambient_light_color: [f32; 3],
    /// Ambient light intensity.
    pub ambient_light_intensity: f32,
    /// Whether depth cueing is enabled.
    pub depth_cue: bool,
    /// Fraction of the scene depth where cueing begins.
    pub depth_cue_start: f32,
    /// Fraction of the scene depth where cueing is complete.
    pub depth_cue_end: f32,
    /// RGB color objects fade toward.
    pub depth_cue_color: [f32; 3],
    /// Whether the key light casts shadows.
    pub shadows: bool,
    /// Number of ambient-occlusion shadow directions (0 = off).
    pub multishadow: u32,
}

impl Default for LightingState {
    fn default() -> Self {
        Self {
            key_light_direction: Vec3::new(1.0, -1.0, -1.0).normalize(),
            key_light_color: [1.0, 1.0, 1.0],
            key_light_intensity: 1.0,
            fill_light_direction: Vec3::new(-1.0, -0.2, -1.0).normalize(),
            fill_light_color: [1.0, 1.0, 1.0],
            fill_light_intensity: 0.5,
            ambient_light_color: [1.0, 1.0, 1.0],
            ambient_light_intensity: 0.4,
            depth_cue: true,
            depth_cue_start: 0.5,
            depth_cue_end: 1.0,
            depth_cue_color: [0.0, 0.0, 0.0],
            shadows: false,
            multishadow: 0,
        }
    }
}

/// Surface material parameters shared by all drawn objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialState {
    /// Diffuse reflectivity.
    pub reflectivity: f32,
    /// Specular reflectivity.
    pub specular_reflectivity: f32,
    /// Specular exponent (shininess).
    pub specular_exponent: f32,
    /// Ambient reflectivity.
    pub ambient_reflectivity: f32,
    /// Whether transparent objects cast shadows.
    pub transparent_cast_shadows: bool,
}

impl Default for MaterialState {
    fn default() -> Self {
        Self {
            reflectivity: 0.8,
            specular_reflectivity: 0.3,
            specular_exponent: 30.0,
            ambient_reflectivity: 0.8,
            transparent_cast_shadows: false,
        }
    }
}

/// Camera-independent view settings: projection, lighting, material,
/// background, and silhouettes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewData {
    /// Camera projection.
    pub camera: CameraProjection,
    /// Lighting.
    pub lighting: LightingState,
    /// Material.
    pub material: MaterialState,
    /// Background RGBA color.
    pub background_color: [f32; 4],
    /// Whether silhouette edges are drawn.
    pub silhouettes: bool,
    /// Silhouette edge width in pixels.
    pub silhouette_width: f32,
    /// Silhouette edge RGBA color.
    pub silhouette_color: [f32; 4],
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            camera: CameraProjection::default(),
            lighting: LightingState::default(),
            material: MaterialState::default(),
            background_color: [0.0, 0.0, 0.0, 1.0],
            silhouettes: false,
            silhouette_width: 1.0,
            silhouette_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}
