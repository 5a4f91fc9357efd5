//! Blending between two visual states.
//!
//! Two policies apply depending on the attribute:
//!
//! - Continuous values (colors, intensities, positions, clip planes) are
//!   blended `(1 - f) * a + f * b` and converted back to their native
//!   representation. Rigid placements use [`rigid`] so rotations stay
//!   rigid.
//! - Discrete values (display flags, half-bond flags, projection mode,
//!   shadow settings) switch from `a` to `b` at `f = 0.5`.

pub mod rigid;

use std::collections::BTreeSet;

use crate::error::{SceneError, SceneResult};
use crate::state::{
    CameraProjection, ClipPlane, LightingState, MaterialState, ModelColors,
    ModelId, ModelVisibility, NamedView, PseudobondVisibility, Rgba8,
    ViewData, VisualState,
};

/// Fraction at which discrete attributes switch from the first state to the
/// second.
pub const SWITCH_FRACTION: f32 = 0.5;

/// Lerp two f32 values.
#[inline]
pub fn lerp_f32(start: f32, end: f32, fraction: f32) -> f32 {
    start + (end - start) * fraction
}

/// Lerp each channel of two float colors.
#[inline]
pub fn lerp_array<const N: usize>(
    start: [f32; N],
    end: [f32; N],
    fraction: f32,
) -> [f32; N] {
    std::array::from_fn(|i| lerp_f32(start[i], end[i], fraction))
}

/// Lerp each channel of two 8-bit colors, rounding to the nearest value.
#[inline]
pub fn lerp_rgba8(start: Rgba8, end: Rgba8, fraction: f32) -> Rgba8 {
    std::array::from_fn(|i| {
        lerp_f32(f32::from(start[i]), f32::from(end[i]), fraction)
            .round()
            .clamp(0.0, 255.0) as u8
    })
}

/// Threshold policy for discrete values: `start` below
/// [`SWITCH_FRACTION`], `end` from it on.
#[inline]
pub fn switch<T: Clone>(start: &T, end: &T, fraction: f32) -> T {
    if fraction < SWITCH_FRACTION {
        start.clone()
    } else {
        end.clone()
    }
}

fn lerp_colors(start: &[Rgba8], end: &[Rgba8], fraction: f32) -> Vec<Rgba8> {
    start
        .iter()
        .zip(end)
        .map(|(a, b)| lerp_rgba8(*a, *b, fraction))
        .collect()
}

/// Whether two states can be blended: they must describe the same models
/// with the same objects in every tracked category.
pub fn interpolatable(a: &VisualState, b: &VisualState) -> bool {
    check_interpolatable(a, b).is_ok()
}

/// Like [`interpolatable`], but reports the first mismatch.
pub fn check_interpolatable(a: &VisualState, b: &VisualState) -> SceneResult<()> {
    let mismatch = |msg: String| Err(SceneError::NotInterpolatable(msg));

    if !same_keys(a.named_view.positions.keys(), b.named_view.positions.keys()) {
        return mismatch("scenes position different models".to_owned());
    }
    if !same_keys(a.scene_colors.keys(), b.scene_colors.keys()) {
        return mismatch("scenes color different models".to_owned());
    }
    if !same_keys(a.scene_visibility.keys(), b.scene_visibility.keys()) {
        return mismatch("scenes track visibility of different models".to_owned());
    }
    for (id, colors) in &a.scene_colors {
        let same = b
            .scene_colors
            .get(id)
            .is_some_and(|other| other.shape() == colors.shape());
        if !same {
            return mismatch(format!("model {id} colors different objects"));
        }
    }
    for (id, vis) in &a.scene_visibility {
        let same = b
            .scene_visibility
            .get(id)
            .is_some_and(|other| other.shape() == vis.shape());
        if !same {
            return mismatch(format!("model {id} shows different objects"));
        }
    }
    Ok(())
}

fn same_keys<'a>(
    a: impl Iterator<Item = &'a ModelId>,
    b: impl Iterator<Item = &'a ModelId>,
) -> bool {
    a.collect::<BTreeSet<_>>() == b.collect::<BTreeSet<_>>()
}

/// Blend two states. `fraction` is clamped to `[0, 1]`; 0 reproduces `a`
/// and 1 reproduces `b`.
///
/// Fails with [`SceneError::NotInterpolatable`] when the states describe
/// different models, and with [`SceneError::VersionMismatch`] when either
/// was written by another format version.
pub fn interpolate(
    a: &VisualState,
    b: &VisualState,
    fraction: f32,
) -> SceneResult<VisualState> {
    a.check_version()?;
    b.check_version()?;
    check_interpolatable(a, b)?;
    let f = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    if f <= 0.0 {
        return Ok(a.clone());
    }
    if f >= 1.0 {
        return Ok(b.clone());
    }

    let scene_colors = a
        .scene_colors
        .iter()
        .filter_map(|(id, ca)| {
            let cb = b.scene_colors.get(id)?;
            Some((*id, blend_model_colors(ca, cb, f)))
        })
        .collect();
    let scene_visibility = a
        .scene_visibility
        .iter()
        .filter_map(|(id, va)| {
            let vb = b.scene_visibility.get(id)?;
            Some((*id, blend_model_visibility(va, vb, f)))
        })
        .collect();

    Ok(VisualState {
        version: VisualState::FORMAT_VERSION,
        main_view_data: blend_view_data(&a.main_view_data, &b.main_view_data, f),
        named_view: blend_named_view(&a.named_view, &b.named_view, f),
        scene_colors,
        scene_visibility,
    })
}

fn blend_view_data(a: &ViewData, b: &ViewData, f: f32) -> ViewData {
    ViewData {
        camera: blend_projection(&a.camera, &b.camera, f),
        lighting: blend_lighting(&a.lighting, &b.lighting, f),
        material: blend_material(&a.material, &b.material, f),
        background_color: lerp_array(a.background_color, b.background_color, f),
        silhouettes: switch(&a.silhouettes, &b.silhouettes, f),
        silhouette_width: lerp_f32(a.silhouette_width, b.silhouette_width, f),
        silhouette_color: lerp_array(a.silhouette_color, b.silhouette_color, f),
    }
}

fn blend_projection(
    a: &CameraProjection,
    b: &CameraProjection,
    f: f32,
) -> CameraProjection {
    CameraProjection {
        mode: switch(&a.mode, &b.mode, f),
        field_of_view: lerp_f32(a.field_of_view, b.field_of_view, f),
        field_width: lerp_f32(a.field_width, b.field_width, f),
    }
}

fn blend_lighting(a: &LightingState, b: &LightingState, f: f32) -> LightingState {
    LightingState {
        key_light_direction: rigid::interpolate_direction(
            a.key_light_direction,
            b.key_light_direction,
            f,
        ),
        key_light_color: lerp_array(a.key_light_color, b.key_light_color, f),
        key_light_intensity: lerp_f32(
            a.key_light_intensity,
            b.key_light_intensity,
            f,
        ),
        fill_light_direction: rigid::interpolate_direction(
            a.fill_light_direction,
            b.fill_light_direction,
            f,
        ),
        fill_light_color: lerp_array(a.fill_light_color, b.fill_light_color, f),
        fill_light_intensity: lerp_f32(
            a.fill_light_intensity,
            b.fill_light_intensity,
            f,
        ),
        ambient_light_color: lerp_array(
            a.ambient_light_color,
            b.ambient_light_color,
            f,
        ),
        ambient_light_intensity: lerp_f32(
            a.ambient_light_intensity,
            b.ambient_light_intensity,
            f,
        ),
        depth_cue: switch(&a.depth_cue, &b.depth_cue, f),
        depth_cue_start: lerp_f32(a.depth_cue_start, b.depth_cue_start, f),
        depth_cue_end: lerp_f32(a.depth_cue_end, b.depth_cue_end, f),
        depth_cue_color: lerp_array(a.depth_cue_color, b.depth_cue_color, f),
        shadows: switch(&a.shadows, &b.shadows, f),
        multishadow: switch(&a.multishadow, &b.multishadow, f),
    }
}

fn blend_material(a: &MaterialState, b: &MaterialState, f: f32) -> MaterialState {
    MaterialState {
        reflectivity: lerp_f32(a.reflectivity, b.reflectivity, f),
        specular_reflectivity: lerp_f32(
            a.specular_reflectivity,
            b.specular_reflectivity,
            f,
        ),
        specular_exponent: lerp_f32(a.specular_exponent, b.specular_exponent, f),
        ambient_reflectivity: lerp_f32(
            a.ambient_reflectivity,
            b.ambient_reflectivity,
            f,
        ),
        transparent_cast_shadows: switch(
            &a.transparent_cast_shadows,
            &b.transparent_cast_shadows,
            f,
        ),
    }
}

fn blend_named_view(a: &NamedView, b: &NamedView, f: f32) -> NamedView {
    let positions = a
        .positions
        .iter()
        .filter_map(|(id, pa)| {
            let pb = b.positions.get(id)?;
            let center = a.motion_center(*id);
            Some((*id, rigid::interpolate_about_local(pa, pb, center, f)))
        })
        .collect();

    NamedView {
        camera_position: rigid::interpolate_orbit(
            &a.camera_position,
            &b.camera_position,
            a.center_of_rotation,
            b.center_of_rotation,
            f,
        ),
        center_of_rotation: a.center_of_rotation.lerp(b.center_of_rotation, f),
        clip_planes: blend_clip_planes(&a.clip_planes, &b.clip_planes, f),
        positions,
        motion_centers: switch(&a.motion_centers, &b.motion_centers, f),
    }
}

/// Planes present in both views move smoothly; a plane present in only one
/// view appears or disappears at the switch fraction.
fn blend_clip_planes(a: &[ClipPlane], b: &[ClipPlane], f: f32) -> Vec<ClipPlane> {
    let mut planes = Vec::with_capacity(a.len().max(b.len()));
    for pa in a {
        match b.iter().find(|pb| pb.name == pa.name) {
            Some(pb) => planes.push(ClipPlane {
                name: pa.name.clone(),
                point: pa.point.lerp(pb.point, f),
                normal: rigid::interpolate_direction(pa.normal, pb.normal, f),
            }),
            None if f < SWITCH_FRACTION => planes.push(pa.clone()),
            None => {}
        }
    }
    if f >= SWITCH_FRACTION {
        planes.extend(
            b.iter()
                .filter(|pb| !a.iter().any(|pa| pa.name == pb.name))
                .cloned(),
        );
    }
    planes
}

fn blend_model_colors(a: &ModelColors, b: &ModelColors, f: f32) -> ModelColors {
    ModelColors {
        atoms: lerp_colors(&a.atoms, &b.atoms, f),
        bonds: lerp_colors(&a.bonds, &b.bonds, f),
        ribbons: lerp_colors(&a.ribbons, &b.ribbons, f),
        rings: lerp_colors(&a.rings, &b.rings, f),
        pseudobonds: a
            .pseudobonds
            .iter()
            .filter_map(|(group, ca)| {
                let cb = b.pseudobonds.get(group)?;
                Some((group.clone(), lerp_colors(ca, cb, f)))
            })
            .collect(),
    }
}

fn blend_model_visibility(
    a: &ModelVisibility,
    b: &ModelVisibility,
    f: f32,
) -> ModelVisibility {
    let pick = |va: &Vec<bool>, vb: &Vec<bool>| switch(va, vb, f);
    ModelVisibility {
        display: switch(&a.display, &b.display, f),
        atoms: pick(&a.atoms, &b.atoms),
        bonds: pick(&a.bonds, &b.bonds),
        halfbonds: pick(&a.halfbonds, &b.halfbonds),
        ribbons: pick(&a.ribbons, &b.ribbons),
        rings: pick(&a.rings, &b.rings),
        pseudobonds: a
            .pseudobonds
            .iter()
            .filter_map(|(group, pa)| {
                let pb = b.pseudobonds.get(group)?;
                Some((
                    group.clone(),
                    PseudobondVisibility {
                        display: pick(&pa.display, &pb.display),
                        halfbonds: pick(&pa.halfbonds, &pb.halfbonds),
                    },
                ))
            })
            .collect(),
    }
}
