//! Rigid-transform interpolation about a center of rotation.
//!
//! Linearly blending two placement matrices shears and shrinks whatever
//! they place. Instead the rotation is slerped and the translation is
//! chosen so a chosen center point travels in a straight line.

use glam::{Affine3A, Quat, Vec3};

fn rotation_of(transform: &Affine3A) -> Quat {
    Quat::from_mat3a(&transform.matrix3).normalize()
}

/// Interpolate a model placement so that `center` (model coordinates)
/// moves linearly between where `a` and `b` put it, while the orientation
/// slerps.
pub fn interpolate_about_local(
    a: &Affine3A,
    b: &Affine3A,
    center: Vec3,
    fraction: f32,
) -> Affine3A {
    if fraction <= 0.0 {
        return *a;
    }
    if fraction >= 1.0 {
        return *b;
    }
    let rotation = rotation_of(a).slerp(rotation_of(b), fraction);
    let world_center = a
        .transform_point3(center)
        .lerp(b.transform_point3(center), fraction);
    Affine3A::from_rotation_translation(rotation, world_center - rotation * center)
}

/// Interpolate a camera placement orbiting a scene-coordinate center of
/// rotation.
///
/// The center itself moves from `center_a` to `center_b`; the camera's
/// offset from it, expressed in camera coordinates, moves linearly, so the
/// viewing distance changes smoothly while the camera swings around the
/// center.
pub fn interpolate_orbit(
    a: &Affine3A,
    b: &Affine3A,
    center_a: Vec3,
    center_b: Vec3,
    fraction: f32,
) -> Affine3A {
    if fraction <= 0.0 {
        return *a;
    }
    if fraction >= 1.0 {
        return *b;
    }
    let rotation = rotation_of(a).slerp(rotation_of(b), fraction);
    let local_a = a.inverse().transform_point3(center_a);
    let local_b = b.inverse().transform_point3(center_b);
    let local = local_a.lerp(local_b, fraction);
    let center = center_a.lerp(center_b, fraction);
    Affine3A::from_rotation_translation(rotation, center - rotation * local)
}

/// Blend two unit directions, keeping the result unit length.
///
/// Falls back to a hard switch at the midpoint for opposite directions,
/// whose blend has no meaningful direction.
pub fn interpolate_direction(a: Vec3, b: Vec3, fraction: f32) -> Vec3 {
    if fraction <= 0.0 {
        return a;
    }
    if fraction >= 1.0 {
        return b;
    }
    a.lerp(b, fraction)
        .try_normalize()
        .unwrap_or(if fraction < 0.5 { a } else { b })
}
