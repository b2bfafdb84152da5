//! Small vector helpers shared by the locomotion and orientation solvers.
//!
//! All functions are pure and defined for finite inputs; degenerate cases
//! (zero-length normalize targets) fall back instead of producing NaN.

use bevy::prelude::*;

/// Clamp `v` to a maximum length. Vectors already within the limit are
/// returned unchanged; the square root is only taken on the long path.
#[inline]
pub fn clamp_length(v: Vec3, max_len: f32) -> Vec3 {
    let length_sq = v.length_squared();
    if length_sq <= max_len * max_len {
        return v;
    }
    v * (max_len / length_sq.sqrt())
}

/// Remove the component of `v` along `normal` (not required to be unit length).
#[inline]
pub fn project_onto_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * (v.dot(normal) / normal.dot(normal))
}

/// Move `current` toward `target` by at most `max_delta`, without overshoot.
#[inline]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance_sq = delta.length_squared();
    if distance_sq <= max_delta * max_delta {
        return target;
    }
    current + delta * (max_delta / distance_sq.sqrt())
}

/// Rotation whose forward (-Z) axis is `forward` and up axis is `up`.
/// Caller guarantees both are unit length and orthogonal.
#[inline]
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    Quat::from_mat3(&Mat3::from_cols(forward.cross(up), up, -forward))
}

/// Rotate `v` into the camera's horizontal frame.
///
/// The camera forward is flattened onto the plane orthogonal to `up_axis`
/// (falling back to the flattened camera up when the forward points straight
/// along `up_axis`), a look rotation is built from the flattened forward and
/// `up_axis`, and `v` is rotated by it. Pure rotation: length is preserved.
pub fn camera_relative(v: Vec3, cam_forward: Vec3, cam_up: Vec3, up_axis: Vec3) -> Vec3 {
    let mut flat_forward = project_onto_plane(cam_forward, up_axis);
    if flat_forward.length_squared() == 0.0 {
        flat_forward = project_onto_plane(cam_up, up_axis);
    }
    let Some(forward) = flat_forward.try_normalize() else {
        return v;
    };
    look_rotation(forward, up_axis) * v
}

/// 2D cross product (perp-dot). Positive when `b` lies counter-clockwise of `a`.
#[inline]
pub fn cross_2d(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Signed doubled area of triangle `abc`; the sign gives its winding.
#[inline]
pub fn determinant(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    cross_2d(b - a, c - a)
}

/// True when triangle `abc` winds counter-clockwise.
#[inline]
pub fn is_counter_clockwise(a: Vec2, b: Vec2, c: Vec2) -> bool {
    determinant(a, b, c) > 0.0
}

/// True when triangle `abc` winds clockwise.
#[inline]
pub fn is_clockwise(a: Vec2, b: Vec2, c: Vec2) -> bool {
    determinant(a, b, c) < 0.0
}
