//! Per-tick facing solver.
//!
//! The character only ever turns around +Y. Targets above or below the
//! character are flattened onto the horizontal plane first, and a target
//! with no horizontal component leaves the facing unchanged.

use bevy::prelude::*;

use crate::camera::ActiveCamera;
use crate::components::{AimTarget, CharacterPosition, CharacterYaw};
use crate::config::{AimMode, ControllerConfig};
use crate::input::TickInput;
use crate::locomotion::move_direction;
use crate::schedule::{TickGate, FIXED_TIMESTEP_HZ};

/// Yaw angle that faces along `direction`, ignoring its Y component.
pub fn yaw_from_direction(direction: Vec3) -> f32 {
    (-direction.x).atan2(-direction.z)
}

/// Wrap an angle into (-PI, PI].
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    if wrapped > std::f32::consts::PI {
        wrapped - std::f32::consts::TAU
    } else {
        wrapped
    }
}

/// Turn `current_yaw` toward facing `direction`.
///
/// The blend factor is `speed * dt`, saturating at 1, and the turn always
/// takes the shorter arc. A direction with no horizontal component
/// returns `current_yaw` untouched.
pub fn orient_towards_direction(current_yaw: f32, direction: Vec3, speed: f32, dt: f32) -> f32 {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    let Some(flat) = flat.try_normalize() else {
        return current_yaw;
    };
    let target = yaw_from_direction(flat);
    let t = (speed * dt).clamp(0.0, 1.0);
    current_yaw + wrap_angle(target - current_yaw) * t
}

/// Turn `current_yaw` toward looking at `target` from `position`.
pub fn orient_towards_position(
    current_yaw: f32,
    position: Vec3,
    target: Vec3,
    speed: f32,
    dt: f32,
) -> f32 {
    orient_towards_direction(current_yaw, target - position, speed, dt)
}

/// Intersect a ray with the horizontal plane at `plane_height`.
///
/// Returns `None` for rays parallel to the plane or pointing away from it.
pub fn ray_plane_height(origin: Vec3, dir: Vec3, plane_height: f32) -> Option<Vec3> {
    if dir.y.abs() <= 1e-6 {
        return None;
    }
    let t = (plane_height - origin.y) / dir.y;
    if t < 0.0 {
        return None;
    }
    Some(origin + dir * t)
}

/// Resolve the pointer to a world-space look point on the ground plane
/// at `plane_height`. Falls back to `cached` when the ray misses.
pub fn resolve_pointer_look(
    camera: &ActiveCamera,
    pointer: Vec2,
    plane_height: f32,
    cached: Vec3,
) -> Vec3 {
    let (origin, dir) = camera.screen_ray(pointer);
    ray_plane_height(origin, dir, plane_height).unwrap_or(cached)
}

/// Aim origin for a character, from a facing-local (right, up, forward)
/// offset.
pub fn aim_origin(position: Vec3, yaw: CharacterYaw, offset: Vec3) -> Vec3 {
    position + yaw.right() * offset.x + Vec3::Y * offset.y + yaw.forward() * offset.z
}

/// Point along `forward` at the look point's distance, clamped into the
/// aiming band.
pub fn aim_point(
    origin: Vec3,
    forward: Vec3,
    look_point: Vec3,
    min_distance: f32,
    max_distance: f32,
) -> Vec3 {
    let distance = (look_point - origin).length().clamp(min_distance, max_distance);
    origin + forward * distance
}

/// Turn every armed character toward its aim target for this tick.
pub fn orientation_tick(
    input: Res<TickInput>,
    camera: Res<ActiveCamera>,
    config: Res<ControllerConfig>,
    mut characters: Query<(&CharacterPosition, &mut CharacterYaw, &mut AimTarget, &TickGate)>,
) {
    let dt = 1.0 / FIXED_TIMESTEP_HZ as f32;

    for (position, mut yaw, mut aim, gate) in characters.iter_mut() {
        if !gate.armed() {
            continue;
        }

        match config.aim_mode {
            AimMode::PointerRay => {
                let look_point = resolve_pointer_look(
                    &camera,
                    input.0.pointer_screen,
                    position.0.y,
                    aim.look_point,
                );
                aim.look_point = look_point;
                yaw.0 = orient_towards_position(
                    yaw.0,
                    position.0,
                    look_point,
                    config.orientation_speed,
                    dt,
                );
            }
            AimMode::AnalogDirection => {
                let direction = move_direction(input.0.move_axis, &camera.pose);
                yaw.0 = orient_towards_direction(yaw.0, direction, config.orientation_speed, dt);
            }
            AimMode::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraPose;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_yaw_from_direction_cardinals() {
        assert!(yaw_from_direction(Vec3::NEG_Z).abs() < 1e-6);
        assert!((yaw_from_direction(Vec3::X) + FRAC_PI_2).abs() < 1e-6);
        assert!((yaw_from_direction(Vec3::NEG_X) - FRAC_PI_2).abs() < 1e-6);
        assert!((yaw_from_direction(Vec3::Z).abs() - PI).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_angle_recenters() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-1.5 * PI) - FRAC_PI_2).abs() < 1e-5);
        assert!((wrap_angle(0.25 * PI) - 0.25 * PI).abs() < 1e-6);
    }

    #[test]
    fn test_orient_steps_toward_the_target() {
        // Target yaw is -PI/2 (facing +X); factor is 15 * 0.01 = 0.15.
        let yaw = orient_towards_direction(0.0, Vec3::X, 15.0, 0.01);
        assert!((yaw - (-FRAC_PI_2 * 0.15)).abs() < 1e-5);
    }

    #[test]
    fn test_orient_snaps_when_the_factor_saturates() {
        let yaw = orient_towards_direction(1.0, Vec3::X, 15.0, 1.0);
        assert!((yaw - (-FRAC_PI_2)).abs() < 1e-5);
    }

    #[test]
    fn test_orient_takes_the_shorter_arc() {
        // From yaw 3.0 to yaw -3.0 the short way is forward through PI,
        // not backward through zero.
        let target_dir = CharacterYaw(-3.0).forward();
        let yaw = orient_towards_direction(3.0, target_dir, 1.0, 0.1);
        assert!(yaw > 3.0);
    }

    #[test]
    fn test_target_straight_above_keeps_the_facing() {
        let position = Vec3::new(1.0, 0.0, 1.0);
        let target = position + Vec3::Y * 5.0;
        let yaw = orient_towards_position(1.2, position, target, 15.0, 0.1);
        assert_eq!(yaw, 1.2);
    }

    #[test]
    fn test_ray_plane_intersections() {
        let hit = ray_plane_height(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y, 0.0);
        assert_eq!(hit, Some(Vec3::ZERO));

        // Parallel to the plane.
        assert_eq!(ray_plane_height(Vec3::Y, Vec3::X, 0.0), None);

        // Pointing away from the plane.
        assert_eq!(ray_plane_height(Vec3::Y, Vec3::Y, 0.0), None);
    }

    #[test]
    fn test_pointer_resolves_onto_the_ground_plane() {
        let camera = ActiveCamera {
            pose: CameraPose::looking_at(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO),
            ..Default::default()
        };
        let point = resolve_pointer_look(&camera, camera.viewport * 0.5, 0.0, Vec3::splat(9.0));
        assert!(point.abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn test_missed_pointer_ray_returns_the_cached_point() {
        // Default camera looks level along -Z; the center ray never
        // reaches a plane at its own height.
        let camera = ActiveCamera::default();
        let cached = Vec3::new(1.0, 0.0, -3.0);
        let point = resolve_pointer_look(&camera, camera.viewport * 0.5, 0.0, cached);
        assert_eq!(point, cached);
    }

    #[test]
    fn test_aim_origin_offsets_in_facing_space() {
        let origin = aim_origin(
            Vec3::new(2.0, 0.0, 5.0),
            CharacterYaw(0.0),
            Vec3::new(0.0, 1.0, 0.75),
        );
        assert!(origin.abs_diff_eq(Vec3::new(2.0, 1.0, 4.25), 1e-6));
    }

    #[test]
    fn test_aim_point_clamps_into_the_band() {
        let forward = Vec3::NEG_Z;

        let near = aim_point(Vec3::ZERO, forward, Vec3::new(0.0, 0.0, -1.0), 2.0, 20.0);
        assert!(near.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));

        let far = aim_point(Vec3::ZERO, forward, Vec3::new(0.0, 0.0, -50.0), 2.0, 20.0);
        assert!(far.abs_diff_eq(Vec3::new(0.0, 0.0, -20.0), 1e-5));

        let inside = aim_point(Vec3::ZERO, forward, Vec3::new(0.0, 0.0, -5.0), 2.0, 20.0);
        assert!(inside.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));
    }
}
