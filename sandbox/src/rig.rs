//! Minimal orbit rig publishing the camera pose the solvers read.

use bevy::prelude::*;
use controller::{ActiveCamera, CameraPose, CharacterPosition, FIXED_TIMESTEP_HZ};

/// Orbit radius from the pivot.
const ORBIT_DISTANCE: f32 = 5.5;
/// Orbit angle above the horizon (slightly above).
const ORBIT_PITCH: f32 = 0.45;
/// Height offset of the pivot point above the character.
const ORBIT_BASE_HEIGHT: f32 = 1.0;
/// How fast the camera eases toward its orbit slot.
const FOLLOW_RATE: f32 = 8.0;
/// Slow constant drift around the character, radians per second.
const ORBIT_DRIFT: f32 = 0.15;

/// Orbit state around the character.
#[derive(Resource)]
pub struct OrbitRig {
    yaw: f32,
    position: Vec3,
}

impl Default for OrbitRig {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            position: Vec3::new(0.0, ORBIT_BASE_HEIGHT + 2.0, ORBIT_DISTANCE),
        }
    }
}

/// Calculate camera position orbiting around a pivot point.
fn orbit_position(pivot: Vec3, yaw: f32, pitch: f32, distance: f32) -> Vec3 {
    let cos_pitch = pitch.cos();
    let sin_pitch = pitch.sin();

    // Horizontal offset (behind based on yaw)
    let horizontal_dist = distance * cos_pitch;
    let behind_dir = Vec3::new(yaw.sin(), 0.0, yaw.cos());

    // Vertical offset (above based on pitch)
    let vertical_offset = distance * sin_pitch;

    pivot + behind_dir * horizontal_dist + Vec3::new(0.0, vertical_offset, 0.0)
}

/// Follow the character and publish the pose for this tick.
pub fn update_camera(
    mut rig: ResMut<OrbitRig>,
    mut camera: ResMut<ActiveCamera>,
    characters: Query<&CharacterPosition>,
) {
    let Ok(position) = characters.single() else {
        return;
    };
    let dt = 1.0 / FIXED_TIMESTEP_HZ as f32;

    rig.yaw += ORBIT_DRIFT * dt;
    let pivot = position.0 + Vec3::new(0.0, ORBIT_BASE_HEIGHT, 0.0);
    let target = orbit_position(pivot, rig.yaw, ORBIT_PITCH, ORBIT_DISTANCE);

    // Ease toward the orbit slot instead of teleporting.
    let t = 1.0 - (-FOLLOW_RATE * dt).exp();
    rig.position = rig.position.lerp(target, t);

    camera.pose = CameraPose::looking_at(rig.position, pivot);
}
