//! Camera pose snapshot the per-tick solvers read.
//!
//! The controller never owns a camera. Whatever rig the application runs
//! publishes its pose here once per frame, and the solvers treat it as
//! plain data.

use bevy::prelude::*;

/// Normal field of view in radians.
pub const FOV_DEFAULT: f32 = 70.0_f32.to_radians();

/// Position and orientation of the viewing camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    /// Unit up direction, perpendicular to `forward`.
    pub up: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

impl CameraPose {
    /// Pose at `eye` looking toward `target`, kept level (no roll).
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let Some(forward) = (target - eye).try_normalize() else {
            return Self {
                position: eye,
                ..Default::default()
            };
        };
        let Some(right) = forward.cross(Vec3::Y).try_normalize() else {
            // Looking straight up or down; settle on an arbitrary level up.
            let up = Vec3::X.cross(forward).normalize();
            return Self {
                position: eye,
                forward,
                up,
            };
        };
        Self {
            position: eye,
            forward,
            up: right.cross(forward),
        }
    }

    /// Unit right direction.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up)
    }
}

/// Camera state published for the current frame.
#[derive(Resource, Clone, Copy, Debug)]
pub struct ActiveCamera {
    pub pose: CameraPose,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl Default for ActiveCamera {
    fn default() -> Self {
        Self {
            pose: CameraPose::default(),
            fov_y: FOV_DEFAULT,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

impl ActiveCamera {
    /// World-space ray through a screen pixel, as (origin, unit direction).
    ///
    /// Screen coordinates have the origin at the top left, +Y down.
    pub fn screen_ray(&self, screen: Vec2) -> (Vec3, Vec3) {
        let ndc_x = (screen.x / self.viewport.x) * 2.0 - 1.0;
        let ndc_y = 1.0 - (screen.y / self.viewport.y) * 2.0;

        let tan_half = (self.fov_y * 0.5).tan();
        let aspect = self.viewport.x / self.viewport.y;

        let dir = (self.pose.right() * (ndc_x * tan_half * aspect)
            + self.pose.up * (ndc_y * tan_half)
            + self.pose.forward)
            .normalize();

        (self.pose.position, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looking_at_builds_a_level_basis() {
        let pose = CameraPose::looking_at(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO);
        assert!((pose.forward.length() - 1.0).abs() < 1e-6);
        assert!((pose.up.length() - 1.0).abs() < 1e-6);
        assert!(pose.forward.dot(pose.up).abs() < 1e-6);
        // No roll: right stays horizontal.
        assert!(pose.right().y.abs() < 1e-6);
        // Forward points down toward the target.
        assert!(pose.forward.y < 0.0);
    }

    #[test]
    fn test_looking_at_own_position_falls_back() {
        let eye = Vec3::new(3.0, 1.0, -2.0);
        let pose = CameraPose::looking_at(eye, eye);
        assert_eq!(pose.forward, Vec3::NEG_Z);
        assert_eq!(pose.up, Vec3::Y);
    }

    #[test]
    fn test_screen_center_ray_matches_forward() {
        let camera = ActiveCamera {
            pose: CameraPose::looking_at(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO),
            ..Default::default()
        };
        let (origin, dir) = camera.screen_ray(camera.viewport * 0.5);
        assert_eq!(origin, camera.pose.position);
        assert!(dir.abs_diff_eq(camera.pose.forward, 1e-6));
    }

    #[test]
    fn test_screen_edges_bend_the_ray() {
        let camera = ActiveCamera::default();
        let half_h = camera.viewport.y * 0.5;

        let (_, right_ray) = camera.screen_ray(Vec2::new(camera.viewport.x, half_h));
        assert!(right_ray.dot(camera.pose.right()) > 0.0);

        let (_, top_ray) = camera.screen_ray(Vec2::new(camera.viewport.x * 0.5, 0.0));
        assert!(top_ray.dot(camera.pose.up) > 0.0);
    }
}
