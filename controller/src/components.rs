//! Core components describing one controlled character.

use bevy::prelude::*;

/// Character position in world space.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct CharacterPosition(pub Vec3);

/// Character facing as a yaw angle in radians around +Y.
///
/// Yaw 0 faces -Z; positive yaw turns counter-clockwise when viewed
/// from above.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct CharacterYaw(pub f32);

impl CharacterYaw {
    /// Horizontal unit vector the character is facing.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.0.sin(), 0.0, -self.0.cos())
    }

    /// Horizontal unit vector to the character's right.
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.0.cos(), 0.0, -self.0.sin())
    }

    /// Full rotation for posing a rendered model.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.0)
    }
}

/// Character velocity in world space. (m/s)
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct CharacterVelocity(pub Vec3);

/// Last resolved world-space point the character is turning toward.
///
/// Holds its previous value across ticks where no fresh target could be
/// resolved, so aiming degrades to "keep looking where you were".
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct AimTarget {
    pub look_point: Vec3,
}
