//! Controller tunables, loaded once at startup.
//!
//! Invalid configuration is a startup failure, never handled per tick.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// How the character picks its facing target each tick.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AimMode {
    /// Turn toward the pointer, resolved onto the ground plane at the
    /// character's current height.
    #[default]
    PointerRay,
    /// Turn toward the camera-relative move direction.
    AnalogDirection,
    /// Keep the current facing.
    None,
}

/// Tunable parameters for one run. Immutable after startup.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ControllerConfig {
    /// The character's maximum speed. (m/s)
    pub max_speed: f32,
    /// Max rate of change of velocity. (m/s^2)
    pub max_acceleration: f32,
    /// Grounded steering gain; higher values change direction faster. (1/s)
    pub ground_friction: f32,
    /// Drag applied while falling. (1/s)
    pub air_friction: f32,
    /// Fraction of max acceleration available while airborne.
    /// 0 = no control, 1 = full control.
    pub air_control: f32,
    /// The character's gravity. (m/s^2)
    pub gravity: Vec3,
    /// Turn gain toward the aim target. (1/s)
    pub orientation_speed: f32,
    /// Closest the aim point may sit to the aim origin. (m)
    pub min_aim_distance: f32,
    /// Farthest the aim point may sit from the aim origin. (m)
    pub max_aim_distance: f32,
    /// Aim origin offset from the character position, in facing-local
    /// (right, up, forward) components. (m)
    pub aim_offset: Vec3,
    pub aim_mode: AimMode,
    /// Whether the dash button launches a jump.
    pub jump_enabled: bool,
    /// Upward velocity applied on jump. (m/s)
    pub jump_impulse: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            max_acceleration: 20.0,
            ground_friction: 8.0,
            air_friction: 0.1,
            air_control: 0.3,
            gravity: Vec3::new(0.0, -20.0, 0.0),
            orientation_speed: 15.0,
            min_aim_distance: 2.0,
            max_aim_distance: 20.0,
            aim_offset: Vec3::new(0.0, 1.0, 0.75),
            aim_mode: AimMode::PointerRay,
            jump_enabled: true,
            jump_impulse: 7.5,
        }
    }
}

impl ControllerConfig {
    /// Load and validate a config from a RON file.
    pub fn load(path: &str) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read controller config {}: {}", path, e))?;
        Self::from_ron(&text).map_err(|e| format!("Invalid controller config {}: {}", path, e))
    }

    /// Parse and validate a config from RON text.
    pub fn from_ron(text: &str) -> Result<Self, String> {
        let config: Self = ron::from_str(text).map_err(|e| format!("parse error: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the solvers are not defined for.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_speed <= 0.0 {
            return Err(format!("max_speed must be positive, got {}", self.max_speed));
        }
        if self.max_acceleration < 0.0 {
            return Err(format!(
                "max_acceleration must not be negative, got {}",
                self.max_acceleration
            ));
        }
        if self.ground_friction < 0.0 {
            return Err(format!(
                "ground_friction must not be negative, got {}",
                self.ground_friction
            ));
        }
        if self.air_friction < 0.0 {
            return Err(format!(
                "air_friction must not be negative, got {}",
                self.air_friction
            ));
        }
        if !(0.0..=1.0).contains(&self.air_control) {
            return Err(format!(
                "air_control must be between 0 and 1, got {}",
                self.air_control
            ));
        }
        if self.gravity.y >= 0.0 {
            return Err(format!("gravity must point down, got {:?}", self.gravity));
        }
        if self.orientation_speed < 0.0 {
            return Err(format!(
                "orientation_speed must not be negative, got {}",
                self.orientation_speed
            ));
        }
        if self.min_aim_distance < 0.0 {
            return Err(format!(
                "min_aim_distance must not be negative, got {}",
                self.min_aim_distance
            ));
        }
        if self.max_aim_distance < self.min_aim_distance {
            return Err(format!(
                "max_aim_distance {} is smaller than min_aim_distance {}",
                self.max_aim_distance, self.min_aim_distance
            ));
        }
        if self.jump_enabled && self.jump_impulse <= 0.0 {
            return Err(format!(
                "jump_impulse must be positive when jump is enabled, got {}",
                self.jump_impulse
            ));
        }
        Ok(())
    }
}
