//! Per-tick locomotion and orientation for a third-person character.
//!
//! The crate owns the solvers and their scheduling; the application owns
//! the camera, the input devices and the rendered model. Plug a
//! [`CharacterMotor`] implementation into [`ControllerPlugin`] and spawn
//! characters with the components in [`components`].

pub mod camera;
pub mod components;
pub mod config;
pub mod input;
pub mod locomotion;
pub mod math;
pub mod motor;
pub mod orientation;
pub mod schedule;
pub mod signals;

pub use camera::{ActiveCamera, CameraPose, FOV_DEFAULT};
pub use components::{AimTarget, CharacterPosition, CharacterVelocity, CharacterYaw};
pub use config::{AimMode, ControllerConfig};
pub use input::{InputSnapshot, InputState, TickInput};
pub use locomotion::{
    move_direction, raw_move_direction, step_velocity, wants_jump, CharacterLanded,
    CharacterMoved, LandedWatch, JUMP_CONSTRAINT_PAUSE,
};
pub use motor::{
    ground_clearance_center, is_walkable, CharacterMotor, Collision, FoundGround, GroundMap,
    GroundState, KinematicMotor, Ramp, CHARACTER_HEIGHT, GROUND_SNAP_DISTANCE,
};
pub use orientation::{orient_towards_direction, orient_towards_position, resolve_pointer_look};
pub use schedule::{
    tick_duration, ControllerPlugin, ControllerSet, TickGate, FIXED_TIMESTEP_HZ,
};
pub use signals::{SignalHub, SubscriptionId};
