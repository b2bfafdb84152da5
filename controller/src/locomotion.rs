//! Per-tick velocity solver and character step.
//!
//! Goals:
//! - One authoritative update per fixed tick (see `FIXED_TIMESTEP_HZ`)
//! - Grounded movement steers exponentially toward the desired velocity
//! - Airborne movement keeps momentum, with limited steering, gravity
//!   and drag
//!
//! The solver never moves the character itself; it hands position and
//! velocity to the [`CharacterMotor`] and reads back what the world
//! allowed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::prelude::*;

use crate::camera::{ActiveCamera, CameraPose};
use crate::components::{CharacterPosition, CharacterVelocity};
use crate::config::ControllerConfig;
use crate::input::{InputSnapshot, TickInput};
use crate::math::{camera_relative, clamp_length, move_towards, project_onto_plane};
use crate::motor::{CharacterMotor, FoundGround, GroundState};
use crate::schedule::{TickGate, FIXED_TIMESTEP_HZ};
use crate::signals::{SignalHub, SubscriptionId};

/// How long a jump suspends the motor's downward ground snap.
pub const JUMP_CONSTRAINT_PAUSE: f32 = 0.2;

/// Emitted every tick a character is driven, carrying the clamped
/// stick-space move direction (before camera alignment).
#[derive(Message, Clone, Copy, Debug)]
pub struct CharacterMoved {
    pub entity: Entity,
    pub move_direction: Vec3,
}

/// Emitted on the tick a character lands on walkable ground.
#[derive(Message, Clone, Copy, Debug)]
pub struct CharacterLanded {
    pub entity: Entity,
}

/// Stick direction mapped onto the ground plane, length clamped to 1.
///
/// Stick up is forward (-Z); stick right is +X.
pub fn raw_move_direction(move_axis: Vec2) -> Vec3 {
    clamp_length(Vec3::new(move_axis.x, 0.0, -move_axis.y), 1.0)
}

/// Camera-aligned world move direction for this tick, length at most 1.
pub fn move_direction(move_axis: Vec2, camera: &CameraPose) -> Vec3 {
    camera_relative(
        raw_move_direction(move_axis),
        camera.forward,
        camera.up,
        Vec3::Y,
    )
}

/// Advance velocity one tick toward `desired`, honoring the ground state.
pub fn step_velocity(
    velocity: Vec3,
    desired: Vec3,
    ground: &GroundState,
    config: &ControllerConfig,
    dt: f32,
) -> Vec3 {
    if ground.is_grounded() {
        grounded_velocity(velocity, desired, config, dt)
    } else {
        airborne_velocity(velocity, desired, ground, config, dt)
    }
}

/// Exponential steering toward `desired` while standing on walkable ground.
fn grounded_velocity(velocity: Vec3, desired: Vec3, config: &ControllerConfig, dt: f32) -> Vec3 {
    let t = 1.0 - (-config.ground_friction * dt).exp();
    velocity.lerp(desired, t)
}

/// Airborne update: limited steering, then gravity, then drag.
fn airborne_velocity(
    velocity: Vec3,
    desired: Vec3,
    ground: &GroundState,
    config: &ControllerConfig,
    dt: f32,
) -> Vec3 {
    let mut desired = desired;

    // Pressing into a slope too steep to stand on would climb it.
    // Treat the flattened slope normal as a wall and steer along it.
    if ground.on_ground && desired.dot(ground.normal) < 0.0 {
        let wall = Vec3::new(ground.normal.x, 0.0, ground.normal.z);
        if let Some(wall) = wall.try_normalize() {
            desired = project_onto_plane(desired, wall);
        }
    }

    let mut next = velocity;
    if desired != Vec3::ZERO {
        let horizontal = Vec3::new(next.x, 0.0, next.z);
        let steered = move_towards(
            horizontal,
            desired,
            config.max_acceleration * config.air_control * dt,
        );
        next.x = steered.x;
        next.z = steered.z;
    }

    next += config.gravity * dt;
    next -= next * config.air_friction * dt;
    next
}

/// Whether this tick's input should launch a jump.
pub fn wants_jump(
    snapshot: &InputSnapshot,
    ground: &GroundState,
    velocity: Vec3,
    config: &ControllerConfig,
) -> bool {
    config.jump_enabled && snapshot.dash_just_pressed && ground.can_jump() && velocity.y < 1.0
}

/// Bridges a motor's ground observers to the per-tick landed message.
///
/// The subscription is held only while the character's tick gate is
/// armed. After [`LandedWatch::release`] the motor no longer reaches
/// this watch at all, so nothing fires into torn-down state.
#[derive(Component, Default)]
pub struct LandedWatch {
    subscription: Option<SubscriptionId>,
    landed: Arc<AtomicBool>,
}

impl LandedWatch {
    /// Start listening for landing edges on `hub`. Idempotent.
    pub fn attach(&mut self, hub: &mut SignalHub<FoundGround>) {
        if self.subscription.is_some() {
            return;
        }
        self.landed.store(false, Ordering::Relaxed);
        let latch = self.landed.clone();
        self.subscription = Some(hub.subscribe(move |fg: &FoundGround| {
            if !fg.was_grounded && fg.walkable {
                latch.store(true, Ordering::Relaxed);
            }
        }));
    }

    /// Stop listening and clear any pending edge. Idempotent.
    pub fn release(&mut self, hub: &mut SignalHub<FoundGround>) {
        if let Some(id) = self.subscription.take() {
            hub.unsubscribe(id);
        }
        self.landed.store(false, Ordering::Relaxed);
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Consume the landing edge latched since the last call.
    pub fn take_landed(&mut self) -> bool {
        self.landed.swap(false, Ordering::Relaxed)
    }
}

/// Advance every armed character one fixed tick.
pub fn locomotion_tick<M: CharacterMotor>(
    input: Res<TickInput>,
    camera: Res<ActiveCamera>,
    config: Res<ControllerConfig>,
    mut moved: MessageWriter<CharacterMoved>,
    mut landed: MessageWriter<CharacterLanded>,
    mut characters: Query<(
        Entity,
        &mut CharacterPosition,
        &mut CharacterVelocity,
        &mut M,
        &mut LandedWatch,
        &TickGate,
    )>,
) {
    let dt = 1.0 / FIXED_TIMESTEP_HZ as f32;

    for (entity, mut position, mut velocity, mut motor, mut watch, gate) in characters.iter_mut() {
        if !gate.armed() {
            continue;
        }

        let raw_direction = raw_move_direction(input.0.move_axis);
        let world_direction =
            camera_relative(raw_direction, camera.pose.forward, camera.pose.up, Vec3::Y);
        let desired = world_direction * config.max_speed;

        let ground = motor.ground();
        let mut next = step_velocity(velocity.0, desired, &ground, &config, dt);

        if wants_jump(&input.0, &ground, next, &config) {
            next.y = config.jump_impulse;
            motor.pause_ground_constraint(JUMP_CONSTRAINT_PAUSE);
        }

        velocity.0 = next;
        moved.write(CharacterMoved {
            entity,
            move_direction: raw_direction,
        });

        motor.move_and_slide(&mut position.0, &mut velocity.0, dt);

        if watch.take_landed() {
            landed.write(CharacterLanded { entity });
        }
    }
}
