//! Fixed-tick pipeline wiring.
//!
//! All solver systems run in `FixedUpdate`, gated per character by a
//! [`TickGate`]. Arming a gate starts a fresh run of ticks and replaces
//! any previous run; cancelling stops the character cold until the next
//! arm.

use std::marker::PhantomData;
use std::time::Duration;

use bevy::prelude::*;

use crate::camera::ActiveCamera;
use crate::components::{CharacterPosition, CharacterVelocity};
use crate::config::ControllerConfig;
use crate::input::{InputState, TickInput};
use crate::locomotion::{locomotion_tick, CharacterLanded, CharacterMoved, LandedWatch};
use crate::motor::CharacterMotor;
use crate::orientation::orientation_tick;

/// Fixed timestep frequency (Hz)
pub const FIXED_TIMESTEP_HZ: f64 = 60.0;

/// Duration of one fixed tick.
pub fn tick_duration() -> Duration {
    Duration::from_secs_f64(1.0 / FIXED_TIMESTEP_HZ)
}

/// Per-character switch for the fixed-tick solvers.
#[derive(Component, Clone, Copy, Debug)]
pub struct TickGate {
    armed: bool,
    generation: u32,
}

impl Default for TickGate {
    fn default() -> Self {
        Self {
            armed: true,
            generation: 0,
        }
    }
}

impl TickGate {
    /// Start a fresh run of ticks, replacing any previous run.
    pub fn arm(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.armed = true;
    }

    /// Stop ticking this character. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Which run of ticks is active; bumps on every arm.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Fixed-tick stages, in execution order.
#[derive(SystemSet, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ControllerSet {
    /// Sample input and reconcile observer subscriptions.
    Sync,
    /// Refresh ground contact for every character.
    Probe,
    /// Velocity integration and the character step.
    Locomotion,
    /// Facing update.
    Orientation,
}

/// Latch the frame-accumulated input into this tick's snapshot.
pub fn sample_tick_input(mut input: ResMut<InputState>, mut tick: ResMut<TickInput>) {
    tick.0 = input.sample();
}

/// Attach landed watches for armed characters; release them for
/// cancelled ones so no observer outlives its run.
pub fn sync_motor_subscriptions<M: CharacterMotor>(
    mut characters: Query<(&mut M, &mut LandedWatch, &TickGate)>,
) {
    for (mut motor, mut watch, gate) in characters.iter_mut() {
        if gate.armed() && !watch.is_attached() {
            watch.attach(motor.found_ground());
        } else if !gate.armed() && watch.is_attached() {
            watch.release(motor.found_ground());
        }
    }
}

/// Refresh every armed character's ground state at its current position.
pub fn probe_ground<M: CharacterMotor>(
    mut characters: Query<(&CharacterPosition, &CharacterVelocity, &mut M, &TickGate)>,
) {
    for (position, velocity, mut motor, gate) in characters.iter_mut() {
        if !gate.armed() {
            continue;
        }
        motor.probe_ground(position.0, velocity.0);
    }
}

/// Fail fast when the app forgot to provide required state.
fn check_required_resources(world: &World) {
    if world.get_resource::<ControllerConfig>().is_none() {
        panic!("ControllerPlugin requires a ControllerConfig resource at startup");
    }
    if world.get_resource::<ActiveCamera>().is_none() {
        panic!("ControllerPlugin requires an ActiveCamera resource at startup");
    }
}

/// Installs the fixed-tick solver pipeline for motor type `M`.
pub struct ControllerPlugin<M: CharacterMotor> {
    _motor: PhantomData<M>,
}

impl<M: CharacterMotor> Default for ControllerPlugin<M> {
    fn default() -> Self {
        Self {
            _motor: PhantomData,
        }
    }
}

impl<M: CharacterMotor> Plugin for ControllerPlugin<M> {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputState>();
        app.init_resource::<TickInput>();
        app.add_message::<CharacterMoved>();
        app.add_message::<CharacterLanded>();

        app.insert_resource(Time::<Fixed>::from_hz(FIXED_TIMESTEP_HZ));

        app.configure_sets(
            FixedUpdate,
            (
                ControllerSet::Sync,
                ControllerSet::Probe,
                ControllerSet::Locomotion,
                ControllerSet::Orientation,
            )
                .chain(),
        );

        app.add_systems(Startup, check_required_resources);
        app.add_systems(
            FixedUpdate,
            (
                (sample_tick_input, sync_motor_subscriptions::<M>).in_set(ControllerSet::Sync),
                probe_ground::<M>.in_set(ControllerSet::Probe),
                locomotion_tick::<M>.in_set(ControllerSet::Locomotion),
                orientation_tick.in_set(ControllerSet::Orientation),
            ),
        );
    }
}
