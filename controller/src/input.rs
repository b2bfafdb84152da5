//! Input state for the controller.
//!
//! The binding layer (whatever owns the real input devices) writes
//! `InputState` as events arrive; the scheduler samples it exactly once per
//! fixed tick into `TickInput`, so both solvers read the same stable
//! `InputSnapshot` for the whole tick.

use bevy::prelude::*;

/// Immutable per-tick view of the player's input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Raw move axis, each component in [-1, 1]. Diagonals are length-clamped
    /// by the locomotion solver, not here.
    pub move_axis: Vec2,
    /// Dash/jump button currently held.
    pub dash_held: bool,
    /// Dash/jump button went down since the previous tick sample.
    pub dash_just_pressed: bool,
    pub fire1_held: bool,
    pub fire2_held: bool,
    /// Pointer position in screen pixels, top-left origin.
    pub pointer_screen: Vec2,
}

/// Continuously updated input state (process-wide).
///
/// Setters clamp and latch; `sample` consumes the press edges.
#[derive(Resource, Default)]
pub struct InputState {
    move_axis: Vec2,
    dash_held: bool,
    /// Latched on a false -> true dash transition until the next sample.
    dash_pressed: bool,
    fire1_held: bool,
    fire2_held: bool,
    pointer_screen: Vec2,
}

impl InputState {
    /// Update the move axis; each component is clamped to [-1, 1].
    pub fn set_move_axis(&mut self, axis: Vec2) {
        self.move_axis = axis.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
    }

    /// Update the dash button. A press is latched so that pressing and
    /// releasing between two ticks still registers exactly once.
    pub fn set_dash(&mut self, held: bool) {
        if held && !self.dash_held {
            self.dash_pressed = true;
        }
        self.dash_held = held;
    }

    pub fn set_fire1(&mut self, held: bool) {
        self.fire1_held = held;
    }

    pub fn set_fire2(&mut self, held: bool) {
        self.fire2_held = held;
    }

    pub fn set_pointer(&mut self, screen: Vec2) {
        self.pointer_screen = screen;
    }

    /// Take the per-tick snapshot, consuming the press edges.
    pub fn sample(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            move_axis: self.move_axis,
            dash_held: self.dash_held,
            dash_just_pressed: self.dash_pressed,
            fire1_held: self.fire1_held,
            fire2_held: self.fire2_held,
            pointer_screen: self.pointer_screen,
        };
        self.dash_pressed = false;
        snapshot
    }
}

/// The snapshot every solver reads during the current tick.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct TickInput(pub InputSnapshot);
