//! Character motor interface plus a height-sampled reference motor.
//!
//! Goals:
//! - Keep the locomotion and orientation solvers independent of any
//!   particular collision backend
//! - Deterministic ground collision for the bundled motor (heightfield)
//! - Runs at a fixed timestep (see `FIXED_TIMESTEP_HZ`)
//!
//! The bundled [`KinematicMotor`] is intentionally lightweight. A full
//! rigidbody backend (Rapier/Avian) can slot in later by implementing
//! [`CharacterMotor`] against it.

use bevy::ecs::component::Mutable;
use bevy::prelude::*;

use crate::signals::SignalHub;

/// Character capsule height in meters.
pub const CHARACTER_HEIGHT: f32 = 1.8;

/// How close to the ground we "snap" when falling (prevents tiny hovering).
pub const GROUND_SNAP_DISTANCE: f32 = 0.35;

/// Steepest slope the character can stand on, in degrees from horizontal.
pub const MAX_WALKABLE_SLOPE_DEG: f32 = 45.0;

/// Minimum Y for the capsule center above ground.
#[inline]
pub fn ground_clearance_center() -> f32 {
    CHARACTER_HEIGHT * 0.5
}

/// Check a surface normal against the walkable slope limit.
pub fn is_walkable(normal: Vec3) -> bool {
    normal.y >= MAX_WALKABLE_SLOPE_DEG.to_radians().cos()
}

/// Ground contact state for one character, refreshed every tick.
#[derive(Clone, Copy, Debug)]
pub struct GroundState {
    /// Whether the character is touching ground this tick.
    pub on_ground: bool,
    /// Whether that ground is flat enough to stand on.
    pub walkable: bool,
    /// Whether the character stood on walkable ground last tick.
    pub was_grounded: bool,
    /// Surface normal of the touched ground; +Y while airborne.
    pub normal: Vec3,
    /// Time since last standing on walkable ground (for coyote time).
    pub time_since_grounded: f32,
}

impl Default for GroundState {
    fn default() -> Self {
        Self::airborne()
    }
}

impl GroundState {
    /// Small grace period for jumping after leaving ground.
    pub const COYOTE_TIME: f32 = 0.1;

    /// State for a character with nothing under it.
    pub fn airborne() -> Self {
        Self {
            on_ground: false,
            walkable: false,
            was_grounded: false,
            normal: Vec3::Y,
            time_since_grounded: Self::COYOTE_TIME,
        }
    }

    /// Check if the character is standing on walkable ground.
    pub fn is_grounded(&self) -> bool {
        self.on_ground && self.walkable
    }

    /// Check if the character can jump (grounded or within coyote time).
    pub fn can_jump(&self) -> bool {
        self.is_grounded() || self.time_since_grounded < Self::COYOTE_TIME
    }
}

/// Payload emitted whenever a move ends in ground contact.
#[derive(Clone, Copy, Debug)]
pub struct FoundGround {
    /// Contact point on the ground surface.
    pub point: Vec3,
    pub normal: Vec3,
    pub walkable: bool,
    /// Whether the character already stood on walkable ground before
    /// this move.
    pub was_grounded: bool,
}

/// Payload emitted when a move presses into non-walkable ground.
#[derive(Clone, Copy, Debug)]
pub struct Collision {
    pub point: Vec3,
    pub normal: Vec3,
}

/// Interface the per-tick solvers drive the character body through.
///
/// Implementations own collision detection and response. The solvers only
/// read the resulting ground state and hand over position and velocity.
pub trait CharacterMotor: Component<Mutability = Mutable> {
    /// Refresh and return the ground state at the current position.
    fn probe_ground(&mut self, position: Vec3, velocity: Vec3) -> GroundState;

    /// Ground state from the most recent probe or move.
    fn ground(&self) -> GroundState;

    /// Move the character, colliding with the world along the way.
    fn move_and_slide(&mut self, position: &mut Vec3, velocity: &mut Vec3, dt: f32);

    /// Suspend downward ground snapping for `seconds`, so an upward
    /// launch is not cancelled by the ground constraint.
    fn pause_ground_constraint(&mut self, seconds: f32);

    /// Observers fired when a move ends in ground contact.
    fn found_ground(&mut self) -> &mut SignalHub<FoundGround>;

    /// Observers fired when a move presses into non-walkable ground.
    fn collided(&mut self) -> &mut SignalHub<Collision>;
}

/// Axis-aligned ramp rising linearly along +X across its footprint.
#[derive(Clone, Copy, Debug)]
pub struct Ramp {
    /// Footprint corner at the low edge (x, z).
    pub min: Vec2,
    /// Footprint corner at the high edge (x, z).
    pub max: Vec2,
    /// Surface height at the `min.x` edge.
    pub base_height: f32,
    /// Surface height at the `max.x` edge.
    pub top_height: f32,
}

/// Height-sampled test world the reference motor collides against.
#[derive(Clone, Debug, Default)]
pub struct GroundMap {
    /// Floor height everywhere outside the ramps.
    pub floor_height: f32,
    pub ramps: Vec<Ramp>,
}

impl GroundMap {
    pub fn flat(floor_height: f32) -> Self {
        Self {
            floor_height,
            ramps: Vec::new(),
        }
    }

    pub fn with_ramp(mut self, ramp: Ramp) -> Self {
        self.ramps.push(ramp);
        self
    }

    /// Ground height at a world XZ position.
    pub fn get_height(&self, x: f32, z: f32) -> f32 {
        let mut height = self.floor_height;
        for ramp in &self.ramps {
            if x >= ramp.min.x && x <= ramp.max.x && z >= ramp.min.y && z <= ramp.max.y {
                let span = (ramp.max.x - ramp.min.x).max(1e-6);
                let t = ((x - ramp.min.x) / span).clamp(0.0, 1.0);
                height = height.max(ramp.base_height + (ramp.top_height - ramp.base_height) * t);
            }
        }
        height
    }

    /// Ground normal at a world XZ position, from height differences.
    pub fn get_normal(&self, x: f32, z: f32) -> Vec3 {
        // Sample heights in a small cross pattern around the point
        let sample_dist = 0.5;

        let h_left = self.get_height(x - sample_dist, z);
        let h_right = self.get_height(x + sample_dist, z);
        let h_back = self.get_height(x, z - sample_dist);
        let h_front = self.get_height(x, z + sample_dist);

        let dx = (h_right - h_left) / (2.0 * sample_dist);
        let dz = (h_front - h_back) / (2.0 * sample_dist);

        Vec3::new(-dx, 1.0, -dz).normalize()
    }
}

/// Reference [`CharacterMotor`] colliding against a [`GroundMap`].
#[derive(Component, Default)]
pub struct KinematicMotor {
    pub map: GroundMap,
    ground: GroundState,
    grounded_last_tick: bool,
    constraint_pause: f32,
    found_ground: SignalHub<FoundGround>,
    collided: SignalHub<Collision>,
}

impl KinematicMotor {
    pub fn new(map: GroundMap) -> Self {
        Self {
            map,
            ..Default::default()
        }
    }
}

impl CharacterMotor for KinematicMotor {
    fn probe_ground(&mut self, position: Vec3, velocity: Vec3) -> GroundState {
        let ground_y = self.map.get_height(position.x, position.z);
        let target_y = ground_y + ground_clearance_center();
        let gap = position.y - target_y;

        let touching = gap < 0.0 || (velocity.y <= 0.0 && gap < GROUND_SNAP_DISTANCE);
        let normal = if touching {
            self.map.get_normal(position.x, position.z)
        } else {
            Vec3::Y
        };

        self.ground.on_ground = touching;
        self.ground.walkable = touching && is_walkable(normal);
        self.ground.normal = normal;
        self.ground.was_grounded = self.grounded_last_tick;
        self.ground
    }

    fn ground(&self) -> GroundState {
        self.ground
    }

    fn move_and_slide(&mut self, position: &mut Vec3, velocity: &mut Vec3, dt: f32) {
        self.constraint_pause = (self.constraint_pause - dt).max(0.0);

        // --- Integrate ---
        *position += *velocity * dt;

        // --- Ground collision (heightfield) ---
        // Re-sample ground in case we moved horizontally
        let ground_y = self.map.get_height(position.x, position.z);
        let target_y = ground_y + ground_clearance_center();

        let mut touching = false;

        // Push out of penetration even while the ground constraint is paused.
        if position.y < target_y {
            position.y = target_y;
            if velocity.y < 0.0 {
                velocity.y = 0.0;
            }
            touching = true;
        } else if self.constraint_pause <= 0.0
            && velocity.y <= 0.0
            && (position.y - target_y) < GROUND_SNAP_DISTANCE
        {
            position.y = target_y;
            velocity.y = 0.0;
            touching = true;
        }

        let normal = if touching {
            self.map.get_normal(position.x, position.z)
        } else {
            Vec3::Y
        };
        let walkable = touching && is_walkable(normal);

        // --- Ground state ---
        self.ground.on_ground = touching;
        self.ground.walkable = walkable;
        self.ground.normal = normal;
        self.ground.was_grounded = self.grounded_last_tick;

        // Update coyote timer
        if self.ground.is_grounded() {
            self.ground.time_since_grounded = 0.0;
        } else {
            self.ground.time_since_grounded += dt;
        }

        // --- Observers ---
        if touching {
            let contact = Vec3::new(position.x, ground_y, position.z);
            self.found_ground.emit(&FoundGround {
                point: contact,
                normal,
                walkable,
                was_grounded: self.grounded_last_tick,
            });
            if !walkable {
                self.collided.emit(&Collision {
                    point: contact,
                    normal,
                });
            }
        }

        self.grounded_last_tick = self.ground.is_grounded();
    }

    fn pause_ground_constraint(&mut self, seconds: f32) {
        self.constraint_pause = self.constraint_pause.max(seconds);
    }

    fn found_ground(&mut self) -> &mut SignalHub<FoundGround> {
        &mut self.found_ground
    }

    fn collided(&mut self) -> &mut SignalHub<Collision> {
        &mut self.collided
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const DT: f32 = 1.0 / 60.0;

    fn steep_ramp() -> Ramp {
        // Rises 8m over 4m, about 63 degrees. Too steep to stand on.
        Ramp {
            min: Vec2::new(0.0, -2.0),
            max: Vec2::new(4.0, 2.0),
            base_height: 0.0,
            top_height: 8.0,
        }
    }

    fn gentle_ramp() -> Ramp {
        // Rises 2m over 4m, about 27 degrees. Walkable.
        Ramp {
            min: Vec2::new(0.0, -2.0),
            max: Vec2::new(4.0, 2.0),
            base_height: 0.0,
            top_height: 2.0,
        }
    }

    #[test]
    fn test_flat_map_height_and_normal() {
        let map = GroundMap::flat(1.0);
        assert_eq!(map.get_height(3.0, -7.0), 1.0);
        assert!(map.get_normal(3.0, -7.0).abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_ramp_interpolates_height() {
        let map = GroundMap::flat(0.0).with_ramp(gentle_ramp());
        assert!((map.get_height(2.0, 0.0) - 1.0).abs() < 1e-6);
        assert!((map.get_height(4.0, 0.0) - 2.0).abs() < 1e-6);
        // Outside the footprint the floor wins.
        assert_eq!(map.get_height(-1.0, 0.0), 0.0);
    }

    #[test]
    fn test_walkability_limit() {
        let map = GroundMap::flat(0.0).with_ramp(gentle_ramp());
        assert!(is_walkable(map.get_normal(2.0, 0.0)));

        let map = GroundMap::flat(0.0).with_ramp(steep_ramp());
        assert!(!is_walkable(map.get_normal(2.0, 0.0)));
    }

    #[test]
    fn test_probe_reports_grounded_on_floor() {
        let mut motor = KinematicMotor::new(GroundMap::flat(0.0));
        let position = Vec3::new(0.0, ground_clearance_center(), 0.0);

        let ground = motor.probe_ground(position, Vec3::ZERO);
        assert!(ground.on_ground);
        assert!(ground.walkable);
        assert!(ground.is_grounded());
    }

    #[test]
    fn test_probe_reports_airborne_when_high_up() {
        let mut motor = KinematicMotor::new(GroundMap::flat(0.0));
        let position = Vec3::new(0.0, ground_clearance_center() + 5.0, 0.0);

        let ground = motor.probe_ground(position, Vec3::new(0.0, -1.0, 0.0));
        assert!(!ground.on_ground);
        assert!(!ground.is_grounded());
        assert!(ground.normal.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_move_snaps_down_when_falling_close_to_ground() {
        let mut motor = KinematicMotor::new(GroundMap::flat(0.0));
        let mut position = Vec3::new(0.0, ground_clearance_center() + 0.2, 0.0);
        let mut velocity = Vec3::new(0.0, -1.0, 0.0);

        motor.move_and_slide(&mut position, &mut velocity, DT);

        assert!((position.y - ground_clearance_center()).abs() < 1e-5);
        assert_eq!(velocity.y, 0.0);
        assert!(motor.ground().is_grounded());
    }

    #[test]
    fn test_paused_constraint_skips_the_snap() {
        let mut motor = KinematicMotor::new(GroundMap::flat(0.0));
        let mut position = Vec3::new(0.0, ground_clearance_center() + 0.2, 0.0);
        let mut velocity = Vec3::new(0.0, -0.5, 0.0);

        motor.pause_ground_constraint(0.2);
        motor.move_and_slide(&mut position, &mut velocity, DT);

        // Still hovering; the snap branch is suspended.
        assert!(position.y > ground_clearance_center() + 0.1);
        assert!(!motor.ground().on_ground);

        // Once the pause runs out the snap fires again.
        for _ in 0..13 {
            motor.move_and_slide(&mut position, &mut velocity, DT);
        }
        assert!((position.y - ground_clearance_center()).abs() < 1e-5);
        assert!(motor.ground().is_grounded());
    }

    #[test]
    fn test_penetration_push_out_ignores_the_pause() {
        let mut motor = KinematicMotor::new(GroundMap::flat(0.0));
        let mut position = Vec3::new(0.0, ground_clearance_center() - 0.3, 0.0);
        let mut velocity = Vec3::new(0.0, -2.0, 0.0);

        motor.pause_ground_constraint(1.0);
        motor.move_and_slide(&mut position, &mut velocity, DT);

        assert!((position.y - ground_clearance_center()).abs() < 1e-5);
        assert_eq!(velocity.y, 0.0);
    }

    #[test]
    fn test_found_ground_reports_the_landing_edge_once() {
        let mut motor = KinematicMotor::new(GroundMap::flat(0.0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        motor
            .found_ground()
            .subscribe(move |fg: &FoundGround| sink.lock().unwrap().push(fg.was_grounded));

        let mut position = Vec3::new(0.0, ground_clearance_center() + 0.1, 0.0);
        let mut velocity = Vec3::new(0.0, -1.0, 0.0);

        motor.move_and_slide(&mut position, &mut velocity, DT);
        motor.move_and_slide(&mut position, &mut velocity, DT);

        let seen = seen.lock().unwrap();
        // First contact is the landing edge; the second is a stay.
        assert_eq!(seen.as_slice(), &[false, true]);
    }

    #[test]
    fn test_steep_contact_raises_collided_not_grounded() {
        let mut motor = KinematicMotor::new(GroundMap::flat(0.0).with_ramp(steep_ramp()));
        let hits = Arc::new(Mutex::new(0));
        let sink = hits.clone();
        motor
            .collided()
            .subscribe(move |_c: &Collision| *sink.lock().unwrap() += 1);

        let ramp_y = 4.0;
        let mut position = Vec3::new(2.0, ramp_y + ground_clearance_center() + 0.1, 0.0);
        let mut velocity = Vec3::new(0.0, -1.0, 0.0);

        motor.move_and_slide(&mut position, &mut velocity, DT);

        let ground = motor.ground();
        assert!(ground.on_ground);
        assert!(!ground.walkable);
        assert!(!ground.is_grounded());
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_coyote_time_window() {
        let mut motor = KinematicMotor::new(GroundMap::flat(0.0));
        let mut position = Vec3::new(0.0, ground_clearance_center(), 0.0);
        let mut velocity = Vec3::ZERO;

        // Settle on the ground.
        motor.move_and_slide(&mut position, &mut velocity, DT);
        assert!(motor.ground().can_jump());

        // Walk off a cliff: teleport high so the ground is out of reach.
        position.y += 10.0;
        motor.move_and_slide(&mut position, &mut velocity, DT);
        assert!(!motor.ground().is_grounded());
        assert!(motor.ground().can_jump());

        // Past the grace period jumping is no longer allowed.
        for _ in 0..10 {
            motor.move_and_slide(&mut position, &mut velocity, DT);
        }
        assert!(!motor.ground().can_jump());
    }
}
