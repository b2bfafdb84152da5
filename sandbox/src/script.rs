//! Scripted input feed walking the character through each move the
//! controller supports, then exiting.

use bevy::prelude::*;
use controller::orientation::{aim_origin, aim_point};
use controller::{
    ActiveCamera, AimTarget, CharacterPosition, CharacterYaw, ControllerConfig, InputState,
    TickInput, FIXED_TIMESTEP_HZ,
};

/// One stretch of scripted input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Let the drop-in landing play out.
    WarmUp,
    WalkEast,
    WalkDiagonal,
    /// Sweep the pointer across the screen while holding fire.
    SweepAim,
    /// Run forward and tap jump twice.
    JumpRun,
    /// Push into the steep west face.
    PushWest,
    Settle,
    Done,
}

impl Phase {
    fn duration(self) -> f32 {
        match self {
            Phase::WarmUp => 1.0,
            Phase::WalkEast => 2.5,
            Phase::WalkDiagonal => 2.0,
            Phase::SweepAim => 2.0,
            Phase::JumpRun => 2.5,
            Phase::PushWest => 2.5,
            Phase::Settle => 1.5,
            Phase::Done => f32::INFINITY,
        }
    }

    fn next(self) -> Phase {
        match self {
            Phase::WarmUp => Phase::WalkEast,
            Phase::WalkEast => Phase::WalkDiagonal,
            Phase::WalkDiagonal => Phase::SweepAim,
            Phase::SweepAim => Phase::JumpRun,
            Phase::JumpRun => Phase::PushWest,
            Phase::PushWest => Phase::Settle,
            Phase::Settle | Phase::Done => Phase::Done,
        }
    }
}

/// Progress through the scripted run.
#[derive(Resource)]
pub struct DemoScript {
    phase: Phase,
    elapsed: f32,
}

impl Default for DemoScript {
    fn default() -> Self {
        Self {
            phase: Phase::WarmUp,
            elapsed: 0.0,
        }
    }
}

/// Write this tick's scripted input.
pub fn drive_input(
    mut script: ResMut<DemoScript>,
    mut input: ResMut<InputState>,
    camera: Res<ActiveCamera>,
    mut exit: MessageWriter<AppExit>,
) {
    let dt = 1.0 / FIXED_TIMESTEP_HZ as f32;
    script.elapsed += dt;
    if script.elapsed >= script.phase.duration() {
        script.elapsed = 0.0;
        script.phase = script.phase.next();
        info!("Script phase: {:?}", script.phase);
        if script.phase == Phase::Done {
            exit.write(AppExit::Success);
        }
    }

    // Pointer rests at the screen center unless a phase moves it.
    let mut pointer = camera.viewport * 0.5;
    let mut axis = Vec2::ZERO;
    let mut dash = false;
    let mut fire1 = false;

    match script.phase {
        Phase::WarmUp | Phase::Settle | Phase::Done => {}
        Phase::WalkEast => {
            axis = Vec2::new(1.0, 0.0);
        }
        Phase::WalkDiagonal => {
            axis = Vec2::new(1.0, 1.0);
        }
        Phase::SweepAim => {
            let t = script.elapsed / Phase::SweepAim.duration();
            pointer = Vec2::new(camera.viewport.x * t, camera.viewport.y * 0.6);
            fire1 = true;
        }
        Phase::JumpRun => {
            axis = Vec2::new(0.0, 1.0);
            // Tap the dash button for one tick, twice.
            let tick = (script.elapsed * FIXED_TIMESTEP_HZ as f32).round() as u32;
            dash = tick == 6 || tick == 80;
        }
        Phase::PushWest => {
            axis = Vec2::new(-1.0, 0.0);
        }
    }

    input.set_move_axis(axis);
    input.set_dash(dash);
    input.set_fire1(fire1);
    input.set_pointer(pointer);
}

/// Trace the clamped aim point while fire is held.
pub fn report_aim(
    input: Res<TickInput>,
    config: Res<ControllerConfig>,
    characters: Query<(&CharacterPosition, &CharacterYaw, &AimTarget)>,
) {
    if !input.0.fire1_held {
        return;
    }
    for (position, yaw, aim) in characters.iter() {
        let origin = aim_origin(position.0, *yaw, config.aim_offset);
        let point = aim_point(
            origin,
            yaw.forward(),
            aim.look_point,
            config.min_aim_distance,
            config.max_aim_distance,
        );
        info!("Aim point {:?}", point);
    }
}
