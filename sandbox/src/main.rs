//! Controller sandbox - headless Bevy app that drives one character
//! through a scripted run over a small test range.

mod rig;
mod script;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use controller::{
    math, motor::ground_clearance_center, tick_duration, ActiveCamera, AimTarget, CharacterLanded,
    CharacterMotor, CharacterMoved, CharacterPosition, CharacterVelocity, CharacterYaw,
    ControllerConfig, ControllerPlugin, ControllerSet, GroundMap, KinematicMotor, LandedWatch,
    Ramp, TickGate,
};

use rig::OrbitRig;
use script::DemoScript;

/// Marker for the one scripted character.
#[derive(Component)]
struct Protagonist;

const DEFAULT_CONFIG_PATH: &str = "sandbox/assets/controller.ron";

/// Spawn the scripted character above the test range.
fn spawn_character(mut commands: Commands, config: Res<ControllerConfig>) {
    let map = GroundMap::flat(0.0)
        // Gentle rise to the east; the character can walk up this one.
        .with_ramp(Ramp {
            min: Vec2::new(6.0, -4.0),
            max: Vec2::new(12.0, 4.0),
            base_height: 0.0,
            top_height: 2.0,
        })
        // Steep face to the west, too sheer to stand on.
        .with_ramp(Ramp {
            min: Vec2::new(-12.0, -4.0),
            max: Vec2::new(-6.0, 4.0),
            base_height: 8.0,
            top_height: 0.0,
        });

    let mut motor = KinematicMotor::new(map);
    motor.collided().subscribe(|hit| {
        info!("Scraping non-walkable ground at {:?}", hit.point);
    });

    // Drop in from above so the first landing shows up in the log.
    let spawn = Vec3::new(0.0, ground_clearance_center() + 2.0, 0.0);
    commands.spawn((
        Protagonist,
        CharacterPosition(spawn),
        CharacterYaw(0.0),
        CharacterVelocity(Vec3::ZERO),
        AimTarget::default(),
        motor,
        LandedWatch::default(),
        TickGate::default(),
    ));

    info!("Spawned character at {:?} (aim mode {:?})", spawn, config.aim_mode);
}

/// Log every landing with where it happened.
fn report_landings(
    mut landings: MessageReader<CharacterLanded>,
    positions: Query<&CharacterPosition>,
) {
    for landing in landings.read() {
        if let Ok(position) = positions.get(landing.entity) {
            info!("Landed at {:?}", position.0);
        }
    }
}

/// Feed a model animator the move direction in the character's local
/// frame (forward, strafe).
fn feed_animation(
    camera: Res<ActiveCamera>,
    mut moves: MessageReader<CharacterMoved>,
    characters: Query<&CharacterYaw>,
) {
    for moved in moves.read() {
        let Ok(yaw) = characters.get(moved.entity) else {
            continue;
        };
        let world = math::camera_relative(
            moved.move_direction,
            camera.pose.forward,
            camera.pose.up,
            Vec3::Y,
        );
        let forward = world.dot(yaw.forward());
        let strafe = world.dot(yaw.right());
        debug!("Animation blend: forward {:.2} strafe {:.2}", forward, strafe);
    }
}

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = match ControllerConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut app = App::new();

    // Headless plugins (no rendering). Run the main loop at the fixed
    // tick rate so one frame is one tick.
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick_duration())));
    app.add_plugins(bevy::log::LogPlugin::default());

    app.insert_resource(config);
    app.insert_resource(ActiveCamera::default());
    app.init_resource::<OrbitRig>();
    app.init_resource::<DemoScript>();

    app.add_plugins(ControllerPlugin::<KinematicMotor>::default());

    app.add_systems(Startup, spawn_character);

    // Feed input and the camera pose in before the solvers sample them.
    app.add_systems(
        FixedUpdate,
        (script::drive_input, rig::update_camera).before(ControllerSet::Sync),
    );

    // Consumers run after the solvers have settled the tick.
    app.add_systems(
        FixedUpdate,
        (report_landings, feed_animation, script::report_aim).after(ControllerSet::Orientation),
    );

    info!("Sandbox starting with config {}", config_path);
    app.run();
}
