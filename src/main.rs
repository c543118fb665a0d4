//! Gaitwheel locomotion demo
//!
//! Drives a session through a scripted rest, walk, turn, stop, take-off,
//! flight and landing at a fixed tick, logging state changes and footsteps.
//!
//! Usage:
//!     gaitwheel [OPTIONS]
//!
//! Options:
//!     --assets <FILE>     Avatar asset JSON (default: built-in procedural avatar)
//!     --config <FILE>     Locomotion config JSON (default: built-in thresholds)
//!     --hz <RATE>         Tick rate (default: 60)
//!     -h, --help          Show this help message

use std::env;
use std::path::PathBuf;

use glam::Vec3;

use gaitwheel::animation::{presets, AvatarAssets};
use gaitwheel::core::logging;
use gaitwheel::locomotion::{LocomotionConfig, LocomotionSession, NoFeet, TickInput};

fn print_help() {
    eprintln!("gaitwheel - Procedural locomotion demo");
    eprintln!();
    eprintln!("Usage: gaitwheel [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    --assets <FILE>     Avatar asset JSON (default: built-in procedural avatar)");
    eprintln!("    --config <FILE>     Locomotion config JSON (default: built-in thresholds)");
    eprintln!("    --hz <RATE>         Tick rate (default: 60)");
    eprintln!("    -h, --help          Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    RUST_LOG=debug gaitwheel --hz 30");
}

#[derive(Debug)]
struct Args {
    assets: Option<PathBuf>,
    config: Option<PathBuf>,
    hz: f32,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut assets = None;
    let mut config = None;
    let mut hz = 60.0;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--assets" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --assets")?;
                assets = Some(PathBuf::from(value));
            }
            "--config" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --config")?;
                config = Some(PathBuf::from(value));
            }
            "--hz" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --hz")?;
                hz = value
                    .parse::<f32>()
                    .map_err(|_| format!("Invalid tick rate: {}", value))?;
                if !(hz > 0.0) {
                    return Err(format!("Tick rate must be positive, got {}", hz));
                }
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    Ok(Args { assets, config, hz })
}

/// One leg of the scripted run.
struct Segment {
    name: &'static str,
    seconds: f32,
    velocity: Vec3,
    yaw_rate: f32,
}

fn script() -> Vec<Segment> {
    let segment = |name, seconds, velocity, yaw_rate| Segment {
        name,
        seconds,
        velocity,
        yaw_rate,
    };
    vec![
        segment("rest", 1.0, Vec3::ZERO, 0.0),
        segment("walk", 3.0, Vec3::new(0.0, 0.0, -2.0), 0.0),
        segment("turn", 2.0, Vec3::new(0.0, 0.0, -2.0), 60.0),
        segment("side step", 1.5, Vec3::new(-1.0, 0.0, 0.0), 0.0),
        segment("stop", 1.0, Vec3::ZERO, 0.0),
        segment("take off", 1.5, Vec3::new(0.0, 4.0, 0.0), 0.0),
        segment("fly", 3.0, Vec3::new(0.0, 0.5, -15.0), 20.0),
        segment("hover", 1.0, Vec3::ZERO, 0.0),
        segment("descend", 2.5, Vec3::new(0.0, -3.0, -1.0), 0.0),
        segment("walk", 2.0, Vec3::new(0.0, 0.0, -1.5), 0.0),
        segment("rest", 1.0, Vec3::ZERO, 0.0),
    ]
}

fn load_assets(path: Option<&PathBuf>) -> AvatarAssets {
    match path {
        Some(path) => match AvatarAssets::load(path) {
            Ok(assets) => assets,
            Err(e) => {
                log::warn!("Failed to load assets from {}: {}; using built-in avatar", path.display(), e);
                presets::procedural_avatar()
            }
        },
        None => presets::procedural_avatar(),
    }
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    let config = match &args.config {
        Some(path) => match LocomotionConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => LocomotionConfig::default(),
    };

    let mut session = match LocomotionSession::new(load_assets(args.assets.as_ref()), config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let dt = 1.0 / args.hz;
    let mut height = 0.0_f32;
    let mut time = 0.0_f32;
    let mut last = (session.state(), session.current_animation());
    let mut footsteps = 0u32;

    for segment in script() {
        log::info!("[{:6.2}s] {}", time, segment.name);
        let ticks = (segment.seconds / dt).round() as u32;
        for _ in 0..ticks {
            // Ground stops the descent
            let mut velocity = segment.velocity;
            if height <= 0.0 && velocity.y < 0.0 {
                velocity.y = 0.0;
            }
            height = (height + velocity.y * dt).max(0.0);

            let frame = session.tick(
                &TickInput {
                    delta_time: dt,
                    velocity,
                    height_above_surface: height,
                    yaw_delta: segment.yaw_rate * dt,
                },
                &mut NoFeet,
            );
            time += dt;

            if (frame.state, frame.animation) != last {
                log::info!(
                    "[{:6.2}s] {:?} / {:?} -> {:?} (height {:.2})",
                    time,
                    frame.state,
                    frame.direction,
                    frame.animation,
                    height
                );
                last = (frame.state, frame.animation);
            }
            if let Some(step) = frame.footstep {
                footsteps += 1;
                log::debug!("[{:6.2}s] footstep {:?} at volume {:.2}", time, step.foot, step.volume);
            }
        }
    }

    log::info!(
        "Done: {:.1}s simulated, {} footsteps, stride {:.2}m",
        time,
        footsteps,
        session.calibration().stride_length
    );
}
