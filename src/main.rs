//! Tank Arena headless runner
//!
//! Drives the simulation with a scripted autopilot at a fixed frame rate and
//! logs what happens. Useful for soak runs and reproducing seeds.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tank_arena::consts::*;
use tank_arena::sim::{ArenaLayout, Command, GameEvent, GameSession, TickInput, tick};
use tank_arena::{Settings, angle_delta, bearing_degrees};

/// Simulated frame time fed to the accumulator (a slightly slow 60 Hz display)
const FRAME_DT: f32 = 1.0 / 58.0;
const DEFAULT_TICKS: u64 = 60 * 120;
/// The autopilot fires every this many ticks
const AUTOPILOT_FIRE_INTERVAL: u64 = 20;

struct Args {
    seed: Option<u64>,
    ticks: u64,
    settings: Option<PathBuf>,
    save_settings: Option<PathBuf>,
    arena: Option<ArenaLayout>,
    snapshot: bool,
}

fn parse_args(args: &[String]) -> Args {
    let mut parsed = Args {
        seed: None,
        ticks: DEFAULT_TICKS,
        settings: None,
        save_settings: None,
        arena: None,
        snapshot: false,
    };
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => parsed.seed = iter.next().and_then(|v| v.parse().ok()),
            "--ticks" => {
                if let Some(ticks) = iter.next().and_then(|v| v.parse().ok()) {
                    parsed.ticks = ticks;
                }
            }
            "--settings" => parsed.settings = iter.next().map(PathBuf::from),
            "--save-settings" => parsed.save_settings = iter.next().map(PathBuf::from),
            "--arena" => parsed.arena = iter.next().and_then(|v| ArenaLayout::from_str(v)),
            "--snapshot" => parsed.snapshot = true,
            other => log::warn!("Ignoring unknown argument {}", other),
        }
    }
    parsed
}

fn system_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Turn toward the nearest live enemy, close in, and shoot now and then
fn autopilot(session: &GameSession) -> TickInput {
    let mut commands = Vec::new();
    let Some(player) = session.player().filter(|p| p.is_alive()) else {
        return TickInput { commands };
    };
    if session.game_over {
        return TickInput { commands };
    }

    let nearest = session
        .tanks
        .iter()
        .skip(1)
        .chain(session.boss.iter())
        .filter(|t| t.is_alive())
        .min_by(|a, b| {
            let da = a.position.distance_squared(player.position);
            let db = b.position.distance_squared(player.position);
            da.total_cmp(&db)
        });

    if let Some(target) = nearest {
        let delta = angle_delta(
            bearing_degrees(player.position, target.position),
            player.rotation,
        );
        if delta > PLAYER_ROTATION_STEP {
            commands.push(Command::RotateLeft);
        } else if delta < -PLAYER_ROTATION_STEP {
            commands.push(Command::RotateRight);
        } else if player.position.distance(target.position) > 15.0 {
            commands.push(Command::MoveForward);
        }
    }

    if session.tick_count % AUTOPILOT_FIRE_INTERVAL == 0 {
        commands.push(Command::Fire);
    }
    TickInput { commands }
}

fn log_events(session: &GameSession) {
    for event in &session.events {
        match event {
            GameEvent::Explosion { .. } => {}
            GameEvent::TankDestroyed { victim, by } => {
                log::info!("tick {}: {:?} destroyed by {:?}", session.tick_count, victim, by)
            }
            GameEvent::MatchOver { winner } => {
                log::info!("tick {}: match over, {:?} wins", session.tick_count, winner)
            }
            other => log::debug!("tick {}: {:?}", session.tick_count, other),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args);

    let mut settings = args
        .settings
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    if let Some(arena) = args.arena {
        settings.arena = arena;
    }
    if let Some(path) = &args.save_settings {
        settings.save(path);
    }
    let seed = args.seed.or(settings.seed).unwrap_or_else(system_seed);
    log::info!(
        "Tank Arena starting: seed {}, {} ticks, {} / {} / {} arena",
        seed,
        args.ticks,
        settings.difficulty.as_str(),
        settings.game_mode.as_str(),
        settings.arena.as_str()
    );

    let mut session = GameSession::with_settings(seed, &settings);
    let mut accumulator = 0.0f32;

    while session.tick_count < args.ticks && !session.game_over {
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = autopilot(&session);
            tick(&mut session, &input, SIM_DT);
            log_events(&session);
            accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    log::info!(
        "Finished after {} ticks ({:.1}s): scores {:?}, winner {:?}",
        session.tick_count,
        session.elapsed,
        session.scores,
        session.winner
    );

    if args.snapshot {
        match serde_json::to_string_pretty(&session) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Could not serialize session: {}", e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the host page on the web
}
