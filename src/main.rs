//! Peripheral headless driver
//!
//! Plays a scripted session against the simulation core on a fixed
//! timestep and logs every event. Useful for balancing a tuning file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Env};
use glam::Vec2;
use log::LevelFilter;

use peripheral::Tuning;
use peripheral::consts::SIM_DT;
use peripheral::sim::{GameEvent, Simulation, TickInput, tick};

#[derive(Debug, Parser)]
#[command(name = "peripheral", about = "Run a scripted session against the simulation core")]
struct Args {
    /// Tuning JSON file (defaults are used for missing fields)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Session length limit in seconds
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Collect a pair of glasses every N seconds
    #[arg(long, default_value_t = 12.0)]
    pickup_every: f32,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = Builder::from_env(Env::default().default_filter_or(level.to_string())).try_init();
}

/// Scripted player: wanders a slow figure-eight and sprints in bursts
struct Wanderer {
    pos: Vec2,
    t: f32,
}

impl Wanderer {
    fn step(&mut self, speed: f32, dt: f32) -> TickInput {
        self.t += dt;
        let heading = Vec2::new((self.t * 0.4).cos(), (self.t * 0.8).sin()).normalize_or_zero();
        self.pos += heading * speed * dt;
        TickInput {
            player_position: Some(self.pos),
            sprint: self.t % 8.0 < 2.5,
            viewport: None,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let tuning = match &args.config {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    log::info!("Peripheral starting (seed {})", args.seed);
    let mut sim = Simulation::new(tuning, args.seed);
    let mut player = Wanderer {
        pos: Vec2::ZERO,
        t: 0.0,
    };

    let max_ticks = (args.seconds.max(0.0) / SIM_DT) as u64;
    let pickup_every = args.pickup_every.max(SIM_DT);
    let mut next_pickup = pickup_every;

    for _ in 0..max_ticks {
        let input = player.step(sim.movement_speed(), SIM_DT);
        tick(&mut sim, &input, SIM_DT);

        if sim.elapsed() >= next_pickup {
            next_pickup += pickup_every;
            sim.collect_glasses();
        }

        for event in sim.take_events() {
            log_event(&sim, &event);
        }
        if sim.is_over() {
            break;
        }
    }

    let snapshot = sim.snapshot();
    log::info!(
        "Finished: {:?} at {:.1}s, exposure {:.2}, glasses {}/{}",
        snapshot.phase,
        snapshot.elapsed,
        snapshot.exposure,
        snapshot.glasses_collected,
        snapshot.total_required
    );
    if args.json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("Could not serialize snapshot: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn log_event(sim: &Simulation, event: &GameEvent) {
    let t = sim.elapsed();
    match event {
        GameEvent::ThreatSpawned {
            id,
            position,
            placement,
        } => {
            log::info!(
                "[{t:6.2}] {id} spawned {placement:?} at ({:.1}, {:.1})",
                position.x,
                position.y
            )
        }
        GameEvent::ThreatDespawned(id) => log::info!("[{t:6.2}] {id} gone"),
        GameEvent::ThreatFirstSeen(id) => {
            log::info!("[{t:6.2}] {id} spotted (exposure {:.2})", sim.exposure_level())
        }
        GameEvent::GlassesCollected {
            count,
            vision_radius,
        } => log::info!("[{t:6.2}] glasses {count}, vision radius {vision_radius:.2}"),
        GameEvent::Lost => log::info!("[{t:6.2}] exposure saturated - run lost"),
        GameEvent::Won => log::info!("[{t:6.2}] all glasses collected - run won"),
    }
}
