#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Path Defence experience.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use path_defence_cli::engine::{Engine, EngineConfig};
use path_defence_core::{Event, Health};
use path_defence_rendering::{Color, Presentation, RenderingBackend, Scene};
use path_defence_rendering_macroquad::MacroquadBackend;
use path_defence_system_spawning::{Config as SpawningConfig, RespawnPolicy};
use path_defence_world::{
    board_center, default_circuit, query, BoardConfig, TowerConfig, UnitConfig, WorldConfig,
};

const WINDOW_TITLE: &str = "Path Defence";
const BACKGROUND: Color = Color::new(0.08, 0.10, 0.08, 1.0);

/// Minimal real-time tower defence simulation.
#[derive(Debug, Parser)]
#[command(name = "path-defence")]
struct Args {
    /// Seconds a unit needs to cross the board diagonal.
    #[arg(long, default_value_t = 2.0)]
    crossing_seconds: f64,

    /// Tower engagement radius in pixels.
    #[arg(long, default_value_t = 160)]
    tower_range: u32,

    /// Damage applied per successful hit.
    #[arg(long, default_value_t = 1)]
    tower_damage: i32,

    /// Hit points granted to each spawned unit.
    #[arg(long, default_value_t = 5)]
    unit_health: i32,

    /// Units stamped from the spawn template at startup.
    #[arg(long, default_value_t = 1)]
    units: u32,

    /// Replace every removed unit with a fresh copy of the spawn template.
    #[arg(long)]
    respawn: bool,

    /// Spawn an additional unit every N milliseconds of simulated time.
    #[arg(long)]
    spawn_interval_ms: Option<u64>,

    /// Print frame timing metrics once per second.
    #[arg(long)]
    show_fps: bool,

    /// Sprite manifest path; omitted, entities render as flat shapes.
    #[arg(long)]
    sprites: Option<PathBuf>,

    /// Run without a window for the given number of fixed-size steps.
    #[arg(long)]
    headless_steps: Option<u64>,

    /// Step size used by the headless driver, in milliseconds.
    #[arg(long, default_value_t = 16)]
    step_millis: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let engine = Engine::new(engine_config(&args));

    match args.headless_steps {
        Some(steps) => {
            run_headless(engine, steps, Duration::from_millis(args.step_millis));
            Ok(())
        }
        None => run_windowed(engine, &args),
    }
}

fn engine_config(args: &Args) -> EngineConfig {
    let board = BoardConfig::default();
    let mut tower = TowerConfig::at(board_center(board));
    tower.range_px = args.tower_range;
    tower.damage = args.tower_damage;

    let world = WorldConfig {
        board,
        path: Arc::new(default_circuit(board)),
        towers: vec![tower],
        unit: UnitConfig {
            health: Health::new(args.unit_health),
            crossing: Duration::from_secs_f64(args.crossing_seconds),
        },
    };

    let respawn = if args.respawn {
        RespawnPolicy::Replenish
    } else {
        RespawnPolicy::Disabled
    };
    let spawning = SpawningConfig::new(args.spawn_interval_ms.map(Duration::from_millis), respawn);

    EngineConfig {
        world,
        spawning,
        initial_units: args.units,
    }
}

fn run_windowed(mut engine: Engine, args: &Args) -> Result<()> {
    let board = query::board(engine.world());
    let mut scene = Scene::new(board.width_px, board.height_px, BACKGROUND);
    engine.populate_scene(&mut scene);

    let backend = MacroquadBackend::new()
        .with_show_fps(args.show_fps)
        .with_sprite_manifest(args.sprites.clone());

    backend.run(
        Presentation {
            window_title: WINDOW_TITLE.to_owned(),
            scene,
        },
        move |dt, _input, scene| {
            let _ = engine.step(dt);
            engine.populate_scene(scene);
        },
    )
}

fn run_headless(mut engine: Engine, steps: u64, dt: Duration) {
    let mut spawned = 0u64;
    let mut shots = 0u64;
    let mut removed = 0u64;

    for _ in 0..steps {
        for event in engine.step(dt) {
            match event {
                Event::UnitSpawned { .. } => spawned += 1,
                Event::ShotFired { .. } => shots += 1,
                Event::UnitDespawned { .. } => removed += 1,
                _ => {}
            }
        }
    }

    let live = query::unit_view(engine.world()).iter().count();
    println!(
        "{steps} steps simulated: {spawned} spawned, {shots} shots landed, {removed} removed, {live} live"
    );
}
