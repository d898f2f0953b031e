use std::{sync::Arc, time::Duration};

use path_defence_core::{Command, PixelPoint, WaypointPath};
use path_defence_system_spawning::{Config, RespawnPolicy, Spawning};
use path_defence_world::{
    self as world, query, BoardConfig, TowerConfig, UnitConfig, World, WorldConfig,
};

fn close_range_world() -> World {
    let config = WorldConfig {
        board: BoardConfig::default(),
        path: Arc::new(WaypointPath::new(vec![PixelPoint::new(0, 0)]).expect("test path")),
        towers: vec![TowerConfig::at(PixelPoint::new(5, 0))],
        unit: UnitConfig::default(),
    };
    World::new(config)
}

fn live_units(world: &World) -> usize {
    query::unit_view(world).iter().count()
}

/// Ticks the world, fires at every live unit, sweeps, and routes the step's
/// events through the spawning system.
fn step_with_policy(world: &mut World, spawning: &mut Spawning) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    let offers: Vec<_> = query::unit_view(world).iter().map(|unit| unit.id).collect();
    let tower = query::tower_view(world).into_vec()[0].id;
    for unit in offers {
        world::apply(world, Command::FireShot { tower, unit }, &mut events);
    }
    world::apply(world, Command::SweepDepartedUnits, &mut events);

    let mut commands = Vec::new();
    spawning.handle(&events, &mut commands);
    for command in commands {
        world::apply(world, command, &mut events);
    }
}

#[test]
fn replenish_policy_keeps_population_constant() {
    let mut world = close_range_world();
    let mut events = Vec::new();
    world::apply(&mut world, Command::SpawnUnit, &mut events);
    let mut spawning = Spawning::new(Config::new(None, RespawnPolicy::Replenish));

    for _ in 0..12 {
        step_with_policy(&mut world, &mut spawning);
        assert_eq!(live_units(&world), 1, "every removal is answered");
    }

    // Five hits per life: twelve steps cover at least two removals.
    let survivor = query::unit_view(&world).into_vec()[0];
    assert!(
        survivor.id.get() >= 2,
        "the live unit is a fresh copy, not the original"
    );
}

#[test]
fn disabled_policy_lets_population_decrease() {
    let mut world = close_range_world();
    let mut events = Vec::new();
    world::apply(&mut world, Command::SpawnUnit, &mut events);
    let mut spawning = Spawning::new(Config::new(None, RespawnPolicy::Disabled));

    for _ in 0..5 {
        step_with_policy(&mut world, &mut spawning);
    }
    assert_eq!(live_units(&world), 0, "five hits deplete the only unit");

    for _ in 0..3 {
        step_with_policy(&mut world, &mut spawning);
    }
    assert_eq!(live_units(&world), 0);
}

#[test]
fn interval_spawning_grows_population_through_the_world() {
    let mut world = close_range_world();
    // Tower far away so spawned units survive.
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigurePath {
            waypoints: vec![PixelPoint::new(10_000, 10_000)],
        },
        &mut events,
    );
    let mut spawning = Spawning::new(Config::new(
        Some(Duration::from_millis(64)),
        RespawnPolicy::Disabled,
    ));

    for _ in 0..8 {
        step_with_policy(&mut world, &mut spawning);
    }
    assert_eq!(live_units(&world), 2, "128ms of simulated time per spawn");

    let spawned: Vec<_> = query::unit_view(&world)
        .iter()
        .map(|unit| unit.position)
        .collect();
    assert!(
        spawned
            .iter()
            .all(|position| *position == PixelPoint::new(10_000, 10_000)),
        "spawns land on the first waypoint of the active path"
    );
}
