use std::{sync::Arc, time::Duration};

use path_defence_core::{Command, Event, PixelPoint, WaypointPath};
use path_defence_system_tower_combat::TowerCombat;
use path_defence_system_tower_targeting::TowerTargeting;
use path_defence_world::{
    self as world, query, BoardConfig, TowerConfig, UnitConfig, World, WorldConfig,
};

fn armed_world(tower: TowerConfig, units: usize) -> World {
    let config = WorldConfig {
        board: BoardConfig::default(),
        path: Arc::new(WaypointPath::new(vec![PixelPoint::new(0, 0)]).expect("test path")),
        towers: vec![tower],
        unit: UnitConfig::default(),
    };
    let mut world = World::new(config);
    let mut events = Vec::new();
    for _ in 0..units {
        world::apply(&mut world, Command::SpawnUnit, &mut events);
    }
    world
}

/// Runs one engagement step (no movement: the single-point path parks every
/// unit at the spawn) and returns the number of shots that landed.
fn engagement_step(
    world: &mut World,
    targeting: &mut TowerTargeting,
    combat: &mut TowerCombat,
) -> usize {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    let mut targets = Vec::new();
    targeting.handle(&query::tower_view(world), &query::unit_view(world), &mut targets);

    let mut commands = Vec::new();
    combat.handle(query::tower_view(world), &targets, &mut commands);
    for command in commands {
        world::apply(world, command, &mut events);
    }
    world::apply(world, Command::SweepDepartedUnits, &mut events);

    events
        .iter()
        .filter(|event| matches!(event, Event::ShotFired { .. }))
        .count()
}

#[test]
fn default_accumulation_fires_at_most_once_per_step() {
    let tower = TowerConfig::at(PixelPoint::new(5, 0));
    let mut world = armed_world(tower, 3);
    let mut targeting = TowerTargeting::new();
    let mut combat = TowerCombat::new();

    // 3 units x 5 health: fifteen steps of exactly one landed shot each.
    for step in 0..15 {
        let fired = engagement_step(&mut world, &mut targeting, &mut combat);
        assert_eq!(fired, 1, "step {step} must land exactly one shot");
        let snapshot = query::tower_view(&world).into_vec()[0];
        assert_eq!(
            snapshot.shots_available, 0,
            "the accumulated shot is spent every step"
        );
    }

    assert!(
        query::unit_view(&world).iter().next().is_none(),
        "all units are depleted and swept"
    );

    // With nothing in range the counter accumulates monotonically.
    for expected in 1..=3 {
        let fired = engagement_step(&mut world, &mut targeting, &mut combat);
        assert_eq!(fired, 0);
        let snapshot = query::tower_view(&world).into_vec()[0];
        assert_eq!(snapshot.shots_available, expected);
    }
}

#[test]
fn banked_shots_are_bounded_by_accumulation() {
    let tower = TowerConfig::at(PixelPoint::new(5, 0));
    let mut world = armed_world(tower, 0);
    let mut targeting = TowerTargeting::new();
    let mut combat = TowerCombat::new();

    // Five empty steps bank five shots.
    for _ in 0..5 {
        assert_eq!(engagement_step(&mut world, &mut targeting, &mut combat), 0);
    }
    assert_eq!(query::tower_view(&world).into_vec()[0].shots_available, 5);

    let mut events = Vec::new();
    for _ in 0..3 {
        world::apply(&mut world, Command::SpawnUnit, &mut events);
    }

    // All three offers can be served from the bank in a single step.
    let fired = engagement_step(&mut world, &mut targeting, &mut combat);
    assert_eq!(fired, 3);
    assert_eq!(
        query::tower_view(&world).into_vec()[0].shots_available,
        3,
        "five banked plus one accumulated minus three spent"
    );
}

#[test]
fn offers_beyond_the_bank_are_refused_without_effect() {
    let mut tower = TowerConfig::at(PixelPoint::new(5, 0));
    tower.reload_rate = 1;
    let mut world = armed_world(tower, 4);
    let mut targeting = TowerTargeting::new();
    let mut combat = TowerCombat::new();

    // One accumulated shot, four offers: three refusals leave no trace.
    let fired = engagement_step(&mut world, &mut targeting, &mut combat);
    assert_eq!(fired, 1);
    let units: Vec<_> = query::unit_view(&world).into_vec();
    assert_eq!(units.len(), 4, "refused offers apply no damage");
    let damaged = units
        .iter()
        .filter(|unit| unit.health.get() < 5)
        .count();
    assert_eq!(damaged, 1);
}
