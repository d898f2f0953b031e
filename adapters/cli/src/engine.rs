//! Per-step orchestration of the authoritative world and the pure systems.
//!
//! Each step is strictly ordered: towers accumulate ammunition, every unit
//! moves, every shot is evaluated, depleted units are swept, and the spawn
//! policy reacts. No step begins before the previous step's sweep completed,
//! and the shot visuals handed to the render sink never outlive their step.

use std::time::Duration;

use path_defence_core::{Command, Event, TowerTarget};
use path_defence_rendering::{Scene, SceneTower, SceneUnit, ShotLine, SpriteBounds, SpriteKey};
use path_defence_system_movement::Movement;
use path_defence_system_spawning::{Config as SpawningConfig, Spawning};
use path_defence_system_tower_combat::TowerCombat;
use path_defence_system_tower_targeting::TowerTargeting;
use path_defence_world::{self as world, query, World, WorldConfig};

/// Drawable bounds of the 32x32 unit sprite.
const UNIT_BOUNDS: SpriteBounds = SpriteBounds::new(32, 32);
/// Drawable bounds of the tower body.
const TOWER_BOUNDS: SpriteBounds = SpriteBounds::new(48, 48);

/// Everything needed to assemble an [`Engine`].
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    /// Authoritative world configuration.
    pub world: WorldConfig,
    /// Population policy configuration.
    pub spawning: SpawningConfig,
    /// Units stamped from the template before the first step.
    pub initial_units: u32,
}

/// Owns the world and the pure systems, and drives one step at a time.
#[derive(Debug)]
pub struct Engine {
    world: World,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    spawning: Spawning,
    events: Vec<Event>,
    commands: Vec<Command>,
    targets: Vec<TowerTarget>,
}

impl Engine {
    /// Builds the world and spawns the initial population.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let mut world = World::new(config.world);
        let mut events = Vec::new();
        for _ in 0..config.initial_units {
            world::apply(&mut world, Command::SpawnUnit, &mut events);
        }
        events.clear();

        Self {
            world,
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            spawning: Spawning::new(config.spawning),
            events,
            commands: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Runs one simulation step and returns the events it produced.
    ///
    /// The returned slice is valid until the next call; callers that need the
    /// events across steps must copy them out.
    pub fn step(&mut self, dt: Duration) -> &[Event] {
        self.events.clear();

        // Towers accumulate and last step's shot visuals are discarded.
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        // Movement proposes, the world validates and applies.
        let units = query::unit_view(&self.world);
        let path = query::path(&self.world);
        self.movement
            .handle(&self.events, &units, &path, &mut self.commands);
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        // Every live unit is offered to every tower once, post-movement.
        let units = query::unit_view(&self.world);
        self.targeting
            .handle(&query::tower_view(&self.world), &units, &mut self.targets);
        self.combat
            .handle(query::tower_view(&self.world), &self.targets, &mut self.commands);
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        // Depleted units leave the live set only after the full shot pass.
        world::apply(
            &mut self.world,
            Command::SweepDepartedUnits,
            &mut self.events,
        );

        self.spawning.handle(&self.events, &mut self.commands);
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        &self.events
    }

    /// Rebuilds the scene snapshot handed to the render sink this step.
    pub fn populate_scene(&self, scene: &mut Scene) {
        scene.towers.clear();
        scene.units.clear();
        scene.shots.clear();

        for tower in query::tower_view(&self.world).iter() {
            scene.towers.push(SceneTower {
                id: tower.id,
                position: tower.position,
                bounds: TOWER_BOUNDS,
                sprite: SpriteKey::Tower,
                range_px: (tower.range_squared as f32).sqrt(),
            });
        }
        for unit in query::unit_view(&self.world).iter() {
            scene.units.push(SceneUnit {
                id: unit.id,
                position: unit.position,
                bounds: UNIT_BOUNDS,
                sprite: SpriteKey::Unit,
            });
        }
        for visual in query::shot_visuals(&self.world) {
            scene.shots.push(ShotLine {
                from: visual.from(),
                to: visual.to(),
            });
        }
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }
}
