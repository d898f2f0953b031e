#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Path Defence.
//!
//! The world owns the live unit collection, the towers, the shared waypoint
//! path, and the per-step shot-visual list. All mutation flows through
//! [`apply`], which executes one [`Command`] at a time and broadcasts
//! [`Event`] values; [`query`] exposes immutable snapshots for systems and
//! adapters.

use std::{sync::Arc, time::Duration};

use path_defence_core::{
    Command, Event, Health, PixelPoint, ShotVisual, SubPixel, TowerId, UnitId, UnitSpeed,
    WaypointPath,
};

const DEFAULT_BOARD_WIDTH: u32 = 1_024;
const DEFAULT_BOARD_HEIGHT: u32 = 768;
const DEFAULT_UNIT_HEALTH: Health = Health::new(5);
const DEFAULT_CROSSING: Duration = Duration::from_millis(2_000);
const DEFAULT_TOWER_RANGE: u32 = 160;
const DEFAULT_RELOAD_RATE: u32 = 1;
const DEFAULT_DAMAGE: i32 = 1;

/// Sprite margin kept between the default circuit and the board edge.
const DEFAULT_PATH_MARGIN: i32 = 32;

/// Dimensions of the playable board measured in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    /// Board width in pixels.
    pub width_px: u32,
    /// Board height in pixels.
    pub height_px: u32,
}

impl BoardConfig {
    /// Creates a board description with explicit dimensions.
    #[must_use]
    pub const fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    /// Length of the board diagonal in pixels.
    ///
    /// The diagonal anchors the designer-facing "seconds to cross the board"
    /// speed constant.
    #[must_use]
    pub fn diagonal_px(&self) -> f32 {
        let width = self.width_px as f32;
        let height = self.height_px as f32;
        (width * width + height * height).sqrt()
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_WIDTH, DEFAULT_BOARD_HEIGHT)
    }
}

/// Parameters applied to every unit stamped from the spawn template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitConfig {
    /// Hit points granted at spawn.
    pub health: Health,
    /// Simulated time a unit needs to cover the board diagonal.
    pub crossing: Duration,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            health: DEFAULT_UNIT_HEALTH,
            crossing: DEFAULT_CROSSING,
        }
    }
}

/// Parameters describing a single stationary tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerConfig {
    /// Fixed position of the tower.
    pub position: PixelPoint,
    /// Maximum engagement distance in whole pixels.
    pub range_px: u32,
    /// Shots accumulated per simulation step.
    pub reload_rate: u32,
    /// Damage applied per successful hit.
    pub damage: i32,
}

impl TowerConfig {
    /// Creates a tower configuration at the provided position with defaults
    /// for range, reload rate, and damage.
    #[must_use]
    pub const fn at(position: PixelPoint) -> Self {
        Self {
            position,
            range_px: DEFAULT_TOWER_RANGE,
            reload_rate: DEFAULT_RELOAD_RATE,
            damage: DEFAULT_DAMAGE,
        }
    }
}

/// Complete configuration consumed by [`World::new`].
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Board dimensions.
    pub board: BoardConfig,
    /// Shared waypoint path traversed by all units.
    pub path: Arc<WaypointPath>,
    /// Towers present for the whole run.
    pub towers: Vec<TowerConfig>,
    /// Spawn-template parameters.
    pub unit: UnitConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let board = BoardConfig::default();
        Self {
            path: Arc::new(default_circuit(board)),
            towers: vec![TowerConfig::at(board_center(board))],
            unit: UnitConfig::default(),
            board,
        }
    }
}

/// Builds the default circuit: a loop hugging the board edges with a sprite
/// margin, crossing the board diagonally between the left and right rails.
#[must_use]
pub fn default_circuit(board: BoardConfig) -> WaypointPath {
    let right = board.width_px as i32 - DEFAULT_PATH_MARGIN;
    let bottom = board.height_px as i32 - DEFAULT_PATH_MARGIN;
    WaypointPath::new(vec![
        PixelPoint::new(0, 0),
        PixelPoint::new(right, 0),
        PixelPoint::new(0, bottom),
        PixelPoint::new(right, bottom),
        PixelPoint::new(0, 0),
    ])
    .expect("default circuit is never empty")
}

/// Center of the provided board in pixels.
#[must_use]
pub fn board_center(board: BoardConfig) -> PixelPoint {
    PixelPoint::new(board.width_px as i32 / 2, board.height_px as i32 / 2)
}

/// Represents the authoritative Path Defence world state.
#[derive(Debug)]
pub struct World {
    board: BoardConfig,
    path: Arc<WaypointPath>,
    template: UnitTemplate,
    units: Vec<Unit>,
    towers: Vec<Tower>,
    shot_visuals: Vec<ShotVisual>,
    next_unit_id: u32,
}

impl World {
    /// Creates a new world ready for simulation.
    ///
    /// The spawn template is stamped from the configuration: units spawn at
    /// the first waypoint with a speed derived from the board-crossing
    /// duration. No units exist until a `SpawnUnit` command arrives.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let speed = UnitSpeed::from_crossing(config.board.diagonal_px(), config.unit.crossing);
        let template = UnitTemplate {
            spawn: config.path.first(),
            speed,
            health: config.unit.health,
        };
        let towers = config
            .towers
            .iter()
            .enumerate()
            .map(|(index, tower)| Tower::from_config(TowerId::new(index as u32), *tower))
            .collect();

        Self {
            board: config.board,
            path: config.path,
            template,
            units: Vec::new(),
            towers,
            shot_visuals: Vec::new(),
            next_unit_id: 0,
        }
    }

    fn spawn_from_template(&mut self, out_events: &mut Vec<Event>) {
        let unit = Unit::from_template(UnitId::new(self.next_unit_id), self.template);
        self.next_unit_id = self.next_unit_id.wrapping_add(1);
        out_events.push(Event::UnitSpawned {
            unit_id: unit.id,
            position: unit.position,
        });
        self.units.push(unit);
    }

    fn unit_index(&self, unit_id: UnitId) -> Option<usize> {
        self.units.iter().position(|unit| unit.id == unit_id)
    }

    fn tower_mut(&mut self, tower_id: TowerId) -> Option<&mut Tower> {
        self.towers.iter_mut().find(|tower| tower.id == tower_id)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// `apply` is a total function: malformed commands (unknown identifiers,
/// stale waypoint indices, empty paths) are ignored without mutating state,
/// so a step either fully completes or is not considered to have started.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.shot_visuals.clear();
            for tower in &mut world.towers {
                tower.accumulate();
            }
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::ConfigurePath { waypoints } => {
            let Ok(path) = WaypointPath::new(waypoints) else {
                return;
            };
            world.path = Arc::new(path);
            world.template.spawn = world.path.first();
            for unit in &mut world.units {
                unit.reset_traversal();
            }
            out_events.push(Event::PathConfigured {
                waypoints: world.path.len(),
            });
        }
        Command::MoveUnit {
            unit_id,
            position,
            residual,
            next_waypoint,
        } => {
            let path_len = world.path.len();
            let Some(index) = world.unit_index(unit_id) else {
                return;
            };
            let unit = &mut world.units[index];
            if unit.health.is_depleted() {
                return;
            }
            if next_waypoint < unit.next_waypoint || next_waypoint > path_len {
                return;
            }

            let from = unit.position;
            unit.position = position;
            unit.residual = residual;
            unit.next_waypoint = next_waypoint;
            if from != position {
                out_events.push(Event::UnitMoved {
                    unit_id,
                    from,
                    to: position,
                });
            }
        }
        Command::FireShot { tower, unit } => {
            let Some(unit_index) = world.unit_index(unit) else {
                return;
            };
            if world.units[unit_index].health.is_depleted() {
                return;
            }
            let unit_position = world.units[unit_index].position;

            let Some(shooter) = world.tower_mut(tower) else {
                return;
            };
            if !shooter.attempt_shot(unit_position) {
                return;
            }
            let muzzle = shooter.position;
            let damage = shooter.damage;

            world
                .shot_visuals
                .push(ShotVisual::new(muzzle, unit_position));
            out_events.push(Event::ShotFired {
                tower,
                unit,
                from: muzzle,
                to: unit_position,
            });

            let target = &mut world.units[unit_index];
            target.health = target.health.absorb(damage);
            out_events.push(Event::UnitDamaged {
                unit_id: unit,
                remaining: target.health,
            });
            if target.health.is_depleted() {
                out_events.push(Event::UnitDied { unit_id: unit });
            }
        }
        Command::SpawnUnit => {
            world.spawn_from_template(out_events);
        }
        Command::SweepDepartedUnits => {
            let mut departed: Vec<UnitId> = Vec::new();
            world.units.retain(|unit| {
                if unit.health.is_depleted() {
                    departed.push(unit.id);
                    false
                } else {
                    true
                }
            });
            for unit_id in departed {
                out_events.push(Event::UnitDespawned { unit_id });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::sync::Arc;

    use super::{BoardConfig, World};
    use path_defence_core::{
        ShotVisual, TowerSnapshot, TowerView, UnitSnapshot, UnitView, WaypointPath,
    };

    /// Provides the board dimensions for presentation purposes.
    #[must_use]
    pub fn board(world: &World) -> BoardConfig {
        world.board
    }

    /// Returns a shared handle to the waypoint path units traverse.
    #[must_use]
    pub fn path(world: &World) -> Arc<WaypointPath> {
        Arc::clone(&world.path)
    }

    /// Captures a read-only view of the live units on the board.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(
            world
                .units
                .iter()
                .map(|unit| UnitSnapshot {
                    id: unit.id,
                    position: unit.position,
                    residual: unit.residual,
                    speed: unit.speed,
                    next_waypoint: unit.next_waypoint,
                    health: unit.health,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the towers on the board.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| TowerSnapshot {
                    id: tower.id,
                    position: tower.position,
                    range_squared: tower.range_squared,
                    shots_available: tower.shots_available,
                    damage: tower.damage,
                })
                .collect(),
        )
    }

    /// Shot visuals recorded during the current step.
    ///
    /// The slice is valid for exactly one step; the next `Tick` clears it.
    #[must_use]
    pub fn shot_visuals(world: &World) -> &[ShotVisual] {
        &world.shot_visuals
    }
}

/// Spawn parameters copied into every freshly created unit.
///
/// Units are value-copied from the template: no live unit aliases it.
#[derive(Clone, Copy, Debug)]
struct UnitTemplate {
    spawn: PixelPoint,
    speed: UnitSpeed,
    health: Health,
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    position: PixelPoint,
    residual: SubPixel,
    speed: UnitSpeed,
    next_waypoint: usize,
    health: Health,
}

impl Unit {
    fn from_template(id: UnitId, template: UnitTemplate) -> Self {
        Self {
            id,
            position: template.spawn,
            residual: SubPixel::ZERO,
            speed: template.speed,
            next_waypoint: 1,
            health: template.health,
        }
    }

    /// Restarts traversal at the first waypoint without touching position.
    fn reset_traversal(&mut self) {
        self.next_waypoint = 1;
        self.residual = SubPixel::ZERO;
    }
}

#[derive(Clone, Debug)]
struct Tower {
    id: TowerId,
    position: PixelPoint,
    range_squared: i64,
    reload_rate: u32,
    damage: i32,
    shots_available: u32,
}

impl Tower {
    fn from_config(id: TowerId, config: TowerConfig) -> Self {
        let range = i64::from(config.range_px);
        Self {
            id,
            position: config.position,
            range_squared: range * range,
            reload_rate: config.reload_rate,
            damage: config.damage,
            shots_available: 0,
        }
    }

    fn accumulate(&mut self) {
        self.shots_available = self.shots_available.saturating_add(self.reload_rate);
    }

    /// Expends one shot when the target is inside the engagement radius.
    ///
    /// Distances strictly greater than the squared range are rejected without
    /// consuming ammunition; equality is a hit.
    fn attempt_shot(&mut self, target: PixelPoint) -> bool {
        if self.shots_available == 0 {
            return false;
        }
        if self.position.distance_squared(target) > self.range_squared {
            return false;
        }
        self.shots_available -= 1;
        true
    }
}
