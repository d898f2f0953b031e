#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous step.
        dt: Duration,
    },
    /// Replaces the shared waypoint path traversed by all units.
    ///
    /// Every live unit restarts its traversal at the first waypoint; an empty
    /// waypoint list violates the path precondition and is ignored.
    ConfigurePath {
        /// Ordered waypoints composing the replacement path.
        waypoints: Vec<PixelPoint>,
    },
    /// Requests that a unit adopt the movement result computed for this step.
    MoveUnit {
        /// Identifier of the unit that moved.
        unit_id: UnitId,
        /// Integer pixel position after the step.
        position: PixelPoint,
        /// Sub-pixel remainder carried into the next step.
        residual: SubPixel,
        /// Index of the waypoint the unit approaches next.
        next_waypoint: usize,
    },
    /// Offers a unit to a tower for a single shot attempt.
    FireShot {
        /// Tower asked to expend one accumulated shot.
        tower: TowerId,
        /// Unit the shot is aimed at.
        unit: UnitId,
    },
    /// Requests that a fresh copy of the spawn template enter the board.
    SpawnUnit,
    /// Removes every unit whose health is depleted from the live collection.
    SweepDepartedUnits,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the step.
        dt: Duration,
    },
    /// Announces that the shared waypoint path was replaced.
    PathConfigured {
        /// Number of waypoints composing the new path.
        waypoints: usize,
    },
    /// Confirms that a unit entered the board.
    UnitSpawned {
        /// Identifier assigned to the new unit.
        unit_id: UnitId,
        /// Position the unit occupies after spawning.
        position: PixelPoint,
    },
    /// Confirms that a unit's integer position changed this step.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit_id: UnitId,
        /// Position occupied before the step.
        from: PixelPoint,
        /// Position occupied after the step.
        to: PixelPoint,
    },
    /// Confirms that a tower expended a shot and hit a unit.
    ShotFired {
        /// Tower that fired.
        tower: TowerId,
        /// Unit that was hit.
        unit: UnitId,
        /// Muzzle end of the shot line.
        from: PixelPoint,
        /// Impact end of the shot line.
        to: PixelPoint,
    },
    /// Reports the health remaining after a hit was applied.
    UnitDamaged {
        /// Identifier of the unit that absorbed the hit.
        unit_id: UnitId,
        /// Health remaining after the hit.
        remaining: Health,
    },
    /// Announces that a unit's health reached depletion.
    UnitDied {
        /// Identifier of the depleted unit.
        unit_id: UnitId,
    },
    /// Confirms that a depleted unit left the live collection.
    UnitDespawned {
        /// Identifier of the removed unit.
        unit_id: UnitId,
    },
}

/// Location expressed in signed screen-space pixels.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct PixelPoint {
    x: i32,
    y: i32,
}

impl PixelPoint {
    /// Creates a new pixel point from signed coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in pixels.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate in pixels.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the squared Euclidean distance to another point.
    ///
    /// Widened to `i64` so the square never overflows for screen-scale
    /// coordinates; range gating compares squared distances to avoid a square
    /// root in the hot path.
    #[must_use]
    pub const fn distance_squared(self, other: PixelPoint) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx * dx + dy * dy
    }
}

/// Sub-pixel movement remainder carried between steps on each axis.
///
/// Folding whole pixels out of the remainder keeps a unit's long-run average
/// speed exact despite integer-pixel rendering, independent of frame-time
/// variance.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SubPixel {
    x: f32,
    y: f32,
}

impl SubPixel {
    /// Remainder of zero on both axes.
    pub const ZERO: SubPixel = SubPixel { x: 0.0, y: 0.0 };

    /// Creates a remainder from per-axis fractions.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal remainder in fractional pixels.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical remainder in fractional pixels.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Remaining hit points of a unit.
///
/// Signed so a hit may drive the value below zero; depletion is any value at
/// or below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(i32);

impl Health {
    /// Creates a health value from the provided hit points.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the raw hit-point count.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Returns the health remaining after absorbing the provided damage.
    #[must_use]
    pub const fn absorb(self, damage: i32) -> Self {
        Self(self.0 - damage)
    }

    /// Reports whether the unit holding this health is dead.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 <= 0
    }
}

/// Traversal speed expressed in pixels per millisecond.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct UnitSpeed(f32);

impl UnitSpeed {
    /// Creates a speed from raw pixels per millisecond.
    #[must_use]
    pub const fn new(pixels_per_ms: f32) -> Self {
        Self(pixels_per_ms)
    }

    /// Derives the speed that covers `distance_px` in the provided duration.
    ///
    /// This is how designers express speed: "crossing the board takes two
    /// seconds" rather than a raw pixel rate. A zero duration yields a zero
    /// speed so callers never observe infinities.
    #[must_use]
    pub fn from_crossing(distance_px: f32, crossing: Duration) -> Self {
        let millis = crossing.as_secs_f32() * 1_000.0;
        if millis <= 0.0 {
            return Self(0.0);
        }
        Self(distance_px / millis)
    }

    /// Pixels covered per millisecond of simulated time.
    #[must_use]
    pub const fn pixels_per_ms(&self) -> f32 {
        self.0
    }
}

/// Errors raised when constructing a waypoint path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path contained no waypoints; traversal requires at least one.
    #[error("waypoint path requires at least one point")]
    Empty,
}

/// Ordered, immutable sequence of waypoints shared by all units.
///
/// One path instance serves many readers: units hold a shared handle
/// (`Arc<WaypointPath>`) and never copy the sequence. The path exposes no
/// mutation API after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaypointPath {
    points: Vec<PixelPoint>,
}

impl WaypointPath {
    /// Builds a path from ordered waypoints, rejecting an empty sequence.
    pub fn new(points: Vec<PixelPoint>) -> Result<Self, PathError> {
        if points.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self { points })
    }

    /// Number of waypoints composing the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the path is empty; always false by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the waypoint at the provided index, if it exists.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<PixelPoint> {
        self.points.get(index).copied()
    }

    /// First waypoint of the path, where units spawn.
    #[must_use]
    pub fn first(&self) -> PixelPoint {
        self.points[0]
    }

    /// All waypoints in traversal order.
    #[must_use]
    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }
}

/// Ephemeral record of a shot that connected during the current step.
///
/// Consumed by the render step in the same frame and discarded afterwards;
/// never persisted across steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShotVisual {
    from: PixelPoint,
    to: PixelPoint,
}

impl ShotVisual {
    /// Creates a shot visual spanning the tower and the hit unit.
    #[must_use]
    pub const fn new(from: PixelPoint, to: PixelPoint) -> Self {
        Self { from, to }
    }

    /// Muzzle end of the shot line.
    #[must_use]
    pub const fn from(&self) -> PixelPoint {
        self.from
    }

    /// Impact end of the shot line.
    #[must_use]
    pub const fn to(&self) -> PixelPoint {
        self.to
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Integer pixel position currently occupied.
    pub position: PixelPoint,
    /// Sub-pixel remainder carried toward the next step.
    pub residual: SubPixel,
    /// Traversal speed fixed at spawn.
    pub speed: UnitSpeed,
    /// Index of the waypoint approached next.
    pub next_waypoint: usize,
    /// Remaining health.
    pub health: Health,
}

/// Read-only snapshot describing all live units on the board.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Fixed position of the tower.
    pub position: PixelPoint,
    /// Square of the maximum engagement distance in pixels.
    pub range_squared: i64,
    /// Shots accumulated and not yet expended.
    pub shots_available: u32,
    /// Damage applied per successful hit.
    pub damage: i32,
}

/// Read-only snapshot describing all towers on the board.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Candidate pairing produced by targeting: one unit offered to one tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower the unit is offered to.
    pub tower: TowerId,
    /// Unit within the tower's engagement radius.
    pub unit: UnitId,
    /// Tower position captured when the offer was computed.
    pub tower_position: PixelPoint,
    /// Unit position captured when the offer was computed.
    pub unit_position: PixelPoint,
}

#[cfg(test)]
mod tests {
    use super::{Health, PathError, PixelPoint, TowerId, UnitId, UnitSpeed, WaypointPath};
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    #[test]
    fn distance_squared_matches_expectation() {
        let origin = PixelPoint::new(0, 0);
        let point = PixelPoint::new(3, -4);
        assert_eq!(origin.distance_squared(point), 25);
        assert_eq!(point.distance_squared(origin), 25);
    }

    #[test]
    fn empty_path_is_rejected() {
        assert_eq!(WaypointPath::new(Vec::new()), Err(PathError::Empty));
    }

    #[test]
    fn single_point_path_is_accepted() {
        let path = WaypointPath::new(vec![PixelPoint::new(5, 7)]).expect("single waypoint");
        assert_eq!(path.len(), 1);
        assert_eq!(path.first(), PixelPoint::new(5, 7));
        assert_eq!(path.point(1), None);
    }

    #[test]
    fn health_depletes_at_zero_and_below() {
        let health = Health::new(2);
        assert!(!health.is_depleted());
        assert!(!health.absorb(1).is_depleted());
        assert!(health.absorb(2).is_depleted());
        assert!(health.absorb(3).is_depleted());
    }

    #[test]
    fn speed_derives_from_crossing_duration() {
        let speed = UnitSpeed::from_crossing(1_280.0, Duration::from_millis(2_000));
        assert!((speed.pixels_per_ms() - 0.64).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_crossing_duration_yields_zero_speed() {
        let speed = UnitSpeed::from_crossing(1_280.0, Duration::ZERO);
        assert_eq!(speed.pixels_per_ms(), 0.0);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn unit_id_round_trips_through_bincode() {
        assert_round_trip(&UnitId::new(7));
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn pixel_point_round_trips_through_bincode() {
        assert_round_trip(&PixelPoint::new(-12, 993));
    }

    #[test]
    fn health_round_trips_through_bincode() {
        assert_round_trip(&Health::new(5));
    }
}
