#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that integrates waypoint traversal.
//!
//! The system consumes `TimeAdvanced` events and unit snapshots, computes
//! each unit's motion for the elapsed step, and proposes `MoveUnit` commands
//! for the world to validate and apply. It holds no mutable simulation state
//! of its own.

use std::time::Duration;

use path_defence_core::{
    Command, Event, PixelPoint, SubPixel, UnitSnapshot, UnitView, WaypointPath,
};

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes world events and immutable views to emit movement commands.
    ///
    /// Only `TimeAdvanced` events drive motion; a step without elapsed time
    /// produces no commands and therefore no state change.
    pub fn handle(
        &mut self,
        events: &[Event],
        units: &UnitView,
        path: &WaypointPath,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = elapsed.saturating_add(*dt);
            }
        }
        if elapsed.is_zero() {
            return;
        }

        for unit in units.iter() {
            if unit.health.is_depleted() {
                continue;
            }
            if let Some(step) = advance_along_path(unit, path, elapsed) {
                out.push(Command::MoveUnit {
                    unit_id: unit.id,
                    position: step.position,
                    residual: step.residual,
                    next_waypoint: step.next_waypoint,
                });
            }
        }
    }
}

/// Result of integrating one unit's motion for a single step.
#[derive(Clone, Copy, Debug, PartialEq)]
struct TraversalStep {
    position: PixelPoint,
    residual: SubPixel,
    next_waypoint: usize,
}

/// Integrates a unit's motion toward its current target waypoint.
///
/// The current target is always `path[next_waypoint - 1]`. When the remaining
/// distance exceeds what the unit can cover this step, the unit takes a
/// partial step along the direction vector; fractional pixels accumulate in
/// the residual and whole pixels fold out of it. When the unit reaches or
/// passes the target, it snaps onto the waypoint and, if a further waypoint
/// exists, retargets it. A unit parked on the final waypoint yields `None`.
fn advance_along_path(
    unit: &UnitSnapshot,
    path: &WaypointPath,
    elapsed: Duration,
) -> Option<TraversalStep> {
    let target_index = unit.next_waypoint.checked_sub(1)?;
    let target = path.point(target_index)?;

    let coverable = unit.speed.pixels_per_ms() * elapsed_millis(elapsed);
    if coverable <= 0.0 {
        return None;
    }

    let dx = (target.x() - unit.position.x()) as f32;
    let dy = (target.y() - unit.position.y()) as f32;
    let remaining = (dx * dx + dy * dy).sqrt();

    if remaining > coverable {
        let scale = coverable / remaining;
        let travelled_x = dx * scale + unit.residual.x();
        let travelled_y = dy * scale + unit.residual.y();
        let whole_x = travelled_x.trunc();
        let whole_y = travelled_y.trunc();

        return Some(TraversalStep {
            position: PixelPoint::new(
                unit.position.x() + whole_x as i32,
                unit.position.y() + whole_y as i32,
            ),
            residual: SubPixel::new(travelled_x - whole_x, travelled_y - whole_y),
            next_waypoint: unit.next_waypoint,
        });
    }

    // The target is reached (or passed) this step.
    if unit.next_waypoint < path.len() {
        return Some(TraversalStep {
            position: target,
            residual: SubPixel::ZERO,
            next_waypoint: unit.next_waypoint + 1,
        });
    }
    if remaining > 0.0 {
        // Final waypoint: arrive, keep the last target.
        return Some(TraversalStep {
            position: target,
            residual: SubPixel::ZERO,
            next_waypoint: unit.next_waypoint,
        });
    }
    None
}

fn elapsed_millis(elapsed: Duration) -> f32 {
    elapsed.as_secs_f32() * 1_000.0
}
