#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic engagement offers from snapshots.
//!
//! Every live unit inside a tower's engagement radius is offered to that
//! tower exactly once per step, in stable unit-id order. Which offers turn
//! into shots is decided downstream: the combat system filters on
//! ammunition and the world consumes it authoritatively.

use path_defence_core::{TowerTarget, TowerView, UnitView};

/// Tower targeting system that produces in-range engagement offers.
#[derive(Debug, Default)]
pub struct TowerTargeting;

impl TowerTargeting {
    /// Creates a new tower targeting system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Computes engagement offers for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// offers. Distances strictly greater than the squared range are
    /// rejected; equality is within range.
    pub fn handle(&mut self, towers: &TowerView, units: &UnitView, out: &mut Vec<TowerTarget>) {
        out.clear();

        for tower in towers.iter() {
            for unit in units.iter() {
                if unit.health.is_depleted() {
                    continue;
                }
                if tower.position.distance_squared(unit.position) > tower.range_squared {
                    continue;
                }
                out.push(TowerTarget {
                    tower: tower.id,
                    unit: unit.id,
                    tower_position: tower.position,
                    unit_position: unit.position,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TowerTargeting;
    use path_defence_core::{
        Health, PixelPoint, SubPixel, TowerId, TowerSnapshot, TowerView, UnitId, UnitSnapshot,
        UnitSpeed, UnitView,
    };

    fn tower_snapshot(id: u32, position: PixelPoint, range_px: i64) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            position,
            range_squared: range_px * range_px,
            shots_available: 1,
            damage: 1,
        }
    }

    fn unit_snapshot(id: u32, position: PixelPoint) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            position,
            residual: SubPixel::ZERO,
            speed: UnitSpeed::new(0.5),
            next_waypoint: 1,
            health: Health::new(5),
        }
    }

    #[test]
    fn offers_every_unit_in_range_in_id_order() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(0, PixelPoint::new(0, 0), 10)]);
        let units = UnitView::from_snapshots(vec![
            unit_snapshot(9, PixelPoint::new(3, 0)),
            unit_snapshot(2, PixelPoint::new(0, 5)),
            unit_snapshot(5, PixelPoint::new(200, 0)),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &units, &mut out);

        let offered: Vec<u32> = out.iter().map(|target| target.unit.get()).collect();
        assert_eq!(offered, vec![2, 9], "in-range units offered in id order");
    }

    #[test]
    fn squared_range_boundary_is_inclusive() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(0, PixelPoint::new(0, 0), 5)]);
        let units = UnitView::from_snapshots(vec![
            unit_snapshot(1, PixelPoint::new(3, 4)),
            unit_snapshot(2, PixelPoint::new(5, 1)),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &units, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].unit, UnitId::new(1), "25 hits, 26 misses");
    }

    #[test]
    fn depleted_units_are_not_offered() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(0, PixelPoint::new(0, 0), 10)]);
        let mut snapshot = unit_snapshot(1, PixelPoint::new(1, 1));
        snapshot.health = Health::new(0);
        let units = UnitView::from_snapshots(vec![snapshot]);

        let mut out = Vec::new();
        system.handle(&towers, &units, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_collections_clear_previous_offers() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(0, PixelPoint::new(0, 0), 10)]);
        let units = UnitView::from_snapshots(vec![unit_snapshot(1, PixelPoint::new(1, 1))]);

        let mut out = Vec::new();
        system.handle(&towers, &units, &mut out);
        assert_eq!(out.len(), 1);

        system.handle(&TowerView::default(), &units, &mut out);
        assert!(out.is_empty());

        system.handle(&towers, &UnitView::default(), &mut out);
        assert!(out.is_empty());
    }
}
