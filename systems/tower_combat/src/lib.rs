#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns engagement offers into firing commands.

use path_defence_core::{Command, TowerId, TowerSnapshot, TowerTarget, TowerView};

/// Tower combat system that queues firing commands for armed towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireShot` entries for offers made to armed towers.
    ///
    /// The ammunition check here is advisory: the world consumes shots
    /// authoritatively, so offers exceeding the accumulated count are
    /// refused there without effect.
    pub fn handle(&mut self, towers: TowerView, targets: &[TowerTarget], out: &mut Vec<Command>) {
        if targets.is_empty() {
            return;
        }

        let snapshots = towers.into_vec();
        if snapshots.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in targets {
            if let Some(snapshot) = find_tower(&snapshots, target.tower) {
                if snapshot.shots_available > 0 {
                    self.scratch.push(Command::FireShot {
                        tower: target.tower,
                        unit: target.unit,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_tower(snapshots: &[TowerSnapshot], tower: TowerId) -> Option<&TowerSnapshot> {
    snapshots
        .binary_search_by_key(&tower, |snapshot| snapshot.id)
        .ok()
        .map(|index| &snapshots[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{PixelPoint, UnitId};

    fn snapshot(tower: u32, shots_available: u32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(tower),
            position: PixelPoint::new(0, 0),
            range_squared: 25_600,
            shots_available,
            damage: 1,
        }
    }

    fn target(tower: u32, unit: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            unit: UnitId::new(unit),
            tower_position: PixelPoint::new(0, 0),
            unit_position: PixelPoint::new(0, 0),
        }
    }

    #[test]
    fn armed_towers_fire_at_their_offers() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![snapshot(2, 1), snapshot(5, 3)]);
        let targets = vec![target(2, 4), target(5, 1)];
        let mut out = Vec::new();

        system.handle(towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireShot {
                    tower: TowerId::new(2),
                    unit: UnitId::new(4),
                },
                Command::FireShot {
                    tower: TowerId::new(5),
                    unit: UnitId::new(1),
                },
            ],
        );
    }

    #[test]
    fn unarmed_or_missing_towers_are_skipped() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![snapshot(3, 0), snapshot(8, 2)]);
        let targets = vec![target(3, 9), target(8, 2), target(42, 3)];
        let mut out = Vec::new();

        system.handle(towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![Command::FireShot {
                tower: TowerId::new(8),
                unit: UnitId::new(2),
            }],
        );
    }

    #[test]
    fn empty_offer_list_is_silent() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![snapshot(1, 5)]);
        let mut out = Vec::new();

        system.handle(towers, &[], &mut out);
        assert!(out.is_empty());
    }
}
