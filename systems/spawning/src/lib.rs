#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system implementing the population policy.
//!
//! Population replenishment is an explicit, separately configured mechanism
//! rather than a side effect of unit death: interval spawning accumulates
//! simulated time, and the replenish policy reacts to `UnitDespawned` events
//! with one fresh spawn per removal.

use std::time::Duration;

use path_defence_core::{Command, Event};

/// Policy applied when a depleted unit leaves the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RespawnPolicy {
    /// Deaths shrink the population.
    #[default]
    Disabled,
    /// Every removal is answered with a fresh copy of the spawn template.
    Replenish,
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    spawn_interval: Option<Duration>,
    respawn: RespawnPolicy,
}

impl Config {
    /// Creates a new configuration from a spawn cadence and respawn policy.
    #[must_use]
    pub const fn new(spawn_interval: Option<Duration>, respawn: RespawnPolicy) -> Self {
        Self {
            spawn_interval,
            respawn,
        }
    }
}

/// Pure system that deterministically emits spawn commands.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Option<Duration>,
    accumulator: Duration,
    respawn: RespawnPolicy,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            respawn: config.respawn,
        }
    }

    /// Consumes world events to emit spawn commands per the configured policy.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        let mut despawned = 0usize;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    accumulated = accumulated.saturating_add(*dt);
                }
                Event::UnitDespawned { .. } => despawned += 1,
                _ => {}
            }
        }

        if let Some(interval) = self.spawn_interval {
            if !interval.is_zero() && !accumulated.is_zero() {
                self.accumulator = self.accumulator.saturating_add(accumulated);
                while self.accumulator >= interval {
                    self.accumulator -= interval;
                    out.push(Command::SpawnUnit);
                }
            }
        }

        if self.respawn == RespawnPolicy::Replenish {
            for _ in 0..despawned {
                out.push(Command::SpawnUnit);
            }
        }
    }
}
