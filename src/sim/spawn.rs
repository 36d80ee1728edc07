//! Spawn scheduling
//!
//! Obstacles arrive on a distance-ramped interval - more often the farther
//! the run goes, clamped at a floor so the track never saturates. Coins keep
//! a fixed cadence. Both land at the spawn line in a uniformly random lane.

use rand::Rng;
use rand_pcg::Pcg32;

use super::registry::EntityRegistry;
use super::state::{Entity, EntityKind, Lane, ObstacleHeight};
use crate::consts::*;

/// Per-kind elapsed-time accumulators, carried across ticks and reset on
/// restart
#[derive(Debug, Clone, Default)]
pub struct SpawnScheduler {
    since_obstacle: f32,
    since_coin: f32,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Seconds between obstacle spawns at the given distance traveled.
    /// Shrinks linearly, clamped at the floor.
    pub fn obstacle_interval(distance: f32) -> f32 {
        (OBSTACLE_SPAWN_INTERVAL - distance / 1000.0).max(MIN_OBSTACLE_INTERVAL)
    }

    /// Run both spawn checks for one tick. Each triggered spawn inserts one
    /// entity into the registry.
    pub fn update(
        &mut self,
        dt: f32,
        distance: f32,
        rng: &mut Pcg32,
        registry: &mut EntityRegistry,
        next_id: &mut u32,
    ) {
        self.since_obstacle += dt;
        self.since_coin += dt;

        if self.since_obstacle >= Self::obstacle_interval(distance) {
            self.since_obstacle = 0.0;
            let height = if rng.random_bool(0.5) {
                ObstacleHeight::Low
            } else {
                ObstacleHeight::High
            };
            registry.insert(Entity {
                id: alloc_id(next_id),
                kind: EntityKind::Obstacle { height },
                lane: random_lane(rng),
                z: SPAWN_DISTANCE,
            });
        }

        if self.since_coin >= COIN_SPAWN_INTERVAL {
            self.since_coin = 0.0;
            registry.insert(Entity {
                id: alloc_id(next_id),
                kind: EntityKind::Coin,
                lane: random_lane(rng),
                z: SPAWN_DISTANCE,
            });
        }
    }
}

fn alloc_id(next_id: &mut u32) -> u32 {
    let id = *next_id;
    *next_id += 1;
    id
}

fn random_lane(rng: &mut Pcg32) -> Lane {
    Lane::ALL[rng.random_range(0..Lane::ALL.len())]
}
