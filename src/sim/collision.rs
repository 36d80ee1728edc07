//! Collision and pickup evaluation
//!
//! Every live entity is classified against the player once per tick: in the
//! player's lane and inside the proximity window, an obstacle either ends
//! the run or is cleared by the matching move, and a coin is picked up.
//! Everything else passes through untouched.

use super::registry::EntityRegistry;
use super::state::{Entity, EntityKind, ObstacleHeight, PlayerState, RunStats, Stance};
use crate::consts::COLLISION_THRESHOLD;

/// How one entity relates to the player this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No interaction; the entity stays live
    Clear,
    /// Coin within reach; consumed and counted
    Pickup,
    /// Obstacle hit; the run ends
    Collision,
}

/// Early-move leniency: the first 20% of a jump or slide does not clear the
/// matching obstacle yet.
const AVOID_MIN_PROGRESS: f32 = 0.2;

/// Classify a single entity against the current player state
pub fn classify(entity: &Entity, player: &PlayerState) -> Outcome {
    if entity.lane != player.lane {
        return Outcome::Clear;
    }

    match entity.kind {
        EntityKind::Coin => {
            if entity.z.abs() < COLLISION_THRESHOLD {
                Outcome::Pickup
            } else {
                Outcome::Clear
            }
        }
        EntityKind::Obstacle { height } => {
            if entity.z.abs() > COLLISION_THRESHOLD {
                Outcome::Clear
            } else if avoided(height, player.stance) {
                Outcome::Clear
            } else {
                Outcome::Collision
            }
        }
    }
}

fn avoided(height: ObstacleHeight, stance: Stance) -> bool {
    match (height, stance) {
        (ObstacleHeight::Low, Stance::Jumping { progress }) => progress > AVOID_MIN_PROGRESS,
        (ObstacleHeight::High, Stance::Sliding { progress }) => progress > AVOID_MIN_PROGRESS,
        _ => false,
    }
}

/// Resolve every live entity for this tick
///
/// Picked-up coins and the struck obstacle are removed from the registry.
/// Coin counters include pickups from a tick that also ends the run -
/// collision wins the state transition but does not roll pickups back.
/// Returns true when a collision ended the run.
pub fn resolve(registry: &mut EntityRegistry, player: &PlayerState, stats: &mut RunStats) -> bool {
    let mut collided = false;
    let mut coins = 0u32;

    registry.retain(|entity| match classify(entity, player) {
        Outcome::Clear => true,
        Outcome::Pickup => {
            coins += 1;
            false
        }
        Outcome::Collision => {
            collided = true;
            false
        }
    });

    if coins > 0 {
        stats.record_coins(coins);
    }
    collided
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Lane;

    fn obstacle(height: ObstacleHeight, lane: Lane, z: f32) -> Entity {
        Entity {
            id: 0,
            kind: EntityKind::Obstacle { height },
            lane,
            z,
        }
    }

    fn coin(lane: Lane, z: f32) -> Entity {
        Entity {
            id: 1,
            kind: EntityKind::Coin,
            lane,
            z,
        }
    }

    fn player(lane: Lane, stance: Stance) -> PlayerState {
        PlayerState { lane, stance }
    }

    #[test]
    fn test_low_obstacle_cleared_by_committed_jump() {
        let entity = obstacle(ObstacleHeight::Low, Lane::Center, 0.5);
        let jumping = player(Lane::Center, Stance::Jumping { progress: 0.3 });
        assert_eq!(classify(&entity, &jumping), Outcome::Clear);

        // Too early in the jump - leniency window not yet reached
        let early = player(Lane::Center, Stance::Jumping { progress: 0.1 });
        assert_eq!(classify(&entity, &early), Outcome::Collision);
    }

    #[test]
    fn test_high_obstacle_cleared_only_by_slide() {
        let entity = obstacle(ObstacleHeight::High, Lane::Center, 0.5);

        let upright = player(Lane::Center, Stance::Upright);
        assert_eq!(classify(&entity, &upright), Outcome::Collision);

        // Jumping does not clear a high obstacle
        let jumping = player(Lane::Center, Stance::Jumping { progress: 0.5 });
        assert_eq!(classify(&entity, &jumping), Outcome::Collision);

        let sliding = player(Lane::Center, Stance::Sliding { progress: 0.5 });
        assert_eq!(classify(&entity, &sliding), Outcome::Clear);
    }

    #[test]
    fn test_other_lane_or_out_of_range_is_clear() {
        let upright = player(Lane::Center, Stance::Upright);

        let beside = obstacle(ObstacleHeight::Low, Lane::Left, 0.0);
        assert_eq!(classify(&beside, &upright), Outcome::Clear);

        let ahead = obstacle(ObstacleHeight::Low, Lane::Center, -4.0);
        assert_eq!(classify(&ahead, &upright), Outcome::Clear);

        let far_coin = coin(Lane::Center, -4.0);
        assert_eq!(classify(&far_coin, &upright), Outcome::Clear);
    }

    #[test]
    fn test_coin_pickup_counts_once_and_is_removed() {
        let mut registry = EntityRegistry::new();
        registry.insert(coin(Lane::Center, 0.2));
        registry.insert(coin(Lane::Left, 0.2));
        let mut stats = RunStats::default();

        let collided = resolve(
            &mut registry,
            &player(Lane::Center, Stance::Upright),
            &mut stats,
        );

        assert!(!collided);
        assert_eq!(stats.coins_this_run, 1);
        assert_eq!(stats.coins_lifetime, 1);
        // The off-lane coin stays live
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_pickups_survive_a_same_tick_collision() {
        let mut registry = EntityRegistry::new();
        registry.insert(coin(Lane::Center, -0.5));
        registry.insert(obstacle(ObstacleHeight::High, Lane::Center, 0.5));
        registry.insert(coin(Lane::Center, 1.0));
        let mut stats = RunStats::default();

        let collided = resolve(
            &mut registry,
            &player(Lane::Center, Stance::Upright),
            &mut stats,
        );

        assert!(collided);
        assert_eq!(stats.coins_this_run, 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_multiple_simultaneous_pickups_all_count() {
        let mut registry = EntityRegistry::new();
        for z in [-1.0, 0.0, 1.0] {
            registry.insert(coin(Lane::Right, z));
        }
        let mut stats = RunStats::default();

        resolve(
            &mut registry,
            &player(Lane::Right, Stance::Upright),
            &mut stats,
        );
        assert_eq!(stats.coins_this_run, 3);
        assert!(registry.is_empty());
    }
}
