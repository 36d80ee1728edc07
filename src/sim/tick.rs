//! Per-tick simulation update
//!
//! One tick advances the run by a variable real-time delta: difficulty ramp,
//! distance, stance timers, entity movement, spawns, then collision and
//! pickup resolution - in that order. The host drives this once per frame
//! while the phase is Running and stops re-arming the loop otherwise.

use super::collision;
use super::state::{GameState, RunPhase};
use crate::consts::*;

/// Advance the simulation by `dt` seconds of real time
///
/// Callers clamp `dt` (see [`MAX_FRAME_DT`]) and stop ticking outside the
/// Running phase; the guard here is a backstop, not the scheduling contract.
pub fn tick(state: &mut GameState, dt: f32) {
    if state.phase != RunPhase::Running {
        return;
    }

    // Difficulty ramp, then distance at the new speed
    state.speed = (state.speed + SPEED_INCREMENT * dt).min(MAX_SPEED);
    state.stats.distance += state.speed * dt;

    // Active jump/slide timers
    state.player.advance(dt);

    // Entities approach and pass the player at track speed
    state.entities.advance(state.speed * dt);

    // New obstacles and coins for this tick
    state.run_spawns(dt);

    // Collision ends the run; pickups resolved this tick are kept
    if collision::resolve(&mut state.entities, &state.player, &mut state.stats) {
        state.phase = RunPhase::GameOver;
        log::info!(
            "run over at {:.0}m with {} coins",
            state.stats.distance,
            state.stats.coins_this_run
        );
    }
}


#[cfg(test)]
mod prop_tests {
    use proptest::prelude::*;

    use super::*;
    use crate::input::Command;

    fn arb_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            Just(Command::MoveLeft),
            Just(Command::MoveRight),
            Just(Command::Jump),
            Just(Command::Slide),
        ]
    }

    proptest! {
        /// Arbitrary command/tick interleavings never break the core run
        /// invariants: bounded speed, bounded registry, bounded progress,
        /// non-decreasing distance.
        #[test]
        fn run_invariants_hold(
            seed in any::<u64>(),
            steps in proptest::collection::vec((arb_command(), 0.0f32..MAX_FRAME_DT), 1..200),
        ) {
            let mut state = GameState::new(seed);
            state.apply(Command::Start);
            let mut last_distance = 0.0f32;

            for (cmd, dt) in steps {
                state.apply(cmd);
                tick(&mut state, dt);
                if state.phase != RunPhase::Running {
                    break;
                }

                prop_assert!(state.speed >= BASE_SPEED && state.speed <= MAX_SPEED);
                prop_assert!(state.stats.distance >= last_distance);
                last_distance = state.stats.distance;
                prop_assert!(state.entities.len() <= MAX_ENTITIES);

                match state.player.stance {
                    crate::sim::state::Stance::Jumping { progress }
                    | crate::sim::state::Stance::Sliding { progress } => {
                        prop_assert!((0.0..1.0).contains(&progress));
                    }
                    crate::sim::state::Stance::Upright => {}
                }
            }
        }

        /// Lifetime coins never decrease, and this-run coins never exceed
        /// them, across an entire session of runs and restarts.
        #[test]
        fn coin_counters_are_consistent(
            seed in any::<u64>(),
            steps in proptest::collection::vec(0.0f32..MAX_FRAME_DT, 1..300),
        ) {
            let mut state = GameState::new(seed);
            state.apply(Command::Start);
            let mut last_lifetime = 0u32;

            for dt in steps {
                tick(&mut state, dt);
                prop_assert!(state.stats.coins_lifetime >= last_lifetime);
                prop_assert!(state.stats.coins_this_run <= state.stats.coins_lifetime);
                last_lifetime = state.stats.coins_lifetime;
                if state.phase == RunPhase::GameOver {
                    state.apply(Command::Restart);
                }
            }
        }
    }
}
