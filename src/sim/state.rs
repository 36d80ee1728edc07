//! Run state and core simulation types

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::registry::EntityRegistry;
use super::spawn::SpawnScheduler;
use crate::consts::*;
use crate::input::Command;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunPhase {
    /// Waiting for the first start command
    Ready,
    /// Active gameplay
    Running,
    /// Frozen mid-run, reversible
    Paused,
    /// Run ended by a collision, terminal until restart
    GameOver,
}

/// One of the three track lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Lane {
    Left,
    Center,
    Right,
}

/// Direction of a lane change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneShift {
    Left,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    /// Signed offset from the track centerline: -1, 0, +1
    #[inline]
    pub fn offset(self) -> i8 {
        match self {
            Lane::Left => -1,
            Lane::Center => 0,
            Lane::Right => 1,
        }
    }

    /// One step toward the requested side, clamped at the track edges
    /// (no wraparound)
    pub fn stepped(self, dir: LaneShift) -> Lane {
        match (self, dir) {
            (Lane::Right, LaneShift::Left) => Lane::Center,
            (Lane::Center, LaneShift::Left) => Lane::Left,
            (Lane::Left, LaneShift::Right) => Lane::Center,
            (Lane::Center, LaneShift::Right) => Lane::Right,
            (lane, _) => lane,
        }
    }
}

/// Obstacle profiles: low ones are jumped over, high ones are slid under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObstacleHeight {
    Low,
    High,
}

/// What a track entity is. Obstacle height only exists for obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum EntityKind {
    Obstacle { height: ObstacleHeight },
    Coin,
}

/// A track entity
///
/// Owned exclusively by the [`EntityRegistry`]; its position is mutated only
/// by the registry's advance pass and nothing retains references across
/// ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub lane: Lane,
    /// Longitudinal position: negative ahead of the player, 0 at the player,
    /// positive behind
    pub z: f32,
}

impl Entity {
    pub fn is_coin(&self) -> bool {
        matches!(self.kind, EntityKind::Coin)
    }
}

/// Transient locomotion state
///
/// Jumping and sliding are mutually exclusive by construction. Progress runs
/// 0..=1 on a fixed timer and is not influenced by input while active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "stance")]
pub enum Stance {
    Upright,
    Jumping { progress: f32 },
    Sliding { progress: f32 },
}

impl Stance {
    pub fn is_upright(self) -> bool {
        matches!(self, Stance::Upright)
    }

    pub fn jump_progress(self) -> Option<f32> {
        match self {
            Stance::Jumping { progress } => Some(progress),
            _ => None,
        }
    }

    pub fn slide_progress(self) -> Option<f32> {
        match self {
            Stance::Sliding { progress } => Some(progress),
            _ => None,
        }
    }
}

/// The player's lane position and active move
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub lane: Lane,
    pub stance: Stance,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            lane: Lane::Center,
            stance: Stance::Upright,
        }
    }
}

impl PlayerState {
    /// Move one lane toward `dir`, clamped at the track edges
    pub fn change_lane(&mut self, dir: LaneShift) {
        self.lane = self.lane.stepped(dir);
    }

    /// Begin a jump. Rejected while a jump or slide is already active.
    pub fn jump(&mut self) -> bool {
        if !self.stance.is_upright() {
            return false;
        }
        self.stance = Stance::Jumping { progress: 0.0 };
        true
    }

    /// Begin a slide. Rejected while a jump or slide is already active.
    pub fn slide(&mut self) -> bool {
        if !self.stance.is_upright() {
            return false;
        }
        self.stance = Stance::Sliding { progress: 0.0 };
        true
    }

    /// Advance the active move's timer. Reaching full progress returns the
    /// stance to upright within the same tick.
    pub fn advance(&mut self, dt: f32) {
        self.stance = match self.stance {
            Stance::Jumping { progress } => {
                let progress = progress + dt / JUMP_DURATION;
                if progress >= 1.0 {
                    Stance::Upright
                } else {
                    Stance::Jumping { progress }
                }
            }
            Stance::Sliding { progress } => {
                let progress = progress + dt / SLIDE_DURATION;
                if progress >= 1.0 {
                    Stance::Upright
                } else {
                    Stance::Sliding { progress }
                }
            }
            stance => stance,
        };
    }
}

/// Per-session scoring. `coins_lifetime` survives restarts; the rest resets
/// with each new run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Meters traveled this run, non-decreasing while running
    pub distance: f32,
    /// Coins collected across every run this session
    pub coins_lifetime: u32,
    /// Coins collected this run
    pub coins_this_run: u32,
}

impl RunStats {
    pub fn record_coins(&mut self, n: u32) {
        self.coins_lifetime += n;
        self.coins_this_run += n;
    }

    fn reset_run(&mut self) {
        self.distance = 0.0;
        self.coins_this_run = 0;
    }
}

/// Complete simulation state, owned by the run loop
///
/// Render code receives read-only copies (see [`super::snapshot`]); input
/// commands mutate state synchronously through [`GameState::apply`] and are
/// observed by the next tick.
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: RunPhase,
    pub player: PlayerState,
    pub stats: RunStats,
    /// Current forward speed, ramped from base toward the cap while running
    pub speed: f32,
    pub entities: EntityRegistry,
    pub spawner: SpawnScheduler,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a fresh session in the Ready phase
    pub fn new(seed: u64) -> Self {
        Self {
            phase: RunPhase::Ready,
            player: PlayerState::default(),
            stats: RunStats::default(),
            speed: BASE_SPEED,
            entities: EntityRegistry::new(),
            spawner: SpawnScheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 0,
        }
    }

    /// Apply a mapped input command. Commands invalid for the current phase
    /// are silent no-ops.
    pub fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::TogglePause => self.toggle_pause(),
            Command::Start => {
                if self.phase == RunPhase::Ready {
                    self.phase = RunPhase::Running;
                    log::info!("run started");
                }
            }
            Command::Restart => {
                if self.phase == RunPhase::GameOver {
                    self.restart();
                }
            }
            _ if self.phase != RunPhase::Running => {}
            Command::MoveLeft => self.player.change_lane(LaneShift::Left),
            Command::MoveRight => self.player.change_lane(LaneShift::Right),
            Command::Jump => {
                self.player.jump();
            }
            Command::Slide => {
                self.player.slide();
            }
        }
    }

    fn toggle_pause(&mut self) {
        match self.phase {
            RunPhase::Running => {
                self.phase = RunPhase::Paused;
                log::info!("paused");
            }
            RunPhase::Paused => {
                self.phase = RunPhase::Running;
                log::info!("resumed");
            }
            _ => {}
        }
    }

    /// Begin a fresh run after a collision. The lifetime coin total is the
    /// only thing that survives.
    pub fn restart(&mut self) {
        self.player = PlayerState::default();
        self.entities.clear();
        self.spawner.reset();
        self.stats.reset_run();
        self.speed = BASE_SPEED;
        self.next_id = 0;
        self.phase = RunPhase::Running;
        log::info!(
            "run restarted (lifetime coins: {})",
            self.stats.coins_lifetime
        );
    }

    /// Run the spawn scheduler for this tick; registry inserts happen inside.
    pub(crate) fn run_spawns(&mut self, dt: f32) {
        let Self {
            spawner,
            rng,
            entities,
            stats,
            next_id,
            ..
        } = self;
        spawner.update(dt, stats.distance, rng, entities, next_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_step_clamps_at_edges() {
        assert_eq!(Lane::Left.stepped(LaneShift::Left), Lane::Left);
        assert_eq!(Lane::Right.stepped(LaneShift::Right), Lane::Right);
        assert_eq!(Lane::Center.stepped(LaneShift::Left), Lane::Left);
        assert_eq!(Lane::Left.stepped(LaneShift::Right), Lane::Center);
    }

    #[test]
    fn test_jump_and_slide_are_exclusive() {
        let mut player = PlayerState::default();
        assert!(player.jump());
        assert!(!player.slide());
        assert!(!player.jump());

        let mut player = PlayerState::default();
        assert!(player.slide());
        assert!(!player.jump());
    }

    #[test]
    fn test_stance_clears_in_same_tick_at_full_progress() {
        let mut player = PlayerState::default();
        player.jump();
        // One dt covering the whole jump duration lands the player upright
        player.advance(JUMP_DURATION);
        assert!(player.stance.is_upright());
        assert_eq!(player.stance.jump_progress(), None);
    }

    #[test]
    fn test_stance_progress_stays_in_bounds() {
        let mut player = PlayerState::default();
        player.slide();
        let mut steps = 0;
        while !player.stance.is_upright() {
            if let Some(p) = player.stance.slide_progress() {
                assert!((0.0..1.0).contains(&p));
            }
            player.advance(0.05);
            steps += 1;
            assert!(steps < 100, "slide never completed");
        }
    }

    #[test]
    fn test_locomotion_commands_ignored_outside_running() {
        let mut state = GameState::new(7);
        state.apply(Command::Jump);
        state.apply(Command::MoveLeft);
        assert!(state.player.stance.is_upright());
        assert_eq!(state.player.lane, Lane::Center);

        state.apply(Command::Start);
        assert_eq!(state.phase, RunPhase::Running);
        state.apply(Command::MoveLeft);
        assert_eq!(state.player.lane, Lane::Left);
    }

    #[test]
    fn test_pause_toggles_only_running_and_paused() {
        let mut state = GameState::new(7);
        state.apply(Command::TogglePause);
        assert_eq!(state.phase, RunPhase::Ready);

        state.apply(Command::Start);
        state.apply(Command::TogglePause);
        assert_eq!(state.phase, RunPhase::Paused);
        state.apply(Command::TogglePause);
        assert_eq!(state.phase, RunPhase::Running);
    }

    #[test]
    fn test_restart_only_from_game_over() {
        let mut state = GameState::new(7);
        state.apply(Command::Start);
        state.stats.distance = 120.0;
        state.apply(Command::Restart);
        // Ignored while running
        assert!(state.stats.distance > 0.0);

        state.phase = RunPhase::GameOver;
        state.stats.record_coins(4);
        state.apply(Command::Restart);
        assert_eq!(state.phase, RunPhase::Running);
        assert_eq!(state.stats.distance, 0.0);
        assert_eq!(state.stats.coins_this_run, 0);
        assert_eq!(state.stats.coins_lifetime, 4);
        assert_eq!(state.speed, BASE_SPEED);
        assert!(state.entities.is_empty());
        assert_eq!(state.player, PlayerState::default());
    }
}
