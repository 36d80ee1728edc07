//! Read-only render frames
//!
//! The host captures one frame per tick and hands it to the external
//! renderer (serialized to JSON in the browser). Frames are plain copies -
//! the renderer holds no references into the simulation, and the simulation
//! never waits on rendering.

use glam::Vec3;
use serde::Serialize;

use super::state::{EntityKind, GameState, RunPhase, RunStats, Stance};
use crate::consts::*;

/// World-space view of the player for one frame
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Signed lane offset: -1, 0, +1
    pub lane: i8,
    /// Lane-centered world position; y carries the jump arc
    pub position: Vec3,
    /// Height multiplier, crouched while sliding
    pub height_scale: f32,
    #[serde(flatten)]
    pub stance: Stance,
}

/// World-space view of one live entity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityView {
    pub id: u32,
    #[serde(flatten)]
    pub kind: EntityKind,
    pub lane: i8,
    pub position: Vec3,
}

/// Immutable per-tick snapshot for the external renderer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub phase: RunPhase,
    pub speed: f32,
    pub stats: RunStats,
    pub player: PlayerView,
    pub entities: Vec<EntityView>,
}

/// Height of the jump arc at a given progress fraction
#[inline]
pub fn jump_arc_height(progress: f32) -> f32 {
    JUMP_APEX * (progress * std::f32::consts::PI).sin()
}

impl RenderFrame {
    /// Capture the current tick's state
    pub fn capture(state: &GameState) -> Self {
        let stance = state.player.stance;
        let (y, height_scale) = match stance {
            Stance::Jumping { progress } => (jump_arc_height(progress), 1.0),
            Stance::Sliding { .. } => (0.0, SLIDE_CROUCH),
            Stance::Upright => (0.0, 1.0),
        };

        let lane = state.player.lane.offset();
        let player = PlayerView {
            lane,
            position: Vec3::new(lane as f32 * LANE_WIDTH, y, 0.0),
            height_scale,
            stance,
        };

        let entities = state
            .entities
            .iter()
            .map(|e| EntityView {
                id: e.id,
                kind: e.kind,
                lane: e.lane.offset(),
                position: Vec3::new(e.lane.offset() as f32 * LANE_WIDTH, 0.0, e.z),
            })
            .collect();

        Self {
            phase: state.phase,
            speed: state.speed,
            stats: state.stats,
            player,
            entities,
        }
    }
}
