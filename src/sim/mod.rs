//! Runner simulation module
//!
//! All gameplay logic lives here. This module must stay free of platform and
//! rendering dependencies:
//! - Delta-time scaled updates only
//! - Seeded RNG only
//! - Entities owned exclusively by the registry

pub mod collision;
pub mod registry;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Outcome, classify, resolve};
pub use registry::EntityRegistry;
pub use snapshot::{EntityView, PlayerView, RenderFrame};
pub use spawn::SpawnScheduler;
pub use state::{
    Entity, EntityKind, GameState, Lane, LaneShift, ObstacleHeight, PlayerState, RunPhase,
    RunStats, Stance,
};
pub use tick::tick;
