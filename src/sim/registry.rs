//! Bounded entity collection
//!
//! Live entities exist here and nowhere else. The registry advances and
//! prunes them each tick; collision resolution removes them through
//! [`EntityRegistry::retain`].

use std::collections::VecDeque;

use super::state::Entity;
use crate::consts::{DESPAWN_DISTANCE, MAX_ENTITIES};

/// Ordered collection of live track entities with a hard size bound
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: VecDeque<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entities: VecDeque::with_capacity(MAX_ENTITIES),
        }
    }

    /// Insert a freshly spawned entity. At capacity the oldest entity is
    /// evicted - FIFO, not nearest or farthest.
    pub fn insert(&mut self, entity: Entity) {
        if self.entities.len() >= MAX_ENTITIES {
            self.entities.pop_front();
        }
        self.entities.push_back(entity);
    }

    /// Move every entity toward (and past) the player, then drop the ones
    /// beyond the despawn line. `delta` is never negative: entities only
    /// approach, never retreat.
    pub fn advance(&mut self, delta: f32) {
        for entity in &mut self.entities {
            entity.z += delta;
        }
        self.entities.retain(|e| e.z < DESPAWN_DISTANCE);
    }

    /// Keep only entities the predicate approves. Used by collision
    /// resolution to consume coins and the struck obstacle.
    pub fn retain(&mut self, f: impl FnMut(&Entity) -> bool) {
        self.entities.retain(f);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}
