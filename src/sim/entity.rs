//! Entity registry
//!
//! Every positioned game object lives in one [`Registry`] owned by the game
//! state. Entities carry a capability-tagged [`Body`] so collision handling
//! can match on the kind instead of inspecting types at runtime.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::state::{Ball, Brick, Paddle, PowerUp};

/// Stable handle for a live entity. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind tag for an entity body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Paddle,
    Ball,
    Brick,
    PowerUp,
}

/// Per-kind entity data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Body {
    Paddle(Paddle),
    Ball(Ball),
    Brick(Brick),
    PowerUp(PowerUp),
}

impl Body {
    pub fn kind(&self) -> EntityKind {
        match self {
            Body::Paddle(_) => EntityKind::Paddle,
            Body::Ball(_) => EntityKind::Ball,
            Body::Brick(_) => EntityKind::Brick,
            Body::PowerUp(_) => EntityKind::PowerUp,
        }
    }
}

/// A live entity: identity, geometry and body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub bounds: Aabb,
    pub body: Body,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.bounds = self.bounds.translated(delta);
    }
}

/// Live entity set keyed by id (iteration is in id order)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u32,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Register a new entity and return its handle
    pub fn insert(&mut self, bounds: Aabb, body: Body) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Entity { id, bounds, body });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn bounds(&self, id: EntityId) -> Option<Aabb> {
        self.entities.get(&id).map(|e| e.bounds)
    }

    /// Move an entity; returns false if the id is not live
    pub fn translate(&mut self, id: EntityId, delta: Vec2) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.translate(delta);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Ids of every live entity whose box overlaps `region`, ascending
    pub fn query_overlap(&self, region: &Aabb) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.bounds.overlaps(region))
            .map(|e| e.id)
            .collect()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.values().filter(|e| e.kind() == kind).count()
    }

    pub fn ids_of(&self, kind: EntityKind) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.kind() == kind)
            .map(|e| e.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
