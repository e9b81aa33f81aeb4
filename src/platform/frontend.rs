//! Rendering, input binding and HUD collaborator
//!
//! The simulation never calls a frontend directly. It records
//! [`GameEvent`]s, and [`present`] replays a drained batch onto any
//! [`Frontend`] implementation in order.

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::{Aabb, Color, EntityId, GameEvent, Key, Shape, Spark};

/// Drawing/input/HUD surface driven by the simulation
pub trait Frontend {
    fn create_shape(&mut self, id: EntityId, shape: Shape, bounds: Aabb, fill: Color);
    fn move_shape(&mut self, id: EntityId, delta: Vec2);
    /// Replace a shape's geometry outright
    fn set_shape_bounds(&mut self, id: EntityId, bounds: Aabb);
    fn set_shape_style(&mut self, id: EntityId, fill: Color);
    fn delete_shape(&mut self, id: EntityId);

    fn bind_key(&mut self, key: Key);
    fn unbind_key(&mut self, key: Key);

    fn update_hud(&mut self, lives: &str, score: &str);
    fn show_message(&mut self, text: &str);
    fn clear_message(&mut self);

    /// Visual-only hook; the simulation never depends on the outcome
    fn trigger_explosion(&mut self, position: Vec2, sparks: &[Spark]);
}

/// Replay events onto a frontend
pub fn present<F>(events: impl IntoIterator<Item = GameEvent>, frontend: &mut F)
where
    F: Frontend + ?Sized,
{
    for event in events {
        match event {
            GameEvent::ShapeCreated {
                id,
                shape,
                bounds,
                fill,
            } => frontend.create_shape(id, shape, bounds, fill),
            GameEvent::ShapeMoved { id, delta } => frontend.move_shape(id, delta),
            GameEvent::ShapeResized { id, bounds } => frontend.set_shape_bounds(id, bounds),
            GameEvent::ShapeRestyled { id, fill } => frontend.set_shape_style(id, fill),
            GameEvent::ShapeDeleted { id } => frontend.delete_shape(id),
            GameEvent::KeyBound(key) => frontend.bind_key(key),
            GameEvent::KeyUnbound(key) => frontend.unbind_key(key),
            GameEvent::HudChanged { lives, score } => frontend.update_hud(&lives, &score),
            GameEvent::MessageShown(text) => frontend.show_message(&text),
            GameEvent::MessageCleared => frontend.clear_message(),
            GameEvent::Explosion { position, sparks } => {
                frontend.trigger_explosion(position, &sparks)
            }
        }
    }
}

/// Headless frontend that logs every call and remembers what's on screen
#[derive(Debug, Default)]
pub struct LogFrontend {
    shapes: HashSet<EntityId>,
    bound: HashSet<Key>,
    hud: (String, String),
    message: Option<String>,
    explosions: usize,
}

impl LogFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bound(&self, key: Key) -> bool {
        self.bound.contains(&key)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn hud(&self) -> (&str, &str) {
        (&self.hud.0, &self.hud.1)
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn explosions(&self) -> usize {
        self.explosions
    }
}

impl Frontend for LogFrontend {
    fn create_shape(&mut self, id: EntityId, shape: Shape, bounds: Aabb, fill: Color) {
        log::debug!("create {id} {shape:?} {fill} at {:?}", bounds.center());
        self.shapes.insert(id);
    }

    fn move_shape(&mut self, id: EntityId, delta: Vec2) {
        log::trace!("move {id} by {delta:?}");
    }

    fn set_shape_bounds(&mut self, id: EntityId, bounds: Aabb) {
        log::debug!("reshape {id} to {:?}..{:?}", bounds.min, bounds.max);
    }

    fn set_shape_style(&mut self, id: EntityId, fill: Color) {
        log::debug!("restyle {id} {fill}");
    }

    fn delete_shape(&mut self, id: EntityId) {
        log::debug!("delete {id}");
        self.shapes.remove(&id);
    }

    fn bind_key(&mut self, key: Key) {
        self.bound.insert(key);
    }

    fn unbind_key(&mut self, key: Key) {
        self.bound.remove(&key);
    }

    fn update_hud(&mut self, lives: &str, score: &str) {
        log::info!("{lives} | {score}");
        self.hud = (lives.to_string(), score.to_string());
    }

    fn show_message(&mut self, text: &str) {
        log::info!("{}", text.replace('\n', " - "));
        self.message = Some(text.to_string());
    }

    fn clear_message(&mut self) {
        self.message = None;
    }

    fn trigger_explosion(&mut self, position: Vec2, sparks: &[Spark]) {
        log::debug!("explosion at {position:?} ({} sparks)", sparks.len());
        self.explosions += 1;
    }
}
