//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed-delay ticks driven from outside via `GameState::advance`
//! - Injected randomness only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod collision;
pub mod entity;
pub mod random;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use collision::{reflect_walls, steer};
pub use entity::{Body, Entity, EntityId, EntityKind, Registry};
pub use random::{RandomSource, ScriptedRandom};
pub use state::{
    Ball, Brick, BrickHit, Color, Effect, GameEvent, GamePhase, GameState, Key, Next, Paddle,
    PowerUp, Report, SPARK_PALETTE, Shape, Spark,
};
pub use tick::{brick_layout, generate_bricks};
