//! Brick Breaker - a single-screen brick breaking arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, game state machine)
//! - `platform`: Frontend collaborator boundary and the fixed-delay scheduler
//! - `settings`: Data-driven game configuration

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Fixed delay between simulation ticks (ms)
    pub const TICK_INTERVAL_MS: u64 = 50;
    /// Delay between losing a life and the next serve (ms)
    pub const RESET_DELAY_MS: u64 = 1000;

    /// Arena dimensions (origin top-left, y grows downward)
    pub const ARENA_WIDTH: f32 = 610.0;
    pub const ARENA_HEIGHT: f32 = 400.0;

    pub const STARTING_LIVES: i32 = 3;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    pub const BALL_SPEED: f32 = 5.0;
    /// Vertical centre of a freshly served ball
    pub const BALL_SERVE_Y: f32 = 310.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 80.0;
    pub const PADDLE_HEIGHT: f32 = 10.0;
    pub const PADDLE_Y: f32 = 326.0;
    /// Horizontal distance covered by one Left/Right input
    pub const PADDLE_STEP: f32 = 10.0;
    /// Fixed width the paddle snaps to under the Expand power-up
    pub const EXPANDED_PADDLE_WIDTH: f32 = 160.0;

    /// Brick grid
    pub const BRICK_WIDTH: f32 = 75.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_MARGIN: f32 = 5.0;
    /// (row centre y, starting hits), top to bottom
    pub const BRICK_ROWS: [(f32, u8); 3] = [(50.0, 3), (70.0, 2), (90.0, 1)];

    /// Power-ups
    pub const POWER_UP_SIZE: f32 = 20.0;
    /// Chance a destroyed brick drops a power-up
    pub const POWER_UP_CHANCE: f32 = 0.1;
    /// Offset from the activating ball's top-left corner to the extra ball's centre
    pub const EXTRA_BALL_OFFSET: f32 = 20.0;

    /// Sparks carried by one explosion trigger
    pub const SPARK_COUNT: usize = 10;
    pub const SPARK_MIN_DISTANCE: f32 = 10.0;
    pub const SPARK_MAX_DISTANCE: f32 = 30.0;
}
