//! Game settings
//!
//! Tunable numbers for a run. Every field has a default, so a JSON file
//! only needs the keys it wants to override.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,

    // === Rules ===
    /// Lives at the start of a run
    pub lives: i32,
    /// Per-tick ball displacement along each axis
    pub ball_speed: f32,
    /// Paddle travel per Left/Right press
    pub paddle_step: f32,
    /// Chance (0-1) that a destroyed brick drops a power-up
    pub power_up_chance: f32,
    /// Width the Expand power-up snaps the paddle to
    pub expanded_paddle_width: f32,

    // === Timing ===
    pub tick_interval_ms: u64,
    /// Delay between losing a life and the next serve
    pub reset_delay_ms: u64,

    /// RNG seed for power-up and explosion rolls
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,

            lives: STARTING_LIVES,
            ball_speed: BALL_SPEED,
            paddle_step: PADDLE_STEP,
            power_up_chance: POWER_UP_CHANCE,
            expanded_paddle_width: EXPANDED_PADDLE_WIDTH,

            tick_interval_ms: TICK_INTERVAL_MS,
            reset_delay_ms: RESET_DELAY_MS,

            seed: 0,
        }
    }
}

/// Reasons a settings document is rejected
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(err) => write!(f, "settings read error: {err}"),
            SettingsError::Parse(err) => write!(f, "settings parse error: {err}"),
            SettingsError::Invalid(reason) => write!(f, "invalid settings: {reason}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(err) => Some(err),
            SettingsError::Parse(err) => Some(err),
            SettingsError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        SettingsError::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Parse(err)
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        log::debug!("Reading settings from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a JSON settings document
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!("Loaded settings (seed {})", settings.seed);
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation can't run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.arena_width < PADDLE_WIDTH {
            return Err(SettingsError::Invalid(format!(
                "arena width {} is narrower than the paddle ({PADDLE_WIDTH})",
                self.arena_width
            )));
        }
        if self.arena_height <= PADDLE_Y + PADDLE_HEIGHT / 2.0 {
            return Err(SettingsError::Invalid(format!(
                "arena height {} leaves no room below the paddle",
                self.arena_height
            )));
        }
        if self.ball_speed <= 0.0 {
            return Err(SettingsError::Invalid("ball speed must be positive".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(SettingsError::Invalid(
                "tick interval must be at least 1 ms".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.power_up_chance) {
            return Err(SettingsError::Invalid(format!(
                "power-up chance {} is outside 0-1",
                self.power_up_chance
            )));
        }
        if self.expanded_paddle_width < PADDLE_WIDTH {
            return Err(SettingsError::Invalid(
                "expanded paddle can't be narrower than the paddle".into(),
            ));
        }
        Ok(())
    }
}
