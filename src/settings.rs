//! Physics and timing tuning
//!
//! Defaults reproduce the shipped game feel. Hosts may override any subset
//! from a JSON file; missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::ms_to_ticks;

/// Errors raised while loading tuning overrides
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation parameters (distances in pixels, speeds in pixels per tick)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player physics ===
    pub gravity: f32,
    pub terminal_velocity: f32,
    /// Horizontal velocity multiplier per tick with no movement input
    pub friction: f32,
    pub double_jump_factor: f32,
    pub dash_speed: f32,
    pub dash_cooldown_ms: f32,
    /// Fall speed cap while gliding
    pub glide_fall_speed: f32,
    pub climb_speed: f32,

    // === Damage ===
    pub invulnerability_ms: f32,

    // === World ===
    pub player_width: f32,
    pub player_height: f32,
    pub viewport_width: f32,
    pub fall_margin: f32,

    // === Frame pacing ===
    pub tick_ms: f32,
    /// Frames longer than this are dropped, not simulated
    pub max_frame_delta_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            terminal_velocity: TERMINAL_VELOCITY,
            friction: FRICTION,
            double_jump_factor: DOUBLE_JUMP_FACTOR,
            dash_speed: DASH_SPEED,
            dash_cooldown_ms: DASH_COOLDOWN_MS,
            glide_fall_speed: GLIDE_FALL_SPEED,
            climb_speed: CLIMB_SPEED,

            invulnerability_ms: INVULNERABILITY_MS,

            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            viewport_width: VIEWPORT_WIDTH,
            fall_margin: FALL_MARGIN,

            tick_ms: TICK_MS,
            max_frame_delta_ms: MAX_FRAME_DELTA_MS,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning overrides from a JSON file (native hosts only)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Player hitbox size
    pub fn player_size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.player_width, self.player_height)
    }

    /// Invulnerability window in ticks
    pub fn invulnerability_ticks(&self) -> u64 {
        ms_to_ticks(self.invulnerability_ms, self.tick_ms)
    }

    /// Dash cooldown in ticks
    pub fn dash_cooldown_ticks(&self) -> u64 {
        ms_to_ticks(self.dash_cooldown_ms, self.tick_ms)
    }
}
