//! Cat Quest - A side-scrolling platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `level`: Static level data and the level catalog
//! - `character`: Playable characters and their abilities
//! - `settings`: Data-driven physics/timing tuning
//! - `game`: State machine controller and frame pacing

pub mod character;
pub mod game;
pub mod level;
pub mod settings;
pub mod sim;

pub use character::{Ability, CharacterKind};
pub use game::{Game, RunSummary, Snapshot};
pub use level::{Level, LevelCatalog, LevelError};
pub use settings::{SettingsError, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz, matches the browser frame rate)
    pub const TICK_MS: f32 = 1000.0 / 60.0;
    /// Frames longer than this are dropped instead of simulated (tab was hidden, etc.)
    pub const MAX_FRAME_DELTA_MS: f32 = 100.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Player physics (pixels per tick)
    pub const GRAVITY: f32 = 0.6;
    pub const TERMINAL_VELOCITY: f32 = 15.0;
    pub const FRICTION: f32 = 0.85;
    /// Below this horizontal speed, friction snaps to a full stop
    pub const STOP_SPEED: f32 = 0.01;
    /// Minimum horizontal speed to count as "moving" (drives walk animation)
    pub const MOVING_SPEED: f32 = 0.5;
    /// Second jump is weaker than the first
    pub const DOUBLE_JUMP_FACTOR: f32 = 0.85;
    pub const DASH_SPEED: f32 = 15.0;
    pub const DASH_COOLDOWN_MS: f32 = 800.0;
    pub const GLIDE_FALL_SPEED: f32 = 2.5;
    pub const CLIMB_SPEED: f32 = 3.0;

    /// Damage grace period
    pub const INVULNERABILITY_MS: f32 = 1500.0;

    /// Player hitbox
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    pub const START_HEALTH: u8 = 3;
    pub const START_LIVES: u8 = 3;

    /// Pickup and portal hitboxes
    pub const COLLECTIBLE_SIZE: f32 = 30.0;
    pub const PORTAL_WIDTH: f32 = 60.0;
    pub const PORTAL_HEIGHT: f32 = 80.0;

    /// Visible width of the world
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    /// How far below the level floor the player may fall before respawning
    pub const FALL_MARGIN: f32 = 100.0;
}

/// Convert a duration in milliseconds to whole simulation ticks (rounded, at least 1)
#[inline]
pub fn ms_to_ticks(ms: f32, tick_ms: f32) -> u64 {
    if ms <= 0.0 || tick_ms <= 0.0 {
        return 0;
    }
    ((ms / tick_ms).round() as u64).max(1)
}
