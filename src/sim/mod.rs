//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Timed effects are tick deadlines, never wall-clock timers
//! - Stable iteration order (level template order)
//! - No rendering, audio or I/O

pub mod collision;
pub mod rect;
pub mod state;
pub mod tick;

pub use collision::{Resolution, WallSide, fell_out, resolve_platforms};
pub use rect::Rect;
pub use state::{
    Collectible, CollectibleKind, DamageOutcome, Direction, Enemy, EnemyKind, GameEvent,
    GamePhase, GameState, PatrolBounds, PlayerState, Portal,
};
pub use tick::{Intent, camera_offset, tick};
