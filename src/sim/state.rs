//! Game state and core simulation types
//!
//! Everything the simulation mutates between ticks lives here. Level data is
//! separate and read-only; enemies and collectibles are copied out of it on
//! every level start.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::WallSide;
use super::rect::Rect;
use super::tick::Intent;
use crate::character::CharacterKind;
use crate::consts::*;
use crate::level::Level;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, no level loaded
    #[default]
    MainMenu,
    /// Active gameplay
    Playing,
    /// Game is paused (state frozen)
    Paused,
    /// Health ran out
    GameOver,
    /// Player reached the portal
    LevelComplete,
    /// Last level completed
    Victory,
}

/// Horizontal walking direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Direction::Left),
            1 => Ok(Direction::Right),
            other => Err(format!("direction must be 1 or -1, got {other}")),
        }
    }
}

impl From<Direction> for i8 {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// Horizontal range an enemy walks back and forth within
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatrolBounds {
    pub min: f32,
    pub max: f32,
}

/// Enemy types (rendering only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    #[default]
    Slime,
    Bat,
    Spike,
}

/// A patrolling enemy. Touching it hurts; it cannot be defeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub rect: Rect,
    #[serde(default)]
    pub kind: EnemyKind,
    #[serde(default)]
    pub patrol: Option<PatrolBounds>,
    pub speed: f32,
    pub direction: Direction,
}

impl Enemy {
    /// Walk one tick; direction flips once a patrol bound is reached
    pub fn advance(&mut self) {
        self.rect.x += self.speed * self.direction.sign();

        if let Some(bounds) = self.patrol {
            if self.rect.x >= bounds.max {
                self.direction = Direction::Left;
            } else if self.rect.x <= bounds.min {
                self.direction = Direction::Right;
            }
        }
    }
}

/// Collectible types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectibleKind {
    Coin,
    Heart,
    Star,
    PowerUp,
}

/// A pickup. Once collected it stays in the list but is inert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub pos: Vec2,
    pub kind: CollectibleKind,
    #[serde(default)]
    pub collected: bool,
    #[serde(default)]
    pub value: u32,
}

impl Collectible {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, Vec2::splat(COLLECTIBLE_SIZE))
    }
}

fn default_true() -> bool {
    true
}

/// Level exit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub pos: Vec2,
    pub target_level: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Default for Portal {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            target_level: 0,
            active: false,
        }
    }
}

impl Portal {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, Vec2::new(PORTAL_WIDTH, PORTAL_HEIGHT))
    }
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Top-left of the hitbox
    pub pos: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
    pub jumping: bool,
    pub facing_right: bool,
    pub moving: bool,
    pub health: u8,
    pub max_health: u8,
    pub coins: u32,
    pub stars: u32,
    pub invulnerable: bool,
    /// Tick at which invulnerability ends
    pub invulnerable_until: Option<u64>,
    /// Second jump available (only meaningful with the double jump ability)
    pub double_jump_armed: bool,
    /// Earliest tick a dash may start
    pub dash_ready_at: u64,
    /// Wall the player was pressed against at the end of the last tick
    pub against_wall: Option<WallSide>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            pos: Vec2::new(100.0, 400.0),
            vel: Vec2::ZERO,
            grounded: false,
            jumping: false,
            facing_right: true,
            moving: false,
            health: START_HEALTH,
            max_health: START_HEALTH,
            coins: 0,
            stars: 0,
            invulnerable: false,
            invulnerable_until: None,
            double_jump_armed: true,
            dash_ready_at: 0,
            against_wall: None,
        }
    }
}

impl PlayerState {
    /// Hitbox at the current position
    #[inline]
    pub fn rect(&self, size: Vec2) -> Rect {
        Rect::from_pos_size(self.pos, size)
    }

    /// Put the player back at `spawn` at rest (health/coins/stars untouched)
    pub fn respawn(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.vel = Vec2::ZERO;
        self.grounded = false;
        self.jumping = false;
        self.moving = false;
        self.against_wall = None;
    }

    /// Heal one point, never past max health
    pub fn heal(&mut self) {
        self.health = self.health.saturating_add(1).min(self.max_health);
    }

    /// Clear invulnerability once its deadline has passed
    pub fn expire_invulnerability(&mut self, now: u64) {
        if self.invulnerable_until.is_some_and(|until| now >= until) {
            self.invulnerable = false;
            self.invulnerable_until = None;
        }
    }
}

/// Things that happened during a tick, for sound and visual effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    DoubleJumped,
    Dashed,
    Landed,
    /// Hit the underside of a platform while rising
    HeadBumped,
    Collected { id: u32, kind: CollectibleKind },
    Hurt { health: u8 },
    FellOut,
    Died,
    LevelCompleted,
}

/// Result of a damage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Player was invulnerable or already dead
    Ignored,
    /// Lost a point of health, grace period started
    Hurt,
    /// Health reached zero
    Died,
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Current level id (0 while in the main menu)
    pub level_id: u32,
    pub character: CharacterKind,
    pub phase: GamePhase,
    pub player: PlayerState,
    /// Runtime enemies, rebuilt from the level template on level start
    pub enemies: Vec<Enemy>,
    /// Runtime collectibles, rebuilt from the level template on level start
    pub collectibles: Vec<Collectible>,
    pub portal: Portal,
    /// Horizontal scroll offset of the viewport
    pub camera_x: f32,
    pub score: u64,
    pub lives: u8,
    /// Simulation clock (ticks since the controller was created)
    pub time_ticks: u64,
    /// Intent from the previous tick, for press-edge detection
    pub input_latch: Intent,
    /// Events emitted by the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(CharacterKind::default())
    }
}

impl GameState {
    /// Fresh state sitting in the main menu
    pub fn new(character: CharacterKind) -> Self {
        Self {
            level_id: 0,
            character,
            phase: GamePhase::MainMenu,
            player: PlayerState::default(),
            enemies: Vec::new(),
            collectibles: Vec::new(),
            portal: Portal::default(),
            camera_x: 0.0,
            score: 0,
            lives: START_LIVES,
            time_ticks: 0,
            input_latch: Intent::default(),
            events: Vec::new(),
        }
    }

    /// A level is on screen, whether running, paused or finished
    pub fn is_playing(&self) -> bool {
        matches!(
            self.phase,
            GamePhase::Playing | GamePhase::Paused | GamePhase::GameOver | GamePhase::LevelComplete
        )
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_level_complete(&self) -> bool {
        self.phase == GamePhase::LevelComplete
    }

    /// Reset all run counters (score, lives, health, coins, stars)
    pub fn reset_run(&mut self) {
        self.score = 0;
        self.lives = START_LIVES;
        self.player = PlayerState::default();
    }

    /// (Re)initialize runtime entities from a level template
    ///
    /// Health, coins and stars carry over; position, velocity and timed
    /// effects reset.
    pub fn load_level(&mut self, level: &Level) {
        self.level_id = level.id;
        self.enemies.clone_from(&level.enemies);
        self.collectibles.clone_from(&level.collectibles);
        for collectible in &mut self.collectibles {
            collectible.collected = false;
        }
        self.portal = level.portal.clone();
        self.camera_x = 0.0;

        let PlayerState {
            health,
            max_health,
            coins,
            stars,
            ..
        } = self.player;
        self.player = PlayerState {
            health,
            max_health,
            coins,
            stars,
            dash_ready_at: self.time_ticks,
            ..PlayerState::default()
        };
        self.player.respawn(level.spawn);

        self.input_latch = Intent::default();
        self.events.clear();
    }

    /// Apply one point of damage unless the player is protected
    pub fn take_damage(&mut self, now: u64, invulnerability_ticks: u64) -> DamageOutcome {
        if self.player.invulnerable || self.player.health == 0 {
            return DamageOutcome::Ignored;
        }

        self.player.health = self.player.health.saturating_sub(1);
        if self.player.health == 0 {
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::Died);
            log::info!("Game over on level {} (score {})", self.level_id, self.score);
            return DamageOutcome::Died;
        }

        self.player.invulnerable = true;
        self.player.invulnerable_until = Some(now + invulnerability_ticks);
        self.events.push(GameEvent::Hurt {
            health: self.player.health,
        });
        DamageOutcome::Hurt
    }
}
