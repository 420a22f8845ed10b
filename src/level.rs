//! Static level data and the level catalog
//!
//! Levels are plain data supplied fully formed by a loader. The catalog keeps
//! them in play order; the simulation only ever borrows them read-only.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::rect::Rect;
use crate::sim::state::{Collectible, Enemy, Portal};

/// Built-in level pack, embedded at compile time
const BUILTIN_LEVELS: &str = include_str!("../levels/builtin.json");

/// Errors raised while loading or looking up level data
#[derive(Debug, Error)]
pub enum LevelError {
    /// Requested level id has no level data
    #[error("unknown level id {0}")]
    UnknownLevel(u32),

    /// Level JSON could not be parsed
    #[error("failed to parse level data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two levels share an id
    #[error("duplicate level id {0}")]
    DuplicateId(u32),

    /// Catalog has no levels at all
    #[error("level catalog is empty")]
    Empty,

    /// Level geometry is unusable
    #[error("level {level} is invalid: {reason}")]
    InvalidGeometry { level: u32, reason: String },
}

/// Platform surface (rendering only; all surfaces collide the same)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    #[default]
    Grass,
    Stone,
    Ice,
    Moving,
    Brick,
    Terracotta,
}

/// A solid, static platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub rect: Rect,
    #[serde(default)]
    pub surface: SurfaceKind,
}

/// Visual theme tag (rendering only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Meadow,
    Forest,
    Sky,
    Building,
    Skyline,
    Metro,
}

/// Static description of one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub theme: Theme,
    pub platforms: Vec<Platform>,
    /// Enemy templates, copied into runtime state on level start
    #[serde(default)]
    pub enemies: Vec<Enemy>,
    /// Collectible templates, copied into runtime state on level start
    #[serde(default)]
    pub collectibles: Vec<Collectible>,
    pub portal: Portal,
    /// Player spawn (top-left of the player box)
    pub spawn: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Level {
    /// Check the level is something the simulation can run
    pub fn validate(&self) -> Result<(), LevelError> {
        let invalid = |reason: String| LevelError::InvalidGeometry {
            level: self.id,
            reason,
        };

        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(invalid(format!(
                "size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        let bounds = Rect::new(0.0, 0.0, self.width, self.height);
        if !bounds.contains_point(self.spawn) {
            return Err(invalid(format!(
                "spawn ({}, {}) is outside the level",
                self.spawn.x, self.spawn.y
            )));
        }
        if let Some(p) = self
            .platforms
            .iter()
            .find(|p| p.rect.width <= 0.0 || p.rect.height <= 0.0)
        {
            return Err(invalid(format!("platform {} has an empty rectangle", p.id)));
        }
        if let Some(e) = self
            .enemies
            .iter()
            .find(|e| e.patrol.is_some_and(|b| b.min > b.max))
        {
            return Err(invalid(format!("enemy {} has inverted patrol bounds", e.id)));
        }
        Ok(())
    }
}

/// On-disk shape of a level pack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelFile {
    pub levels: Vec<Level>,
}

/// All playable levels, in play order
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Build a catalog from levels in play order
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        for (i, level) in levels.iter().enumerate() {
            if levels[..i].iter().any(|l| l.id == level.id) {
                return Err(LevelError::DuplicateId(level.id));
            }
            level.validate()?;
        }
        log::info!("Level catalog ready ({} levels)", levels.len());
        Ok(Self { levels })
    }

    /// Parse a JSON level pack
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let file: LevelFile = serde_json::from_str(json)?;
        Self::new(file.levels)
    }

    /// The level pack shipped with the game
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    /// Look up a level, failing loudly on unknown ids
    pub fn get(&self, id: u32) -> Result<&Level, LevelError> {
        self.levels
            .iter()
            .find(|l| l.id == id)
            .ok_or(LevelError::UnknownLevel(id))
    }

    /// Id of the first level in play order
    pub fn first_id(&self) -> u32 {
        // Non-empty by construction
        self.levels[0].id
    }

    /// Id of the level played after `id`, or None if `id` is the last one
    pub fn next_id(&self, id: u32) -> Result<Option<u32>, LevelError> {
        let index = self
            .levels
            .iter()
            .position(|l| l.id == id)
            .ok_or(LevelError::UnknownLevel(id))?;
        Ok(self.levels.get(index + 1).map(|l| l.id))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = r#"{
        "levels": [
            {
                "id": 7,
                "name": "Tiny",
                "platforms": [
                    { "id": 1, "rect": { "x": 0, "y": 450, "width": 800, "height": 20 }, "surface": "stone" }
                ],
                "portal": { "pos": [700, 370], "target_level": 8 },
                "spawn": [100, 400],
                "width": 800,
                "height": 600
            }
        ]
    }"#;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.first_id(), 1);
        assert_eq!(catalog.next_id(1).unwrap(), Some(2));
        assert_eq!(catalog.next_id(3).unwrap(), None);
        for level in catalog.iter() {
            assert!(!level.platforms.is_empty());
            assert!(level.collectibles.iter().all(|c| !c.collected));
            assert!(level.portal.active);
        }
    }

    #[test]
    fn test_from_json_defaults() {
        let catalog = LevelCatalog::from_json(TINY).unwrap();
        let level = catalog.get(7).unwrap();
        assert_eq!(level.theme, Theme::Meadow);
        assert_eq!(level.platforms[0].surface, SurfaceKind::Stone);
        assert!(level.enemies.is_empty());
        assert!(level.portal.active);
        assert_eq!(level.spawn, Vec2::new(100.0, 400.0));
    }

    #[test]
    fn test_unknown_level_fails_loudly() {
        let catalog = LevelCatalog::from_json(TINY).unwrap();
        assert!(matches!(catalog.get(1), Err(LevelError::UnknownLevel(1))));
        assert!(matches!(catalog.next_id(99), Err(LevelError::UnknownLevel(99))));
    }

    #[test]
    fn test_rejects_bad_packs() {
        assert!(matches!(
            LevelCatalog::from_json(r#"{ "levels": [] }"#),
            Err(LevelError::Empty)
        ));
        assert!(matches!(
            LevelCatalog::from_json("{ not json"),
            Err(LevelError::Parse(_))
        ));

        let level = LevelCatalog::from_json(TINY).unwrap().get(7).unwrap().clone();
        assert!(matches!(
            LevelCatalog::new(vec![level.clone(), level.clone()]),
            Err(LevelError::DuplicateId(7))
        ));

        let mut outside = level;
        outside.spawn = Vec2::new(-10.0, 0.0);
        assert!(matches!(
            LevelCatalog::new(vec![outside]),
            Err(LevelError::InvalidGeometry { level: 7, .. })
        ));
    }
}
