//! Playable characters
//!
//! Each character has its own run speed and exactly one movement ability.

use serde::{Deserialize, Serialize};

/// Movement ability granted by a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    /// A weaker second jump while airborne
    DoubleJump,
    /// Short horizontal burst with a cooldown
    Dash,
    /// Hold jump while falling to descend slowly
    Glide,
    /// Hold jump against a wall to climb it
    Climb,
}

/// Character roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CharacterKind {
    #[default]
    Derrik,
    Christo,
    Lou,
    Teri,
}

impl CharacterKind {
    pub const ALL: [CharacterKind; 4] = [
        CharacterKind::Derrik,
        CharacterKind::Christo,
        CharacterKind::Lou,
        CharacterKind::Teri,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterKind::Derrik => "derrik",
            CharacterKind::Christo => "christo",
            CharacterKind::Lou => "lou",
            CharacterKind::Teri => "teri",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "derrik" => Some(CharacterKind::Derrik),
            "christo" => Some(CharacterKind::Christo),
            "lou" => Some(CharacterKind::Lou),
            "teri" => Some(CharacterKind::Teri),
            _ => None,
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            CharacterKind::Derrik => "Derrik",
            CharacterKind::Christo => "Christo",
            CharacterKind::Lou => "Lou",
            CharacterKind::Teri => "Teri",
        }
    }

    /// Horizontal run speed (pixels per tick)
    pub fn speed(&self) -> f32 {
        match self {
            CharacterKind::Derrik => 4.0,
            CharacterKind::Christo => 7.0,
            CharacterKind::Lou => 5.0,
            CharacterKind::Teri => 6.0,
        }
    }

    /// Initial upward speed of a grounded jump (pixels per tick)
    pub fn jump_power(&self) -> f32 {
        14.0
    }

    pub fn ability(&self) -> Ability {
        match self {
            CharacterKind::Derrik => Ability::DoubleJump,
            CharacterKind::Christo => Ability::Dash,
            CharacterKind::Lou => Ability::Glide,
            CharacterKind::Teri => Ability::Climb,
        }
    }

    #[inline]
    pub fn has(&self, ability: Ability) -> bool {
        self.ability() == ability
    }
}
