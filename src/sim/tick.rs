//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation by one step. Each stage
//! depends on the one before it, so the order below is load-bearing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{WallSide, fell_out, resolve_platforms};
use super::state::{CollectibleKind, DamageOutcome, GameEvent, GamePhase, GameState};
use crate::character::Ability;
use crate::consts::{MOVING_SPEED, STOP_SPEED};
use crate::level::Level;
use crate::settings::Tuning;

/// Held input for a single tick (deterministic)
///
/// Every field is the *held* state of its control; press edges are derived
/// against the previous tick's intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub dash: bool,
}

/// Advance the game state by one fixed timestep
///
/// Does nothing unless the game is in the `Playing` phase.
pub fn tick(state: &mut GameState, level: &Level, input: &Intent, tuning: &Tuning) {
    state.events.clear();
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;
    let now = state.time_ticks;
    state.player.expire_invulnerability(now);

    let latch = state.input_latch;
    let jump_pressed = input.jump && !latch.jump;
    let dash_pressed = input.dash && !latch.dash;
    let character = state.character;
    let size = tuning.player_size();

    // --- HORIZONTAL INTENT ---
    let player = &mut state.player;
    if input.move_left {
        player.vel.x = -character.speed();
        player.facing_right = false;
    } else if input.move_right {
        player.vel.x = character.speed();
        player.facing_right = true;
    } else {
        player.vel.x *= tuning.friction;
        if player.vel.x.abs() < STOP_SPEED {
            player.vel.x = 0.0;
        }
    }

    // --- JUMP (one per press) ---
    let mut launched = false;
    if jump_pressed {
        if player.grounded {
            launched = true;
            player.vel.y = -character.jump_power();
            player.grounded = false;
            player.double_jump_armed = character.has(Ability::DoubleJump);
            state.events.push(GameEvent::Jumped);
        } else if player.double_jump_armed && character.has(Ability::DoubleJump) {
            player.vel.y = -character.jump_power() * tuning.double_jump_factor;
            player.double_jump_armed = false;
            state.events.push(GameEvent::DoubleJumped);
        }
    }

    // --- DASH ---
    if dash_pressed && character.has(Ability::Dash) && now >= player.dash_ready_at {
        let dir = if player.facing_right { 1.0 } else { -1.0 };
        player.vel.x = tuning.dash_speed * dir;
        player.dash_ready_at = now + tuning.dash_cooldown_ticks();
        state.events.push(GameEvent::Dashed);
    }

    // --- GRAVITY ---
    player.vel.y = (player.vel.y + tuning.gravity).min(tuning.terminal_velocity);

    if character.has(Ability::Glide)
        && input.jump
        && !player.grounded
        && player.vel.y > tuning.glide_fall_speed
    {
        player.vel.y = tuning.glide_fall_speed;
    }

    // Climbing only takes over once airborne; a grounded press is a jump
    if character.has(Ability::Climb) && input.jump && !player.grounded && !launched {
        let pushing_into_wall = match player.against_wall {
            Some(WallSide::Left) => input.move_left,
            Some(WallSide::Right) => input.move_right,
            None => false,
        };
        if pushing_into_wall {
            player.vel.y = -tuning.climb_speed;
        }
    }

    // --- INTEGRATE + RESOLVE ---
    let was_grounded = player.grounded;
    let prev = player.pos;
    let next = prev + player.vel;
    let res = resolve_platforms(prev, next, player.vel, size, &level.platforms, level.width);

    player.pos = res.pos;
    player.vel = res.vel;
    player.grounded = res.grounded;
    player.against_wall = res.wall;
    player.moving = player.vel.x.abs() > MOVING_SPEED;
    player.jumping = !player.grounded;
    if res.grounded {
        player.double_jump_armed = true;
        if !was_grounded {
            state.events.push(GameEvent::Landed);
        }
    }
    if res.bumped_head {
        state.events.push(GameEvent::HeadBumped);
    }

    // --- FALL-THROUGH ---
    if fell_out(state.player.pos, level.height, tuning.fall_margin) {
        let outcome = state.take_damage(now, tuning.invulnerability_ticks());
        state.player.respawn(level.spawn);
        state.events.push(GameEvent::FellOut);
        log::debug!("Fell out of level {} ({:?})", level.id, outcome);
        if outcome == DamageOutcome::Died {
            finish_tick(state, level, input, tuning);
            return;
        }
    }

    // --- ENEMIES ---
    for enemy in &mut state.enemies {
        enemy.advance();
    }

    let player_box = state.player.rect(size);
    if state
        .enemies
        .iter()
        .any(|enemy| enemy.rect.overlaps(&player_box))
        && state.take_damage(now, tuning.invulnerability_ticks()) == DamageOutcome::Died
    {
        finish_tick(state, level, input, tuning);
        return;
    }

    // --- PICKUPS ---
    for collectible in &mut state.collectibles {
        if collectible.collected || !collectible.rect().overlaps(&player_box) {
            continue;
        }
        collectible.collected = true;

        let player = &mut state.player;
        match collectible.kind {
            CollectibleKind::Coin => {
                player.coins = player.coins.saturating_add(collectible.value);
                state.score = state.score.saturating_add(u64::from(collectible.value));
            }
            CollectibleKind::Star => {
                player.stars = player.stars.saturating_add(1);
                state.score = state.score.saturating_add(u64::from(collectible.value));
            }
            CollectibleKind::Heart => player.heal(),
            CollectibleKind::PowerUp => {
                state.score = state.score.saturating_add(u64::from(collectible.value));
            }
        }
        state.events.push(GameEvent::Collected {
            id: collectible.id,
            kind: collectible.kind,
        });
    }

    // --- PORTAL ---
    if state.portal.active && state.portal.rect().overlaps(&player_box) {
        state.phase = GamePhase::LevelComplete;
        state.events.push(GameEvent::LevelCompleted);
        log::info!(
            "Level {} complete (score {}, coins {}, stars {})",
            level.id,
            state.score,
            state.player.coins,
            state.player.stars
        );
    }

    finish_tick(state, level, input, tuning);
}

/// Camera follow and input latch, run at the end of every executed tick
fn finish_tick(state: &mut GameState, level: &Level, input: &Intent, tuning: &Tuning) {
    state.camera_x = camera_offset(state.player.pos, level.width, tuning.viewport_width);
    state.input_latch = *input;
}

/// Horizontal viewport offset that follows the player without showing past
/// the level edges
pub fn camera_offset(player_pos: Vec2, level_width: f32, viewport_width: f32) -> f32 {
    let max = (level_width - viewport_width).max(0.0);
    (player_pos.x - viewport_width / 2.0).max(0.0).min(max)
}
