//! Collision detection and response against level geometry
//!
//! The player box is resolved in three passes over every platform: landing,
//! then horizontal blocking, then head bumps. Edge crossings are tested
//! against the previous frame's box so a fast fall cannot skip a thin
//! platform. There is no sub-stepping; terminal velocity keeps a single
//! check per tick sufficient.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::level::Platform;

/// Slack for "was resting on top" comparisons (float drift after a snap)
pub const CONTACT_EPSILON: f32 = 1e-3;

/// Which side of the player box is pressed against a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
}

/// Corrected movement after resolving one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Landed on a platform top this tick
    pub grounded: bool,
    /// Horizontal motion was blocked by a platform side or a world edge
    pub wall: Option<WallSide>,
    /// Head hit a platform underside this tick
    pub bumped_head: bool,
}

/// Resolve a moving box against static platforms
///
/// `prev` is the box position before integration, `next` the tentative
/// position after `pos += vel`, `vel` the velocity that produced it.
pub fn resolve_platforms(
    prev: Vec2,
    next: Vec2,
    vel: Vec2,
    size: Vec2,
    platforms: &[Platform],
    level_width: f32,
) -> Resolution {
    let prev_box = Rect::from_pos_size(prev, size);
    let mut pos = next;
    let mut vel = vel;
    let mut grounded = false;
    let mut wall = None;
    let mut bumped_head = false;

    // Landing
    if vel.y > 0.0 {
        for platform in platforms {
            let p = &platform.rect;
            let new_box = Rect::from_pos_size(pos, size);
            if prev_box.bottom() <= p.top() + CONTACT_EPSILON
                && new_box.bottom() >= p.top()
                && new_box.overlaps_x(p)
            {
                pos.y = p.top() - size.y;
                vel.y = 0.0;
                grounded = true;
            }
        }
    }

    // Horizontal blocking (against the vertically corrected box)
    for platform in platforms {
        let p = &platform.rect;
        let new_box = Rect::from_pos_size(pos, size);
        if !new_box.overlaps_y(p) {
            continue;
        }
        if vel.x > 0.0 && prev_box.right() <= p.left() && new_box.right() > p.left() {
            pos.x = p.left() - size.x;
            vel.x = 0.0;
            wall = Some(WallSide::Right);
        } else if vel.x < 0.0 && prev_box.left() >= p.right() && new_box.left() < p.right() {
            pos.x = p.right();
            vel.x = 0.0;
            wall = Some(WallSide::Left);
        }
    }

    // Head bump
    if vel.y < 0.0 {
        for platform in platforms {
            let p = &platform.rect;
            let new_box = Rect::from_pos_size(pos, size);
            if prev_box.top() >= p.bottom() && new_box.top() < p.bottom() && new_box.overlaps_x(p)
            {
                pos.y = p.bottom();
                vel.y = 0.0;
                bumped_head = true;
                break;
            }
        }
    }

    // World bounds
    let max_x = (level_width - size.x).max(0.0);
    if pos.x < 0.0 {
        pos.x = 0.0;
        if vel.x < 0.0 {
            wall = Some(WallSide::Left);
        }
    } else if pos.x > max_x {
        pos.x = max_x;
        if vel.x > 0.0 {
            wall = Some(WallSide::Right);
        }
    }

    Resolution {
        pos,
        vel,
        grounded,
        wall,
        bumped_head,
    }
}

/// Check if a box has dropped past the level's kill line
#[inline]
pub fn fell_out(pos: Vec2, level_height: f32, fall_margin: f32) -> bool {
    pos.y > level_height + fall_margin
}
