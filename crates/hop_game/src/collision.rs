//! Tile collision resolution.
//!
//! Each step the character's hitbox corners are probed against the tile map.
//! A probe looks up the single tile under the corner and tests every collision
//! rectangle on it. An overlap is resolved along its thinner axis (minimum
//! translation): a tall, thin overlap is a wall contact and pushes the
//! character sideways, a wide, flat one is a floor or ceiling contact and
//! pushes it vertically.
//!
//! Probes mutate the character in place and run in [`Corner::PROBE_ORDER`].
//! A later probe recomputes its corner from the position corrected by the
//! earlier ones, so the same overlap is never resolved twice in one step.
//!
//! Overlaps with equal width and height are ambiguous and left alone; the
//! character's velocity carries it further in and the next step resolves it.

use hop_core::Rect;

use crate::controller::{Character, Corner, Hitbox};
use crate::map::TileMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactSide {
    /// Blocked on the character's left; pushed right.
    Left,
    /// Blocked on the character's right; pushed left.
    Right,
    /// Landed on top of a collider.
    Floor,
    /// Hit the underside of a collider.
    Ceiling,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub side: ContactSide,
    /// Distance the character was moved.
    pub depth: f32,
    pub cell: (u32, u32),
}

/// Probe one point and push the character out of any collider on the tile
/// beneath it. Applied contacts are appended to `contacts`.
pub fn resolve(
    map: &TileMap,
    probe_x: f32,
    probe_y: f32,
    character: &mut Character,
    hitbox: &Hitbox,
    contacts: &mut Vec<Contact>,
) {
    let Some((column, row)) = map.cell_at(probe_x, probe_y) else {
        return;
    };
    let Some(tile) = map.tile_at(column, row) else {
        return;
    };

    for collider in tile.world_colliders() {
        let body = hitbox.world(character.x, character.y);
        let overlap = body.intersection(&collider);
        if overlap.width == 0.0 || overlap.height == 0.0 || overlap.width == overlap.height {
            continue;
        }

        if let Some(side) = separate(character, &body, &collider, &overlap) {
            let depth = match side {
                ContactSide::Left | ContactSide::Right => overlap.width,
                ContactSide::Floor | ContactSide::Ceiling => overlap.height,
            };
            log::trace!(
                "{side:?} contact at cell ({column}, {row}), depth {depth:.3}"
            );
            contacts.push(Contact {
                side,
                depth,
                cell: (column, row),
            });
        }
    }
}

fn separate(
    character: &mut Character,
    body: &Rect,
    collider: &Rect,
    overlap: &Rect,
) -> Option<ContactSide> {
    if overlap.width < overlap.height {
        let side = if body.center_x() < collider.center_x() {
            character.x -= overlap.width;
            ContactSide::Right
        } else if body.center_x() > collider.center_x() {
            character.x += overlap.width;
            ContactSide::Left
        } else {
            return None;
        };
        character.velocity_x = 0.0;
        Some(side)
    } else if collider.center_y() >= body.center_y() {
        character.y -= overlap.height;
        character.velocity_y = 0.0;
        character.grounded = true;
        Some(ContactSide::Floor)
    } else {
        // Ceiling hits never touch the ground flag.
        character.y += overlap.height;
        character.velocity_y = 0.0;
        Some(ContactSide::Ceiling)
    }
}

/// Probe the four hitbox corners in order, each from the current position.
pub fn resolve_corners(
    map: &TileMap,
    character: &mut Character,
    hitbox: &Hitbox,
    contacts: &mut Vec<Contact>,
) {
    for corner in Corner::PROBE_ORDER {
        let (probe_x, probe_y) = hitbox.corner(character.x, character.y, corner);
        resolve(map, probe_x, probe_y, character, hitbox, contacts);
    }
}
