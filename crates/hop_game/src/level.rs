//! A loaded level: map, player character, camera.
//!
//! `tick` is the whole per-step simulation: integrate, resolve corners (unless
//! noclip is held), then frame the camera. `draw` records the frame into a
//! draw list and never feeds back into physics.

use glam::Vec2;
use hop_core::{InputSnapshot, Rect};
use hop_render::{Camera2D, DrawList};

use crate::collision::{resolve_corners, Contact, ContactSide};
use crate::controller::{Character, ControllerConfig, Hitbox};
use crate::map::TileMap;

const TILE_TINT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const HITBOX_COLOR: [f32; 4] = [0.9, 0.16, 0.22, 1.0];
const HITBOX_FILL: [f32; 4] = [0.9, 0.16, 0.22, 0.35];
const COLLIDER_COLOR: [f32; 4] = [0.15, 0.9, 0.15, 0.6];

/// What happened during the most recent step.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub contacts: Vec<Contact>,
    pub grounded: bool,
    /// False when noclip skipped collision.
    pub resolved: bool,
}

impl TickReport {
    pub fn has_contact(&self, side: ContactSide) -> bool {
        self.contacts.iter().any(|c| c.side == side)
    }
}

pub struct Level {
    map: TileMap,
    pub character: Character,
    hitbox: Hitbox,
    pub config: ControllerConfig,
    camera: Camera2D,
    show_colliders: bool,
    report: TickReport,
}

impl Level {
    pub fn new(
        map: TileMap,
        spawn: Vec2,
        hitbox: Hitbox,
        config: ControllerConfig,
        viewport: (u32, u32),
        zoom: f32,
    ) -> Self {
        let mut camera = Camera2D::new(viewport.0, viewport.1);
        camera.zoom = zoom;
        camera.follow(spawn);
        Self {
            map,
            character: Character::new(spawn.x, spawn.y),
            hitbox,
            config,
            camera,
            show_colliders: false,
            report: TickReport::default(),
        }
    }

    pub fn tick(&mut self, input: &InputSnapshot) -> &TickReport {
        let was_grounded = self.character.grounded;
        self.report.contacts.clear();

        self.character.integrate(input, &self.config);

        self.report.resolved = !input.noclip;
        if self.report.resolved {
            resolve_corners(
                &self.map,
                &mut self.character,
                &self.hitbox,
                &mut self.report.contacts,
            );
        }
        if self.character.grounded {
            self.character.landed(input.now, &self.config);
        }
        self.report.grounded = self.character.grounded;

        if self.character.grounded && !was_grounded {
            log::debug!(
                "Landed at ({:.1}, {:.1}), t={:.3}",
                self.character.x,
                self.character.y,
                input.now
            );
        }
        for contact in &self.report.contacts {
            if contact.side != ContactSide::Ceiling {
                continue;
            }
            let (column, row) = contact.cell;
            log::debug!(
                "Ceiling hit at ({:.1}, {:.1}): tile gid {} at ({column}, {row}), pushed {:.2}",
                self.character.x,
                self.character.y,
                self.map.tile_at(column, row).map_or(0, |t| t.gid()),
                contact.depth
            );
        }

        self.camera
            .follow(Vec2::new(self.character.x, self.character.y));
        &self.report
    }

    pub fn draw(&self, list: &mut DrawList) {
        for tile in self.map.tiles() {
            list.quad(tile.texture().clone(), tile.uv(), tile.world_rect(), TILE_TINT);
        }

        if self.show_colliders {
            for tile in self.map.tiles() {
                for collider in tile.world_colliders() {
                    list.outline(collider, 1.0 / self.camera.zoom, COLLIDER_COLOR);
                }
            }
        }

        let body = self.hitbox_rect();
        list.filled(body, HITBOX_FILL);
        list.outline(body, 1.0 / self.camera.zoom, HITBOX_COLOR);
    }

    pub fn hitbox_rect(&self) -> Rect {
        self.hitbox.world(self.character.x, self.character.y)
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn last_report(&self) -> &TickReport {
        &self.report
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    pub fn show_colliders(&self) -> bool {
        self.show_colliders
    }

    pub fn set_show_colliders(&mut self, show: bool) {
        self.show_colliders = show;
    }

    pub fn toggle_colliders(&mut self) {
        self.show_colliders = !self.show_colliders;
        log::info!(
            "Collider outlines: {}",
            if self.show_colliders { "ON" } else { "OFF" }
        );
    }
}
