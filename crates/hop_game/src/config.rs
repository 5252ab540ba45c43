use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;

use crate::controller::{ControllerConfig, Hitbox};
use crate::level::Level;
use crate::map::load_map_from_path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub map_path: PathBuf,
    pub tile_layer: String,
    pub viewport: ViewportConfig,
    pub zoom: f32,
    pub spawn: SpawnPoint,
    pub hitbox: HitboxConfig,
    pub controller: ControllerConfig,
    pub show_colliders: bool,
    pub fixed_dt: f64,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct HitboxConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_path: PathBuf::from("assets/maps/level.json"),
            tile_layer: "Tile Layer 1".to_string(),
            viewport: ViewportConfig {
                width: 800,
                height: 450,
            },
            zoom: 3.0,
            spawn: SpawnPoint { x: 100.0, y: 20.0 },
            hitbox: HitboxConfig {
                x: -8.0,
                y: -16.0,
                width: 16.0,
                height: 16.0,
            },
            controller: ControllerConfig::default(),
            show_colliders: false,
            fixed_dt: 1.0 / 60.0,
        }
    }
}

impl GameConfig {
    pub fn hitbox(&self) -> Result<Hitbox, String> {
        let h = self.hitbox;
        Hitbox::new(h.x, h.y, h.width, h.height)
    }

    /// Load the map and build a ready-to-tick level.
    pub fn build_level(&self) -> Result<Level, String> {
        let hitbox = self.hitbox()?;
        let map = load_map_from_path(&self.map_path, &self.tile_layer)?;
        let mut level = Level::new(
            map,
            Vec2::new(self.spawn.x, self.spawn.y),
            hitbox,
            self.controller,
            (self.viewport.width, self.viewport.height),
            self.zoom,
        );
        level.set_show_colliders(self.show_colliders);
        Ok(level)
    }
}

/// Load a config file. Relative map paths resolve against the config's folder.
pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let mut config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    if config.map_path.is_relative() {
        if let Some(dir) = path.parent() {
            config.map_path = dir.join(&config.map_path);
        }
    }
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.viewport.width == 0 || config.viewport.height == 0 {
        return Err("Config validation failed: viewport must be non-empty".to_string());
    }
    if !(config.zoom > 0.0) {
        return Err("Config validation failed: zoom must be > 0".to_string());
    }
    if !(config.fixed_dt > 0.0) {
        return Err("Config validation failed: fixed_dt must be > 0".to_string());
    }
    if config.controller.jump_grace < 0.0 {
        return Err("Config validation failed: controller.jump_grace must be >= 0".to_string());
    }
    if config.controller.max_speed < 0.0 {
        return Err("Config validation failed: controller.max_speed must be >= 0".to_string());
    }
    config.hitbox().map(|_| ()).map_err(|e| format!("Config {e}"))
}
