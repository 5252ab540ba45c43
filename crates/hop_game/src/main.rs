//! Tilehop -- headless runner.
//!
//! Loads a game config and its tile map, then drives the level with a replay
//! through the same fixed-timestep loop a windowed host would use:
//!
//!   1. `begin_frame_with()` -- feed the replay's frame time into the accumulator
//!   2. `while should_step()` -- one `Level::tick` per fixed slice
//!   3. Rebuild the draw list and mesh for the frame
//!
//! Usage: `hop_game [config.json] [replay.json]`. Without a replay the built-in
//! demo input runs.

mod collision;
mod config;
mod controller;
mod level;
mod map;
mod replay;

use std::path::PathBuf;

use glam::Vec2;
use hop_core::{InputState, TimeState};
use hop_render::DrawList;

use collision::ContactSide;
use config::{load_config_from_path, GameConfig};
use level::Level;
use replay::{load_replay_from_path, ReplaySequence};

const DEFAULT_CONFIG_PATH: &str = "assets/config/game.json";

/// Totals gathered over a run.
#[derive(Debug, Clone, Default, PartialEq)]
struct RunSummary {
    frames: u64,
    steps: u64,
    landings: u32,
    ceiling_hits: u32,
    wall_hits: u32,
    final_x: f32,
    final_y: f32,
    grounded: bool,
    vertices: usize,
    draw_calls: usize,
    /// Character position in screen pixels after the last step.
    character_screen: Vec2,
    /// World-space corners of the viewport after the last step.
    visible_world: (Vec2, Vec2),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Tilehop starting...");

    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let replay_path = args.next().map(PathBuf::from);

    match run(config_path, replay_path) {
        Ok(summary) => log::info!(
            "Run complete: {} frames, {} steps, {} landings, {} ceiling hits, {} wall hits, \
             final ({:.1}, {:.1}) grounded={}, mesh {} verts / {} draw calls",
            summary.frames,
            summary.steps,
            summary.landings,
            summary.ceiling_hits,
            summary.wall_hits,
            summary.final_x,
            summary.final_y,
            summary.grounded,
            summary.vertices,
            summary.draw_calls
        ),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

fn run(config_path: PathBuf, replay_path: Option<PathBuf>) -> Result<RunSummary, String> {
    let config = if config_path.exists() {
        load_config_from_path(&config_path)?
    } else {
        log::warn!(
            "Config {} not found, using defaults",
            config_path.display()
        );
        GameConfig::default()
    };
    log::info!(
        "Loading map {} (layer '{}')",
        config.map_path.display(),
        config.tile_layer
    );
    let mut level = config.build_level()?;
    let (tile_w, tile_h) = level.map().tile_size();
    let tileset_names: Vec<&str> = level
        .map()
        .tilesets()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    log::info!(
        "Map ready: {}x{} cells of {tile_w}x{tile_h}, tilesets [{}], {} placed tiles, colliders {}",
        level.map().width,
        level.map().height,
        tileset_names.join(", "),
        level.map().tiles().count(),
        if level.show_colliders() { "shown" } else { "hidden" }
    );

    let replay = match replay_path {
        Some(path) => load_replay_from_path(&path)?,
        None => {
            log::info!("No replay given, running built-in demo input");
            ReplaySequence::demo(config.fixed_dt)
        }
    };

    Ok(simulate(&mut level, &replay, config.fixed_dt))
}

/// Drive `level` with `replay` through a fixed-step clock.
///
/// Edge-triggered input is cleared only after a frame that consumed at least
/// one step, so a press on a zero-step frame carries into the next one.
fn simulate(level: &mut Level, replay: &ReplaySequence, fixed_dt: f64) -> RunSummary {
    let mut time = TimeState::with_fixed_dt(fixed_dt);
    let mut input = InputState::new();
    let mut draw_list = DrawList::new();
    let mut summary = RunSummary::default();

    for frame in replay.expanded_frames() {
        if frame.toggle_colliders {
            level.toggle_colliders();
        }
        if let Some((width, height)) = frame.resize {
            log::info!("Viewport resized to {width}x{height}");
            level.set_viewport(width, height);
        }
        frame.apply(&mut input);
        time.begin_frame_with(replay.fixed_dt);

        while time.should_step() {
            let was_grounded = level.character.grounded;
            let report = level.tick(&input.snapshot(time.now, time.step_dt()));
            if report.grounded && !was_grounded {
                summary.landings += 1;
            }
            if report.has_contact(ContactSide::Ceiling) {
                summary.ceiling_hits += 1;
            }
            if report.has_contact(ContactSide::Left) || report.has_contact(ContactSide::Right) {
                summary.wall_hits += 1;
            }
        }

        if time.steps_this_frame > 0 {
            input.end_frame();
        }
        time.end_frame();

        draw_list.clear();
        level.draw(&mut draw_list);
    }

    let mesh = draw_list.build_mesh();
    let camera = level.camera();
    let uniform = camera.build_uniform();
    log::debug!("Final view-projection: {:?}", uniform.view_proj);
    let (view_w, view_h) = camera.viewport;
    summary.character_screen =
        camera.world_to_screen(Vec2::new(level.character.x, level.character.y));
    summary.visible_world = (
        camera.screen_to_world(Vec2::ZERO),
        camera.screen_to_world(Vec2::new(view_w as f32, view_h as f32)),
    );
    log::debug!(
        "Character on screen at {:?}, visible world {:?}",
        summary.character_screen,
        summary.visible_world
    );

    summary.frames = time.frame_count;
    summary.steps = time.fixed_step_count;
    summary.final_x = level.character.x;
    summary.final_y = level.character.y;
    summary.grounded = level.last_report().grounded;
    summary.vertices = mesh.vertices.len();
    summary.draw_calls = mesh.draw_calls.len();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerConfig, Hitbox};
    use crate::map::TileMap;
    use crate::replay::ReplayFrame;

    fn room() -> Level {
        let mut rows = vec!["#..............#"; 6];
        rows.push("################");
        Level::new(
            TileMap::from_rows(16, &rows),
            Vec2::new(64.0, 60.0),
            Hitbox::new(-8.0, -16.0, 16.0, 16.0).expect("valid hitbox"),
            ControllerConfig::default(),
            (800, 450),
            3.0,
        )
    }

    fn idle(repeat: u32) -> ReplayFrame {
        ReplayFrame {
            repeat,
            ..ReplayFrame::default()
        }
    }

    #[test]
    fn one_step_per_frame_at_matching_rates() {
        let replay = ReplaySequence {
            fixed_dt: 1.0 / 60.0,
            frames: vec![idle(120)],
        };
        let mut level = room();
        let summary = simulate(&mut level, &replay, 1.0 / 60.0);
        assert_eq!(summary.frames, 120);
        assert_eq!(summary.steps, 120);
        assert_eq!(summary.landings, 1);
        assert!(summary.grounded);
        assert!((summary.final_y - 96.0).abs() < 1e-3);
        // 16 floor tiles + 12 wall tiles + hitbox fill + hitbox outline (4 edge quads).
        assert_eq!(summary.vertices, (16 + 12 + 1 + 4) * 4);
        assert!((summary.character_screen - Vec2::new(400.0, 225.0)).length() < 1e-3);
    }

    #[test]
    fn slow_frames_take_several_steps() {
        let replay = ReplaySequence {
            fixed_dt: 1.0 / 30.0,
            frames: vec![idle(30)],
        };
        let mut level = room();
        let summary = simulate(&mut level, &replay, 1.0 / 60.0);
        assert_eq!(summary.frames, 30);
        assert_eq!(summary.steps, 60);
    }

    #[test]
    fn jump_pressed_on_zero_step_frame_is_not_lost() {
        // Frames run at twice the step rate, so every other frame steps zero times.
        let settle = ReplaySequence {
            fixed_dt: 1.0 / 120.0,
            frames: vec![idle(240)],
        };
        let mut level = room();
        simulate(&mut level, &settle, 1.0 / 60.0);
        assert!(level.character.grounded);
        let rest_y = level.character.y;

        // A fresh clock at half-step frames takes no step on the first frame.
        let press = ReplaySequence {
            fixed_dt: 1.0 / 120.0,
            frames: vec![ReplayFrame {
                jump: true,
                repeat: 4,
                ..ReplayFrame::default()
            }],
        };
        simulate(&mut level, &press, 1.0 / 60.0);
        assert!(level.character.y < rest_y, "jump should have fired");
    }

    #[test]
    fn walking_into_wall_counts_contacts() {
        let replay = ReplaySequence {
            fixed_dt: 1.0 / 60.0,
            frames: vec![
                idle(60),
                ReplayFrame {
                    right: true,
                    repeat: 180,
                    ..ReplayFrame::default()
                },
            ],
        };
        let mut level = room();
        let summary = simulate(&mut level, &replay, 1.0 / 60.0);
        assert!(summary.wall_hits > 0);
        assert!(level.hitbox_rect().right() <= 240.0 + 1e-3);
    }

    #[test]
    fn replay_events_reach_the_level() {
        let replay = ReplaySequence {
            fixed_dt: 1.0 / 60.0,
            frames: vec![
                ReplayFrame {
                    toggle_colliders: true,
                    resize: Some((1280, 720)),
                    repeat: 10,
                    ..ReplayFrame::default()
                },
                idle(5),
            ],
        };
        let mut level = room();
        let summary = simulate(&mut level, &replay, 1.0 / 60.0);
        // Toggled once despite the repeat.
        assert!(level.show_colliders());
        assert_eq!(level.camera().offset, Vec2::new(640.0, 360.0));
        // 28 tiles + 28 collider outlines (4 quads each) + hitbox fill and outline.
        assert_eq!(summary.vertices, (28 + 28 * 4 + 1 + 4) * 4);
        // 1280x720 at zoom 3 shows 426.7 x 240 world units around the character.
        let (min, max) = summary.visible_world;
        assert!(((max.x - min.x) - 1280.0 / 3.0).abs() < 1e-2);
        assert!(((max.y - min.y) - 240.0).abs() < 1e-2);
        assert!(((min.x + max.x) * 0.5 - level.character.x).abs() < 1e-2);
    }

    #[test]
    fn demo_replay_runs_in_room() {
        let replay = ReplaySequence::demo(1.0 / 60.0);
        let mut level = room();
        let summary = simulate(&mut level, &replay, 1.0 / 60.0);
        assert!(summary.steps > 0);
        assert!(summary.landings >= 1);
        let body = level.hitbox_rect();
        assert!(body.x >= 16.0 - 1e-3 && body.right() <= 240.0 + 1e-3);
    }

    #[test]
    fn missing_config_falls_back_to_defaults_then_fails_on_map() {
        let missing = std::env::temp_dir().join(format!(
            "hop_missing_config_{}.json",
            std::process::id()
        ));
        let err = run(missing, None).expect_err("default map path is not present in temp dir");
        assert!(err.starts_with("Failed to read"));
    }
}
