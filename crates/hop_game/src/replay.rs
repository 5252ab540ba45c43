//! Scripted input sequences for headless runs and regression tests.
//!
//! A frame lists the keys held during it; press edges are derived from the
//! previous frame through `InputState`, exactly as live keyboard input is.

use hop_core::{InputState, Key};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayFrame {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub jump: bool,
    #[serde(default)]
    pub noclip: bool,
    /// Flip collider outlines at the start of this entry.
    #[serde(default)]
    pub toggle_colliders: bool,
    /// New viewport `[width, height]` applied at the start of this entry.
    #[serde(default)]
    pub resize: Option<(u32, u32)>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayFrame {
    /// Drive the keyboard state to match this frame.
    pub fn apply(&self, input: &mut InputState) {
        for (key, down) in [
            (Key::Left, self.left),
            (Key::Right, self.right),
            (Key::Space, self.jump),
            (Key::E, self.noclip),
        ] {
            if down {
                input.key_down(key);
            } else {
                input.key_up(key);
            }
        }
    }
}

impl ReplaySequence {
    /// Built-in input for runs without a replay file: settle, run right, hop,
    /// run back left, then a held jump and a tapped jump.
    pub fn demo(fixed_dt: f64) -> Self {
        let hold = |left, right, jump, repeat| ReplayFrame {
            left,
            right,
            jump,
            repeat,
            ..ReplayFrame::default()
        };
        Self {
            fixed_dt,
            frames: vec![
                hold(false, false, false, 60),
                hold(false, true, false, 45),
                hold(false, true, true, 30),
                hold(false, false, false, 30),
                hold(true, false, false, 60),
                hold(false, false, true, 40),
                hold(false, false, false, 20),
                hold(false, false, true, 4),
                hold(false, false, false, 60),
            ],
        }
    }

    /// One frame per step, with `repeat` unrolled. One-shot events stay on
    /// the first copy only.
    pub fn expanded_frames(&self) -> Vec<ReplayFrame> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for i in 0..frame.repeat.max(1) {
                let mut copy = ReplayFrame { repeat: 1, ..*frame };
                if i > 0 {
                    copy.toggle_colliders = false;
                    copy.resize = None;
                }
                out.push(copy);
            }
        }
        out
    }

    /// Per-step snapshots on a clock starting at zero.
    #[cfg(test)]
    pub fn snapshots(&self) -> Vec<hop_core::InputSnapshot> {
        let mut input = InputState::new();
        let dt = self.fixed_dt as f32;
        self.expanded_frames()
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                frame.apply(&mut input);
                let snapshot = input.snapshot((i + 1) as f64 * self.fixed_dt, dt);
                input.end_frame();
                snapshot
            })
            .collect()
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if !(replay.fixed_dt > 0.0) {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f64 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}
