//! Motion integration for the player character.
//!
//! One call per fixed step: read the input snapshot, update velocity from
//! run input, damping, gravity and the jump policy, then move. Collision is
//! resolved afterwards by `collision::resolve_corners`, which may push the
//! character back out and re-assert `grounded`.

use hop_core::{InputSnapshot, Rect};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Horizontal acceleration while a direction is held (units/s^2).
    pub acceleration: f32,
    /// Exponential horizontal damping rate (1/s), applied every step.
    pub damping: f32,
    pub max_speed: f32,
    /// Downward acceleration (units/s^2). y grows downward.
    pub gravity: f32,
    /// Vertical velocity set on jump; negative is up.
    pub jump_impulse: f32,
    /// Upward speed is clamped to this while jump is released.
    pub jump_cutoff: f32,
    /// Seconds a jump press or a ground contact stays valid.
    pub jump_grace: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            acceleration: 900.0,
            damping: 5.0,
            max_speed: 150.0,
            gravity: 500.0,
            jump_impulse: -220.0,
            jump_cutoff: -80.0,
            jump_grace: 0.1,
        }
    }
}

/// Collision box relative to the character position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    rect: Rect,
}

impl Hitbox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Result<Self, String> {
        if !(width > 0.0 && height > 0.0) {
            return Err(format!(
                "Hitbox validation failed: width and height must be > 0 (got {width}x{height})"
            ));
        }
        Ok(Self {
            rect: Rect::new(x, y, width, height),
        })
    }

    pub fn world(&self, x: f32, y: f32) -> Rect {
        self.rect.offset(x, y)
    }

    pub fn corner(&self, x: f32, y: f32, corner: Corner) -> (f32, f32) {
        let r = self.world(x, y);
        match corner {
            Corner::TopLeft => (r.x, r.y),
            Corner::BottomLeft => (r.x, r.bottom()),
            Corner::TopRight => (r.right(), r.y),
            Corner::BottomRight => (r.right(), r.bottom()),
        }
    }
}

const GRACE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl Corner {
    /// Probe order for collision resolution. Later probes see corrections made
    /// by earlier ones, so this order is part of the simulation's behavior.
    pub const PROBE_ORDER: [Corner; 4] = [
        Corner::TopLeft,
        Corner::BottomLeft,
        Corner::TopRight,
        Corner::BottomRight,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Character {
    pub x: f32,
    pub y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    /// Set by collision only on the step a landing was resolved.
    pub grounded: bool,
    pub last_jump_input: Option<f64>,
    pub last_grounded: Option<f64>,
}

impl Character {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn integrate(&mut self, input: &InputSnapshot, config: &ControllerConfig) {
        let dt = input.dt;
        let now = input.now;

        // The ground flag describes the previous step's resolution; keep its
        // timestamp for coyote time and let collision re-assert it.
        if self.grounded {
            self.last_grounded = Some(now);
        }
        self.grounded = false;

        if input.jump_pressed {
            self.last_jump_input = Some(now);
        }

        if input.left {
            self.velocity_x -= config.acceleration * dt;
        }
        if input.right {
            self.velocity_x += config.acceleration * dt;
        }
        self.velocity_x /= 1.0 + config.damping * dt;
        self.velocity_x = self.velocity_x.clamp(-config.max_speed, config.max_speed);

        self.velocity_y += config.gravity * dt;

        if self.jump_buffered(now, config.jump_grace) {
            self.jump(now, config);
        }

        if !input.jump_held && self.velocity_y < config.jump_cutoff {
            self.velocity_y = config.jump_cutoff;
        }

        self.x += self.velocity_x * dt;
        self.y += self.velocity_y * dt;
    }

    /// Called after collision resolved a floor contact at `now`. Stamps the
    /// ground time and fires a jump pressed within the grace window before it.
    pub fn landed(&mut self, now: f64, config: &ControllerConfig) {
        self.last_grounded = Some(now);
        if self.jump_buffered(now, config.jump_grace) {
            self.jump(now, config);
        }
    }

    fn jump(&mut self, now: f64, config: &ControllerConfig) {
        self.velocity_y = config.jump_impulse;
        self.last_jump_input = None;
        self.last_grounded = None;
        log::debug!("Jump at t={now:.3} from ({:.1}, {:.1})", self.x, self.y);
    }

    fn jump_buffered(&self, now: f64, grace: f64) -> bool {
        // Step timestamps accumulate f32 dt; keep an exact multiple of dt inside.
        let within = |mark: Option<f64>| mark.is_some_and(|t| now - t <= grace + GRACE_EPSILON);
        within(self.last_jump_input) && within(self.last_grounded)
    }
}
