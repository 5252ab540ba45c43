//! Fixed-timestep clock.
//!
//! Wall-clock (or scripted) frame time feeds an accumulator; the simulation
//! consumes it in `fixed_dt` slices via `should_step()`. `now` advances only
//! with consumed steps, so it is the monotonic timestamp the jump buffer reads.

use std::time::Instant;

pub struct TimeState {
    pub fixed_dt: f64,
    /// Longest frame fed into the accumulator; anything longer is capped.
    pub max_frame_dt: f64,
    accumulator: f64,
    /// Simulated seconds, advanced by `fixed_dt` per consumed step.
    pub now: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Option<Instant>,
    pub interpolation_alpha: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_fixed_dt(1.0 / 60.0)
    }

    pub fn with_fixed_dt(fixed_dt: f64) -> Self {
        Self {
            fixed_dt,
            max_frame_dt: 0.25,
            accumulator: 0.0,
            now: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: None,
            interpolation_alpha: 0.0,
        }
    }

    /// Start a frame measured against the wall clock.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = match self.last_instant {
            Some(last) => now.duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        self.last_instant = Some(now);
        self.begin_frame_with(real_dt);
    }

    /// Start a frame with an externally supplied elapsed time.
    pub fn begin_frame_with(&mut self, real_dt: f64) {
        self.real_dt = real_dt.max(0.0);

        // Spiral-of-death cap
        if self.real_dt > self.max_frame_dt {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_frame_dt * 1000.0
            );
            self.real_dt = self.max_frame_dt;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        // Small slack so a frame of exactly fixed_dt is not lost to rounding.
        if self.accumulator + 1e-9 >= self.fixed_dt {
            self.accumulator = (self.accumulator - self.fixed_dt).max(0.0);
            self.now += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn step_dt(&self) -> f32 {
        self.fixed_dt as f32
    }

    pub fn end_frame(&mut self) {
        self.interpolation_alpha = self.accumulator / self.fixed_dt;
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
