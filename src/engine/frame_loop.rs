//! Frame scheduling for the continuous engines
//!
//! Hosts call [`run_frame`] once per display refresh; it returns whether the
//! next frame should be scheduled, so `stop()` takes effect cooperatively
//! after the frame in flight.

use super::Engine;
use crate::consts::{FRAME_DT, MAX_FRAME_DT};

/// `stopped → running ⇄ paused → stopped`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationLoop {
    running: bool,
    paused: bool,
}

impl SimulationLoop {
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stopping also clears any pause
    pub fn stop(&mut self) {
        self.running = false;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        if self.running {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Turns host timestamps (ms) into clamped frame deltas (s)
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) if now_ms > last => ((now_ms - last) / 1000.0) as f32,
            Some(_) => 0.0,
            None => FRAME_DT,
        };
        self.last_ms = Some(now_ms);
        dt.min(MAX_FRAME_DT)
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Run one frame: `update` then `render`. Returns whether to schedule another.
pub fn run_frame(engine: &mut dyn Engine, dt: f32) -> bool {
    if !engine.is_running() {
        return false;
    }
    engine.update(dt);
    engine.render();
    engine.is_running()
}

/// Drive `engine` for up to `frames` fixed steps. Returns the frames run.
pub fn run_headless(engine: &mut dyn Engine, frames: usize, dt: f32) -> usize {
    let mut ran = 0;
    while ran < frames {
        let more = run_frame(engine, dt);
        ran += 1;
        if !more {
            break;
        }
    }
    ran
}
