//! Times Tables game engines
//!
//! Core modules:
//! - `engine`: Lifecycle contract, frame loop and error recovery
//! - `surface`: Canvas abstraction engines draw into
//! - `sim`: Entity records, particles and collision helpers
//! - `arcade`: Space-shooter engine
//! - `orbital`: Galaxy map engine
//! - `battle`: Turn-based boss battle engine
//! - `services`: Injected collaborators (questions, cosmetics, audio, timers)
//! - `platform`: Headless and browser hosts

pub mod arcade;
pub mod battle;
pub mod config;
pub mod engine;
pub mod error;
pub mod orbital;
pub mod platform;
pub mod services;
pub mod sim;
pub mod surface;

pub use config::{ArcadeConfig, BattleConfig, OrbitalConfig, QualityPreset};
pub use engine::{Engine, EngineKind};
pub use error::{EngineError, SurfaceError};
pub use services::Services;

use glam::Vec2;

/// Game-wide constants
pub mod consts {
    /// Nominal frame step (60 Hz display)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Longest step a single frame may simulate (tab switches, stalls)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arcade lives at the start of a run
    pub const STARTING_LIVES: u8 = 3;
    /// Correct answers needed per arcade level
    pub const ANSWERS_PER_LEVEL: u32 = 5;

    /// Player health at the start of every battle
    pub const PLAYER_MAX_HEALTH: u32 = 100;
    /// Delay before a broken battle reports the player defeated
    pub const ERROR_DEFEAT_DELAY_MS: u32 = 2000;

    /// Multiplication tables shown on the galaxy map
    pub const FIRST_TABLE: u8 = 2;
    pub const LAST_TABLE: u8 = 10;
    pub const PLANET_COUNT: usize = (LAST_TABLE - FIRST_TABLE + 1) as usize;
    pub const STAR_COUNT: usize = 100;

    /// Fallback notices
    pub const RENDER_ERROR_MESSAGE: &str = "Oops! A render error occurred.";
    pub const BATTLE_ERROR_MESSAGE: &str = "A battle error occurred. Returning to the map...";
}

/// Convert polar (r, theta) to cartesian offset
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Wrap an angle to [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-5);
    }

    #[test]
    fn test_polar_to_cartesian() {
        let p = polar_to_cartesian(10.0, PI / 2.0);
        assert!(p.x.abs() < 1e-4);
        assert!((p.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_planet_count_matches_tables() {
        assert_eq!(consts::PLANET_COUNT, 9);
    }
}
