//! Arcade world state
//!
//! Everything the space-shooter simulates lives here; the engine wraps it
//! with a surface, callbacks and the error policy.

use glam::Vec2;

use crate::config::ArcadeConfig;
use crate::consts::{ANSWERS_PER_LEVEL, STARTING_LIVES};
use crate::sim::{Asteroid, Laser, ParticleSystem, PowerUp, Ship};

/// Lives can be topped up by power-ups, but not past this
pub const MAX_LIVES: u8 = 5;

/// Ship distance from the bottom edge, as a multiple of its size
const SHIP_BOTTOM_MARGIN: f32 = 1.5;

/// Complete arcade world
#[derive(Debug, Clone)]
pub struct ArcadeWorld {
    pub width: f32,
    pub height: f32,
    pub lives: u8,
    pub score: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    /// `None` until the ship has been spawned
    pub ship: Option<Ship>,
    pub asteroids: Vec<Asteroid>,
    pub lasers: Vec<Laser>,
    pub power_ups: Vec<PowerUp>,
    pub particles: ParticleSystem,
    /// Seconds simulated since the last reset
    pub time: f32,
    /// Screen shake intensity (0-1, decays)
    pub shake: f32,
    next_id: u32,
}

impl ArcadeWorld {
    /// An empty world with no ship
    pub fn new(width: f32, height: f32, max_particles: usize) -> Self {
        Self {
            width,
            height,
            lives: STARTING_LIVES,
            score: 0,
            questions_answered: 0,
            correct_answers: 0,
            ship: None,
            asteroids: Vec::new(),
            lasers: Vec::new(),
            power_ups: Vec::new(),
            particles: ParticleSystem::new(max_particles),
            time: 0.0,
            shake: 0.0,
            next_id: 1,
        }
    }

    /// Back to a fresh run: full lives, zero score, empty sky, new ship
    pub fn reset(&mut self, config: &ArcadeConfig, ship_icon: &str) {
        self.lives = STARTING_LIVES;
        self.score = 0;
        self.questions_answered = 0;
        self.correct_answers = 0;
        self.asteroids.clear();
        self.lasers.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.time = 0.0;
        self.shake = 0.0;
        self.next_id = 1;
        self.spawn_ship(config, ship_icon);
    }

    /// Place the ship centered horizontally near the bottom edge
    pub fn spawn_ship(&mut self, config: &ArcadeConfig, icon: &str) {
        let pos = Vec2::new(
            self.width / 2.0,
            self.height - config.ship_size * SHIP_BOTTOM_MARGIN,
        );
        self.ship = Some(Ship::new(pos, config.ship_size, icon));
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Current level (1-based), rising every few correct answers
    pub fn level(&self) -> u32 {
        1 + self.correct_answers / ANSWERS_PER_LEVEL
    }

    pub fn is_game_over(&self) -> bool {
        self.lives == 0
    }
}
