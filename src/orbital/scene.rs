//! Galaxy map scene graph
//!
//! The topology (sun, one planet per table, star field) is fixed at build
//! time; only angles and phases move afterwards.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::OrbitalConfig;
use crate::consts::{FIRST_TABLE, PLANET_COUNT, STAR_COUNT};
use crate::sim::{Comet, MotherShip, Planet, Star, Sun, point_in_circle};
use crate::{polar_to_cartesian, wrap_angle};

/// Extra hit-test slack around planets for small fingers (px)
const HIT_PADDING: f32 = 8.0;
/// Streak at which the comet stops moving outward
const MAX_COMET_STREAK: u32 = 10;
const TWINKLE_SPEED: f32 = 1.7;
const MOTHER_SHIP_MARGIN: f32 = 40.0;

#[derive(Debug, Clone)]
pub struct OrbitalScene {
    pub width: f32,
    pub height: f32,
    pub center: Vec2,
    pub sun: Sun,
    pub planets: Vec<Planet>,
    pub stars: Vec<Star>,
    pub mother_ship: MotherShip,
    pub comet: Comet,
    pub time: f32,
}

impl OrbitalScene {
    pub fn build(
        width: f32,
        height: f32,
        config: &OrbitalConfig,
        rng: &mut Pcg32,
        ship_icon: &str,
    ) -> Self {
        let center = Vec2::new(width / 2.0, height / 2.0);
        let span = width.min(height);

        let planets = (0..PLANET_COUNT)
            .map(|i| {
                let t = i as f32 / (PLANET_COUNT - 1) as f32;
                Planet {
                    table: FIRST_TABLE + i as u8,
                    angle: i as f32 * TAU / PLANET_COUNT as f32,
                    distance: (config.inner_orbit + (config.outer_orbit - config.inner_orbit) * t)
                        * span,
                    radius: 12.0 + (i % 3) as f32 * 3.0,
                    variant: i as u8,
                    orbit_speed: config.orbit_speed / (1.0 + i as f32 * 0.15),
                    mastery: 0.0,
                }
            })
            .collect();

        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                pos: Vec2::new(rng.random::<f32>() * width, rng.random::<f32>() * height),
                size: rng.random_range(0.5_f32..2.5),
                brightness: rng.random_range(0.3_f32..1.0),
                twinkle_phase: rng.random_range(0.0_f32..TAU),
            })
            .collect();

        let mut scene = Self {
            width,
            height,
            center,
            sun: Sun {
                radius: config.sun_radius,
                phase: 0.0,
            },
            planets,
            stars,
            mother_ship: MotherShip {
                pos: Vec2::new(MOTHER_SHIP_MARGIN, height * 0.12),
                icon: ship_icon.to_string(),
                phase: 0.0,
                heading: 1.0,
            },
            comet: Comet {
                angle: 0.0,
                distance: 0.0,
                streak: 0,
            },
            time: 0.0,
        };
        scene.set_streak(0, config);
        scene
    }

    /// Comet distance grows with the streak, out past the last planet
    pub fn set_streak(&mut self, streak: u32, config: &OrbitalConfig) {
        let span = self.width.min(self.height);
        let steps = streak.min(MAX_COMET_STREAK) as f32 / MAX_COMET_STREAK as f32;
        self.comet.streak = streak;
        self.comet.distance =
            config.sun_radius * 1.5 + (config.outer_orbit * span - config.sun_radius) * steps;
    }

    pub fn advance(&mut self, config: &OrbitalConfig, dt: f32) {
        self.time += dt;

        for planet in &mut self.planets {
            planet.angle = wrap_angle(planet.angle + planet.orbit_speed * dt);
        }
        if !config.effects.reduced_motion {
            self.sun.phase = wrap_angle(self.sun.phase + config.pulse_speed * dt);
            for star in &mut self.stars {
                star.twinkle_phase = wrap_angle(star.twinkle_phase + TWINKLE_SPEED * dt);
            }
        }

        let streak_boost = 1.0 + self.comet.streak.min(MAX_COMET_STREAK) as f32 * 0.1;
        self.comet.angle = wrap_angle(self.comet.angle + config.comet_speed * streak_boost * dt);

        let ship = &mut self.mother_ship;
        ship.phase = wrap_angle(ship.phase + 2.0 * dt);
        ship.pos.x += ship.heading * config.mother_ship_speed * dt;
        let right = (self.width - MOTHER_SHIP_MARGIN).max(MOTHER_SHIP_MARGIN);
        if ship.pos.x >= right {
            ship.pos.x = right;
            ship.heading = -1.0;
        } else if ship.pos.x <= MOTHER_SHIP_MARGIN {
            ship.pos.x = MOTHER_SHIP_MARGIN;
            ship.heading = 1.0;
        }
    }

    pub fn planet_position(&self, planet: &Planet) -> Vec2 {
        self.center + polar_to_cartesian(planet.distance, planet.angle)
    }

    pub fn comet_position(&self) -> Vec2 {
        self.center + polar_to_cartesian(self.comet.distance, self.comet.angle)
    }

    /// Table of the planet under `point`, nearest first
    pub fn planet_at(&self, point: Vec2) -> Option<u8> {
        self.planets
            .iter()
            .filter(|p| point_in_circle(point, self.planet_position(p), p.radius + HIT_PADDING))
            .min_by(|a, b| {
                let da = self.planet_position(a).distance_squared(point);
                let db = self.planet_position(b).distance_squared(point);
                da.total_cmp(&db)
            })
            .map(|p| p.table)
    }

    pub fn planet(&self, table: u8) -> Option<&Planet> {
        self.planets.iter().find(|p| p.table == table)
    }

    pub fn planet_mut(&mut self, table: u8) -> Option<&mut Planet> {
        self.planets.iter_mut().find(|p| p.table == table)
    }
}
