//! Short-lived visual particles
//!
//! Particles never affect gameplay. They are born in bursts on events and
//! pruned as soon as their lifetime runs out.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Index into the particle palette
    pub color: u8,
    /// Seconds left
    pub life: f32,
    /// Seconds at birth
    pub max_life: f32,
    pub size: f32,
}

impl Particle {
    /// Remaining life in [0, 1], used for fading
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Shape of a burst
#[derive(Debug, Clone, Copy)]
pub struct Burst {
    pub origin: Vec2,
    pub count: usize,
    pub min_speed: f32,
    pub max_speed: f32,
    pub lifetime: f32,
    pub color: u8,
    pub size: f32,
}

/// Capped particle pool; the oldest particles are dropped first
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    cap: usize,
}

impl ParticleSystem {
    pub fn new(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap.min(256)),
            cap,
        }
    }

    /// Emit `burst.count` particles spreading in random directions
    pub fn burst<R: Rng>(&mut self, rng: &mut R, burst: Burst) {
        if self.cap == 0 {
            return;
        }
        for _ in 0..burst.count {
            let angle = rng.random_range(0.0_f32..std::f32::consts::TAU);
            let speed = if burst.max_speed > burst.min_speed {
                rng.random_range(burst.min_speed..burst.max_speed)
            } else {
                burst.min_speed
            };
            let life = burst.lifetime * rng.random_range(0.6_f32..1.0);
            self.push(Particle {
                pos: burst.origin,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color: burst.color,
                life,
                max_life: life,
                size: burst.size * rng.random_range(0.5_f32..1.0),
            });
        }
    }

    pub fn push(&mut self, particle: Particle) {
        if self.cap == 0 {
            return;
        }
        if self.particles.len() >= self.cap {
            let excess = self.particles.len() + 1 - self.cap;
            self.particles.drain(..excess);
        }
        self.particles.push(particle);
    }

    /// Move particles, apply drag, and prune the expired ones
    pub fn advance(&mut self, dt: f32, drag: f32) {
        let keep = (1.0 - drag * dt).clamp(0.0, 1.0);
        for p in self.particles.iter_mut() {
            p.pos += p.vel * dt;
            p.vel *= keep;
            p.life -= dt;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}
