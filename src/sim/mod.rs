//! Simulation building blocks shared by the engines
//!
//! All state mutation here is plain data manipulation:
//! - No drawing or platform calls
//! - Randomness only through the caller's seeded RNG

pub mod collision;
pub mod entity;
pub mod particles;

pub use collision::{Contact, circle_contact, circles_overlap, outside_bounds, point_in_circle};
pub use entity::{
    Asteroid, Combatant, Comet, Laser, MotherShip, Planet, PowerUp, PowerUpKind, Ship, Star, Sun,
};
pub use particles::{Burst, Particle, ParticleSystem};
