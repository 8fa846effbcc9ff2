//! Entity records for every game mode
//!
//! Plain data: the engines own these in their world lists and mutate them
//! each frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The player's ship in the arcade mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub size: f32,
    /// Equipped glyph from the shop
    pub icon: String,
    /// Steering input in [-1, 1]
    pub steer: f32,
    /// Seconds of invulnerability left after a hit
    pub invulnerable: f32,
    /// Seconds of shield left
    pub shield: f32,
    /// Seconds of rapid fire left
    pub rapid_fire: f32,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
}

impl Ship {
    pub fn new(pos: Vec2, size: f32, icon: impl Into<String>) -> Self {
        Self {
            pos,
            size,
            icon: icon.into(),
            steer: 0.0,
            invulnerable: 0.0,
            shield: 0.0,
            rapid_fire: 0.0,
            fire_cooldown: 0.0,
        }
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    /// Collisions hurt only when neither shield nor invulnerability is up
    pub fn is_vulnerable(&self) -> bool {
        self.invulnerable <= 0.0 && self.shield <= 0.0
    }

    /// Count down all timers by `dt`
    pub fn tick_timers(&mut self, dt: f32) {
        self.invulnerable = (self.invulnerable - dt).max(0.0);
        self.shield = (self.shield - dt).max(0.0);
        self.rapid_fire = (self.rapid_fire - dt).max(0.0);
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
    }
}

/// A falling asteroid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub rotation: f32,
    pub spin: f32,
    /// Visual variant (shape/shade)
    pub variant: u8,
}

impl Asteroid {
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }
}

/// A laser bolt fired by the ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    RapidFire,
    ExtraLife,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Shield,
        PowerUpKind::RapidFire,
        PowerUpKind::ExtraLife,
    ];

    pub fn icon(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "🛡️",
            PowerUpKind::RapidFire => "⚡",
            PowerUpKind::ExtraLife => "❤️",
        }
    }
}

/// A drifting power-up capsule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
}

/// The galaxy map's central sun
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sun {
    pub radius: f32,
    /// Pulse phase (radians)
    pub phase: f32,
}

impl Sun {
    /// Current drawn radius including the pulse
    pub fn pulsed_radius(&self) -> f32 {
        self.radius * (1.0 + 0.06 * self.phase.sin())
    }
}

/// One planet per multiplication table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub table: u8,
    /// Orbit angle (radians)
    pub angle: f32,
    /// Orbit distance from the sun (px)
    pub distance: f32,
    pub radius: f32,
    /// Palette/visual variant
    pub variant: u8,
    /// Angular speed (rad/s)
    pub orbit_speed: f32,
    /// Player mastery of this table in [0, 1]
    pub mastery: f32,
}

/// A background star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub brightness: f32,
    pub twinkle_phase: f32,
}

/// The player's mother ship drifting across the map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotherShip {
    pub pos: Vec2,
    pub icon: String,
    /// Bobbing phase (radians)
    pub phase: f32,
    /// Horizontal direction of travel (+1 or -1)
    pub heading: f32,
}

/// Comet orbiting the sun; farther and faster with a longer streak
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comet {
    pub angle: f32,
    pub distance: f32,
    pub streak: u32,
}

impl Comet {
    pub fn is_visible(&self) -> bool {
        self.streak > 0
    }
}

/// Boss or player in a battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub avatar: String,
    pub health: u32,
    pub max_health: u32,
}

impl Combatant {
    /// A combatant at full health
    pub fn new(name: impl Into<String>, avatar: impl Into<String>, health: u32) -> Self {
        Self {
            name: name.into(),
            avatar: avatar.into(),
            health,
            max_health: health,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ship_vulnerability_windows() {
        let mut ship = Ship::new(Vec2::ZERO, 40.0, "🚀");
        assert!(ship.is_vulnerable());
        ship.shield = 1.0;
        assert!(!ship.is_vulnerable());
        ship.tick_timers(2.0);
        assert_eq!(ship.shield, 0.0);
        assert!(ship.is_vulnerable());
    }

    #[test]
    fn test_comet_hidden_without_streak() {
        let comet = Comet {
            angle: 0.0,
            distance: 10.0,
            streak: 0,
        };
        assert!(!comet.is_visible());
    }

    #[test]
    fn test_combatant_starts_full() {
        let boss = Combatant::new("Zorg", "👾", 150);
        assert_eq!(boss.health, 150);
        assert_eq!(boss.max_health, 150);
    }
}
