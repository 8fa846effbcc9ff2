//! Engine tunables
//!
//! Each engine takes its config at construction and never mutates it.
//! Configs round-trip through JSON so hosts can ship balance tweaks as data.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 60,
            QualityPreset::Medium => 200,
            QualityPreset::High => 500,
        }
    }

    /// Particles per explosion burst
    pub fn burst_size(&self) -> usize {
        match self {
            QualityPreset::Low => 6,
            QualityPreset::Medium => 14,
            QualityPreset::High => 24,
        }
    }
}

/// Visual effect switches shared by all engines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub quality: QualityPreset,
    /// Minimize shake and flashes
    pub reduced_motion: bool,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            reduced_motion: false,
        }
    }
}

impl EffectsConfig {
    pub fn max_particles(&self) -> usize {
        self.quality.max_particles()
    }

    pub fn burst_size(&self) -> usize {
        self.quality.burst_size()
    }

    /// Scale for shake/flash intensities (0 under reduced motion)
    pub fn motion_scale(&self) -> f32 {
        if self.reduced_motion { 0.0 } else { 1.0 }
    }
}

/// Space-shooter tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    /// RNG seed for spawns and particle spread
    pub seed: u64,
    /// Ship horizontal speed (px/s)
    pub ship_speed: f32,
    pub ship_size: f32,
    /// Base asteroid fall speed at level 1 (px/s)
    pub asteroid_speed: f32,
    pub asteroid_min_size: f32,
    pub asteroid_max_size: f32,
    /// Expected asteroid spawns per second at level 1
    pub asteroid_spawn_rate: f32,
    /// Laser speed (px/s, upward)
    pub laser_speed: f32,
    /// Seconds between shots (halved under rapid fire)
    pub fire_cooldown: f32,
    /// Particle lifetime (s)
    pub particle_lifetime: f32,
    /// Chance per second of a power-up appearing
    pub power_up_chance: f32,
    pub power_up_speed: f32,
    /// Duration of shield and rapid-fire power-ups (s)
    pub power_up_duration: f32,
    /// Added to speed and spawn rate per level above 1 (0.25 = +25%)
    pub difficulty_scale: f32,
    /// Invulnerability window after losing a life (s)
    pub invulnerable_time: f32,
    /// Score for shooting an asteroid
    pub asteroid_score: u32,
    /// Score per correct answer, multiplied by the level
    pub answer_score: u32,
    pub effects: EffectsConfig,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED_A4CA,
            ship_speed: 320.0,
            ship_size: 40.0,
            asteroid_speed: 70.0,
            asteroid_min_size: 18.0,
            asteroid_max_size: 42.0,
            asteroid_spawn_rate: 0.8,
            laser_speed: 520.0,
            fire_cooldown: 0.3,
            particle_lifetime: 0.8,
            power_up_chance: 0.06,
            power_up_speed: 90.0,
            power_up_duration: 8.0,
            difficulty_scale: 0.25,
            invulnerable_time: 1.5,
            asteroid_score: 5,
            answer_score: 10,
            effects: EffectsConfig::default(),
        }
    }
}

impl ArcadeConfig {
    /// Multiplier applied to speed and spawn rate at `level` (1-based)
    pub fn level_factor(&self, level: u32) -> f32 {
        1.0 + level.saturating_sub(1) as f32 * self.difficulty_scale
    }
}

/// Galaxy map tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitalConfig {
    /// Seed for the star field
    pub seed: u64,
    pub sun_radius: f32,
    /// Innermost planet orbit as a fraction of the shorter surface side
    pub inner_orbit: f32,
    /// Outermost planet orbit as a fraction of the shorter surface side
    pub outer_orbit: f32,
    /// Angular speed of the innermost planet (rad/s)
    pub orbit_speed: f32,
    /// Sun pulse frequency (rad/s)
    pub pulse_speed: f32,
    /// Comet angular speed with no streak (rad/s)
    pub comet_speed: f32,
    /// Mother ship drift speed (px/s)
    pub mother_ship_speed: f32,
    pub effects: EffectsConfig,
}

impl Default for OrbitalConfig {
    fn default() -> Self {
        Self {
            seed: 0x0A1A_C71C,
            sun_radius: 36.0,
            inner_orbit: 0.12,
            outer_orbit: 0.46,
            orbit_speed: 0.35,
            pulse_speed: 2.0,
            comet_speed: 0.4,
            mother_ship_speed: 40.0,
            effects: EffectsConfig::default(),
        }
    }
}

/// Boss battle tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub seed: u64,
    /// Damage dealt by a correct player-turn answer
    pub player_damage: u32,
    /// Damage dealt by the boss when the player misses a boss-turn question
    pub boss_damage: u32,
    /// Damage the boss still lands when the player answers correctly (blocked)
    pub blocked_damage: u32,
    /// Correct player-turn answers needed to charge the super attack
    pub super_attack_threshold: u32,
    /// Super attack damage multiplier
    pub super_attack_multiplier: f32,
    /// Extra damage per streak step beyond the second
    pub streak_bonus: u32,
    /// Streak bonus cap
    pub max_streak_bonus: u32,
    pub particle_lifetime: f32,
    pub effects: EffectsConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 0xB055_BA77,
            player_damage: 20,
            boss_damage: 15,
            blocked_damage: 0,
            super_attack_threshold: 3,
            super_attack_multiplier: 2.5,
            streak_bonus: 5,
            max_streak_bonus: 15,
            particle_lifetime: 0.9,
            effects: EffectsConfig::default(),
        }
    }
}

/// Parse any engine config from JSON; missing fields take defaults
pub fn from_json<T: for<'de> Deserialize<'de>>(json: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_factor() {
        let config = ArcadeConfig::default();
        assert_eq!(config.level_factor(1), 1.0);
        assert_eq!(config.level_factor(0), 1.0);
        assert!((config.level_factor(3) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ArcadeConfig = from_json(r#"{"ship_speed": 100.0}"#).unwrap();
        assert_eq!(config.ship_speed, 100.0);
        assert_eq!(config.laser_speed, ArcadeConfig::default().laser_speed);
    }

    #[test]
    fn test_battle_config_json() {
        let config: BattleConfig =
            from_json(r#"{"super_attack_threshold": 5, "effects": {"reduced_motion": true}}"#)
                .unwrap();
        assert_eq!(config.super_attack_threshold, 5);
        assert_eq!(config.effects.motion_scale(), 0.0);
        assert_eq!(config.effects.quality, QualityPreset::Medium);
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert!(QualityPreset::Low.max_particles() < QualityPreset::High.max_particles());
    }
}
