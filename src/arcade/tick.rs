//! Per-frame arcade simulation
//!
//! Advances the world by one variable step and reports what happened as
//! [`ArcadeEvent`]s; the engine turns those into sounds and host callbacks.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{ArcadeWorld, MAX_LIVES};
use crate::config::ArcadeConfig;
use crate::sim::{
    Asteroid, Burst, Laser, PowerUp, PowerUpKind, circles_overlap, outside_bounds,
};

/// Particle palette slots used by the arcade
pub mod palette {
    pub const EXPLOSION: u8 = 0;
    pub const SPARK: u8 = 1;
    pub const SHIELD: u8 = 2;
    pub const DAMAGE: u8 = 3;
    pub const CELEBRATION: u8 = 5;
}

const LASER_SIZE: f32 = 6.0;
const POWER_UP_SIZE: f32 = 28.0;
/// Particle velocity damping (per second)
const PARTICLE_DRAG: f32 = 1.5;
/// Shake decay (per second)
const SHAKE_DECAY: f32 = 3.0;

/// Something the host or audio may want to hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcadeEvent {
    AsteroidDestroyed { id: u32 },
    ShieldAbsorbed,
    LifeLost { remaining: u8 },
    PowerUpCollected(PowerUpKind),
    GameOver,
}

/// Advance the world by `dt` seconds
pub fn tick(
    world: &mut ArcadeWorld,
    config: &ArcadeConfig,
    rng: &mut Pcg32,
    dt: f32,
    events: &mut Vec<ArcadeEvent>,
) {
    // Nothing to simulate until the ship exists
    let Some(ship) = world.ship.as_mut() else {
        return;
    };

    world.time += dt;

    ship.tick_timers(dt);
    let half = ship.radius();
    ship.pos.x = (ship.pos.x + ship.steer * config.ship_speed * dt)
        .clamp(half, (world.width - half).max(half));

    for asteroid in &mut world.asteroids {
        asteroid.pos += asteroid.vel * dt;
        asteroid.rotation += asteroid.spin * dt;
    }
    for laser in &mut world.lasers {
        laser.pos += laser.vel * dt;
    }
    for power_up in &mut world.power_ups {
        power_up.pos += power_up.vel * dt;
    }
    world.particles.advance(dt, PARTICLE_DRAG);
    world.shake = (world.shake - SHAKE_DECAY * dt).max(0.0);

    spawn(world, config, rng, dt);
    resolve_laser_hits(world, config, rng, events);
    resolve_ship_hits(world, config, rng, events);
    collect_power_ups(world, config, rng, events);

    let (w, h) = (world.width, world.height);
    world
        .asteroids
        .retain(|a| !(a.pos.y - a.radius() > h || outside_bounds(a.pos, a.radius() * 4.0, w, h)));
    world.lasers.retain(|l| !outside_bounds(l.pos, l.size, w, h));
    world.power_ups.retain(|p| p.pos.y - p.size < h);
}

/// Probabilistic spawning, scaled by level
fn spawn(world: &mut ArcadeWorld, config: &ArcadeConfig, rng: &mut Pcg32, dt: f32) {
    let factor = config.level_factor(world.level());

    if rng.random::<f32>() < config.asteroid_spawn_rate * factor * dt {
        let size = if config.asteroid_max_size > config.asteroid_min_size {
            rng.random_range(config.asteroid_min_size..config.asteroid_max_size)
        } else {
            config.asteroid_min_size
        };
        let x = random_x(rng, world.width, size / 2.0);
        let speed = config.asteroid_speed * factor * rng.random_range(0.8_f32..1.2);
        let id = world.next_entity_id();
        world.asteroids.push(Asteroid {
            id,
            pos: Vec2::new(x, -size / 2.0),
            vel: Vec2::new(rng.random_range(-20.0_f32..20.0), speed),
            size,
            rotation: 0.0,
            spin: rng.random_range(-2.0_f32..2.0),
            variant: rng.random_range(0..3),
        });
    }

    if rng.random::<f32>() < config.power_up_chance * dt {
        let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
        let x = random_x(rng, world.width, POWER_UP_SIZE / 2.0);
        let id = world.next_entity_id();
        world.power_ups.push(PowerUp {
            id,
            kind,
            pos: Vec2::new(x, -POWER_UP_SIZE / 2.0),
            vel: Vec2::new(0.0, config.power_up_speed),
            size: POWER_UP_SIZE,
        });
    }
}

fn random_x(rng: &mut Pcg32, width: f32, margin: f32) -> f32 {
    if width > margin * 2.0 {
        rng.random_range(margin..width - margin)
    } else {
        width / 2.0
    }
}

fn explosion(world: &mut ArcadeWorld, config: &ArcadeConfig, rng: &mut Pcg32, at: Vec2, color: u8) {
    world.particles.burst(
        rng,
        Burst {
            origin: at,
            count: config.effects.burst_size(),
            min_speed: 40.0,
            max_speed: 180.0,
            lifetime: config.particle_lifetime,
            color,
            size: 5.0,
        },
    );
}

/// Laser × asteroid: both destroyed, score awarded
fn resolve_laser_hits(
    world: &mut ArcadeWorld,
    config: &ArcadeConfig,
    rng: &mut Pcg32,
    events: &mut Vec<ArcadeEvent>,
) {
    let mut spent_lasers = Vec::new();
    let mut destroyed = Vec::new();

    for (li, laser) in world.lasers.iter().enumerate() {
        let hit = world.asteroids.iter().enumerate().find(|(ai, a)| {
            !destroyed.contains(ai)
                && circles_overlap(laser.pos, laser.size / 2.0, a.pos, a.radius())
        });
        if let Some((ai, _)) = hit {
            spent_lasers.push(li);
            destroyed.push(ai);
        }
    }

    destroyed.sort_unstable();
    for ai in destroyed.into_iter().rev() {
        let asteroid = world.asteroids.remove(ai);
        world.score += config.asteroid_score;
        explosion(world, config, rng, asteroid.pos, palette::EXPLOSION);
        events.push(ArcadeEvent::AsteroidDestroyed { id: asteroid.id });
    }
    spent_lasers.sort_unstable();
    for li in spent_lasers.into_iter().rev() {
        world.lasers.remove(li);
    }
}

/// Asteroid × ship: the asteroid breaks; the ship loses a life unless protected
fn resolve_ship_hits(
    world: &mut ArcadeWorld,
    config: &ArcadeConfig,
    rng: &mut Pcg32,
    events: &mut Vec<ArcadeEvent>,
) {
    let Some(ship) = world.ship.as_ref() else { return };
    let (ship_pos, ship_radius) = (ship.pos, ship.radius());

    let mut hits: Vec<usize> = world
        .asteroids
        .iter()
        .enumerate()
        .filter(|(_, a)| circles_overlap(ship_pos, ship_radius, a.pos, a.radius()))
        .map(|(i, _)| i)
        .collect();
    hits.sort_unstable();

    for ai in hits.into_iter().rev() {
        let asteroid = world.asteroids.remove(ai);
        let vulnerable = world.ship.as_ref().is_some_and(|s| s.is_vulnerable());

        if !vulnerable || world.lives == 0 {
            explosion(world, config, rng, asteroid.pos, palette::SHIELD);
            events.push(ArcadeEvent::ShieldAbsorbed);
            continue;
        }

        world.lives -= 1;
        world.shake = config.effects.motion_scale();
        if let Some(ship) = world.ship.as_mut() {
            ship.invulnerable = config.invulnerable_time;
        }
        explosion(world, config, rng, asteroid.pos, palette::DAMAGE);
        events.push(ArcadeEvent::LifeLost {
            remaining: world.lives,
        });
        if world.lives == 0 {
            events.push(ArcadeEvent::GameOver);
        }
    }
}

fn collect_power_ups(
    world: &mut ArcadeWorld,
    config: &ArcadeConfig,
    rng: &mut Pcg32,
    events: &mut Vec<ArcadeEvent>,
) {
    let Some(ship) = world.ship.as_ref() else { return };
    let (ship_pos, ship_radius) = (ship.pos, ship.radius());

    let (taken, left): (Vec<PowerUp>, Vec<PowerUp>) = world
        .power_ups
        .drain(..)
        .partition(|p| circles_overlap(ship_pos, ship_radius, p.pos, p.size / 2.0));
    world.power_ups = left;

    for power_up in taken {
        match power_up.kind {
            PowerUpKind::Shield => {
                if let Some(ship) = world.ship.as_mut() {
                    ship.shield = config.power_up_duration;
                }
            }
            PowerUpKind::RapidFire => {
                if let Some(ship) = world.ship.as_mut() {
                    ship.rapid_fire = config.power_up_duration;
                }
            }
            PowerUpKind::ExtraLife => {
                if world.lives > 0 {
                    world.lives = (world.lives + 1).min(MAX_LIVES);
                }
            }
        }
        explosion(world, config, rng, power_up.pos, palette::SPARK);
        events.push(ArcadeEvent::PowerUpCollected(power_up.kind));
    }
}

/// Fire a laser from the ship's nose if the cooldown allows. Returns whether
/// a shot was fired.
pub fn fire_laser(world: &mut ArcadeWorld, config: &ArcadeConfig) -> bool {
    let Some(ship) = world.ship.as_mut() else {
        return false;
    };
    if ship.fire_cooldown > 0.0 {
        return false;
    }
    ship.fire_cooldown = if ship.rapid_fire > 0.0 {
        config.fire_cooldown / 2.0
    } else {
        config.fire_cooldown
    };
    let nose = ship.pos - Vec2::new(0.0, ship.radius());
    let id = world.next_entity_id();
    world.lasers.push(Laser {
        id,
        pos: nose,
        vel: Vec2::new(0.0, -config.laser_speed),
        size: LASER_SIZE,
    });
    true
}

/// Apply an externally graded answer to the score and counters
pub fn record_answer(
    world: &mut ArcadeWorld,
    config: &ArcadeConfig,
    rng: &mut Pcg32,
    correct: bool,
) {
    world.questions_answered += 1;
    if correct {
        let level = world.level();
        world.correct_answers += 1;
        world.score += config.answer_score * level;
        if let Some(at) = world.ship.as_ref().map(|s| s.pos) {
            explosion(world, config, rng, at, palette::CELEBRATION);
        }
    } else {
        world.shake = 0.5 * config.effects.motion_scale();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Ship;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn quiet_config() -> ArcadeConfig {
        ArcadeConfig {
            asteroid_spawn_rate: 0.0,
            power_up_chance: 0.0,
            ..Default::default()
        }
    }

    fn world_with_ship(config: &ArcadeConfig) -> ArcadeWorld {
        let mut world = ArcadeWorld::new(800.0, 600.0, 200);
        world.reset(config, "🚀");
        world
    }

    fn asteroid_at(world: &mut ArcadeWorld, pos: Vec2) -> u32 {
        let id = world.next_entity_id();
        world.asteroids.push(Asteroid {
            id,
            pos,
            vel: Vec2::ZERO,
            size: 30.0,
            rotation: 0.0,
            spin: 0.0,
            variant: 0,
        });
        id
    }

    #[test]
    fn test_tick_without_ship_is_noop() {
        let config = ArcadeConfig::default();
        let mut world = ArcadeWorld::new(800.0, 600.0, 200);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        tick(&mut world, &config, &mut rng, DT, &mut events);
        assert_eq!(world.time, 0.0);
        assert!(world.asteroids.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_ship_steering_is_clamped() {
        let config = quiet_config();
        let mut world = world_with_ship(&config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        world.ship.as_mut().unwrap().steer = -1.0;
        for _ in 0..600 {
            tick(&mut world, &config, &mut rng, DT, &mut events);
        }
        let ship = world.ship.as_ref().unwrap();
        assert_eq!(ship.pos.x, ship.radius());
    }

    #[test]
    fn test_laser_destroys_asteroid() {
        let config = quiet_config();
        let mut world = world_with_ship(&config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();

        let ship_x = world.ship.as_ref().unwrap().pos.x;
        let id = asteroid_at(&mut world, Vec2::new(ship_x, 200.0));
        assert!(fire_laser(&mut world, &config));

        for _ in 0..120 {
            tick(&mut world, &config, &mut rng, DT, &mut events);
        }
        assert!(world.asteroids.is_empty());
        assert!(world.lasers.is_empty());
        assert_eq!(world.score, config.asteroid_score);
        assert!(events.contains(&ArcadeEvent::AsteroidDestroyed { id }));
    }

    #[test]
    fn test_fire_cooldown() {
        let config = quiet_config();
        let mut world = world_with_ship(&config);
        assert!(fire_laser(&mut world, &config));
        assert!(!fire_laser(&mut world, &config));
        world.ship.as_mut().unwrap().tick_timers(config.fire_cooldown);
        assert!(fire_laser(&mut world, &config));
    }

    #[test]
    fn test_asteroid_hit_costs_a_life_then_grants_invulnerability() {
        let config = quiet_config();
        let mut world = world_with_ship(&config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();

        let ship_pos = world.ship.as_ref().unwrap().pos;
        asteroid_at(&mut world, ship_pos);
        tick(&mut world, &config, &mut rng, DT, &mut events);
        assert_eq!(world.lives, 2);
        assert_eq!(events, vec![ArcadeEvent::LifeLost { remaining: 2 }]);

        events.clear();
        asteroid_at(&mut world, ship_pos);
        tick(&mut world, &config, &mut rng, DT, &mut events);
        assert_eq!(world.lives, 2);
        assert_eq!(events, vec![ArcadeEvent::ShieldAbsorbed]);
    }

    #[test]
    fn test_game_over_event_once() {
        let config = ArcadeConfig {
            invulnerable_time: 0.0,
            ..quiet_config()
        };
        let mut world = world_with_ship(&config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        let ship_pos = world.ship.as_ref().unwrap().pos;

        for _ in 0..5 {
            asteroid_at(&mut world, ship_pos);
            tick(&mut world, &config, &mut rng, DT, &mut events);
        }
        assert_eq!(world.lives, 0);
        let overs = events.iter().filter(|e| **e == ArcadeEvent::GameOver).count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_power_up_collection() {
        let config = quiet_config();
        let mut world = world_with_ship(&config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        let ship_pos = world.ship.as_ref().unwrap().pos;

        for kind in PowerUpKind::ALL {
            let id = world.next_entity_id();
            world.power_ups.push(PowerUp {
                id,
                kind,
                pos: ship_pos,
                vel: Vec2::ZERO,
                size: 20.0,
            });
        }
        tick(&mut world, &config, &mut rng, DT, &mut events);

        let ship: &Ship = world.ship.as_ref().unwrap();
        assert!(ship.shield > 0.0);
        assert!(ship.rapid_fire > 0.0);
        assert_eq!(world.lives, 4);
        assert!(world.power_ups.is_empty());
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_spawning_scales_with_level() {
        let config = ArcadeConfig {
            power_up_chance: 0.0,
            asteroid_spawn_rate: 2.0,
            ..Default::default()
        };
        let count_spawns = |correct: u32| {
            let mut world = world_with_ship(&config);
            world.correct_answers = correct;
            let mut rng = Pcg32::seed_from_u64(42);
            let mut events = Vec::new();
            let mut spawned = 0;
            for _ in 0..600 {
                let before = world.asteroids.len();
                tick(&mut world, &config, &mut rng, DT, &mut events);
                spawned += world.asteroids.len().saturating_sub(before);
                world.asteroids.clear();
            }
            spawned
        };
        assert!(count_spawns(0) > 0);
        assert!(count_spawns(40) > count_spawns(0));
    }

    #[test]
    fn test_offscreen_entities_are_pruned() {
        let config = quiet_config();
        let mut world = world_with_ship(&config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        asteroid_at(&mut world, Vec2::new(100.0, 700.0));
        world.lasers.push(Laser {
            id: 99,
            pos: Vec2::new(100.0, -50.0),
            vel: Vec2::ZERO,
            size: 6.0,
        });
        tick(&mut world, &config, &mut rng, DT, &mut events);
        assert!(world.asteroids.is_empty());
        assert!(world.lasers.is_empty());
    }

    #[test]
    fn test_record_answer() {
        let config = quiet_config();
        let mut world = world_with_ship(&config);
        let mut rng = Pcg32::seed_from_u64(1);
        record_answer(&mut world, &config, &mut rng, true);
        record_answer(&mut world, &config, &mut rng, false);
        assert_eq!(world.questions_answered, 2);
        assert_eq!(world.correct_answers, 1);
        assert_eq!(world.score, config.answer_score);
        assert!(world.shake > 0.0);
    }
}
