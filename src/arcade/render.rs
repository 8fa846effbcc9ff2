//! Arcade scene drawing
//!
//! Back to front: sky, particles, asteroids, power-ups, lasers, ship, HUD,
//! then the question and pause overlays.

use glam::Vec2;

use super::state::ArcadeWorld;
use crate::error::SurfaceError;
use crate::services::Question;
use crate::surface::color::PARTICLE_COLORS;
use crate::surface::{Color, RenderSurface, TextAlign, TextStyle};

const HUD_MARGIN: f32 = 16.0;
const HUD_TEXT: TextStyle = TextStyle::new(18.0, Color::WHITE);
const SHAKE_PIXELS: f32 = 8.0;

/// Draw one arcade frame
pub fn draw_arcade(
    surface: &mut RenderSurface,
    world: &ArcadeWorld,
    paused: bool,
    question: Option<&Question>,
) -> Result<(), SurfaceError> {
    let (width, height) = (surface.width(), surface.height());
    let center = surface.center();
    let canvas = surface.canvas();

    canvas.clear(Color::SPACE)?;

    // Cheap deterministic jitter from the clock
    let shake = if world.shake > 0.0 {
        Vec2::new((world.time * 61.0).sin(), (world.time * 47.0).cos()) * world.shake * SHAKE_PIXELS
    } else {
        Vec2::ZERO
    };

    for p in world.particles.iter() {
        let color = PARTICLE_COLORS[p.color as usize % PARTICLE_COLORS.len()];
        canvas.fill_circle(p.pos + shake, p.size * p.alpha(), color.faded(p.alpha()))?;
    }

    for asteroid in &world.asteroids {
        let shade = 1.0 - asteroid.variant as f32 * 0.15;
        canvas.fill_circle(
            asteroid.pos + shake,
            asteroid.radius(),
            Color::ASTEROID.faded(shade),
        )?;
    }

    for power_up in &world.power_ups {
        canvas.stroke_circle(
            power_up.pos + shake,
            power_up.size / 2.0,
            2.0,
            PARTICLE_COLORS[2],
        )?;
        canvas.fill_text(
            power_up.kind.icon(),
            power_up.pos + shake,
            TextStyle::new(power_up.size * 0.6, Color::WHITE),
        )?;
    }

    for laser in &world.lasers {
        canvas.fill_rect(
            laser.pos - Vec2::new(laser.size / 4.0, laser.size) + shake,
            Vec2::new(laser.size / 2.0, laser.size * 2.0),
            Color::LASER,
        )?;
    }

    if let Some(ship) = &world.ship {
        // Blink while invulnerable
        let visible = ship.invulnerable <= 0.0 || (world.time * 10.0) as i32 % 2 == 0;
        if visible {
            let style = TextStyle::new(ship.size, Color::WHITE);
            canvas.fill_text(&ship.icon, ship.pos + shake, style)?;
        }
        if ship.shield > 0.0 {
            canvas.stroke_circle(ship.pos + shake, ship.radius() * 1.3, 3.0, PARTICLE_COLORS[2])?;
        }
    }

    canvas.fill_text(
        &format!("Score: {}", world.score),
        Vec2::new(HUD_MARGIN, HUD_MARGIN + 8.0),
        HUD_TEXT.aligned(TextAlign::Left),
    )?;
    canvas.fill_text(
        &format!("Level {}", world.level()),
        Vec2::new(width / 2.0, HUD_MARGIN + 8.0),
        HUD_TEXT,
    )?;
    canvas.fill_text(
        &"❤️".repeat(world.lives as usize),
        Vec2::new(width - HUD_MARGIN, HUD_MARGIN + 8.0),
        HUD_TEXT.aligned(TextAlign::Right),
    )?;

    if let Some(question) = question {
        canvas.fill_rect(
            Vec2::new(0.0, height - 48.0),
            Vec2::new(width, 48.0),
            Color::OVERLAY,
        )?;
        canvas.fill_text(
            &question.prompt(),
            Vec2::new(width / 2.0, height - 24.0),
            TextStyle::new(22.0, Color::GOLD),
        )?;
    }

    if paused {
        canvas.fill_rect(Vec2::ZERO, Vec2::new(width, height), Color::OVERLAY)?;
        canvas.fill_text("Paused", center, TextStyle::new(36.0, Color::WHITE))?;
    }

    Ok(())
}
