//! Battle screen drawing

use glam::Vec2;

use super::state::{BattlePhase, BattleState, Outcome, Side, Stage};
use crate::error::SurfaceError;
use crate::services::Question;
use crate::sim::{Combatant, ParticleSystem};
use crate::surface::color::PARTICLE_COLORS;
use crate::surface::{Canvas2d, Color, RenderSurface, TextAlign, TextStyle};

const BAR_SIZE: Vec2 = Vec2::new(180.0, 14.0);
const BAR_BACK: Color = Color::rgba(255, 255, 255, 0.15);
const LOW_HEALTH: f32 = 0.3;
const SHAKE_PIXELS: f32 = 10.0;

/// Where each combatant stands, as fractions of the surface
pub fn anchor(side: Side, width: f32, height: f32) -> Vec2 {
    match side {
        Side::Boss => Vec2::new(width * 0.72, height * 0.32),
        Side::Player => Vec2::new(width * 0.28, height * 0.68),
    }
}

/// Presentational side channels drawn with the state
#[derive(Debug, Clone, Copy)]
pub struct Effects<'a> {
    pub particles: &'a ParticleSystem,
    pub shake: f32,
    pub flash: f32,
    pub time: f32,
}

pub fn draw_battle(
    surface: &mut RenderSurface,
    state: &BattleState,
    effects: Effects<'_>,
    question: Option<&Question>,
) -> Result<(), SurfaceError> {
    let (width, height) = (surface.width(), surface.height());
    let center = surface.center();
    let canvas = surface.canvas();

    canvas.clear(Color::SPACE)?;
    if state.phase == BattlePhase::Idle {
        return Ok(());
    }

    let shake = if effects.shake > 0.0 {
        Vec2::new((effects.time * 53.0).sin(), (effects.time * 41.0).cos())
            * effects.shake
            * SHAKE_PIXELS
    } else {
        Vec2::ZERO
    };

    if let Some(boss) = &state.boss {
        draw_combatant(canvas, boss, anchor(Side::Boss, width, height) + shake, 72.0)?;
    }
    if let Some(player) = &state.player {
        draw_combatant(canvas, player, anchor(Side::Player, width, height) + shake, 56.0)?;
    }

    for p in effects.particles.iter() {
        let color = PARTICLE_COLORS[p.color as usize % PARTICLE_COLORS.len()];
        canvas.fill_circle(p.pos, p.size * p.alpha(), color.faded(p.alpha()))?;
    }

    let hud = TextStyle::new(16.0, Color::WHITE).aligned(TextAlign::Left);
    if state.correct_streak >= 2 {
        canvas.fill_text(
            &format!("🔥 Streak {}", state.correct_streak),
            Vec2::new(16.0, 28.0),
            hud,
        )?;
    }
    let super_text = if state.super_attack_armed {
        "⚡ SUPER ATTACK ARMED".to_string()
    } else if state.super_attack_ready {
        "⚡ SUPER READY".to_string()
    } else {
        format!("⚡ Charge {}", state.super_attack_charge)
    };
    canvas.fill_text(&super_text, Vec2::new(16.0, 52.0), hud)?;

    match state.phase {
        BattlePhase::Turn { side, stage } => {
            let banner = match (side, stage) {
                (Side::Boss, Stage::Question) => "Boss attacks! Answer to block",
                (Side::Player, Stage::Question) => "Your turn! Answer to attack",
                (_, Stage::Attack) => "Attack!",
                (_, Stage::Resolution) => "...",
            };
            canvas.fill_text(
                banner,
                Vec2::new(width / 2.0, 28.0),
                TextStyle::new(20.0, Color::GOLD),
            )?;
        }
        BattlePhase::Finished(outcome) => {
            let text = match outcome {
                Outcome::BossDefeated => "Victory!",
                Outcome::PlayerDefeated => "Defeated...",
            };
            canvas.fill_rect(Vec2::ZERO, Vec2::new(width, height), Color::OVERLAY)?;
            canvas.fill_text(text, center, TextStyle::new(40.0, Color::GOLD))?;
        }
        BattlePhase::Idle => {}
    }

    if let Some(question) = question {
        canvas.fill_text(
            &question.prompt(),
            Vec2::new(width / 2.0, height - 32.0),
            TextStyle::new(26.0, Color::WHITE),
        )?;
    }

    if effects.flash > 0.0 {
        canvas.fill_rect(
            Vec2::ZERO,
            Vec2::new(width, height),
            Color::WHITE.faded(effects.flash * 0.6),
        )?;
    }
    Ok(())
}

fn draw_combatant(
    canvas: &mut dyn Canvas2d,
    combatant: &Combatant,
    at: Vec2,
    avatar_size: f32,
) -> Result<(), SurfaceError> {
    canvas.fill_text(&combatant.avatar, at, TextStyle::new(avatar_size, Color::WHITE))?;
    canvas.fill_text(
        &combatant.name,
        at + Vec2::new(0.0, avatar_size * 0.8),
        TextStyle::new(16.0, Color::WHITE),
    )?;

    let ratio = if combatant.max_health == 0 {
        0.0
    } else {
        combatant.health as f32 / combatant.max_health as f32
    };
    let origin = at + Vec2::new(-BAR_SIZE.x / 2.0, avatar_size * 0.8 + 14.0);
    canvas.fill_rect(origin, BAR_SIZE, BAR_BACK)?;
    let fill = if ratio < LOW_HEALTH {
        Color::HEALTH_LOW
    } else {
        Color::HEALTH_GOOD
    };
    canvas.fill_rect(origin, Vec2::new(BAR_SIZE.x * ratio, BAR_SIZE.y), fill)?;
    canvas.fill_text(
        &format!("{}/{}", combatant.health, combatant.max_health),
        origin + Vec2::new(BAR_SIZE.x / 2.0, BAR_SIZE.y + 12.0),
        TextStyle::new(12.0, Color::WHITE),
    )
}
