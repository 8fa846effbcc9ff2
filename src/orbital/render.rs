//! Galaxy map drawing. The whole scene is redrawn every frame.

use glam::Vec2;

use super::scene::OrbitalScene;
use crate::error::SurfaceError;
use crate::surface::color::PLANET_COLORS;
use crate::surface::{Color, RenderSurface, TextStyle};

const ORBIT_RING: Color = Color::rgba(255, 255, 255, 0.08);
const HOVER_RING: Color = Color::rgba(255, 255, 255, 0.6);
const COMET_TAIL: usize = 5;
const MASTERY_STARS: usize = 3;

/// Highlight state for drawing
#[derive(Debug, Clone, Copy, Default)]
pub struct Highlight {
    pub hovered: Option<u8>,
    pub selected: Option<u8>,
}

pub fn draw_orbital(
    surface: &mut RenderSurface,
    scene: &OrbitalScene,
    highlight: Highlight,
) -> Result<(), SurfaceError> {
    let canvas = surface.canvas();
    canvas.clear(Color::SPACE)?;

    for star in &scene.stars {
        let twinkle = 0.7 + 0.3 * star.twinkle_phase.sin();
        canvas.fill_circle(star.pos, star.size, Color::WHITE.faded(star.brightness * twinkle))?;
    }

    for planet in &scene.planets {
        canvas.stroke_circle(scene.center, planet.distance, 1.0, ORBIT_RING)?;
    }

    let sun_radius = scene.sun.pulsed_radius();
    canvas.fill_circle(scene.center, sun_radius * 1.4, Color::SUN.faded(0.15))?;
    canvas.fill_circle(scene.center, sun_radius, Color::SUN)?;

    if scene.comet.is_visible() {
        let head = scene.comet_position();
        for i in 1..=COMET_TAIL {
            let lag = scene.comet.angle - i as f32 * 0.06;
            let pos = scene.center + crate::polar_to_cartesian(scene.comet.distance, lag);
            let fade = 1.0 - i as f32 / (COMET_TAIL + 1) as f32;
            canvas.fill_circle(pos, 4.0 * fade, Color::WHITE.faded(0.5 * fade))?;
        }
        canvas.fill_circle(head, 5.0, Color::WHITE)?;
    }

    for planet in &scene.planets {
        let pos = scene.planet_position(planet);
        let color = PLANET_COLORS[planet.variant as usize % PLANET_COLORS.len()];
        canvas.fill_circle(pos, planet.radius, color)?;

        if highlight.selected == Some(planet.table) {
            canvas.stroke_circle(pos, planet.radius + 6.0, 3.0, Color::GOLD)?;
        } else if highlight.hovered == Some(planet.table) {
            canvas.stroke_circle(pos, planet.radius + 4.0, 2.0, HOVER_RING)?;
        }

        canvas.fill_text(
            &planet.table.to_string(),
            pos,
            TextStyle::new(planet.radius, Color::WHITE),
        )?;

        let earned = (planet.mastery.clamp(0.0, 1.0) * MASTERY_STARS as f32).floor() as usize;
        if earned > 0 {
            canvas.fill_text(
                &"★".repeat(earned),
                pos + Vec2::new(0.0, planet.radius + 10.0),
                TextStyle::new(10.0, Color::GOLD),
            )?;
        }
    }

    let ship = &scene.mother_ship;
    let bob = Vec2::new(0.0, ship.phase.sin() * 6.0);
    canvas.fill_text(&ship.icon, ship.pos + bob, TextStyle::new(32.0, Color::WHITE))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrbitalConfig;
    use crate::platform::headless::{DrawCommand, HeadlessHost};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_full_scene_every_frame() {
        let host = HeadlessHost::new();
        let log = host.add_surface("map", 800.0, 600.0);
        let mut surface = RenderSurface::resolve(&host, "map").unwrap();
        let config = OrbitalConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut scene = OrbitalScene::build(800.0, 600.0, &config, &mut rng, "🚀");
        scene.planets[0].mastery = 1.0;

        draw_orbital(&mut surface, &scene, Highlight::default()).unwrap();
        let first = log.len();
        draw_orbital(&mut surface, &scene, Highlight::default()).unwrap();
        assert_eq!(log.len(), first * 2);

        let texts = log.texts();
        assert!(texts.contains(&"10".to_string()));
        assert!(texts.contains(&"★★★".to_string()));
        assert!(texts.contains(&"🚀".to_string()));
    }

    #[test]
    fn test_selection_ring() {
        let host = HeadlessHost::new();
        let log = host.add_surface("map", 800.0, 600.0);
        let mut surface = RenderSurface::resolve(&host, "map").unwrap();
        let config = OrbitalConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let scene = OrbitalScene::build(800.0, 600.0, &config, &mut rng, "🚀");

        let highlight = Highlight {
            hovered: None,
            selected: Some(4),
        };
        draw_orbital(&mut surface, &scene, highlight).unwrap();
        let gold_rings = log
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Ring { color, .. } if *color == Color::GOLD))
            .count();
        assert_eq!(gold_rings, 1);
    }
}
