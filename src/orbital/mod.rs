//! Galaxy map engine
//!
//! A continuously animated scene with one planet per multiplication table.
//! There is no combat here: hover and selection are presentational and the
//! host decides what picking a planet means.

pub mod render;
pub mod scene;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

pub use crate::config::OrbitalConfig;
pub use render::Highlight;
pub use scene::OrbitalScene;

use crate::consts::RENDER_ERROR_MESSAGE;
use crate::engine::{Engine, EngineKind, ErrorPolicy, Fallback, SimulationLoop};
use crate::error::{EngineError, EngineResult};
use crate::services::Services;
use crate::sim::{Planet, Star};
use crate::surface::{RenderSurface, SurfaceProvider};

pub struct OrbitalEngine {
    surface: Option<RenderSurface>,
    policy: ErrorPolicy,
    looping: SimulationLoop,
    config: OrbitalConfig,
    scene: OrbitalScene,
    ship_icon: String,
    highlight: Highlight,
}

impl OrbitalEngine {
    pub fn new(
        surface_id: &str,
        provider: &dyn SurfaceProvider,
        services: Services,
        config: OrbitalConfig,
    ) -> Self {
        let mut policy = ErrorPolicy::new(EngineKind::Orbital, services.diagnostics.clone());
        let surface = match RenderSurface::resolve(provider, surface_id) {
            Ok(surface) => Some(surface),
            Err(e) => {
                policy.fail_construction(&e.into());
                None
            }
        };
        let (width, height) = surface
            .as_ref()
            .map_or((0.0, 0.0), |s| (s.width(), s.height()));

        let ship_icon = services.cosmetics.equipped().ship;
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let scene = OrbitalScene::build(width, height, &config, &mut rng, &ship_icon);

        let mut engine = Self {
            surface,
            policy,
            looping: SimulationLoop::default(),
            config,
            scene,
            ship_icon,
            highlight: Highlight::default(),
        };
        if engine.surface.is_some()
            && let Err(e) = engine.validate_config()
        {
            engine.policy.fail_construction(&e);
        }
        engine
    }

    fn validate_config(&self) -> EngineResult {
        let c = &self.config;
        if c.sun_radius.is_nan() || c.sun_radius <= 0.0 {
            return Err(EngineError::Construction(format!(
                "sun radius {} must be positive",
                c.sun_radius
            )));
        }
        if !(0.0 < c.inner_orbit && c.inner_orbit < c.outer_orbit && c.outer_orbit <= 0.5) {
            return Err(EngineError::Construction(format!(
                "orbit band {}..{} does not fit the surface",
                c.inner_orbit, c.outer_orbit
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f32 {
        self.scene.width
    }

    pub fn height(&self) -> f32 {
        self.scene.height
    }

    pub fn center(&self) -> Vec2 {
        self.scene.center
    }

    pub fn scene(&self) -> &OrbitalScene {
        &self.scene
    }

    pub fn planets(&self) -> &[Planet] {
        &self.scene.planets
    }

    pub fn stars(&self) -> &[Star] {
        &self.scene.stars
    }

    pub fn hovered_planet(&self) -> Option<u8> {
        self.highlight.hovered
    }

    pub fn selected_planet(&self) -> Option<u8> {
        self.highlight.selected
    }

    /// Track the planet under the pointer. Returns its table.
    pub fn hover_at(&mut self, point: Vec2) -> Option<u8> {
        self.highlight.hovered = self.scene.planet_at(point);
        self.highlight.hovered
    }

    /// Select the planet under `point`; a miss keeps the current selection
    pub fn select_at(&mut self, point: Vec2) -> Option<u8> {
        let picked = self.scene.planet_at(point);
        if picked.is_some() {
            self.highlight.selected = picked;
        }
        picked
    }

    pub fn clear_selection(&mut self) {
        self.highlight.selected = None;
    }

    /// Feed the player's current correct-answer streak to the comet
    pub fn set_streak(&mut self, streak: u32) {
        self.scene.set_streak(streak, &self.config);
    }

    /// Mastery of `table` in [0, 1], shown as stars under the planet
    pub fn set_mastery(&mut self, table: u8, mastery: f32) {
        match self.scene.planet_mut(table) {
            Some(planet) if mastery.is_finite() => planet.mastery = mastery.clamp(0.0, 1.0),
            Some(_) => self.policy.warn(&format!("ignoring mastery {mastery} for table {table}")),
            None => self.policy.warn(&format!("no planet for table {table}")),
        }
    }

    fn try_update(&mut self, dt: f32) -> EngineResult {
        if !dt.is_finite() || dt < 0.0 {
            return Err(EngineError::InvalidState(format!("frame step {dt}")));
        }
        self.scene.advance(&self.config, dt);
        Ok(())
    }
}

impl Engine for OrbitalEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Orbital
    }

    fn init(&mut self) {
        if !self.policy.admit("init") {
            return;
        }
        let streak = self.scene.comet.streak;
        let mastery: Vec<f32> = self.scene.planets.iter().map(|p| p.mastery).collect();

        let mut rng = Pcg32::seed_from_u64(self.config.seed);
        self.scene = OrbitalScene::build(
            self.scene.width,
            self.scene.height,
            &self.config,
            &mut rng,
            &self.ship_icon,
        );
        self.scene.set_streak(streak, &self.config);
        for (planet, m) in self.scene.planets.iter_mut().zip(mastery) {
            planet.mastery = m;
        }
        self.highlight = Highlight::default();
    }

    fn start(&mut self) {
        if !self.policy.admit("start") {
            return;
        }
        self.looping.start();
    }

    fn stop(&mut self) {
        self.looping.stop();
    }

    fn update(&mut self, dt: f32) {
        if !self.policy.admit("update") {
            return;
        }
        if let Err(e) = self.try_update(dt) {
            self.handle_error(e);
        }
    }

    fn render(&mut self) {
        if !self.policy.admit("render") {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Err(e) = render::draw_orbital(surface, &self.scene, self.highlight) {
            self.handle_error(e.into());
        }
    }

    fn handle_error(&mut self, error: EngineError) {
        self.looping.stop();
        self.policy.trip(
            &error,
            self.surface.as_mut(),
            Fallback::Banner(RENDER_ERROR_MESSAGE),
        );
    }

    fn has_error(&self) -> bool {
        self.policy.has_error()
    }

    fn is_running(&self) -> bool {
        self.looping.is_running()
    }
}
