//! Space-shooter engine
//!
//! Asteroids and power-ups fall, the ship steers and shoots. Answers are
//! graded by the question service and fed back through [`ArcadeEngine::submit_answer`]
//! or [`ArcadeEngine::record_answer`]; the engine only keeps score.

pub mod render;
pub mod state;
pub mod tick;

use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

pub use crate::config::ArcadeConfig;
pub use state::ArcadeWorld;
pub use tick::ArcadeEvent;

use crate::consts::RENDER_ERROR_MESSAGE;
use crate::engine::{Engine, EngineKind, ErrorPolicy, Fallback, SimulationLoop};
use crate::error::{EngineError, EngineResult};
use crate::services::{Cue, Equipped, Question, QuestionSlot, Services};
use crate::sim::{Asteroid, Laser, Particle, PowerUp, Ship};
use crate::surface::{RenderSurface, SurfaceProvider};

/// Host hooks. Every hook is optional.
#[derive(Clone, Default)]
pub struct ArcadeCallbacks {
    pub on_correct_answer: Option<Rc<dyn Fn()>>,
    pub on_wrong_answer: Option<Rc<dyn Fn()>>,
    /// Called once with the final score
    pub on_game_over: Option<Rc<dyn Fn(u32)>>,
    /// Called with the lives remaining
    pub on_life_lost: Option<Rc<dyn Fn(u8)>>,
}

pub struct ArcadeEngine {
    surface: Option<RenderSurface>,
    policy: ErrorPolicy,
    looping: SimulationLoop,
    services: Services,
    config: ArcadeConfig,
    callbacks: ArcadeCallbacks,
    world: ArcadeWorld,
    rng: Pcg32,
    equipped: Equipped,
    question: QuestionSlot,
    game_over: bool,
    events: Vec<ArcadeEvent>,
}

impl ArcadeEngine {
    /// Build an engine drawing into surface `surface_id`.
    ///
    /// Never fails: a missing surface or a bad config leaves the engine in its
    /// error state, observable through [`Engine::has_error`].
    pub fn new(
        surface_id: &str,
        provider: &dyn SurfaceProvider,
        services: Services,
        config: ArcadeConfig,
        callbacks: ArcadeCallbacks,
    ) -> Self {
        let mut policy = ErrorPolicy::new(EngineKind::Arcade, services.diagnostics.clone());
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

        let mut engine = Self {
            world: ArcadeWorld::new(width, height, config.effects.max_particles()),
            rng: Pcg32::seed_from_u64(config.seed),
            equipped: services.cosmetics.equipped(),
            surface,
            policy,
            looping: SimulationLoop::default(),
            services,
            config,
            callbacks,
            question: QuestionSlot::default(),
            game_over: false,
            events: Vec::new(),
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
        if !(c.ship_size.is_finite() && c.ship_size > 0.0 && c.ship_size < self.world.width) {
            return Err(EngineError::Construction(format!(
                "ship size {} does not fit a {}px wide surface",
                c.ship_size, self.world.width
            )));
        }
        if !(c.asteroid_min_size > 0.0 && c.asteroid_min_size <= c.asteroid_max_size) {
            return Err(EngineError::Construction(format!(
                "asteroid size range {}..{} is empty",
                c.asteroid_min_size, c.asteroid_max_size
            )));
        }
        if c.laser_speed <= 0.0 || c.fire_cooldown < 0.0 {
            return Err(EngineError::Construction(
                "laser speed must be positive and cooldown non-negative".into(),
            ));
        }
        Ok(())
    }

    pub fn width(&self) -> f32 {
        self.world.width
    }

    pub fn height(&self) -> f32 {
        self.world.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.world.width / 2.0, self.world.height / 2.0)
    }

    pub fn world(&self) -> &ArcadeWorld {
        &self.world
    }

    pub fn lives(&self) -> u8 {
        self.world.lives
    }

    pub fn score(&self) -> u32 {
        self.world.score
    }

    pub fn questions_answered(&self) -> u32 {
        self.world.questions_answered
    }

    pub fn level(&self) -> u32 {
        self.world.level()
    }

    pub fn ship(&self) -> Option<&Ship> {
        self.world.ship.as_ref()
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.world.asteroids
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.world.lasers
    }

    pub fn power_ups(&self) -> &[PowerUp] {
        &self.world.power_ups
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.world.particles.iter()
    }

    pub fn is_paused(&self) -> bool {
        self.looping.is_paused()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn pause(&mut self) {
        self.looping.pause();
    }

    pub fn resume(&mut self) {
        self.looping.resume();
    }

    /// Set steering input; clamped to [-1, 1]
    pub fn steer(&mut self, direction: f32) {
        if let Some(ship) = self.world.ship.as_mut() {
            ship.steer = if direction.is_finite() {
                direction.clamp(-1.0, 1.0)
            } else {
                0.0
            };
        }
    }

    /// Jump the ship to horizontal position `x` (pointer/touch control)
    pub fn move_ship_to(&mut self, x: f32) {
        let width = self.world.width;
        if let Some(ship) = self.world.ship.as_mut()
            && x.is_finite()
        {
            let half = ship.radius();
            ship.pos.x = x.clamp(half, (width - half).max(half));
        }
    }

    /// Shoot if the cooldown allows. Returns whether a laser was fired.
    pub fn fire_laser(&mut self) -> bool {
        if !self.policy.admit("fire") || self.game_over || self.looping.is_paused() {
            return false;
        }
        let fired = tick::fire_laser(&mut self.world, &self.config);
        if fired {
            self.services.play(Cue::Laser);
        }
        fired
    }

    /// Ask the question service for a question at the current level
    pub fn present_question(&mut self) -> Option<&Question> {
        if !self.accepts_input("present question") {
            return None;
        }
        let difficulty = self.world.level().min(u8::MAX as u32) as u8;
        Some(
            self.question
                .present(self.services.questions.as_ref(), difficulty),
        )
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.question.current()
    }

    /// Grade `answer` against the question on screen and record the result.
    /// Returns `None` when no question is showing.
    pub fn submit_answer(&mut self, answer: u32) -> Option<bool> {
        if !self.accepts_input("submit answer") {
            return None;
        }
        let Some(correct) = self
            .question
            .check(self.services.questions.as_ref(), answer)
        else {
            self.policy.warn("answer submitted with no question showing");
            return None;
        };
        self.apply_answer(correct);
        Some(correct)
    }

    /// Record an answer the host already graded
    pub fn record_answer(&mut self, correct: bool) {
        if !self.accepts_input("record answer") {
            return;
        }
        self.apply_answer(correct);
    }

    /// Answers only count while the run is live
    fn accepts_input(&self, op: &str) -> bool {
        if !self.policy.admit(op) {
            return false;
        }
        if self.game_over {
            self.policy.warn(&format!("{op} ignored: run is over"));
            return false;
        }
        true
    }

    fn apply_answer(&mut self, correct: bool) {
        tick::record_answer(&mut self.world, &self.config, &mut self.rng, correct);
        if correct {
            self.services.play(Cue::Correct);
            if let Some(cb) = &self.callbacks.on_correct_answer {
                cb();
            }
        } else {
            self.services.play(Cue::Wrong);
            if let Some(cb) = &self.callbacks.on_wrong_answer {
                cb();
            }
        }
    }

    fn try_update(&mut self, dt: f32) -> EngineResult {
        if !dt.is_finite() || dt < 0.0 {
            return Err(EngineError::InvalidState(format!("frame step {dt}")));
        }
        if self.looping.is_paused() || self.game_over {
            return Ok(());
        }

        let mut events = std::mem::take(&mut self.events);
        tick::tick(&mut self.world, &self.config, &mut self.rng, dt, &mut events);
        for event in events.drain(..) {
            self.dispatch(event);
        }
        self.events = events;
        Ok(())
    }

    fn dispatch(&mut self, event: ArcadeEvent) {
        match event {
            ArcadeEvent::AsteroidDestroyed { .. } | ArcadeEvent::ShieldAbsorbed => {
                self.services.play(Cue::Explosion);
            }
            ArcadeEvent::PowerUpCollected(_) => self.services.play(Cue::PowerUp),
            ArcadeEvent::LifeLost { remaining } => {
                self.services.play(Cue::LifeLost);
                if let Some(cb) = &self.callbacks.on_life_lost {
                    cb(remaining);
                }
            }
            ArcadeEvent::GameOver => {
                if self.game_over {
                    return;
                }
                self.game_over = true;
                self.question.clear();
                self.looping.stop();
                self.services.play(Cue::GameOver);
                log::info!("arcade run over with score {}", self.world.score);
                if let Some(cb) = &self.callbacks.on_game_over {
                    cb(self.world.score);
                }
            }
        }
    }
}

impl Engine for ArcadeEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Arcade
    }

    fn init(&mut self) {
        if !self.policy.admit("init") {
            return;
        }
        self.world.reset(&self.config, &self.equipped.ship);
        self.question.clear();
        self.game_over = false;
        self.looping.resume();
        log::debug!(
            "arcade world reset on {}x{} surface",
            self.world.width,
            self.world.height
        );
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
        let drawn = render::draw_arcade(
            surface,
            &self.world,
            self.looping.is_paused(),
            self.question.current(),
        );
        if let Err(e) = drawn {
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
