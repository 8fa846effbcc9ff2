//! Boss battle engine
//!
//! Turn-based: the host drives progress with discrete calls
//! (`submit_answer` → `resolve_attack` → `next_turn`), usually spacing them
//! out with its own animation timing. `update`/`render` only animate the
//! presentational effects.

pub mod render;
pub mod state;

use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

pub use crate::config::BattleConfig;
pub use state::{AttackReport, BattlePhase, BattleState, Outcome, Side, Stage};

use crate::consts::{BATTLE_ERROR_MESSAGE, ERROR_DEFEAT_DELAY_MS};
use crate::engine::{Engine, EngineKind, ErrorPolicy, Fallback, SimulationLoop};
use crate::error::{EngineError, EngineResult};
use crate::services::{Cue, Question, QuestionSlot, Services};
use crate::sim::{Burst, Combatant, Particle, ParticleSystem};
use crate::surface::{RenderSurface, SurfaceProvider};

const PARTICLE_DRAG: f32 = 2.0;
const SHAKE_DECAY: f32 = 2.5;
const FLASH_DECAY: f32 = 3.0;

mod palette {
    pub const HIT: u8 = 0;
    pub const DAMAGE: u8 = 3;
    pub const SUPER: u8 = 4;
}

/// End-of-battle hooks
#[derive(Clone, Default)]
pub struct BattleCallbacks {
    pub on_boss_defeated: Option<Rc<dyn Fn()>>,
    pub on_player_defeated: Option<Rc<dyn Fn()>>,
}

pub struct BattleEngine {
    surface: Option<RenderSurface>,
    policy: ErrorPolicy,
    looping: SimulationLoop,
    services: Services,
    config: BattleConfig,
    callbacks: BattleCallbacks,
    on_correct_answer: Option<Rc<dyn Fn()>>,
    on_wrong_answer: Option<Rc<dyn Fn()>>,
    state: BattleState,
    question: QuestionSlot,
    particles: ParticleSystem,
    shake_intensity: f32,
    flash_effect: f32,
    time: f32,
    rng: Pcg32,
    width: f32,
    height: f32,
}

impl BattleEngine {
    pub fn new(
        surface_id: &str,
        provider: &dyn SurfaceProvider,
        services: Services,
        config: BattleConfig,
        callbacks: BattleCallbacks,
    ) -> Self {
        let mut policy = ErrorPolicy::new(EngineKind::Battle, services.diagnostics.clone());
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
            surface,
            policy,
            looping: SimulationLoop::default(),
            rng: Pcg32::seed_from_u64(config.seed),
            particles: ParticleSystem::new(config.effects.max_particles()),
            services,
            config,
            callbacks,
            on_correct_answer: None,
            on_wrong_answer: None,
            state: BattleState::default(),
            question: QuestionSlot::default(),
            shake_intensity: 0.0,
            flash_effect: 0.0,
            time: 0.0,
            width,
            height,
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
        if c.super_attack_threshold == 0 {
            return Err(EngineError::Construction(
                "super attack threshold must be at least 1".into(),
            ));
        }
        if !(c.super_attack_multiplier.is_finite() && c.super_attack_multiplier >= 1.0) {
            return Err(EngineError::Construction(format!(
                "super attack multiplier {} must be at least 1",
                c.super_attack_multiplier
            )));
        }
        Ok(())
    }

    pub fn set_on_correct_answer(&mut self, callback: impl Fn() + 'static) {
        self.on_correct_answer = Some(Rc::new(callback));
    }

    pub fn set_on_wrong_answer(&mut self, callback: impl Fn() + 'static) {
        self.on_wrong_answer = Some(Rc::new(callback));
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn phase(&self) -> BattlePhase {
        self.state.phase
    }

    pub fn current_boss(&self) -> Option<&Combatant> {
        self.state.boss.as_ref()
    }

    pub fn player(&self) -> Option<&Combatant> {
        self.state.player.as_ref()
    }

    pub fn boss_health(&self) -> u32 {
        self.state.boss_health()
    }

    pub fn max_boss_health(&self) -> u32 {
        self.state.max_boss_health()
    }

    pub fn player_health(&self) -> u32 {
        self.state.player_health()
    }

    pub fn correct_streak(&self) -> u32 {
        self.state.correct_streak
    }

    pub fn super_attack_charge(&self) -> u32 {
        self.state.super_attack_charge
    }

    pub fn super_attack_ready(&self) -> bool {
        self.state.super_attack_ready
    }

    pub fn is_processing(&self) -> bool {
        self.state.is_processing()
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn shake_intensity(&self) -> f32 {
        self.shake_intensity
    }

    pub fn flash_effect(&self) -> f32 {
        self.flash_effect
    }

    /// Bind combatants and open the boss's first question. The player always
    /// starts at full health; the boss's health becomes its maximum.
    pub fn start_battle(&mut self, boss: Combatant, player: Combatant) {
        if !self.policy.admit("start battle") {
            self.policy.report(&EngineError::InvalidState(format!(
                "battle against '{}' not started: engine is in its error state",
                boss.name
            )));
            return;
        }
        if boss.health == 0 {
            self.policy
                .warn(&format!("boss '{}' has no health; battle not started", boss.name));
            return;
        }
        log::info!("battle against {} ({} hp) begins", boss.name, boss.health);
        self.clear_effects();
        self.question.clear();
        self.state.begin(boss, player);
    }

    /// Clear transient battle progress. The surface and any error state stay.
    pub fn reset(&mut self) {
        self.state.reset();
        self.question.clear();
        self.clear_effects();
    }

    fn clear_effects(&mut self) {
        self.particles.clear();
        self.shake_intensity = 0.0;
        self.flash_effect = 0.0;
    }

    /// Ask the question service for the open turn's question
    pub fn present_question(&mut self) -> Option<&Question> {
        if !self.policy.admit("present question") {
            return None;
        }
        if self.state.phase.stage() != Some(Stage::Question) {
            self.policy.warn("no turn is waiting for a question");
            return None;
        }
        let difficulty = (1 + self.state.correct_streak / 3).min(5) as u8;
        Some(
            self.question
                .present(self.services.questions.as_ref(), difficulty),
        )
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.question.current()
    }

    /// Choose the super attack for the player's open question
    pub fn arm_super_attack(&mut self) -> bool {
        if !self.policy.admit("arm super attack") {
            return false;
        }
        self.state.arm_super_attack()
    }

    /// Grade `answer` against the question on screen and start the attack.
    /// Returns `None` if the input was not accepted.
    pub fn submit_answer(&mut self, answer: u32) -> Option<AttackReport> {
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
        self.attack(correct)
    }

    /// Start the attack for an answer the host already graded
    pub fn record_answer(&mut self, correct: bool) -> Option<AttackReport> {
        if !self.accepts_input("record answer") {
            return None;
        }
        self.question.clear();
        self.attack(correct)
    }

    fn accepts_input(&self, op: &str) -> bool {
        if !self.policy.admit(op) {
            return false;
        }
        if self.state.is_processing() {
            self.policy.warn("input ignored: attack in progress");
            return false;
        }
        if self.state.phase.stage() != Some(Stage::Question) {
            self.policy.warn("input ignored: no turn in progress");
            return false;
        }
        true
    }

    fn attack(&mut self, correct: bool) -> Option<AttackReport> {
        let report = self.state.answer(correct, &self.config)?;

        let callback = if correct {
            self.services.play(Cue::Correct);
            self.on_correct_answer.clone()
        } else {
            self.services.play(Cue::Wrong);
            self.on_wrong_answer.clone()
        };
        if let Some(cb) = callback {
            cb();
        }

        if report.damage > 0 {
            self.services.play(if report.super_attack {
                Cue::SuperAttack
            } else {
                Cue::Attack
            });
        }
        Some(report)
    }

    /// Apply the pending attack's damage. Ends the battle at zero health.
    pub fn resolve_attack(&mut self) -> Option<Outcome> {
        if !self.policy.admit("resolve attack") {
            return None;
        }
        if self.state.phase.stage() != Some(Stage::Attack) {
            self.policy.warn("no attack to resolve");
            return None;
        }
        let pending = self.state.pending();

        match self.state.resolve() {
            Ok(outcome) => {
                if let Some(report) = pending
                    && report.damage > 0
                {
                    self.hit_effects(report.target, report.super_attack);
                }
                if let Some(outcome) = outcome {
                    self.finish(outcome);
                }
                outcome
            }
            Err(e) => {
                self.handle_error(e);
                None
            }
        }
    }

    /// Hand over to the other side's question
    pub fn next_turn(&mut self) -> bool {
        if !self.policy.admit("next turn") {
            return false;
        }
        let advanced = self.state.next_turn();
        if !advanced {
            self.policy.warn("turn cannot advance before the attack resolves");
        }
        advanced
    }

    fn hit_effects(&mut self, target: Side, super_attack: bool) {
        let at = render::anchor(target, self.width, self.height);
        let motion = self.config.effects.motion_scale();
        let (color, count) = match (target, super_attack) {
            (_, true) => (palette::SUPER, self.config.effects.burst_size() * 2),
            (Side::Boss, false) => (palette::HIT, self.config.effects.burst_size()),
            (Side::Player, false) => (palette::DAMAGE, self.config.effects.burst_size()),
        };
        self.particles.burst(
            &mut self.rng,
            Burst {
                origin: at,
                count,
                min_speed: 60.0,
                max_speed: 220.0,
                lifetime: self.config.particle_lifetime,
                color,
                size: 6.0,
            },
        );
        if target == Side::Player {
            self.shake_intensity = motion;
        }
        if super_attack {
            self.flash_effect = motion;
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.question.clear();
        log::info!("battle finished: {outcome:?}");
        let callback = match outcome {
            Outcome::BossDefeated => {
                self.services.play(Cue::Victory);
                self.callbacks.on_boss_defeated.clone()
            }
            Outcome::PlayerDefeated => {
                self.services.play(Cue::GameOver);
                self.callbacks.on_player_defeated.clone()
            }
        };
        if let Some(cb) = callback {
            cb();
        }
    }

    fn try_update(&mut self, dt: f32) -> EngineResult {
        if !dt.is_finite() || dt < 0.0 {
            return Err(EngineError::InvalidState(format!("frame step {dt}")));
        }
        self.time += dt;
        self.particles.advance(dt, PARTICLE_DRAG);
        self.shake_intensity = (self.shake_intensity - SHAKE_DECAY * dt).max(0.0);
        self.flash_effect = (self.flash_effect - FLASH_DECAY * dt).max(0.0);
        Ok(())
    }
}

impl Engine for BattleEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Battle
    }

    fn init(&mut self) {
        if !self.policy.admit("init") {
            return;
        }
        self.reset();
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
        let effects = render::Effects {
            particles: &self.particles,
            shake: self.shake_intensity,
            flash: self.flash_effect,
            time: self.time,
        };
        if let Err(e) = render::draw_battle(surface, &self.state, effects, self.question.current())
        {
            self.handle_error(e.into());
        }
    }

    /// Stops, shows the notice in the host container and, on the first
    /// fault of an unfinished battle, reports the player defeated after a
    /// delay so the host leaves the broken screen.
    fn handle_error(&mut self, error: EngineError) {
        let first = !self.policy.has_error();
        self.looping.stop();
        self.policy.trip(
            &error,
            self.surface.as_mut(),
            Fallback::Container(BATTLE_ERROR_MESSAGE),
        );

        let finished = matches!(self.state.phase, BattlePhase::Finished(_));
        if first
            && !finished
            && let Some(cb) = self.callbacks.on_player_defeated.clone()
        {
            self.services
                .timers
                .schedule(ERROR_DEFEAT_DELAY_MS, Box::new(move || cb()));
        }
    }

    fn has_error(&self) -> bool {
        self.policy.has_error()
    }

    fn is_running(&self) -> bool {
        self.looping.is_running()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::platform::headless::{DrawLog, DrawOp, HeadlessHost, ManualTimers};
    use crate::services::testing::{RecordingAudio, RecordingSink, test_services};

    struct Fixture {
        engine: BattleEngine,
        log: DrawLog,
        sink: Rc<RecordingSink>,
        timers: Rc<ManualTimers>,
        boss_defeats: Rc<Cell<u32>>,
        player_defeats: Rc<Cell<u32>>,
    }

    fn fixture_with(config: BattleConfig) -> Fixture {
        let host = HeadlessHost::new();
        let log = host.add_surface("battle", 800.0, 600.0);
        let (services, sink, timers) = test_services();
        let boss_defeats = Rc::new(Cell::new(0));
        let player_defeats = Rc::new(Cell::new(0));
        let callbacks = BattleCallbacks {
            on_boss_defeated: Some(Rc::new({
                let n = boss_defeats.clone();
                move || n.set(n.get() + 1)
            })),
            on_player_defeated: Some(Rc::new({
                let n = player_defeats.clone();
                move || n.set(n.get() + 1)
            })),
        };
        let engine = BattleEngine::new("battle", &host, services, config, callbacks);
        Fixture {
            engine,
            log,
            sink,
            timers,
            boss_defeats,
            player_defeats,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(BattleConfig::default())
    }

    fn boss(health: u32) -> Combatant {
        Combatant::new("Zorg", "👾", health)
    }

    fn cadet() -> Combatant {
        Combatant::new("Cadet", "🧑‍🚀", 10)
    }

    fn play_turn(engine: &mut BattleEngine, correct: bool) -> Option<Outcome> {
        engine.record_answer(correct).unwrap();
        let outcome = engine.resolve_attack();
        if outcome.is_none() {
            assert!(engine.next_turn());
        }
        outcome
    }

    #[test]
    fn test_start_battle_sets_health() {
        let mut f = fixture();
        f.engine.start_battle(boss(150), cadet());
        assert_eq!(f.engine.boss_health(), 150);
        assert_eq!(f.engine.max_boss_health(), 150);
        assert_eq!(f.engine.player_health(), 100);
        assert_eq!(f.engine.correct_streak(), 0);
        assert_eq!(f.engine.super_attack_charge(), 0);
        assert!(!f.engine.super_attack_ready());
        assert_eq!(f.engine.current_boss().unwrap().name, "Zorg");
    }

    #[test]
    fn test_start_battle_with_error_is_noop() {
        let host = HeadlessHost::new();
        let (services, sink, _) = test_services();
        let mut engine = BattleEngine::new(
            "missing",
            &host,
            services,
            BattleConfig::default(),
            BattleCallbacks::default(),
        );
        assert!(engine.has_error());
        assert_eq!(sink.error_count(), 1);
        engine.start_battle(boss(150), cadet());
        assert!(engine.current_boss().is_none());
        // Logged at error level on top of the guard warning
        assert_eq!(sink.error_count(), 2);
        assert_eq!(
            sink.warnings.borrow().last().unwrap(),
            "cannot start battle: context unavailable"
        );
    }

    #[test]
    fn test_input_rejected_while_processing() {
        let mut f = fixture();
        f.engine.start_battle(boss(150), cadet());
        f.engine.present_question().unwrap();
        let answer = f.engine.current_question().unwrap().answer;

        let report = f.engine.submit_answer(answer).unwrap();
        assert!(report.correct);
        assert!(f.engine.is_processing());
        assert!(f.engine.record_answer(true).is_none());
        // Blocking on the boss turn does not count toward the streak
        assert_eq!(f.engine.correct_streak(), 0);
        assert_eq!(f.sink.warning_count(), 1);

        assert_eq!(f.engine.resolve_attack(), None);
        assert!(f.engine.is_processing());
        assert!(f.engine.next_turn());
        assert!(!f.engine.is_processing());
        assert_eq!(f.engine.phase().side(), Some(Side::Player));
    }

    #[test]
    fn test_answer_callbacks() {
        let mut f = fixture();
        let correct = Rc::new(Cell::new(0));
        let wrong = Rc::new(Cell::new(0));
        f.engine.set_on_correct_answer({
            let c = correct.clone();
            move || c.set(c.get() + 1)
        });
        f.engine.set_on_wrong_answer({
            let w = wrong.clone();
            move || w.set(w.get() + 1)
        });
        f.engine.start_battle(boss(150), cadet());
        play_turn(&mut f.engine, true);
        play_turn(&mut f.engine, false);
        play_turn(&mut f.engine, true);
        assert_eq!(correct.get(), 2);
        assert_eq!(wrong.get(), 1);
    }

    #[test]
    fn test_boss_defeated_once() {
        let mut f = fixture();
        f.engine.start_battle(boss(40), cadet());
        let mut outcome = None;
        for _ in 0..10 {
            outcome = play_turn(&mut f.engine, true);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(Outcome::BossDefeated));
        assert_eq!(f.engine.boss_health(), 0);
        assert!(f.engine.record_answer(true).is_none());
        assert_eq!(f.engine.resolve_attack(), None);
        assert_eq!(f.boss_defeats.get(), 1);
        assert_eq!(f.player_defeats.get(), 0);
    }

    #[test]
    fn test_player_defeated_once() {
        let mut f = fixture();
        f.engine.start_battle(boss(500), cadet());
        let mut outcome = None;
        for _ in 0..30 {
            outcome = play_turn(&mut f.engine, false);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(Outcome::PlayerDefeated));
        assert_eq!(f.engine.player_health(), 0);
        assert_eq!(f.player_defeats.get(), 1);
        assert!(f.engine.shake_intensity() > 0.0);
    }

    #[test]
    fn test_super_attack_flow() {
        let mut f = fixture();
        f.engine.start_battle(boss(1000), cadet());
        for _ in 0..3 {
            play_turn(&mut f.engine, true);
            assert!(!f.engine.arm_super_attack() || f.engine.super_attack_ready());
            play_turn(&mut f.engine, true);
        }
        assert!(f.engine.super_attack_ready());
        play_turn(&mut f.engine, true);
        assert!(f.engine.arm_super_attack());

        let before = f.engine.boss_health();
        let report = f.engine.record_answer(true).unwrap();
        assert!(report.super_attack);
        f.engine.resolve_attack();
        assert_eq!(before - f.engine.boss_health(), report.damage);
        assert!(f.engine.flash_effect() > 0.0);
        assert!(!f.engine.super_attack_ready());
    }

    #[test]
    fn test_reset_keeps_error_and_surface() {
        let mut f = fixture();
        f.engine.start_battle(boss(150), cadet());
        play_turn(&mut f.engine, true);
        play_turn(&mut f.engine, true);
        f.engine.record_answer(true);
        f.engine.resolve_attack();
        assert!(f.engine.particles().count() > 0);

        f.engine.handle_error(EngineError::InvalidState("forced".into()));
        f.engine.reset();
        assert_eq!(f.engine.particles().count(), 0);
        assert_eq!(f.engine.correct_streak(), 0);
        assert_eq!(f.engine.super_attack_charge(), 0);
        assert!(!f.engine.super_attack_ready());
        assert!(!f.engine.is_processing());
        assert!(f.engine.has_error());
        assert!(f.engine.surface.is_some());
    }

    #[test]
    fn test_error_reports_defeat_after_delay() {
        let mut f = fixture();
        f.engine.start();
        f.engine.start_battle(boss(150), cadet());
        f.log.fail_on(DrawOp::Clear);
        f.engine.render();

        assert!(f.engine.has_error());
        assert!(!f.engine.is_running());
        assert!(f.log.texts().contains(&BATTLE_ERROR_MESSAGE.to_string()));

        f.timers.advance(1999);
        assert_eq!(f.player_defeats.get(), 0);
        f.timers.advance(1);
        assert_eq!(f.player_defeats.get(), 1);

        // A second fault does not schedule again
        f.engine.handle_error(EngineError::InvalidState("again".into()));
        f.timers.advance(5000);
        assert_eq!(f.player_defeats.get(), 1);
    }

    #[test]
    fn test_failed_notice_is_swallowed() {
        let mut f = fixture();
        f.engine.start_battle(boss(150), cadet());
        f.log.fail_on(DrawOp::Clear);
        f.log.fail_on(DrawOp::ContainerMessage);
        f.engine.render();
        assert!(f.engine.has_error());
        assert_eq!(f.sink.error_count(), 2);
    }

    #[test]
    fn test_effects_decay_with_updates() {
        let host = HeadlessHost::new();
        host.add_surface("battle", 800.0, 600.0);
        let (services, _, _) = test_services();
        let audio = Rc::new(RecordingAudio::default());
        let mut engine = BattleEngine::new(
            "battle",
            &host,
            services.with_audio(audio.clone()),
            BattleConfig::default(),
            BattleCallbacks::default(),
        );
        engine.start_battle(boss(150), cadet());
        play_turn(&mut engine, false);
        assert!(engine.shake_intensity() > 0.0);
        assert!(audio.cues.borrow().contains(&Cue::Attack));

        for _ in 0..120 {
            engine.update(1.0 / 60.0);
        }
        assert_eq!(engine.shake_intensity(), 0.0);
        assert_eq!(engine.particles().count(), 0);
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let mut config = BattleConfig::default();
        config.effects.reduced_motion = true;
        let mut f = fixture_with(config);
        f.engine.start_battle(boss(150), cadet());
        play_turn(&mut f.engine, false);
        assert_eq!(f.engine.shake_intensity(), 0.0);
        assert_eq!(f.engine.player_health(), 85);
    }
}
