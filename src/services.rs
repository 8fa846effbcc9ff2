//! Collaborators injected into every engine
//!
//! Engines never reach for globals: the host hands them a [`Services`] bundle
//! at construction, and tests swap any piece for a double.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::engine::EngineKind;
use crate::error::EngineError;

/// A multiplication question as produced by the question service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub table: u8,
    pub multiplier: u8,
    pub answer: u32,
    pub options: Vec<u32>,
    pub difficulty: u8,
}

impl Question {
    /// Prompt text, e.g. `7 × 8 = ?`
    pub fn prompt(&self) -> String {
        format!("{} × {} = ?", self.table, self.multiplier)
    }
}

/// Generates and grades questions. Engines only relay.
pub trait QuestionService {
    fn next_question(&self, difficulty: u8) -> Question;
    fn validate(&self, question: &Question, answer: u32) -> bool;
}

/// Visual markers the player has equipped in the shop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipped {
    pub ship: String,
    pub avatar: String,
}

impl Default for Equipped {
    fn default() -> Self {
        Self {
            ship: "🚀".to_string(),
            avatar: "🧑‍🚀".to_string(),
        }
    }
}

pub trait CosmeticsService {
    fn equipped(&self) -> Equipped;
}

/// Cosmetics for hosts without a shop: always the starter ship
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCosmetics;

impl CosmeticsService for DefaultCosmetics {
    fn equipped(&self) -> Equipped {
        Equipped::default()
    }
}

/// Sound cues engines may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Click,
    Correct,
    Wrong,
    Laser,
    Explosion,
    LifeLost,
    PowerUp,
    Attack,
    SuperAttack,
    Victory,
    GameOver,
}

/// Fire-and-forget audio
pub trait AudioService {
    fn play(&self, cue: Cue);
}

/// One-shot delayed tasks (`setTimeout` on the web)
pub trait Timers {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>);
}

/// Where engines report warnings and faults
pub trait DiagnosticSink {
    fn warn(&self, engine: EngineKind, message: &str);
    fn error(&self, engine: EngineKind, error: &EngineError);
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn warn(&self, engine: EngineKind, message: &str) {
        log::warn!("[{}] {}", engine.as_str(), message);
    }

    fn error(&self, engine: EngineKind, error: &EngineError) {
        log::error!("[{}] {}", engine.as_str(), error);
    }
}

/// Everything an engine talks to besides its surface
#[derive(Clone)]
pub struct Services {
    pub questions: Rc<dyn QuestionService>,
    pub cosmetics: Rc<dyn CosmeticsService>,
    pub audio: Option<Rc<dyn AudioService>>,
    pub timers: Rc<dyn Timers>,
    pub diagnostics: Rc<dyn DiagnosticSink>,
}

impl Services {
    /// Bundle with default cosmetics, no audio and log-backed diagnostics
    pub fn new(questions: Rc<dyn QuestionService>, timers: Rc<dyn Timers>) -> Self {
        Self {
            questions,
            cosmetics: Rc::new(DefaultCosmetics),
            audio: None,
            timers,
            diagnostics: Rc::new(LogSink),
        }
    }

    pub fn with_cosmetics(mut self, cosmetics: Rc<dyn CosmeticsService>) -> Self {
        self.cosmetics = cosmetics;
        self
    }

    pub fn with_audio(mut self, audio: Rc<dyn AudioService>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Play a cue if an audio service is attached
    pub fn play(&self, cue: Cue) {
        if let Some(audio) = &self.audio {
            audio.play(cue);
        }
    }
}

/// The question currently on screen, if any
#[derive(Debug, Clone, Default)]
pub struct QuestionSlot {
    current: Option<Question>,
}

impl QuestionSlot {
    /// Pull a fresh question from the service and keep it
    pub fn present(&mut self, service: &dyn QuestionService, difficulty: u8) -> &Question {
        self.current.insert(service.next_question(difficulty))
    }

    pub fn current(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    /// Grade `answer` against the current question, consuming it.
    /// Returns `None` when no question is on screen.
    pub fn check(&mut self, service: &dyn QuestionService, answer: u32) -> Option<bool> {
        let question = self.current.take()?;
        Some(service.validate(&question, answer))
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
