//! The lifecycle contract shared by every game mode
//!
//! Each engine owns a surface, a world and a callback set, and implements
//! [`Engine`]: `init → start → (update, render)* → stop`. Faults inside any
//! of these are absorbed by the engine's [`ErrorPolicy`] and never reach the
//! host.

pub mod frame_loop;
pub mod recovery;

pub use frame_loop::{FrameClock, SimulationLoop, run_frame, run_headless};
pub use recovery::{ErrorPolicy, Fallback};

use crate::error::EngineError;

/// Which game mode an engine drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Arcade,
    Orbital,
    Battle,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Arcade => "arcade",
            EngineKind::Orbital => "orbital",
            EngineKind::Battle => "battle",
        }
    }
}

/// Capability interface implemented by the arcade, orbital and battle engines
pub trait Engine {
    fn kind(&self) -> EngineKind;

    /// Reset the world to its starting state
    fn init(&mut self);

    /// Begin (or continue) scheduling frames
    fn start(&mut self);

    /// Stop scheduling frames. Idempotent.
    fn stop(&mut self);

    /// Advance the world by `dt` seconds
    fn update(&mut self, dt: f32);

    /// Draw the current world
    fn render(&mut self);

    /// Enter the terminal error state for `error`
    fn handle_error(&mut self, error: EngineError);

    fn has_error(&self) -> bool;

    fn is_running(&self) -> bool;
}

#[cfg(test)]
mod tests {
    //! Contract checks run against all three engines

    use std::rc::Rc;

    use super::*;
    use crate::arcade::{ArcadeCallbacks, ArcadeConfig, ArcadeEngine};
    use crate::battle::{BattleCallbacks, BattleConfig, BattleEngine};
    use crate::orbital::{OrbitalConfig, OrbitalEngine};
    use crate::platform::headless::{DrawOp, HeadlessHost};
    use crate::services::testing::{RecordingSink, test_services};

    fn build_all(host: &HeadlessHost, id: &str) -> (Vec<Box<dyn Engine>>, Rc<RecordingSink>) {
        let (services, sink, _) = test_services();
        let engines: Vec<Box<dyn Engine>> = vec![
            Box::new(ArcadeEngine::new(
                id,
                host,
                services.clone(),
                ArcadeConfig::default(),
                ArcadeCallbacks::default(),
            )),
            Box::new(OrbitalEngine::new(
                id,
                host,
                services.clone(),
                OrbitalConfig::default(),
            )),
            Box::new(BattleEngine::new(
                id,
                host,
                services,
                BattleConfig::default(),
                BattleCallbacks::default(),
            )),
        ];
        (engines, sink)
    }

    #[test]
    fn test_missing_surface_sets_error_for_all_engines() {
        let host = HeadlessHost::new();
        let (engines, sink) = build_all(&host, "does-not-exist");
        for engine in &engines {
            assert!(engine.has_error(), "{:?}", engine.kind());
            assert!(!engine.is_running());
        }
        assert_eq!(sink.error_count(), 3);
    }

    #[test]
    fn test_contextless_surface_sets_error_for_all_engines() {
        let host = HeadlessHost::new();
        host.add_contextless_surface("no-context");
        let (mut engines, sink) = build_all(&host, "no-context");
        for engine in engines.iter_mut() {
            assert!(engine.has_error(), "{:?}", engine.kind());
            engine.start();
            engine.render();
            assert!(!engine.is_running(), "{:?}", engine.kind());
        }
        assert_eq!(sink.error_count(), 3);
        // start and render each warn once per engine
        assert_eq!(sink.warning_count(), 6);
    }

    #[test]
    fn test_render_with_error_warns_once_per_call() {
        let host = HeadlessHost::new();
        let log = host.add_surface("shared", 800.0, 600.0);
        let (mut engines, sink) = build_all(&host, "shared");
        for engine in engines.iter_mut() {
            engine.handle_error(EngineError::InvalidState("forced".into()));
        }
        log.clear();
        let warnings_before = sink.warning_count();

        for engine in engines.iter_mut() {
            engine.render();
        }
        assert!(log.is_empty(), "no drawing after the error state");
        assert_eq!(sink.warning_count() - warnings_before, 3);
        assert!(
            sink.warnings
                .borrow()
                .iter()
                .all(|w| w == "cannot render: context unavailable")
        );
    }

    #[test]
    fn test_frame_fault_stops_engine_and_draws_message() {
        for index in 0..3 {
            let host = HeadlessHost::new();
            let log = host.add_surface("canvas", 800.0, 600.0);
            let (mut engines, _) = build_all(&host, "canvas");
            let engine = &mut engines[index];
            engine.start();
            assert!(engine.is_running());

            log.fail_on(DrawOp::Clear);
            engine.render();

            assert!(engine.has_error(), "{:?}", engine.kind());
            assert!(!engine.is_running(), "{:?}", engine.kind());
            assert!(!log.texts().is_empty(), "{:?} drew no message", engine.kind());
        }
    }

    #[test]
    fn test_start_stop_round_trip() {
        let host = HeadlessHost::new();
        host.add_surface("canvas", 800.0, 600.0);
        let (mut engines, _) = build_all(&host, "canvas");
        for engine in engines.iter_mut() {
            engine.start();
            assert!(engine.is_running());
            engine.stop();
            assert!(!engine.is_running());
            engine.stop();
            assert!(!engine.is_running());
        }
    }

    #[test]
    fn test_start_is_refused_after_error() {
        let host = HeadlessHost::new();
        let (mut engines, _) = build_all(&host, "missing");
        for engine in engines.iter_mut() {
            engine.start();
            assert!(!engine.is_running());
        }
    }
}
