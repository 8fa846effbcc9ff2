//! Uniform error recovery
//!
//! Once an engine trips, it stays tripped: frame operations become logged
//! no-ops and the host is expected to drop and rebuild the engine.

use std::rc::Rc;

use super::EngineKind;
use crate::error::EngineError;
use crate::services::DiagnosticSink;
use crate::surface::RenderSurface;

/// Where the user-visible failure notice goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Painted over the canvas
    Banner(&'static str),
    /// Replaces the host container's content
    Container(&'static str),
}

/// Error latch plus diagnostics reporting, embedded in every engine
pub struct ErrorPolicy {
    kind: EngineKind,
    failed: bool,
    diagnostics: Rc<dyn DiagnosticSink>,
}

impl ErrorPolicy {
    pub fn new(kind: EngineKind, diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        Self {
            kind,
            failed: false,
            diagnostics,
        }
    }

    pub fn has_error(&self) -> bool {
        self.failed
    }

    /// Gate for a frame operation. Emits one warning and returns false when
    /// the engine is in its error state.
    pub fn admit(&self, op: &str) -> bool {
        if self.failed {
            self.warn(&format!("cannot {op}: context unavailable"));
            return false;
        }
        true
    }

    pub fn warn(&self, message: &str) {
        self.diagnostics.warn(self.kind, message);
    }

    pub fn report(&self, error: &EngineError) {
        self.diagnostics.error(self.kind, error);
    }

    /// Latch a failure found while constructing the engine
    pub fn fail_construction(&mut self, error: &EngineError) {
        self.failed = true;
        self.report(error);
    }

    /// Latch a frame fault and show `fallback` on the surface, if there is one.
    /// A failure while showing the notice is reported and dropped.
    pub fn trip(
        &mut self,
        error: &EngineError,
        surface: Option<&mut RenderSurface>,
        fallback: Fallback,
    ) {
        self.failed = true;
        self.report(error);

        let Some(surface) = surface else { return };
        let shown = match fallback {
            Fallback::Banner(text) => surface.paint_message(text),
            Fallback::Container(text) => surface.show_container_message(text),
        };
        if let Err(e) = shown {
            self.report(&e.into());
        }
    }
}
