//! Error types shared by every engine
//!
//! Nothing in here ever reaches the host as a failure: engines convert these
//! into their terminal error state at the operation boundary.

use thiserror::Error;

/// Failures resolving or drawing into a render surface
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("surface '{0}' not found")]
    NotFound(String),
    #[error("2d context unavailable for surface '{0}'")]
    ContextUnavailable(String),
    #[error("surface '{id}' has unusable size {width}x{height}")]
    InvalidSize { id: String, width: f32, height: f32 },
    #[error("draw call `{op}` failed: {reason}")]
    Draw { op: &'static str, reason: String },
}

impl SurfaceError {
    pub fn draw(op: &'static str, reason: impl Into<String>) -> Self {
        Self::Draw {
            op,
            reason: reason.into(),
        }
    }
}

/// Anything that can put an engine into its error state
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("failed to build initial scene: {0}")]
    Construction(String),
    #[error("invalid engine state: {0}")]
    InvalidState(String),
}

pub type EngineResult<T = ()> = Result<T, EngineError>;
