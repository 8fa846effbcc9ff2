//! Platform layer
//!
//! - `headless`: recording canvases and manual timers for native runs and tests
//! - `web`: `<canvas>` surfaces, `setTimeout` timers and the animation-frame loop
//! - `audio`: Web Audio cue player

pub mod headless;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod web;
