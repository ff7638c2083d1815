//! Engine: wires the field store, input debouncing, the font embed state
//! machine and the texture rasterizer into one deterministic loop.
//!
//! # Invariants
//! - Time only moves through `advance`; debounced commits fire in deadline order.
//! - At most one rasterizer pass runs per turn, after all of the turn's writes.
//! - Errors inside the loop become state (font `error`, failed pass), never panics.

pub mod config;
pub mod engine;

pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, EngineEvent};

pub fn crate_info() -> &'static str {
    "textura-kernel v0.1.0"
}
