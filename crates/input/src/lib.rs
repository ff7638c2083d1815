//! Field input: raw control values, per-field debouncing, clamping committers.
//!
//! # Invariants
//! - Only the last input within a field's quiet period is ever committed.
//! - Out-of-range font sizes and weights are clamped, never rejected.
//! - Tearing down the coordinator drops pending commits; none fire afterwards.

pub mod commit;
pub mod coordinator;
pub mod debounce;
pub mod input;

pub use coordinator::{DebounceConfig, InputCoordinator};
pub use debounce::Debounced;
pub use input::FieldInput;

pub fn crate_info() -> &'static str {
    "textura-input v0.1.0"
}
