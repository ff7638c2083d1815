//! Shared types for the textura engine: field identifiers and values, colors,
//! clamped numeric font parameters, font faces.
//!
//! # Invariants
//! - `FontSize` is always within `1..=64`.
//! - `FontWeight` is always a multiple of 100 within `100..=900`.

pub mod color;
pub mod field;
pub mod types;

pub use color::{ColorParseError, Rgba};
pub use field::{ConfigSnapshot, FieldName, FieldValue};
pub use types::{
    embed_for_family, FontEmbedState, FontFace, FontSize, FontWeight, RangeError, TextureStats,
    FALLBACK_FAMILY, SYSTEM_FONT_FAMILY,
};

pub fn crate_info() -> &'static str {
    "textura-common v0.1.0"
}
