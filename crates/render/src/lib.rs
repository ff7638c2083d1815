//! Texture rasterization: text surface interface, pixel buffer, and the
//! reactive pass that turns the field store's configuration into a texture.
//!
//! # Invariants
//! - A pass only paints when the font embed state is `loaded`; otherwise the
//!   previous buffer and texture stats stay as they were.
//! - Buffer width is `ceil(width)`, doubled in marquee mode; height is
//!   `ceil(ascent + descent)`.
//! - Surface failures never escape a pass.
//!
//! The [`TextSurface`] trait is the seam for measuring and painting. The
//! `fontdue` backend is the default; tests swap in fixed-metric surfaces.

mod buffer;
mod fontdue_surface;
mod preview;
mod rasterizer;
mod surface;

pub use buffer::{AspectRatio, PixelBuffer};
pub use fontdue_surface::FontdueSurface;
pub use preview::ascii_preview;
pub use rasterizer::{PassOutcome, TextureRasterizer, texture_size};
pub use surface::{FontSpec, SurfaceError, TextMetrics, TextSurface};

pub fn crate_info() -> &'static str {
    "textura-render v0.1.0"
}
