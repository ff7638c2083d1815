use crate::buffer::PixelBuffer;
use std::fmt;
use textura_common::{FALLBACK_FAMILY, FontFace, FontSize, FontWeight, Rgba};

/// Font selection for measuring and painting: weight, pixel size and an
/// ordered family list ending in the generic fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub weight: FontWeight,
    pub size: FontSize,
    pub families: Vec<String>,
}

impl FontSpec {
    pub fn compose(weight: FontWeight, size: FontSize, family: &str) -> Self {
        Self {
            weight,
            size,
            families: vec![family.to_string(), FALLBACK_FAMILY.to_string()],
        }
    }

    pub fn px(&self) -> f32 {
        self.size.get() as f32
    }
}

impl fmt::Display for FontSpec {
    /// CSS font shorthand, e.g. `400 32px Iceland, sans-serif`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}px {}",
            self.weight.get(),
            self.size.get(),
            self.families.join(", ")
        )
    }
}

/// Bounding box of a measured string, relative to its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    /// Advance width.
    pub width: f32,
    /// Distance from the baseline to the top of the highest glyph.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the lowest glyph.
    pub descent: f32,
}

/// Errors from a text surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("no installed face matches {0}")]
    NoFace(String),
    #[error("invalid font face for {family}: {reason}")]
    InvalidFace { family: String, reason: String },
    #[error("text surface unavailable: {0}")]
    Unavailable(String),
}

/// Platform text measurement and painting.
pub trait TextSurface {
    /// Make faces delivered by a font fetch available. Faces for a family
    /// replace whatever that family had before. All-or-nothing.
    fn install_faces(&mut self, faces: Vec<FontFace>) -> Result<(), SurfaceError>;

    /// Confirm that `spec` resolves to a usable face.
    fn ensure_ready(&mut self, spec: &FontSpec) -> Result<(), SurfaceError>;

    fn measure(&mut self, spec: &FontSpec, text: &str) -> Result<TextMetrics, SurfaceError>;

    /// Paint `text` with its baseline starting at (`x`, `baseline`).
    fn fill_text(
        &mut self,
        target: &mut PixelBuffer,
        spec: &FontSpec,
        color: Rgba,
        text: &str,
        x: f32,
        baseline: f32,
    ) -> Result<(), SurfaceError>;
}
