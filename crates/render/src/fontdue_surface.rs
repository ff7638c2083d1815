use crate::buffer::PixelBuffer;
use crate::surface::{FontSpec, SurfaceError, TextMetrics, TextSurface};
use fontdue::{Font, FontSettings};
use std::collections::HashMap;
use textura_common::{FALLBACK_FAMILY, FontFace, FontWeight, Rgba, SYSTEM_FONT_FAMILY};

struct LoadedFace {
    weight: FontWeight,
    font: Font,
}

/// CPU text surface backed by `fontdue`.
///
/// Families are matched case-insensitively. The generic `sans-serif` and the
/// `system-ui` sentinel both resolve to the configured system font. Within a
/// family the face with the nearest weight wins.
#[derive(Default)]
pub struct FontdueSurface {
    families: HashMap<String, Vec<LoadedFace>>,
    system: Option<Font>,
}

impl FontdueSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_font(data: &[u8]) -> Result<Self, SurfaceError> {
        let mut surface = Self::new();
        surface.set_system_font(data)?;
        Ok(surface)
    }

    pub fn set_system_font(&mut self, data: &[u8]) -> Result<(), SurfaceError> {
        self.system = Some(parse_face(SYSTEM_FONT_FAMILY, data)?);
        Ok(())
    }

    pub fn has_system_font(&self) -> bool {
        self.system.is_some()
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.families.contains_key(&family_key(family))
    }

    /// Number of installed faces across all families.
    pub fn face_count(&self) -> usize {
        self.families.values().map(Vec::len).sum()
    }

    fn resolve(&self, spec: &FontSpec) -> Result<&Font, SurfaceError> {
        for family in &spec.families {
            let key = family_key(family);
            if key == FALLBACK_FAMILY || key == SYSTEM_FONT_FAMILY {
                if let Some(font) = &self.system {
                    return Ok(font);
                }
                continue;
            }
            let nearest = self
                .families
                .get(&key)
                .and_then(|faces| faces.iter().min_by_key(|f| f.weight.distance(spec.weight)));
            if let Some(face) = nearest {
                return Ok(&face.font);
            }
        }
        Err(SurfaceError::NoFace(spec.to_string()))
    }
}

impl TextSurface for FontdueSurface {
    fn install_faces(&mut self, faces: Vec<FontFace>) -> Result<(), SurfaceError> {
        let mut parsed: HashMap<String, Vec<LoadedFace>> = HashMap::new();
        for face in faces {
            let font = parse_face(&face.family, &face.data)?;
            parsed
                .entry(family_key(&face.family))
                .or_default()
                .push(LoadedFace {
                    weight: face.weight,
                    font,
                });
        }
        for (family, faces) in parsed {
            tracing::debug!(%family, faces = faces.len(), "installed font faces");
            self.families.insert(family, faces);
        }
        Ok(())
    }

    fn ensure_ready(&mut self, spec: &FontSpec) -> Result<(), SurfaceError> {
        self.resolve(spec).map(|_| ())
    }

    fn measure(&mut self, spec: &FontSpec, text: &str) -> Result<TextMetrics, SurfaceError> {
        let font = self.resolve(spec)?;
        let px = spec.px();

        // Ink bounds are signed: a hyphen has a negative descent and an
        // underscore a negative ascent.
        let mut ascent = f32::NEG_INFINITY;
        let mut descent = f32::NEG_INFINITY;
        let mut width = 0.0;
        let mut prev: Option<char> = None;
        for ch in text.chars() {
            if let Some(left) = prev {
                width += font.horizontal_kern(left, ch, px).unwrap_or(0.0);
            }
            let glyph = font.metrics(ch, px);
            if glyph.width > 0 && glyph.height > 0 {
                let bounds = glyph.bounds;
                ascent = ascent.max(bounds.ymin + bounds.height);
                descent = descent.max(-bounds.ymin);
            }
            width += glyph.advance_width;
            prev = Some(ch);
        }

        if !ascent.is_finite() {
            // No ink at all (empty text or only spaces).
            ascent = 0.0;
            descent = 0.0;
        }
        Ok(TextMetrics {
            width,
            ascent,
            descent,
        })
    }

    fn fill_text(
        &mut self,
        target: &mut PixelBuffer,
        spec: &FontSpec,
        color: Rgba,
        text: &str,
        x: f32,
        baseline: f32,
    ) -> Result<(), SurfaceError> {
        let font = self.resolve(spec)?;
        let px = spec.px();

        let mut pen = x;
        let mut prev: Option<char> = None;
        for ch in text.chars() {
            if let Some(left) = prev {
                pen += font.horizontal_kern(left, ch, px).unwrap_or(0.0);
            }
            let (glyph, coverage) = font.rasterize(ch, px);
            let left = (pen + glyph.xmin as f32).round() as i32;
            let top = (baseline - (glyph.ymin + glyph.height as i32) as f32).round() as i32;

            for row in 0..glyph.height {
                for col in 0..glyph.width {
                    let alpha = coverage[row * glyph.width + col];
                    target.blend(left + col as i32, top + row as i32, color, alpha);
                }
            }
            pen += glyph.advance_width;
            prev = Some(ch);
        }
        Ok(())
    }
}

fn family_key(family: &str) -> String {
    family.trim().to_lowercase()
}

fn parse_face(family: &str, data: &[u8]) -> Result<Font, SurfaceError> {
    Font::from_bytes(data, FontSettings::default()).map_err(|reason| SurfaceError::InvalidFace {
        family: family.to_string(),
        reason: reason.to_string(),
    })
}
