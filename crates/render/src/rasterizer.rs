use crate::buffer::{AspectRatio, PixelBuffer};
use crate::surface::{FontSpec, SurfaceError, TextMetrics, TextSurface};
use textura_common::{ConfigSnapshot, FieldValue, FontEmbedState, TextureStats};
use textura_store::FieldStore;

/// Result of one rasterizer pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    /// Buffer resized, stats published and text painted.
    Rendered(TextureStats),
    /// Font not loaded; previous buffer and stats left untouched.
    Suspended(FontEmbedState),
    /// Surface failed this cycle. Eligible to run again on the next change.
    Failed(SurfaceError),
}

impl PassOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }
}

/// Buffer dimensions for measured text: the width is doubled in marquee mode.
pub fn texture_size(metrics: &TextMetrics, marquee: bool) -> (u32, u32) {
    let width = metrics.width.ceil().max(0.0) as u32;
    let height = (metrics.ascent + metrics.descent).ceil().max(0.0) as u32;
    let width = if marquee { width.saturating_mul(2) } else { width };
    (width, height)
}

/// Turns the current configuration into a painted pixel buffer.
///
/// Passes are driven from outside: the caller runs one whenever any raster
/// input in the store changed. The pass reads a single snapshot, so two
/// writes committed before it are always seen together.
pub struct TextureRasterizer<S> {
    surface: S,
    buffer: PixelBuffer,
    aspect_ratio: Option<AspectRatio>,
    passes: u64,
}

impl<S: TextSurface> TextureRasterizer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            buffer: PixelBuffer::default(),
            aspect_ratio: None,
            passes: 0,
        }
    }

    /// Run one pass against the store's current snapshot.
    pub fn run(&mut self, store: &mut FieldStore) -> PassOutcome {
        self.passes += 1;
        let config = store.snapshot();
        let _span = tracing::info_span!("rasterize", pass = self.passes).entered();

        if !config.font_embed_state.is_loaded() {
            tracing::trace!(state = %config.font_embed_state, "font not loaded; pass skipped");
            return PassOutcome::Suspended(config.font_embed_state);
        }

        let spec = FontSpec::compose(config.font_weight, config.font_size, &config.font_family);
        match self.render(&config, &spec, store) {
            Ok(stats) => {
                tracing::debug!(font = %spec, %stats, "texture rasterized");
                PassOutcome::Rendered(stats)
            }
            Err(err) => {
                tracing::warn!(font = %spec, %err, "rasterize pass failed");
                PassOutcome::Failed(err)
            }
        }
    }

    fn render(
        &mut self,
        config: &ConfigSnapshot,
        spec: &FontSpec,
        store: &mut FieldStore,
    ) -> Result<TextureStats, SurfaceError> {
        self.surface.ensure_ready(spec)?;
        let metrics = self.surface.measure(spec, &config.text)?;

        let (width, height) = texture_size(&metrics, config.texture_marquee);
        self.buffer.resize(width, height);
        self.aspect_ratio = Some(self.buffer.aspect_ratio());

        let stats = self.buffer.stats();
        store.write(FieldValue::TextureStats(stats));

        if !self.buffer.is_empty() {
            let baseline = metrics.ascent.ceil();
            self.surface.fill_text(
                &mut self.buffer,
                spec,
                config.color,
                &config.text,
                0.0,
                baseline,
            )?;
        }
        Ok(stats)
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Presentation hint recorded by the last successful resize.
    pub fn aspect_ratio(&self) -> Option<AspectRatio> {
        self.aspect_ratio
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use textura_common::{FontFace, Rgba};
    use textura_store::FieldDefaults;

    /// Every glyph is 10 wide, 10 above and 4 below the baseline.
    #[derive(Default)]
    struct FixedSurface {
        unavailable: bool,
        painted: Vec<(String, Rgba, f32)>,
    }

    impl TextSurface for FixedSurface {
        fn install_faces(&mut self, _: Vec<FontFace>) -> Result<(), SurfaceError> {
            Ok(())
        }

        fn ensure_ready(&mut self, _: &FontSpec) -> Result<(), SurfaceError> {
            if self.unavailable {
                return Err(SurfaceError::Unavailable("no context".into()));
            }
            Ok(())
        }

        fn measure(&mut self, _: &FontSpec, text: &str) -> Result<TextMetrics, SurfaceError> {
            let chars = text.chars().count() as f32;
            Ok(TextMetrics {
                width: 10.0 * chars,
                ascent: if chars > 0.0 { 10.0 } else { 0.0 },
                descent: if chars > 0.0 { 4.0 } else { 0.0 },
            })
        }

        fn fill_text(
            &mut self,
            target: &mut PixelBuffer,
            _: &FontSpec,
            color: Rgba,
            text: &str,
            _: f32,
            baseline: f32,
        ) -> Result<(), SurfaceError> {
            target.blend(0, 0, color, 255);
            self.painted.push((text.to_string(), color, baseline));
            Ok(())
        }
    }

    fn loaded_store(text: &str, marquee: bool) -> FieldStore {
        let mut store = FieldStore::in_memory(&FieldDefaults::default());
        store.write(FieldValue::Text(text.to_string()));
        store.write(FieldValue::TextureMarquee(marquee));
        store.write(FieldValue::FontEmbedState(FontEmbedState::Loaded));
        store
    }

    #[test]
    fn sizes_buffer_from_metrics() {
        let mut store = loaded_store("AB", false);
        let mut raster = TextureRasterizer::new(FixedSurface::default());

        assert_eq!(
            raster.run(&mut store),
            PassOutcome::Rendered(TextureStats::new(20, 14))
        );
        assert_eq!(store.texture_stats(), TextureStats::new(20, 14));
        assert_eq!(raster.buffer().width(), 20);
        assert_eq!(raster.buffer().height(), 14);
        assert_eq!(raster.surface().painted[0].2, 10.0);
    }

    #[test]
    fn marquee_doubles_width() {
        let mut store = loaded_store("AB", true);
        let mut raster = TextureRasterizer::new(FixedSurface::default());
        raster.run(&mut store);
        assert_eq!(store.texture_stats(), TextureStats::new(40, 14));
        assert_eq!(
            raster.aspect_ratio(),
            Some(AspectRatio {
                width: 40,
                height: 14
            })
        );
    }

    #[test]
    fn fractional_metrics_round_up() {
        let metrics = TextMetrics {
            width: 20.2,
            ascent: 9.5,
            descent: 3.6,
        };
        assert_eq!(texture_size(&metrics, false), (21, 14));
        assert_eq!(texture_size(&metrics, true), (42, 14));
    }

    #[test]
    fn empty_text_is_zero_area_not_error() {
        let mut store = loaded_store("", true);
        let mut raster = TextureRasterizer::new(FixedSurface::default());
        let outcome = raster.run(&mut store);
        assert!(outcome.is_rendered());
        assert_eq!(store.texture_stats().width, 0);
        assert!(raster.surface().painted.is_empty());
    }

    #[test]
    fn guard_leaves_previous_output_untouched() {
        let mut store = loaded_store("AB", false);
        let mut raster = TextureRasterizer::new(FixedSurface::default());
        raster.run(&mut store);

        store.write(FieldValue::Text("ABCD".into()));
        store.write(FieldValue::FontEmbedState(FontEmbedState::Loading));
        assert_eq!(
            raster.run(&mut store),
            PassOutcome::Suspended(FontEmbedState::Loading)
        );
        assert_eq!(store.texture_stats(), TextureStats::new(20, 14));
        assert_eq!(raster.buffer().width(), 20);

        store.write(FieldValue::FontEmbedState(FontEmbedState::Error));
        assert!(!raster.run(&mut store).is_rendered());
        assert_eq!(store.texture_stats(), TextureStats::new(20, 14));
    }

    #[test]
    fn surface_failure_is_non_fatal() {
        let mut store = loaded_store("AB", false);
        let mut raster = TextureRasterizer::new(FixedSurface {
            unavailable: true,
            ..FixedSurface::default()
        });
        assert!(matches!(
            raster.run(&mut store),
            PassOutcome::Failed(SurfaceError::Unavailable(_))
        ));
        assert!(store.texture_stats().is_empty());

        raster.surface_mut().unavailable = false;
        assert!(raster.run(&mut store).is_rendered());
        assert_eq!(raster.passes(), 2);
    }

    #[test]
    fn paints_in_configured_color() {
        let mut store = loaded_store("A", false);
        store.write(FieldValue::Color(Rgba::opaque(0x11, 0x22, 0x33)));
        let mut raster = TextureRasterizer::new(FixedSurface::default());
        raster.run(&mut store);
        assert_eq!(
            raster.buffer().pixel(0, 0),
            Some(Rgba::opaque(0x11, 0x22, 0x33))
        );
    }
}
