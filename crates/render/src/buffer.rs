use std::fmt;
use textura_common::{Rgba, TextureStats};

/// Width-to-height ratio of a texture, kept as the integer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// `None` for a zero-height texture.
    pub fn as_f32(self) -> Option<f32> {
        (self.height > 0).then(|| self.width as f32 / self.height as f32)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.width, self.height)
    }
}

/// RGBA8 pixel buffer, row-major, straight alpha.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Change the dimensions. Like a canvas resize, this always clears to
    /// transparent, even when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 4, 0);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn stats(&self) -> TextureStats {
        TextureStats::new(self.width, self.height)
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        AspectRatio {
            width: self.width,
            height: self.height,
        }
    }

    /// Raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some(Rgba {
            r: self.pixels[i],
            g: self.pixels[i + 1],
            b: self.pixels[i + 2],
            a: self.pixels[i + 3],
        })
    }

    /// Composite `color` at `coverage` (0-255) over the pixel at (x, y).
    /// Out-of-bounds coordinates are ignored.
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba, coverage: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height || coverage == 0 {
            return;
        }
        let i = self.index(x as u32, y as u32);

        let sa = color.a as u32 * coverage as u32 / 255;
        if sa == 0 {
            return;
        }
        let da = self.pixels[i + 3] as u32;
        let da_rest = da * (255 - sa) / 255;
        let out_a = sa + da_rest;

        let mix = |src: u8, dst: u8| -> u8 {
            ((src as u32 * sa + dst as u32 * da_rest + out_a / 2) / out_a) as u8
        };
        self.pixels[i] = mix(color.r, self.pixels[i]);
        self.pixels[i + 1] = mix(color.g, self.pixels[i + 1]);
        self.pixels[i + 2] = mix(color.b, self.pixels[i + 2]);
        self.pixels[i + 3] = out_a as u8;
    }

    /// Number of pixels with any coverage.
    pub fn painted_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("painted", &self.painted_pixels())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_transparent() {
        let buf = PixelBuffer::new(3, 2);
        assert_eq!(buf.as_bytes().len(), 24);
        assert_eq!(buf.pixel(2, 1), Some(Rgba::TRANSPARENT));
        assert_eq!(buf.pixel(3, 0), None);
        assert_eq!(buf.painted_pixels(), 0);
    }

    #[test]
    fn resize_clears_contents() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.blend(0, 0, Rgba::WHITE, 255);
        buf.resize(2, 2);
        assert_eq!(buf.painted_pixels(), 0);
        buf.resize(0, 14);
        assert!(buf.is_empty());
        assert!(buf.as_bytes().is_empty());
    }

    #[test]
    fn full_coverage_writes_color() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.blend(0, 0, Rgba::opaque(10, 20, 30), 255);
        assert_eq!(buf.pixel(0, 0), Some(Rgba::opaque(10, 20, 30)));
    }

    #[test]
    fn partial_coverage_on_transparent_keeps_color() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.blend(0, 0, Rgba::opaque(200, 100, 50), 128);
        let px = buf.pixel(0, 0).unwrap();
        assert_eq!((px.r, px.g, px.b), (200, 100, 50));
        assert_eq!(px.a, 128);
    }

    #[test]
    fn overlapping_coverage_accumulates_alpha() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.blend(0, 0, Rgba::WHITE, 128);
        buf.blend(0, 0, Rgba::WHITE, 128);
        assert!(buf.pixel(0, 0).unwrap().a > 128);
    }

    #[test]
    fn out_of_bounds_blend_is_ignored() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.blend(-1, 0, Rgba::WHITE, 255);
        buf.blend(0, 5, Rgba::WHITE, 255);
        assert_eq!(buf.painted_pixels(), 0);
    }

    #[test]
    fn aspect_ratio_hint() {
        let buf = PixelBuffer::new(40, 14);
        assert_eq!(buf.aspect_ratio().to_string(), "40 / 14");
        assert_eq!(PixelBuffer::new(0, 0).aspect_ratio().as_f32(), None);
    }
}
