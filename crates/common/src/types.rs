use serde::{Deserialize, Serialize};
use std::fmt;

/// Family name that selects the platform's default font. Never fetched remotely.
pub const SYSTEM_FONT_FAMILY: &str = "system-ui";

/// Generic family appended to every font specification.
pub const FALLBACK_FAMILY: &str = "sans-serif";

/// Error for a numeric field value outside its allowed domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("font size {0} outside 1..=64")]
    FontSize(u32),
    #[error("font weight {0} is not a multiple of 100 in 100..=900")]
    FontWeight(u16),
}

/// Font size in pixels, always within `1..=64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FontSize(u32);

impl FontSize {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 64;

    /// Clamp an arbitrary integer into the allowed range.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for FontSize {
    type Error = RangeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RangeError::FontSize(value))
        }
    }
}

impl From<FontSize> for u32 {
    fn from(size: FontSize) -> Self {
        size.0
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// CSS-style font weight: one of 100, 200, ..., 900.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct FontWeight(u16);

impl FontWeight {
    pub const THIN: Self = Self(100);
    pub const REGULAR: Self = Self(400);
    pub const BOLD: Self = Self(700);
    pub const BLACK: Self = Self(900);

    /// Clamp into `100..=900`, then round to the nearest multiple of 100.
    /// Halfway values round up.
    pub fn clamped(value: i64) -> Self {
        let v = value.clamp(100, 900);
        Self((((v + 50) / 100) * 100) as u16)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Distance used when picking the closest available face.
    pub fn distance(self, other: Self) -> u16 {
        self.0.abs_diff(other.0)
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::REGULAR
    }
}

impl TryFrom<u16> for FontWeight {
    type Error = RangeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if (100..=900).contains(&value) && value % 100 == 0 {
            Ok(Self(value))
        } else {
            Err(RangeError::FontWeight(value))
        }
    }
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        weight.0
    }
}

/// Load state of the font requested by the current font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontEmbedState {
    /// No font has been requested yet.
    #[default]
    None,
    /// A fetch for the current embed string is outstanding.
    Loading,
    /// The font for the current family is available.
    Loaded,
    /// The last fetch failed.
    Error,
}

impl FontEmbedState {
    pub fn is_loaded(self) -> bool {
        matches!(self, Self::Loaded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for FontEmbedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel dimensions of the last successfully rasterized texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextureStats {
    pub width: u32,
    pub height: u32,
}

impl TextureStats {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for TextureStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// A single font face delivered by a font source.
#[derive(Clone, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    pub weight: FontWeight,
    pub data: Vec<u8>,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("weight", &self.weight.get())
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Embed string for a family: `None` for the system font, otherwise the
/// family with spaces replaced by `+`.
pub fn embed_for_family(family: &str) -> Option<String> {
    if family == SYSTEM_FONT_FAMILY {
        None
    } else {
        Some(family.replace(' ', "+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_clamps_both_ends() {
        assert_eq!(FontSize::clamped(0).get(), 1);
        assert_eq!(FontSize::clamped(-40).get(), 1);
        assert_eq!(FontSize::clamped(65).get(), 64);
        assert_eq!(FontSize::clamped(32).get(), 32);
    }

    #[test]
    fn font_weight_rounds_to_hundreds() {
        assert_eq!(FontWeight::clamped(0).get(), 100);
        assert_eq!(FontWeight::clamped(1200).get(), 900);
        assert_eq!(FontWeight::clamped(449).get(), 400);
        assert_eq!(FontWeight::clamped(450).get(), 500);
        assert_eq!(FontWeight::clamped(951).get(), 900);
    }

    #[test]
    fn out_of_range_numbers_fail_to_deserialize() {
        assert!(serde_json::from_str::<FontSize>("0").is_err());
        assert!(serde_json::from_str::<FontSize>("65").is_err());
        assert!(serde_json::from_str::<FontWeight>("450").is_err());
        assert_eq!(serde_json::from_str::<FontWeight>("700").unwrap(), FontWeight::BOLD);
    }

    #[test]
    fn embed_string_replaces_spaces() {
        assert_eq!(embed_for_family("Open Sans").as_deref(), Some("Open+Sans"));
        assert_eq!(embed_for_family("Iceland").as_deref(), Some("Iceland"));
        assert_eq!(embed_for_family(SYSTEM_FONT_FAMILY), None);
    }

    #[test]
    fn stats_display_uses_times_sign() {
        assert_eq!(TextureStats::new(40, 14).to_string(), "40×14");
    }

    #[test]
    fn embed_state_serializes_lowercase() {
        let json = serde_json::to_string(&FontEmbedState::Loading).unwrap();
        assert_eq!(json, "\"loading\"");
    }
}
