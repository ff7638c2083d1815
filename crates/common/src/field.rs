use crate::color::Rgba;
use crate::types::{FontEmbedState, FontSize, FontWeight, TextureStats};
use std::fmt;

/// Identifies one configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    Text,
    Color,
    FontWeight,
    FontFamily,
    FontSize,
    FontEmbed,
    TextureMarquee,
    FontEmbedState,
    TextureStats,
}

impl FieldName {
    pub const ALL: [Self; 9] = [
        Self::Text,
        Self::Color,
        Self::FontWeight,
        Self::FontFamily,
        Self::FontSize,
        Self::FontEmbed,
        Self::TextureMarquee,
        Self::FontEmbedState,
        Self::TextureStats,
    ];

    /// Fields the texture rasterizer depends on.
    pub const RASTER_INPUTS: [Self; 7] = [
        Self::Text,
        Self::Color,
        Self::FontWeight,
        Self::FontFamily,
        Self::FontSize,
        Self::TextureMarquee,
        Self::FontEmbedState,
    ];

    /// Storage key for this field.
    pub fn key(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Color => "color",
            Self::FontWeight => "fontWeight",
            Self::FontFamily => "fontFamily",
            Self::FontSize => "fontSize",
            Self::FontEmbed => "fontEmbed",
            Self::TextureMarquee => "textureMarquee",
            Self::FontEmbedState => "fontEmbedState",
            Self::TextureStats => "textureStats",
        }
    }

    /// Whether writes to this field survive a restart.
    pub fn is_persistent(self) -> bool {
        !matches!(self, Self::FontEmbedState | Self::TextureStats)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A typed value for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Color(Rgba),
    FontWeight(FontWeight),
    FontFamily(String),
    FontSize(FontSize),
    FontEmbed(Option<String>),
    TextureMarquee(bool),
    FontEmbedState(FontEmbedState),
    TextureStats(TextureStats),
}

impl FieldValue {
    pub fn name(&self) -> FieldName {
        match self {
            Self::Text(_) => FieldName::Text,
            Self::Color(_) => FieldName::Color,
            Self::FontWeight(_) => FieldName::FontWeight,
            Self::FontFamily(_) => FieldName::FontFamily,
            Self::FontSize(_) => FieldName::FontSize,
            Self::FontEmbed(_) => FieldName::FontEmbed,
            Self::TextureMarquee(_) => FieldName::TextureMarquee,
            Self::FontEmbedState(_) => FieldName::FontEmbedState,
            Self::TextureStats(_) => FieldName::TextureStats,
        }
    }
}

/// The rasterizer's dependency set, read at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    pub text: String,
    pub color: Rgba,
    pub font_weight: FontWeight,
    pub font_family: String,
    pub font_size: FontSize,
    pub texture_marquee: bool,
    pub font_embed_state: FontEmbedState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_state_and_stats_are_transient() {
        let transient: Vec<FieldName> = FieldName::ALL
            .into_iter()
            .filter(|f| !f.is_persistent())
            .collect();
        assert_eq!(
            transient,
            vec![FieldName::FontEmbedState, FieldName::TextureStats]
        );
    }

    #[test]
    fn raster_inputs_exclude_outputs() {
        assert!(!FieldName::RASTER_INPUTS.contains(&FieldName::TextureStats));
        assert!(!FieldName::RASTER_INPUTS.contains(&FieldName::FontEmbed));
    }

    #[test]
    fn value_knows_its_field() {
        assert_eq!(FieldValue::TextureMarquee(true).name(), FieldName::TextureMarquee);
        assert_eq!(FieldValue::FontEmbed(None).name(), FieldName::FontEmbed);
    }
}
