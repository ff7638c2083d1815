/// A raw value produced by a form control, before debouncing and validation.
///
/// Numeric controls deliver their text as typed; the committer parses and
/// clamps it. The presentation layer never writes fields directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    /// Text to render.
    Text(String),
    /// Font family name, e.g. `"Open Sans"` or `"system-ui"`.
    FontFamily(String),
    /// Font size as typed into a numeric field.
    FontSize(String),
    /// Font weight as typed into a numeric field.
    FontWeight(String),
    /// Hex color from a color picker.
    Color(String),
    /// Marquee checkbox state.
    TextureMarquee(bool),
}

impl FieldInput {
    /// Whether this input is committed without waiting for a quiet period.
    pub fn is_immediate(&self) -> bool {
        matches!(self, Self::Color(_) | Self::TextureMarquee(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_and_marquee_are_immediate() {
        assert!(FieldInput::Color("#fff".into()).is_immediate());
        assert!(FieldInput::TextureMarquee(true).is_immediate());
    }

    #[test]
    fn typed_fields_are_debounced() {
        assert!(!FieldInput::Text("a".into()).is_immediate());
        assert!(!FieldInput::FontFamily("Iceland".into()).is_immediate());
        assert!(!FieldInput::FontSize("12".into()).is_immediate());
        assert!(!FieldInput::FontWeight("700".into()).is_immediate());
    }
}
