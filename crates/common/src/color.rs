use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors from parsing a hex color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("color must have 3, 6 or 8 hex digits: {0:?}")]
    BadLength(String),
    #[error("invalid hex digit in color: {0:?}")]
    BadDigit(String),
}

/// Straight (non-premultiplied) 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self::opaque(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    /// Accepts `#RGB`, `#RRGGBB` and `#RRGGBBAA`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|n| n * 17);
        let bad = |_| ColorParseError::BadDigit(s.to_string());

        match hex.len() {
            3 => Ok(Self::opaque(
                nibble(0).map_err(bad)?,
                nibble(1).map_err(bad)?,
                nibble(2).map_err(bad)?,
            )),
            6 => Ok(Self::opaque(
                byte(0).map_err(bad)?,
                byte(2).map_err(bad)?,
                byte(4).map_err(bad)?,
            )),
            8 => Ok(Self {
                r: byte(0).map_err(bad)?,
                g: byte(2).map_err(bad)?,
                b: byte(4).map_err(bad)?,
                a: byte(6).map_err(bad)?,
            }),
            _ => Err(ColorParseError::BadLength(s.to_string())),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!("#FFFFFF".parse::<Rgba>().unwrap(), Rgba::WHITE);
        assert_eq!("#fff".parse::<Rgba>().unwrap(), Rgba::WHITE);
        assert_eq!(
            "#10203040".parse::<Rgba>().unwrap(),
            Rgba {
                r: 0x10,
                g: 0x20,
                b: 0x30,
                a: 0x40
            }
        );
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(matches!(
            "FFFFFF".parse::<Rgba>(),
            Err(ColorParseError::MissingHash(_))
        ));
        assert!(matches!(
            "#FFFF".parse::<Rgba>(),
            Err(ColorParseError::BadLength(_))
        ));
        assert!(matches!(
            "#GGGGGG".parse::<Rgba>(),
            Err(ColorParseError::BadDigit(_))
        ));
    }

    #[test]
    fn display_omits_opaque_alpha() {
        assert_eq!(Rgba::opaque(0xab, 0x01, 0xff).to_string(), "#AB01FF");
        assert_eq!(Rgba::TRANSPARENT.to_string(), "#00000000");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Rgba::WHITE).unwrap();
        assert_eq!(json, "\"#FFFFFF\"");
        assert!(serde_json::from_str::<Rgba>("\"nope\"").is_err());
    }
}
