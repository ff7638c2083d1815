//! Committers: turn raw control values into validated field values.

use textura_common::{FieldValue, FontSize, FontWeight, Rgba};

/// Parse the leading integer of `raw`: optional whitespace, optional sign,
/// then decimal digits. Trailing text is ignored (`"12px"` is 12).
/// Values beyond `i64` saturate.
pub fn parse_integer_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        let d = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    seen.then_some(value)
}

pub fn commit_text(raw: String) -> Option<FieldValue> {
    Some(FieldValue::Text(raw))
}

pub fn commit_font_family(raw: String) -> Option<FieldValue> {
    Some(FieldValue::FontFamily(raw))
}

/// Clamp into `1..=64`.
pub fn commit_font_size(value: i64) -> FieldValue {
    FieldValue::FontSize(FontSize::clamped(value))
}

/// Clamp into `100..=900` and round to the nearest hundred.
pub fn commit_font_weight(value: i64) -> FieldValue {
    FieldValue::FontWeight(FontWeight::clamped(value))
}

pub fn commit_font_size_text(raw: String) -> Option<FieldValue> {
    match parse_integer_prefix(&raw) {
        Some(v) => Some(commit_font_size(v)),
        None => {
            tracing::debug!(%raw, "font size input is not a number, ignored");
            None
        }
    }
}

pub fn commit_font_weight_text(raw: String) -> Option<FieldValue> {
    match parse_integer_prefix(&raw) {
        Some(v) => Some(commit_font_weight(v)),
        None => {
            tracing::debug!(%raw, "font weight input is not a number, ignored");
            None
        }
    }
}

pub fn commit_color(raw: &str) -> Option<FieldValue> {
    match raw.parse::<Rgba>() {
        Ok(color) => Some(FieldValue::Color(color)),
        Err(err) => {
            tracing::warn!(%err, "invalid color input ignored");
            None
        }
    }
}
