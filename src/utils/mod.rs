use chrono::{DateTime, Local};

use crate::models::DisplayValue;

pub const GLYPH_CLEAR: &str = "✓";
pub const GLYPH_RAISED: &str = "✗";
pub const GLYPH_UNKNOWN: &str = "○";
pub const PLACEHOLDER: &str = "-";

/// Renders a field the same way everywhere: flags as badges, missing values
/// as the neutral badge, empty text as a dash.
pub fn safe_display(value: &DisplayValue) -> String {
    match value {
        DisplayValue::Flag(false) => GLYPH_CLEAR.to_string(),
        DisplayValue::Flag(true) => GLYPH_RAISED.to_string(),
        DisplayValue::Absent => GLYPH_UNKNOWN.to_string(),
        DisplayValue::Empty => PLACEHOLDER.to_string(),
        DisplayValue::Text(text) => text.clone(),
    }
}

pub fn format_amount(currency: &str, value: &DisplayValue) -> String {
    format!("{}{}", currency, safe_display(value))
}

/// File URLs written as `-` by the extractor mean "no document".
pub fn file_link(value: &DisplayValue) -> Option<&str> {
    match value.as_text() {
        Some(url) if !url.is_empty() && url != PLACEHOLDER => Some(url),
        _ => None,
    }
}

pub fn format_timestamp(value: DateTime<Local>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}
