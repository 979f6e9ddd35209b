//! Cleaning of locale-formatted numeric cells.

use serde_json::Value;

/// Parses a numeric cell such as `¥1,234,567円` into a number.
///
/// Full-width digits, minus signs and periods are folded to ASCII, then every
/// character other than an ASCII digit, `-` or `.` is dropped (this removes
/// yen signs, the `円` suffix and thousands separators). Returns `None` when
/// nothing numeric remains or the remainder does not parse; a malformed cell is
/// missing data, never an error.
#[must_use]
pub fn normalize(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .map(fold_full_width)
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();

    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    cleaned.parse::<f64>().ok()
}

/// Reads a registry JSON scalar that may be a number or a formatted string.
///
/// Strings go through [`normalize`]; `null`, booleans and containers are
/// missing data.
#[must_use]
pub fn normalize_json(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => normalize(s),
        _ => None,
    }
}

fn fold_full_width(c: char) -> char {
    match c {
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
        '－' | '−' => '-',
        '．' => '.',
        _ => c,
    }
}
