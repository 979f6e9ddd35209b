//! Decoding of downloaded export bytes to text.

use filings_core::{FilingError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decodes export bytes.
///
/// UTF-16 is recognised by its byte-order mark; everything else must be UTF-8
/// (with or without BOM).
///
/// # Errors
/// Returns [`FilingError::Decode`] if the bytes are not valid in the detected
/// encoding.
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    if let Some(body) = bytes.strip_prefix(UTF16LE_BOM) {
        return decode_utf16(body, u16::from_le_bytes);
    }
    if let Some(body) = bytes.strip_prefix(UTF16BE_BOM) {
        return decode_utf16(body, u16::from_be_bytes);
    }

    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(body)
        .map(str::to_string)
        .map_err(|e| FilingError::Decode(format!("invalid UTF-8 at byte {}", e.valid_up_to())))
}

fn decode_utf16(body: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    if body.len() % 2 != 0 {
        return Err(FilingError::Decode(format!(
            "UTF-16 payload has odd length {}",
            body.len()
        )));
    }
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| FilingError::Decode(e.to_string()))
}
