//! # Hex Encoding/Decoding Utilities
//!
//! Hex helpers shared by frame serialization, capture parsing and debug
//! logging.
//!
//! ## Usage
//!
//! ```rust
//! use wmbus_radio::util::hex::{encode_hex, decode_hex};
//!
//! let data = [0x54, 0xCD, 0x0A];
//! let hex_str = encode_hex(&data);
//! assert_eq!(hex_str, "54cd0a");
//!
//! let decoded = decode_hex(&hex_str).unwrap();
//! assert_eq!(decoded, data);
//! ```

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

/// Encode bytes to lowercase hex string
///
/// This is the encoding used by every frame serialization.
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode hex string to bytes
///
/// Accepts both uppercase and lowercase hex characters and an optional
/// `0x` prefix. Whitespace is automatically stripped.
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>, HexError> {
    let trimmed = hex_str.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let cleaned: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return Err(HexError::EmptyString);
    }

    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }

    hex::decode(&cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Format hex data for compact display (useful for logs)
///
/// Formats data as "54 cd 0a" with spaces between bytes.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_lowercase() {
        let data = vec![0xAB, 0xCD, 0xEF];
        assert_eq!(encode_hex(&data), "abcdef");
    }

    #[test]
    fn test_decode_with_prefix_and_whitespace() {
        let expected = vec![0x54, 0xCD, 0x0A];
        assert_eq!(decode_hex("0x54cd0a").unwrap(), expected);
        assert_eq!(decode_hex("  54 CD 0A\n").unwrap(), expected);
    }

    #[test]
    fn test_format_compact() {
        let data = vec![0x54, 0xcd, 0x0a];
        assert_eq!(format_hex_compact(&data), "54 cd 0a");
    }

    #[test]
    fn test_errors() {
        assert_eq!(decode_hex(""), Err(HexError::EmptyString));
        assert_eq!(decode_hex("0x"), Err(HexError::EmptyString));
        assert_eq!(decode_hex("1"), Err(HexError::OddLength(1)));
        assert!(matches!(decode_hex("GG"), Err(HexError::DecodeError(_))));
    }
}
