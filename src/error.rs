//! # wM-Bus Error Handling
//!
//! This module defines the error types of the wmbus-radio crate. Packet
//! rejections are reported through [`DropReason`], everything else through
//! [`WMBusError`].

use crate::util::hex::HexError;
use thiserror::Error;

/// Represents the different error types that can occur outside packet conversion.
#[derive(Debug, Error)]
pub enum WMBusError {
    /// Indicates an error while reading from the radio source.
    #[error("Radio I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Indicates an invalid hexadecimal capture.
    #[error("Invalid hex capture: {0}")]
    Hex(#[from] HexError),

    /// Indicates a malformed configuration file.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Indicates a capture line that could not be parsed.
    #[error("Invalid capture line {line}: {message}")]
    InvalidCapture { line: usize, message: String },

    /// A catch‑all error for uncategorized cases.
    #[error("Other error: {0}")]
    Other(String),
}

/// Reason a packet was discarded during conversion.
///
/// Conversion itself only reports absence of a frame; the reason travels
/// through the diagnostic sink.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Received byte count does not match the computed packet size.
    #[error("size mismatch: expected {}, got {actual}", fmt_expected(.expected))]
    SizeMismatch {
        expected: Option<usize>,
        actual: usize,
    },

    /// The T1 payload contains an invalid 3-of-6 symbol.
    #[error("3of6 decode failed ({len} bytes)")]
    DecodeFailure { len: usize },

    /// The first byte never resolved to a link mode.
    #[error("unknown link mode")]
    UnknownLinkMode,

    /// DLL CRC check or trim failed.
    #[error("DLL CRC check failed ({len} bytes)")]
    CrcCheckFailed { len: usize },

    /// Fewer bytes than a minimal header after normalization.
    #[error("too short after normalize ({len} bytes)")]
    TooShort { len: usize },

    /// L-field announces more bytes than were received.
    #[error("L-field wants {want} bytes but have {have}")]
    LengthFieldMismatch { want: usize, have: usize },
}

fn fmt_expected(expected: &Option<usize>) -> String {
    match expected {
        Some(size) => size.to_string(),
        None => "unknown".to_string(),
    }
}

/// Result type alias using WMBusError.
pub type Result<T> = std::result::Result<T, WMBusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_reason_messages() {
        let reason = DropReason::SizeMismatch {
            expected: Some(17),
            actual: 12,
        };
        assert_eq!(reason.to_string(), "size mismatch: expected 17, got 12");

        let reason = DropReason::SizeMismatch {
            expected: None,
            actual: 3,
        };
        assert_eq!(reason.to_string(), "size mismatch: expected unknown, got 3");

        let reason = DropReason::LengthFieldMismatch { want: 20, have: 14 };
        assert_eq!(reason.to_string(), "L-field wants 20 bytes but have 14");
    }

    #[test]
    fn test_hex_error_conversion() {
        let err: WMBusError = HexError::OddLength(3).into();
        assert!(matches!(err, WMBusError::Hex(HexError::OddLength(3))));
    }
}
