//! # Utility Modules
//!
//! Hex encoding and log throttling helpers shared across the crate.

pub mod hex;
pub mod logging;

pub use hex::{decode_hex, encode_hex, format_hex_compact, HexError};
pub use logging::{log_frame_hex, LogThrottle};
