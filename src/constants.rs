//! wM-Bus Framing Constants
//!
//! This module defines the constants used when assembling radio packets,
//! based on the EN 13757-4 link layer.

/// Number of bytes read from the radio before the packet size can be computed
pub const WMBUS_PREAMBLE_SIZE: usize = 3;

/// Length of the mode C prefix (0x54 + block preamble) stripped before CRC removal
pub const WMBUS_MODE_C_SUFFIX_LEN: usize = 2;

/// First on-air byte of a mode C1 transmission
pub const WMBUS_MODE_C_PREAMBLE: u8 = 0x54;

/// Mode C block preamble announcing frame format A
pub const WMBUS_BLOCK_A_PREAMBLE: u8 = 0xCD;

/// Mode C block preamble announcing frame format B
pub const WMBUS_BLOCK_B_PREAMBLE: u8 = 0x3D;

/// Smallest normalized frame (L, C, M, A and CI fields)
pub const WMBUS_MIN_FRAME_LEN: usize = 11;

// ----------------------------------------------------------------------------
// Data link layer block layout
// ----------------------------------------------------------------------------

/// Size of a DLL CRC field
pub const DLL_CRC_LEN: usize = 2;

/// Data bytes in the first format A block (L through A field)
pub const FORMAT_A_FIRST_BLOCK_LEN: usize = 10;

/// Data bytes in every following format A block
pub const FORMAT_A_BLOCK_LEN: usize = 16;

/// Offset of the first format B CRC in frames longer than one block
pub const FORMAT_B_FIRST_CRC_POS: usize = 126;

/// Largest format B frame that carries a single CRC
pub const FORMAT_B_SINGLE_BLOCK_MAX: usize = 128;

/// Smallest buffer that can hold a DLL header plus its CRC
pub const DLL_MIN_LEN: usize = 12;

/// L-field values below this fit in two format A blocks
pub const FORMAT_A_TWO_BLOCK_LIMIT: u8 = 26;

// ----------------------------------------------------------------------------
// Diagnostics
// ----------------------------------------------------------------------------

/// Default window of the drop warning throttle
pub const LOG_THROTTLE_WINDOW_MS: u64 = 1000;

/// Default number of drop warnings per throttle window
pub const LOG_THROTTLE_CAP: u32 = 5;
