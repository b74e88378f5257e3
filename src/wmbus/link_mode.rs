//! Link mode and frame format tags attached to every received packet.

use std::fmt;

use serde::Serialize;

use crate::constants::{WMBUS_BLOCK_A_PREAMBLE, WMBUS_BLOCK_B_PREAMBLE, WMBUS_MODE_C_PREAMBLE};

/// Physical encoding of a received transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LinkMode {
    /// Not enough bytes to tell yet
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    /// Compact mode: block structured, no line coding
    C1,
    /// Frequent transmit mode: 3-of-6 line coded
    T1,
}

impl LinkMode {
    /// Infer the link mode from the first on-air byte.
    pub fn from_first_byte(byte: u8) -> Self {
        if byte == WMBUS_MODE_C_PREAMBLE {
            LinkMode::C1
        } else {
            LinkMode::T1
        }
    }

    /// Stable short name used in serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            LinkMode::Unknown => "UNKNOWN",
            LinkMode::C1 => "C1",
            LinkMode::T1 => "T1",
        }
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Frame format announced by the block preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FrameFormat {
    A,
    B,
    #[default]
    #[serde(rename = "?")]
    Unknown,
}

impl FrameFormat {
    /// Map a mode C block preamble byte to its frame format.
    pub fn from_block_preamble(byte: u8) -> Self {
        match byte {
            WMBUS_BLOCK_A_PREAMBLE => FrameFormat::A,
            WMBUS_BLOCK_B_PREAMBLE => FrameFormat::B,
            _ => FrameFormat::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FrameFormat::A => "A",
            FrameFormat::B => "B",
            FrameFormat::Unknown => "?",
        }
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
