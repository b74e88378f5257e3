//! # Decoded wM-Bus Frame
//!
//! A [`Frame`] is the validated result of a packet conversion: CRC-free,
//! line-decoded bytes trimmed to the L-field, plus the on-air capture they
//! came from. Frames are read-only apart from a handled counter, so they can
//! be shared behind an `Arc` between frame handlers.

use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::util::hex::encode_hex;
use crate::wmbus::link_mode::{FrameFormat, LinkMode};

/// Represents a validated Wireless M-Bus (wM-Bus) frame.
#[derive(Debug)]
pub struct Frame {
    data: Vec<u8>,
    raw_data: Vec<u8>,
    link_mode: LinkMode,
    rssi: i8,
    format: FrameFormat,
    handlers_count: AtomicU8,
}

/// Serializable snapshot of a frame, used for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    pub link_mode: LinkMode,
    pub format: FrameFormat,
    pub rssi: i8,
    pub timestamp: DateTime<Utc>,
    pub data: String,
    pub raw: String,
}

impl Frame {
    pub(crate) fn new(
        data: Vec<u8>,
        raw_data: Vec<u8>,
        link_mode: LinkMode,
        rssi: i8,
        format: FrameFormat,
    ) -> Self {
        Self {
            data,
            raw_data,
            link_mode,
            rssi,
            format,
            handlers_count: AtomicU8::new(0),
        }
    }

    /// Normalized frame bytes, starting with the L-field
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// On-air bytes as received, before line decoding and CRC removal
    pub fn raw_data(&self) -> &[u8] {
        &self.raw_data
    }

    pub fn link_mode(&self) -> LinkMode {
        self.link_mode
    }

    pub fn rssi(&self) -> i8 {
        self.rssi
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn raw_size(&self) -> usize {
        self.raw_data.len()
    }

    /// Copy of the normalized bytes
    pub fn as_raw(&self) -> Vec<u8> {
        self.data.clone()
    }

    /// Lowercase hex of the normalized bytes
    pub fn as_hex(&self) -> String {
        encode_hex(&self.data)
    }

    /// Lowercase hex of the on-air bytes
    pub fn as_hex_raw(&self) -> String {
        encode_hex(&self.raw_data)
    }

    /// rtl-wmbus compatible line stamped with the current time.
    pub fn as_rtlwmbus(&self) -> String {
        self.as_rtlwmbus_at(Utc::now())
    }

    /// rtl-wmbus compatible line:
    /// `<mode>;1;1;<YYYY-MM-DD HH:MM:SS.00Z>;<rssi>;;;0x<hex>\n`
    pub fn as_rtlwmbus_at(&self, timestamp: DateTime<Utc>) -> String {
        let mut output = String::with_capacity(2 + 5 + 24 + 1 + 4 + 5 + 2 * self.data.len() + 1);
        output.push_str(self.link_mode.name());
        output.push_str(";1;1;");
        output.push_str(&timestamp.format("%F %T.00Z").to_string());
        output.push(';');
        output.push_str(&self.rssi.to_string());
        output.push_str(";;;0x");
        output.push_str(&self.as_hex());
        output.push('\n');
        output
    }

    /// Serializable record of this frame
    pub fn to_record(&self, timestamp: DateTime<Utc>) -> FrameRecord {
        FrameRecord {
            link_mode: self.link_mode,
            format: self.format,
            rssi: self.rssi,
            timestamp,
            data: self.as_hex(),
            raw: self.as_hex_raw(),
        }
    }

    /// Record that one more consumer processed this frame (saturating).
    pub fn mark_as_handled(&self) {
        let _ = self
            .handlers_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1));
    }

    pub fn handlers_count(&self) -> u8 {
        self.handlers_count.load(Ordering::Relaxed)
    }
}
