//! # wmbus-radio - Wireless M-Bus Packet Assembly
//!
//! The wmbus-radio crate sits between a wireless M-Bus radio and the code
//! that interprets meter telegrams. It accumulates the raw bytes of a
//! transmission, works out how long the transmission is while it is still
//! arriving, normalizes mode C1 and mode T1 encodings into one byte stream,
//! validates the data link layer CRCs and hands out immutable frames.
//!
//! ## Features
//!
//! - Link mode detection (C1 / T1) from the first received byte
//! - Packet size computation from the L-field, before all bytes arrived
//! - 3-of-6 line decoding for mode T
//! - DLL CRC removal for frame formats A and B
//! - rtl-wmbus compatible output lines, hex and JSON views of a frame
//! - A receive loop with pluggable radio sources and frame handlers
//!
//! ## Usage
//!
//! ```rust
//! use wmbus_radio::{Packet, DropReason};
//!
//! let packet = Packet::from_bytes(&[0x54, 0xCD, 0x0A]);
//! match packet.try_into_frame() {
//!     Ok(frame) => println!("{}", frame.as_rtlwmbus()),
//!     Err(reason) => println!("dropped: {reason}"),
//! }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod util;
pub mod wmbus;

pub use crate::config::ReceiverConfig;
pub use crate::error::{DropReason, WMBusError};
pub use crate::logging::{init_logger, DiagnosticSink, LogSink, NullSink, RecordingSink};

// Core wM-Bus types
pub use wmbus::{
    Capture, Frame, FrameFormat, FrameRecord, LinkMode, Packet, RadioSource, Receiver,
    ReceiverStats, ReplayRadio,
};
