//! # Wireless M-Bus (wM-Bus) Module
//!
//! Packet assembly and frame validation for wireless M-Bus receivers:
//! link mode detection, 3-of-6 line decoding, DLL CRC removal and the
//! receive loop that ties them to a radio.
//!
pub mod dll_crc;
pub mod encoding;
pub mod frame;
pub mod link_mode;
pub mod packet;
pub mod receiver;

// Re-export the necessary types and functions from the submodules
pub use frame::{Frame, FrameRecord};
pub use link_mode::{FrameFormat, LinkMode};
pub use packet::Packet;
pub use receiver::{Capture, RadioSource, Receiver, ReceiverStats, ReplayRadio};
