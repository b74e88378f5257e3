//! # Radio Packet Assembly
//!
//! A [`Packet`] accumulates the bytes delivered by the radio for a single
//! transmission, works out how long the transmission must be from as few
//! bytes as possible, and finally converts itself into a validated
//! [`Frame`].
//!
//! ## Sizing
//!
//! The L-field sits in a different place per link mode:
//!
//! - **C1**: `0x54`, block preamble, L-field (third byte, no line coding)
//! - **T1**: first byte of the 3-of-6 decoded stream
//!
//! Once known, the on-air size follows from the number of CRC blocks. The
//! result is cached; the packet never changes its mind about its size.
//!
//! ## Conversion
//!
//! [`Packet::try_into_frame`] consumes the packet. Every outcome, success or
//! rejection, ends its life, so a packet can never be converted twice.

use log::{debug, trace};

use crate::constants::{
    FORMAT_A_TWO_BLOCK_LIMIT, WMBUS_BLOCK_A_PREAMBLE, WMBUS_BLOCK_B_PREAMBLE,
    WMBUS_MIN_FRAME_LEN, WMBUS_MODE_C_SUFFIX_LEN, WMBUS_PREAMBLE_SIZE,
};
use crate::error::DropReason;
use crate::logging::{DiagnosticSink, LogSink};
use crate::util::logging::log_frame_hex;
use crate::wmbus::dll_crc::remove_any_dll_crcs;
use crate::wmbus::encoding::{decode_3of6, encoded_size};
use crate::wmbus::frame::Frame;
use crate::wmbus::link_mode::{FrameFormat, LinkMode};

/// Resolve the link mode of a buffer from its first byte.
pub fn detect_link_mode(data: &[u8]) -> LinkMode {
    data.first()
        .map_or(LinkMode::Unknown, |&b| LinkMode::from_first_byte(b))
}

/// Extract the L-field from the bytes received so far.
///
/// Returns `None` while it cannot be determined.
pub fn l_field(link_mode: LinkMode, data: &[u8]) -> Option<u8> {
    let l = match link_mode {
        LinkMode::C1 => data.get(2).copied(),
        LinkMode::T1 => decode_3of6(data).and_then(|decoded| decoded.first().copied()),
        LinkMode::Unknown => None,
    };
    l.filter(|&l| l != 0)
}

/// Number of CRC-protected blocks in a format A frame with L-field `l`.
pub fn block_count(l: u8) -> usize {
    if l < FORMAT_A_TWO_BLOCK_LIMIT {
        2
    } else {
        (l - FORMAT_A_TWO_BLOCK_LIMIT) as usize / 16 + 3
    }
}

/// Compute the total on-air size of a transmission from its head.
///
/// `None` means the size cannot be determined from `data`, either because
/// too few bytes arrived or because a C1 block preamble is not recognized.
pub fn frame_size(link_mode: LinkMode, data: &[u8]) -> Option<usize> {
    let l = l_field(link_mode, data)?;
    let nr_bytes = l as usize + 1 + 2 * block_count(l);

    match link_mode {
        LinkMode::T1 => Some(encoded_size(nr_bytes)),
        LinkMode::C1 => match data.get(1).copied() {
            Some(WMBUS_BLOCK_A_PREAMBLE) => Some(WMBUS_MODE_C_SUFFIX_LEN + nr_bytes),
            Some(WMBUS_BLOCK_B_PREAMBLE) => Some(WMBUS_MODE_C_SUFFIX_LEN + 1 + l as usize),
            _ => None,
        },
        LinkMode::Unknown => None,
    }
}

/// Trim a normalized frame to its L-field, rejecting frames that are too
/// short for a header or shorter than the L-field claims.
pub fn trim_to_l_field(data: &mut Vec<u8>) -> Result<(), DropReason> {
    if data.len() < WMBUS_MIN_FRAME_LEN {
        return Err(DropReason::TooShort { len: data.len() });
    }

    let want = data[0] as usize + 1;
    if want > data.len() {
        return Err(DropReason::LengthFieldMismatch {
            want,
            have: data.len(),
        });
    }
    if want < data.len() {
        trace!("Cutting {} trailing bytes", data.len() - want);
    }
    data.truncate(want);
    Ok(())
}

/// Accumulator for one radio transmission.
#[derive(Debug)]
pub struct Packet {
    /// On-air bytes received so far
    data: Vec<u8>,
    /// Logical capacity offered to the radio
    reserved: usize,
    /// Start of the region handed out by the last `rx_region` call
    rx_start: Option<usize>,
    /// Cached total size, once computable
    expected_size: Option<usize>,
    rssi: i8,
    link_mode: LinkMode,
}

impl Default for Packet {
    fn default() -> Self {
        Self::new()
    }
}

impl Packet {
    /// Create an empty packet ready for the preamble read
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(WMBUS_PREAMBLE_SIZE),
            reserved: WMBUS_PREAMBLE_SIZE,
            rx_start: None,
            expected_size: None,
            rssi: 0,
            link_mode: LinkMode::Unknown,
        }
    }

    /// Create a packet from a complete capture
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut packet = Self::new();
        packet.extend_from_slice(bytes);
        packet
    }

    /// Number of bytes the radio may write before the next size check
    pub fn rx_capacity(&self) -> usize {
        self.reserved.saturating_sub(self.data.len())
    }

    /// Expose the unused capacity as a writable region.
    ///
    /// The content length is provisionally extended over the region; call
    /// [`Packet::commit`] with the number of bytes actually received when it
    /// is less than the region length.
    pub fn rx_region(&mut self) -> &mut [u8] {
        let start = self.data.len();
        if self.reserved > start {
            self.data.resize(self.reserved, 0);
        }
        self.rx_start = Some(start);
        &mut self.data[start..]
    }

    /// Settle the content length after a write into the last `rx_region`.
    pub fn commit(&mut self, received: usize) {
        if let Some(start) = self.rx_start.take() {
            let end = start.saturating_add(received).min(self.data.len());
            self.data.truncate(end);
        }
    }

    /// Append bytes, growing the reservation as needed
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.rx_start = None;
        self.data.extend_from_slice(bytes);
        self.reserved = self.reserved.max(self.data.len());
    }

    /// Current content length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes received so far (on-air encoding)
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn set_rssi(&mut self, rssi: i8) {
        self.rssi = rssi;
    }

    pub fn rssi(&self) -> i8 {
        self.rssi
    }

    /// Link mode, resolved once from the first byte
    pub fn link_mode(&mut self) -> LinkMode {
        if self.link_mode == LinkMode::Unknown {
            self.link_mode = detect_link_mode(&self.data);
        }
        self.link_mode
    }

    /// L-field as far as it can be read from the current content
    pub fn l_field(&mut self) -> Option<u8> {
        let mode = self.link_mode();
        l_field(mode, &self.data)
    }

    /// Total on-air size of this transmission, cached once known
    pub fn expected_size(&mut self) -> Option<usize> {
        if self.expected_size.is_none() {
            let mode = self.link_mode();
            self.expected_size = frame_size(mode, &self.data);
        }
        trace!("expected_size: {:?}", self.expected_size);
        self.expected_size
    }

    /// Compute the expected size and reserve room for the whole packet.
    ///
    /// Returns `false` while the size cannot be determined.
    pub fn calculate_payload_size(&mut self) -> bool {
        match self.expected_size() {
            Some(total) => {
                self.reserved = self.reserved.max(total);
                self.data.reserve(total.saturating_sub(self.data.len()));
                true
            }
            None => false,
        }
    }

    /// Whether every expected byte has arrived
    pub fn is_complete(&mut self) -> bool {
        let len = self.data.len();
        self.expected_size() == Some(len)
    }

    /// Normalize and validate the packet, consuming it.
    pub fn try_into_frame(mut self) -> Result<Frame, DropReason> {
        debug!("Have data from radio ({} bytes)", self.data.len());

        let expected = self.expected_size();
        if expected != Some(self.data.len()) {
            return Err(DropReason::SizeMismatch {
                expected,
                actual: self.data.len(),
            });
        }

        let raw_data = self.data.clone();
        log_frame_hex("raw", &raw_data);

        let link_mode = self.link_mode();
        let (mut data, format) = match link_mode {
            LinkMode::T1 => {
                // Format B is not detected in mode T
                let decoded = decode_3of6(&self.data).ok_or(DropReason::DecodeFailure {
                    len: self.data.len(),
                })?;
                (decoded, FrameFormat::A)
            }
            LinkMode::C1 => {
                let format = FrameFormat::from_block_preamble(self.data[1]);
                self.data.drain(..WMBUS_MODE_C_SUFFIX_LEN);
                (self.data, format)
            }
            LinkMode::Unknown => return Err(DropReason::UnknownLinkMode),
        };

        if !remove_any_dll_crcs(&mut data) {
            return Err(DropReason::CrcCheckFailed { len: data.len() });
        }

        trim_to_l_field(&mut data)?;
        log_frame_hex("frame", &data);

        Ok(Frame::new(data, raw_data, link_mode, self.rssi, format))
    }

    /// Convert into a frame, reporting drops to the given sink.
    pub fn convert_to_frame_with<S: DiagnosticSink + ?Sized>(self, sink: &mut S) -> Option<Frame> {
        match self.try_into_frame() {
            Ok(frame) => {
                sink.frame_decoded(&frame);
                Some(frame)
            }
            Err(reason) => {
                sink.packet_dropped(&reason);
                None
            }
        }
    }

    /// Convert into a frame, logging drops through the `log` facade.
    pub fn convert_to_frame(self) -> Option<Frame> {
        self.convert_to_frame_with(&mut LogSink::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wmbus::dll_crc::add_format_a_crcs;
    use crate::wmbus::encoding::encode_3of6;

    fn c1_format_a(l: u8) -> Vec<u8> {
        let mut frame: Vec<u8> = (0..=l).map(|i| i.wrapping_mul(3)).collect();
        frame[0] = l;
        let mut packet = vec![0x54, 0xCD];
        packet.extend(add_format_a_crcs(&frame));
        packet
    }

    #[test]
    fn test_block_count() {
        assert_eq!(block_count(10), 2);
        assert_eq!(block_count(25), 2);
        assert_eq!(block_count(26), 3);
        assert_eq!(block_count(41), 3);
        assert_eq!(block_count(42), 4);
        assert_eq!(block_count(255), 17);
    }

    #[test]
    fn test_c1_format_a_size() {
        // 2 + 10 + 1 + 2 * 2
        assert_eq!(frame_size(LinkMode::C1, &[0x54, 0xCD, 10]), Some(17));
        assert_eq!(c1_format_a(10).len(), 17);
        assert_eq!(c1_format_a(60).len(), frame_size(LinkMode::C1, &c1_format_a(60)).unwrap());
    }

    #[test]
    fn test_c1_format_b_size() {
        assert_eq!(frame_size(LinkMode::C1, &[0x54, 0x3D, 20]), Some(23));
    }

    #[test]
    fn test_c1_unknown_block_preamble() {
        assert_eq!(frame_size(LinkMode::C1, &[0x54, 0x11, 20]), None);
    }

    #[test]
    fn test_c1_needs_three_bytes() {
        assert_eq!(frame_size(LinkMode::C1, &[0x54, 0xCD]), None);
        assert_eq!(l_field(LinkMode::C1, &[0x54, 0xCD]), None);
    }

    #[test]
    fn test_t1_size() {
        let head = encode_3of6(&[10, 0x44]);
        // 10 + 1 + 4 = 15 bytes before coding
        assert_eq!(frame_size(LinkMode::T1, &head), Some(23));
        assert_eq!(l_field(LinkMode::T1, &[0x00, 0x00, 0x00]), None);
    }

    #[test]
    fn test_unknown_mode_has_no_size() {
        assert_eq!(frame_size(LinkMode::Unknown, &[0x54, 0xCD, 10]), None);
        assert_eq!(detect_link_mode(&[]), LinkMode::Unknown);
    }

    #[test]
    fn test_link_mode_is_memoized() {
        let mut packet = Packet::from_bytes(&[0x54]);
        assert_eq!(packet.link_mode(), LinkMode::C1);

        let mut packet = Packet::new();
        packet.rx_region()[0] = 0x54;
        assert_eq!(packet.link_mode(), LinkMode::C1);
        packet.rx_region();
        packet.data[0] = 0x12;
        assert_eq!(packet.link_mode(), LinkMode::C1);
    }

    #[test]
    fn test_capacity_protocol() {
        let mut packet = Packet::new();
        assert_eq!(packet.rx_capacity(), WMBUS_PREAMBLE_SIZE);

        let region = packet.rx_region();
        assert_eq!(region.len(), 3);
        region.copy_from_slice(&[0x54, 0xCD, 10]);
        packet.commit(3);
        assert_eq!(packet.len(), 3);
        assert_eq!(packet.rx_capacity(), 0);

        assert!(packet.calculate_payload_size());
        assert_eq!(packet.rx_capacity(), 14);

        let region = packet.rx_region();
        assert_eq!(region.len(), 14);
        packet.commit(5);
        assert_eq!(packet.len(), 8);
        assert_eq!(packet.rx_capacity(), 9);
    }

    #[test]
    fn test_region_extends_length_without_commit() {
        let mut packet = Packet::new();
        packet.rx_region();
        assert_eq!(packet.len(), WMBUS_PREAMBLE_SIZE);
    }

    #[test]
    fn test_expected_size_is_stable() {
        let bytes = c1_format_a(10);
        let mut packet = Packet::from_bytes(&bytes[..3]);
        assert_eq!(packet.expected_size(), Some(17));
        packet.extend_from_slice(&bytes[3..]);
        packet.data[2] = 200;
        assert_eq!(packet.expected_size(), Some(17));
    }

    #[test]
    fn test_trim_to_l_field() {
        let mut data = vec![10, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 0xEE, 0xEE];
        trim_to_l_field(&mut data).unwrap();
        assert_eq!(data.len(), 11);

        let mut data = vec![20; 11];
        assert_eq!(
            trim_to_l_field(&mut data),
            Err(DropReason::LengthFieldMismatch { want: 21, have: 11 })
        );

        let mut data = vec![9; 10];
        assert_eq!(trim_to_l_field(&mut data), Err(DropReason::TooShort { len: 10 }));
    }

    #[test]
    fn test_convert_c1_format_a() {
        let bytes = c1_format_a(10);
        let frame = Packet::from_bytes(&bytes).try_into_frame().unwrap();
        assert_eq!(frame.size(), 11);
        assert_eq!(frame.raw_size(), 17);
        assert_eq!(frame.format(), FrameFormat::A);
        assert_eq!(frame.link_mode(), LinkMode::C1);
    }

    #[test]
    fn test_convert_premature() {
        let bytes = c1_format_a(10);
        let result = Packet::from_bytes(&bytes[..12]).try_into_frame();
        assert_eq!(
            result.unwrap_err(),
            DropReason::SizeMismatch {
                expected: Some(17),
                actual: 12
            }
        );
    }
}
