//! Capture builders shared by the integration tests.
#![allow(dead_code)]

use wmbus_radio::wmbus::dll_crc::{add_format_a_crcs, add_format_b_crcs};
use wmbus_radio::wmbus::encoding::encode_3of6;

/// CRC-free telegram of `len` bytes: SND-NR from a Kamstrup meter, then payload.
pub fn telegram(len: usize) -> Vec<u8> {
    assert!(len >= 11 && len <= 256);
    let header = [0x44, 0x2D, 0x2C, 0x78, 0x56, 0x34, 0x12, 0x1B, 0x16, 0x8D];
    let mut frame = Vec::with_capacity(len);
    frame.push((len - 1) as u8);
    frame.extend_from_slice(&header);
    frame.extend((0..len - frame.len()).map(|i| (i as u8).wrapping_mul(13).wrapping_add(5)));
    frame
}

/// Mode C1, frame format A, as delivered by the radio.
pub fn c1_format_a(frame: &[u8]) -> Vec<u8> {
    let mut capture = vec![0x54, 0xCD];
    capture.extend(add_format_a_crcs(frame));
    capture
}

/// Mode C1, frame format B, as delivered by the radio.
pub fn c1_format_b(frame: &[u8]) -> Vec<u8> {
    let mut capture = vec![0x54, 0x3D];
    capture.extend(add_format_b_crcs(frame));
    capture
}

/// Mode T1 (format A, 3-of-6 coded), as delivered by the radio.
pub fn t1(frame: &[u8]) -> Vec<u8> {
    encode_3of6(&add_format_a_crcs(frame))
}
