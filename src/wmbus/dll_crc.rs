//! # Data Link Layer CRC Handling
//!
//! wM-Bus protects the link layer with CRC-16/EN-13757 (polynomial 0x3D65,
//! init 0x0000, final XOR 0xFFFF), transmitted high byte first. Two block
//! layouts exist:
//!
//! - **Format A**: a 10-byte first block (L through A field), then 16-byte
//!   blocks, each followed by its own CRC. The last block may be shorter.
//!   The L-field does not count CRC bytes.
//! - **Format B**: up to 126 bytes under a single CRC, with an optional
//!   second block carrying the remainder. The L-field counts CRC bytes.
//!
//! Removal rewrites the L-field to match the CRC-free length so both
//! formats leave the same normalized layout behind.

use crc::{Crc, CRC_16_EN_13757};
use log::{debug, trace};

use crate::constants::{
    DLL_CRC_LEN, DLL_MIN_LEN, FORMAT_A_BLOCK_LEN, FORMAT_A_FIRST_BLOCK_LEN,
    FORMAT_B_FIRST_CRC_POS, FORMAT_B_SINGLE_BLOCK_MAX,
};

const DLL_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_EN_13757);

/// Calculate the DLL CRC of a block.
pub fn calculate_dll_crc(data: &[u8]) -> u16 {
    DLL_CRC.checksum(data)
}

/// Check the CRC stored big-endian right after `block`.
fn block_crc_ok(block: &[u8], crc: &[u8]) -> bool {
    let received = u16::from_be_bytes([crc[0], crc[1]]);
    let calculated = calculate_dll_crc(block);
    if received != calculated {
        trace!("Block CRC mismatch: expected 0x{calculated:04X}, got 0x{received:04X}");
    }
    received == calculated
}

/// Rewrite the L-field to the CRC-free length; `None` if it cannot fit a byte.
fn fix_l_field(out: &mut [u8]) -> Option<()> {
    let l = u8::try_from(out.len().checked_sub(1)?).ok();
    if l.is_none() {
        debug!("{} CRC-free bytes exceed the L-field range", out.len());
    }
    *out.first_mut()? = l?;
    Some(())
}

/// Strip format A block CRCs, returning the CRC-free bytes.
pub fn trim_format_a_crcs(frame: &[u8]) -> Option<Vec<u8>> {
    if frame.len() < DLL_MIN_LEN {
        return None;
    }

    let mut out = Vec::with_capacity(frame.len());
    let (first, rest) = frame.split_at(FORMAT_A_FIRST_BLOCK_LEN);
    if !block_crc_ok(first, &rest[..DLL_CRC_LEN]) {
        return None;
    }
    out.extend_from_slice(first);

    let mut remaining = &rest[DLL_CRC_LEN..];
    while !remaining.is_empty() {
        if remaining.len() <= DLL_CRC_LEN {
            debug!("Format A: dangling {} bytes after last block", remaining.len());
            return None;
        }
        let block_len = FORMAT_A_BLOCK_LEN.min(remaining.len() - DLL_CRC_LEN);
        let (block, tail) = remaining.split_at(block_len);
        if !block_crc_ok(block, &tail[..DLL_CRC_LEN]) {
            return None;
        }
        out.extend_from_slice(block);
        remaining = &tail[DLL_CRC_LEN..];
    }

    fix_l_field(&mut out)?;
    Some(out)
}

/// Strip format B CRCs, returning the CRC-free bytes.
pub fn trim_format_b_crcs(frame: &[u8]) -> Option<Vec<u8>> {
    if frame.len() < DLL_MIN_LEN {
        return None;
    }

    let len = frame.len();
    let mut out = Vec::with_capacity(len);

    if len <= FORMAT_B_SINGLE_BLOCK_MAX {
        let crc_pos = len - DLL_CRC_LEN;
        if !block_crc_ok(&frame[..crc_pos], &frame[crc_pos..]) {
            return None;
        }
        out.extend_from_slice(&frame[..crc_pos]);
    } else {
        let crc1 = FORMAT_B_FIRST_CRC_POS;
        let crc2 = len - DLL_CRC_LEN;
        let second = crc1 + DLL_CRC_LEN;
        if crc2 < second {
            debug!("Format B: {len} bytes cannot hold a second block");
            return None;
        }
        if !block_crc_ok(&frame[..crc1], &frame[crc1..second]) {
            return None;
        }
        if !block_crc_ok(&frame[second..crc2], &frame[crc2..]) {
            return None;
        }
        out.extend_from_slice(&frame[..crc1]);
        out.extend_from_slice(&frame[second..crc2]);
    }

    fix_l_field(&mut out)?;
    Some(out)
}

/// Remove DLL CRCs in place, trying format A first and then format B.
///
/// Returns `false` and leaves `frame` untouched when neither layout
/// validates.
pub fn remove_any_dll_crcs(frame: &mut Vec<u8>) -> bool {
    let trimmed = trim_format_a_crcs(frame).or_else(|| trim_format_b_crcs(frame));
    match trimmed {
        Some(out) => {
            debug!("Removed DLL CRCs: {} -> {} bytes", frame.len(), out.len());
            *frame = out;
            true
        }
        None => false,
    }
}

/// Build format A on-air blocks from a CRC-free frame.
///
/// The L-field is taken as given; callers set it to `len - 1`.
pub fn add_format_a_crcs(frame: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.len() + 2 * (frame.len() / FORMAT_A_BLOCK_LEN + 2));
    let split = FORMAT_A_FIRST_BLOCK_LEN.min(frame.len());
    let (first, rest) = frame.split_at(split);

    out.extend_from_slice(first);
    out.extend_from_slice(&calculate_dll_crc(first).to_be_bytes());
    for block in rest.chunks(FORMAT_A_BLOCK_LEN) {
        out.extend_from_slice(block);
        out.extend_from_slice(&calculate_dll_crc(block).to_be_bytes());
    }
    out
}

/// Build format B on-air blocks from a CRC-free frame.
///
/// The L-field is rewritten to count the CRC bytes, as format B requires.
pub fn add_format_b_crcs(frame: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.len() + 2 * DLL_CRC_LEN);
    if frame.len() + DLL_CRC_LEN <= FORMAT_B_SINGLE_BLOCK_MAX {
        out.extend_from_slice(frame);
        if let Some(l) = out.first_mut() {
            *l = (frame.len() + DLL_CRC_LEN - 1) as u8;
        }
        let crc = calculate_dll_crc(&out);
        out.extend_from_slice(&crc.to_be_bytes());
    } else {
        let (first, rest) = frame.split_at(FORMAT_B_FIRST_CRC_POS.min(frame.len()));
        out.extend_from_slice(first);
        out[0] = (frame.len() + 2 * DLL_CRC_LEN - 1) as u8;
        let crc = calculate_dll_crc(&out);
        out.extend_from_slice(&crc.to_be_bytes());
        out.extend_from_slice(rest);
        out.extend_from_slice(&calculate_dll_crc(rest).to_be_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(len: usize) -> Vec<u8> {
        let mut frame: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
        frame[0] = (len - 1) as u8;
        frame
    }

    #[test]
    fn test_crc_check_value() {
        assert_eq!(calculate_dll_crc(b"123456789"), 0xC2B7);
    }

    #[test]
    fn test_format_a_layout() {
        let frame = sample_frame(11);
        let coded = add_format_a_crcs(&frame);
        // 10 + CRC, 1 + CRC
        assert_eq!(coded.len(), 15);
        assert_eq!(&coded[..10], &frame[..10]);
        assert_eq!(coded[12], frame[10]);
    }

    #[test]
    fn test_format_a_roundtrip_multi_block() {
        for len in [11, 26, 27, 42, 43, 120] {
            let frame = sample_frame(len);
            let coded = add_format_a_crcs(&frame);
            assert_eq!(trim_format_a_crcs(&coded), Some(frame), "len {len}");
        }
    }

    #[test]
    fn test_format_a_corrupted_block() {
        let frame = sample_frame(40);
        let mut coded = add_format_a_crcs(&frame);
        coded[20] ^= 0x01;
        assert_eq!(trim_format_a_crcs(&coded), None);
    }

    #[test]
    fn test_format_a_dangling_bytes() {
        let mut coded = add_format_a_crcs(&sample_frame(26));
        coded.push(0x00);
        assert_eq!(trim_format_a_crcs(&coded), None);
    }

    #[test]
    fn test_format_b_single_block() {
        let frame = sample_frame(20);
        let coded = add_format_b_crcs(&frame);
        assert_eq!(coded.len(), 22);
        assert_eq!(coded[0] as usize, 21);

        let mut buf = coded;
        assert!(remove_any_dll_crcs(&mut buf));
        assert_eq!(buf, frame);
    }

    #[test]
    fn test_format_b_two_blocks() {
        let frame = sample_frame(150);
        let coded = add_format_b_crcs(&frame);
        assert_eq!(coded.len(), 154);
        assert_eq!(trim_format_b_crcs(&coded), Some(frame));
    }

    #[test]
    fn test_remove_leaves_buffer_on_failure() {
        let mut buf = vec![0xAA; 30];
        let before = buf.clone();
        assert!(!remove_any_dll_crcs(&mut buf));
        assert_eq!(buf, before);
    }

    #[test]
    fn test_format_b_truncated_second_block() {
        assert_eq!(trim_format_b_crcs(&[0x80; 129]), None);
    }

    #[test]
    fn test_oversized_format_b_is_rejected() {
        // 286 CRC-free bytes cannot be described by a one-byte L-field
        let mut frame = sample_frame(286);
        frame[0] = 0xFF;
        let mut coded = frame[..FORMAT_B_FIRST_CRC_POS].to_vec();
        coded.extend_from_slice(&calculate_dll_crc(&coded).to_be_bytes());
        let rest = &frame[FORMAT_B_FIRST_CRC_POS..];
        coded.extend_from_slice(rest);
        coded.extend_from_slice(&calculate_dll_crc(rest).to_be_bytes());
        assert_eq!(coded.len(), 290);

        assert_eq!(trim_format_b_crcs(&coded), None);
        let before = coded.clone();
        assert!(!remove_any_dll_crcs(&mut coded));
        assert_eq!(coded, before);
    }

    #[test]
    fn test_oversized_format_a_is_rejected() {
        let mut frame = sample_frame(300);
        frame[0] = 0xFF;
        assert_eq!(trim_format_a_crcs(&add_format_a_crcs(&frame)), None);
    }

    #[test]
    fn test_too_short() {
        let mut buf = vec![0x0A; DLL_MIN_LEN - 1];
        assert!(!remove_any_dll_crcs(&mut buf));
    }
}
