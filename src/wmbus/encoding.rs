//! # 3-of-6 Line Coding
//!
//! Mode T transmissions encode every nibble as a 6-bit symbol with exactly
//! three bits set (EN 13757-4, 9.4.2.2). Symbols are packed MSB-first, so
//! two payload bytes occupy three on-air bytes.

/// Nibble to symbol table.
const THREE_OUT_OF_SIX_TABLE: [u8; 16] = [
    0b010110, 0b001101, 0b001110, 0b001011, 0b011100, 0b011001, 0b011010, 0b010011,
    0b101100, 0b100101, 0b100110, 0b100011, 0b110100, 0b110001, 0b110010, 0b101001,
];

const SYMBOL_BITS: usize = 6;

/// Look up the nibble for a 6-bit symbol.
fn decode_symbol(symbol: u8) -> Option<u8> {
    THREE_OUT_OF_SIX_TABLE
        .iter()
        .position(|&code| code == symbol)
        .map(|nibble| nibble as u8)
}

/// Number of on-air bytes needed to carry `decoded_size` payload bytes.
pub fn encoded_size(decoded_size: usize) -> usize {
    (3 * decoded_size + 1) / 2
}

/// Decode a 3-of-6 coded byte stream.
///
/// Only whole symbol pairs are decoded; a trailing unpaired symbol and the
/// padding bits of the last byte are ignored. Returns `None` as soon as an
/// invalid symbol is found.
pub fn decode_3of6(coded: &[u8]) -> Option<Vec<u8>> {
    let symbols = coded.len() * 8 / SYMBOL_BITS;
    let mut decoded = Vec::with_capacity(symbols / 2);

    let mut acc: u32 = 0;
    let mut acc_bits = 0;
    let mut high: Option<u8> = None;
    let mut bytes = coded.iter();

    for _ in 0..(symbols / 2) * 2 {
        while acc_bits < SYMBOL_BITS {
            // symbols never outrun the input, see `symbols` above
            let byte = *bytes.next()?;
            acc = (acc << 8) | byte as u32;
            acc_bits += 8;
        }
        acc_bits -= SYMBOL_BITS;
        let symbol = ((acc >> acc_bits) & 0x3F) as u8;
        acc &= (1 << acc_bits) - 1;

        let nibble = decode_symbol(symbol)?;
        match high.take() {
            None => high = Some(nibble),
            Some(h) => decoded.push((h << 4) | nibble),
        }
    }

    Some(decoded)
}

/// Encode bytes with 3-of-6 line coding, zero-padding the final byte.
pub fn encode_3of6(payload: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(encoded_size(payload.len()));
    let mut acc: u32 = 0;
    let mut acc_bits = 0;

    for &byte in payload {
        for nibble in [byte >> 4, byte & 0x0F] {
            acc = (acc << SYMBOL_BITS) | THREE_OUT_OF_SIX_TABLE[nibble as usize] as u32;
            acc_bits += SYMBOL_BITS;
            while acc_bits >= 8 {
                acc_bits -= 8;
                encoded.push((acc >> acc_bits) as u8);
            }
            acc &= (1 << acc_bits) - 1;
        }
    }

    if acc_bits > 0 {
        encoded.push((acc << (8 - acc_bits)) as u8);
    }

    encoded
}
