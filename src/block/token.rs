// LZ77 tokens and their mapping onto the literal/length and distance
// alphabets.
//
// Lengths 3..=258 map to symbols 257..=285 and distances 1..=32768 map to
// codes 0..=29, each followed by a fixed number of extra bits.

use crate::error::{CodecError, Result};

/// One unit of LZ77 output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A byte copied verbatim.
    Literal(u8),
    /// Copy `length` bytes starting `distance` bytes back.
    Match { length: u16, distance: u16 },
}

impl Token {
    /// Number of uncompressed bytes this token stands for.
    #[inline]
    pub fn covered_len(&self) -> usize {
        match *self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => length as usize,
        }
    }
}

/// End-of-block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// First length symbol.
pub const FIRST_LENGTH_SYMBOL: u16 = 257;

/// Highest valid literal/length symbol; 286 and 287 are reserved.
pub const MAX_LITLEN_SYMBOL: u16 = 285;

/// Highest valid distance code; 30 and 31 are reserved.
pub const MAX_DIST_CODE: u16 = 29;

pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

pub const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

pub const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

pub const DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// A symbol plus the extra bits that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolCode {
    pub symbol: u16,
    pub extra_value: u16,
    pub extra_bits: u8,
}

/// Map a match length (3..=258) to its literal/length symbol.
#[inline]
pub fn length_symbol(length: u16) -> SymbolCode {
    debug_assert!((3..=258).contains(&length));
    let idx = LENGTH_BASE.partition_point(|&b| b <= length) - 1;
    SymbolCode {
        symbol: FIRST_LENGTH_SYMBOL + idx as u16,
        extra_value: length - LENGTH_BASE[idx],
        extra_bits: LENGTH_EXTRA[idx],
    }
}

/// Map a distance (1..=32768) to its distance code.
#[inline]
pub fn distance_code(distance: u16) -> SymbolCode {
    debug_assert!(distance >= 1);
    let idx = DIST_BASE.partition_point(|&b| b <= distance) - 1;
    SymbolCode {
        symbol: idx as u16,
        extra_value: distance - DIST_BASE[idx],
        extra_bits: DIST_EXTRA[idx],
    }
}

/// Base length and extra-bit count for a length symbol read from a stream.
pub fn length_base(symbol: u16) -> Result<(u16, u8)> {
    if !(FIRST_LENGTH_SYMBOL..=MAX_LITLEN_SYMBOL).contains(&symbol) {
        return Err(CodecError::corrupt(format!(
            "invalid literal/length symbol {symbol}"
        )));
    }
    let idx = (symbol - FIRST_LENGTH_SYMBOL) as usize;
    Ok((LENGTH_BASE[idx], LENGTH_EXTRA[idx]))
}

/// Base distance and extra-bit count for a distance code read from a stream.
pub fn distance_base(code: u16) -> Result<(u16, u8)> {
    if code > MAX_DIST_CODE {
        return Err(CodecError::corrupt(format!("invalid distance code {code}")));
    }
    Ok((DIST_BASE[code as usize], DIST_EXTRA[code as usize]))
}
