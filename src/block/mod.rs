// Block codec.
//
// A compressed stream after the 2-byte stream header is a sequence of
// blocks.  Each block starts with a 2-bit type tag followed by a 1-bit
// final flag:
//
//   tag 0  stored   align to byte, LEN, NLEN (= !LEN), LEN raw bytes
//   tag 1  fixed    tokens coded with the fixed tables, then symbol 256
//   tag 2  dynamic  code-length header, tokens, then symbol 256
//   tag 3  reserved (corrupt)
//
// - `token`: LZ77 tokens and the length/distance symbol tables
// - `encoder`: BlockEncoder, collects tokens, picks the cheapest coding
// - `decoder`: block header, table and token parsing

pub mod decoder;
pub mod encoder;
pub mod token;

use crate::error::{CodecError, Result};

pub use encoder::BlockEncoder;
pub use token::Token;

/// Order in which code-length code lengths are transmitted.
pub const CL_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Largest payload of a single stored block.
pub const MAX_STORED_LEN: usize = u16::MAX as usize;

/// Block coding strategy, numbered by its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Stored = 0,
    Fixed = 1,
    Dynamic = 2,
}

impl BlockKind {
    /// Parse a 2-bit type tag.
    pub fn from_tag(tag: u32) -> Result<Self> {
        match tag {
            0 => Ok(Self::Stored),
            1 => Ok(Self::Fixed),
            2 => Ok(Self::Dynamic),
            _ => Err(CodecError::corrupt(format!("reserved block type {tag}"))),
        }
    }

    pub fn tag(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Fixed => "fixed",
            Self::Dynamic => "dynamic",
        }
    }
}
