// LSB-first bit reader over a growable input buffer.
//
// The decoder feeds compressed chunks as they arrive and reads tokens
// transactionally: it takes a `mark()` before each token and `rewind()`s
// to it when the buffered input runs out mid-token, so a token split
// across two chunks is simply decoded again on the next call.

use crate::error::{CodecError, Result};

/// Saved reader position for `rewind()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMark {
    pos: usize,
    bit_buf: u64,
    bit_count: u32,
}

/// Buffered bit consumer.
#[derive(Debug, Default)]
pub struct BitReader {
    buf: Vec<u8>,
    /// Next byte of `buf` to move into the accumulator.
    pos: usize,
    /// Bits already pulled from `buf`, right-aligned.
    bit_buf: u64,
    bit_count: u32,
}

impl BitReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append more input.
    pub fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Consume and return `nbits` bits (`nbits <= 32`).
    ///
    /// Returns `UnexpectedEndOfStream` if fewer than `nbits` bits are
    /// buffered.  Bits are never lost on failure, but callers that need to
    /// retry the whole read must `rewind()` to a prior mark.
    #[inline]
    pub fn read_bits(&mut self, nbits: u32) -> Result<u32> {
        debug_assert!(nbits <= 32);
        if nbits == 0 {
            return Ok(0);
        }
        while self.bit_count < nbits {
            let Some(&byte) = self.buf.get(self.pos) else {
                return Err(CodecError::UnexpectedEndOfStream);
            };
            self.bit_buf |= u64::from(byte) << self.bit_count;
            self.bit_count += 8;
            self.pos += 1;
        }
        let value = (self.bit_buf & ((1u64 << nbits) - 1)) as u32;
        self.bit_buf >>= nbits;
        self.bit_count -= nbits;
        Ok(value)
    }

    #[inline]
    pub fn read_bit(&mut self) -> Result<u32> {
        self.read_bits(1)
    }

    /// Discard bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        let drop = self.bit_count % 8;
        self.bit_buf >>= drop;
        self.bit_count -= drop;
    }

    pub fn is_aligned(&self) -> bool {
        self.bit_count % 8 == 0
    }

    /// Copy up to `dst.len()` whole bytes into `dst`.  The reader must be
    /// byte-aligned.  Returns the number of bytes copied.
    pub fn read_aligned_into(&mut self, dst: &mut [u8]) -> usize {
        debug_assert!(self.is_aligned(), "read_aligned_into on unaligned reader");
        let mut n = 0;
        while n < dst.len() && self.bit_count >= 8 {
            dst[n] = self.bit_buf as u8;
            self.bit_buf >>= 8;
            self.bit_count -= 8;
            n += 1;
        }
        let avail = self.buf.len() - self.pos;
        let take = (dst.len() - n).min(avail);
        dst[n..n + take].copy_from_slice(&self.buf[self.pos..self.pos + take]);
        self.pos += take;
        n + take
    }

    /// Bits available without more input.
    pub fn available_bits(&self) -> u64 {
        u64::from(self.bit_count) + (self.buf.len() - self.pos) as u64 * 8
    }

    /// Whole bytes not yet touched by any read.
    pub fn unread_bytes(&self) -> usize {
        self.buf.len() - self.pos + (self.bit_count / 8) as usize
    }

    pub fn mark(&self) -> BitMark {
        BitMark {
            pos: self.pos,
            bit_buf: self.bit_buf,
            bit_count: self.bit_count,
        }
    }

    pub fn rewind(&mut self, mark: BitMark) {
        self.pos = mark.pos;
        self.bit_buf = mark.bit_buf;
        self.bit_count = mark.bit_count;
    }

    /// Drop consumed bytes from the front of the buffer.
    ///
    /// Invalidates outstanding marks; call only between transactions.
    pub fn compact(&mut self) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.pos = 0;
        self.bit_buf = 0;
        self.bit_count = 0;
    }
}
