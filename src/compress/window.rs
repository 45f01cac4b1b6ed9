// Decoder history window.
//
// Ring buffer over the last `size` output bytes.  Back-references are
// resolved against it byte by byte, so overlapping copies (distance <
// length) repeat the pattern as required.

use crate::error::{CodecError, Result};

#[derive(Debug)]
pub struct Window {
    buf: Vec<u8>,
    mask: usize,
    /// Next write index.
    pos: usize,
    /// Bytes written so far, saturating at the window size.
    filled: usize,
}

impl Window {
    /// `size` must be a power of two.
    pub fn new(size: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        Self {
            buf: vec![0u8; size],
            mask: size - 1,
            pos: 0,
            filled: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buf[self.pos] = byte;
        self.pos = (self.pos + 1) & self.mask;
        if self.filled <= self.mask {
            self.filled += 1;
        }
    }

    /// Record literal bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }

    /// Copy `length` bytes from `distance` back, appending them to `out`
    /// and to the history.
    pub fn copy_match(&mut self, distance: usize, length: usize, out: &mut Vec<u8>) -> Result<()> {
        if distance == 0 || distance > self.filled {
            return Err(CodecError::corrupt(format!(
                "distance {distance} reaches before the start of the stream ({} bytes of history)",
                self.filled
            )));
        }
        out.reserve(length);
        for _ in 0..length {
            let b = self.buf[(self.pos.wrapping_sub(distance)) & self.mask];
            out.push(b);
            self.push(b);
        }
        Ok(())
    }

    /// Bytes of history available for back-references.
    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn size(&self) -> usize {
        self.buf.len()
    }

    pub fn footprint(&self) -> usize {
        self.buf.capacity()
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.filled = 0;
    }
}
