// LSB-first bit writer.
//
// Completed bytes accumulate in `out` until the streaming engine drains
// them with `take_bytes()`; at most 7 pending bits stay behind in the
// accumulator between calls.

/// Packs arbitrary-width values into a byte stream, LSB-first.
#[derive(Debug, Default)]
pub struct BitWriter {
    out: Vec<u8>,
    /// Pending bits, right-aligned.  Fewer than 8 between calls.
    bit_buf: u64,
    bit_count: u32,
    /// Total bits ever written (including drained bytes).
    total_bits: u64,
    /// Capacity each fresh output buffer starts with.
    reserve: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer whose output buffer starts with `cap` bytes reserved.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            out: Vec::with_capacity(cap),
            reserve: cap,
            ..Self::default()
        }
    }

    /// Append the low `nbits` bits of `value` (`nbits <= 32`).
    #[inline]
    pub fn write_bits(&mut self, value: u32, nbits: u32) {
        debug_assert!(nbits <= 32);
        if nbits == 0 {
            return;
        }
        let masked = u64::from(value) & ((1u64 << nbits) - 1);
        self.bit_buf |= masked << self.bit_count;
        self.bit_count += nbits;
        self.total_bits += u64::from(nbits);
        while self.bit_count >= 8 {
            self.out.push(self.bit_buf as u8);
            self.bit_buf >>= 8;
            self.bit_count -= 8;
        }
    }

    /// Pad the current partial byte with zero bits and emit it.
    pub fn flush_to_byte(&mut self) {
        if self.bit_count > 0 {
            self.total_bits += u64::from(8 - self.bit_count);
            self.out.push(self.bit_buf as u8);
            self.bit_buf = 0;
            self.bit_count = 0;
        }
    }

    /// Append whole bytes.  The writer must be byte-aligned.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        debug_assert_eq!(self.bit_count, 0, "write_bytes on unaligned writer");
        self.out.extend_from_slice(bytes);
        self.total_bits += bytes.len() as u64 * 8;
    }

    /// Number of bits sitting in the partial byte (0..=7).
    pub fn pending_bits(&self) -> u32 {
        self.bit_count
    }

    /// Total bits written since construction or the last `reset()`.
    pub fn bits_written(&self) -> u64 {
        self.total_bits
    }

    /// Drain all completed bytes, leaving pending bits in place.  The
    /// writer continues with a fresh buffer of the reserved capacity.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        std::mem::replace(&mut self.out, Vec::with_capacity(self.reserve))
    }

    /// Completed bytes not yet drained.
    pub fn completed(&self) -> &[u8] {
        &self.out
    }

    pub fn capacity(&self) -> usize {
        self.out.capacity()
    }

    pub fn reset(&mut self) {
        self.out = Vec::with_capacity(self.reserve);
        self.bit_buf = 0;
        self.bit_count = 0;
        self.total_bits = 0;
    }
}
