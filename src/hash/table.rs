// Hash chains for the match finder.
//
// `head[bucket]` holds the most recent position whose 3-byte prefix hashes
// to `bucket`; `prev[pos & mask]` links each position to the previous one
// in its bucket.  `prev` is a circular buffer one window long, so an entry
// is trustworthy only while its position is less than a window behind the
// current input position.
//
// Positions are absolute stream offsets stored with HASH_OFFSET=1 so that
// stored value 0 means "empty".

use super::config::HASH_BITS;

const HASH_OFFSET: u64 = 1;

/// Multiplicative hash of the three bytes at the front of `bytes`.
#[inline(always)]
pub fn hash3(bytes: &[u8]) -> usize {
    let key = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]);
    (key.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
}

/// Head table plus window-sized prev chain.
#[derive(Debug)]
pub struct HashChain {
    /// Bucket array: `head[bucket] = pos + HASH_OFFSET` or 0 (empty).
    head: Vec<u64>,
    /// Previous-position chain (circular buffer).
    prev: Vec<u64>,
    /// Mask for prev array indexing: `window_size - 1`.
    prev_mask: usize,
}

impl HashChain {
    /// `window_size` must be a power of two.
    pub fn new(window_size: usize) -> Self {
        debug_assert!(window_size.is_power_of_two());
        Self {
            head: vec![0u64; 1 << HASH_BITS],
            prev: vec![0u64; window_size],
            prev_mask: window_size - 1,
        }
    }

    /// Forget every position.
    pub fn reset(&mut self) {
        self.head.fill(0);
        self.prev.fill(0);
    }

    /// Most recent position stored for `bucket`.
    #[inline(always)]
    pub fn lookup(&self, bucket: usize) -> Option<u64> {
        match self.head[bucket] {
            0 => None,
            v => Some(v - HASH_OFFSET),
        }
    }

    /// Make `pos` the head of `bucket`, linking it to the old head.
    #[inline(always)]
    pub fn insert(&mut self, bucket: usize, pos: u64) {
        let old_head = self.head[bucket];
        self.prev[pos as usize & self.prev_mask] = old_head;
        self.head[bucket] = pos + HASH_OFFSET;
    }

    /// Walk the chain from `pos`, returning the previous entry's position.
    /// Returns `None` if the chain ends, wraps, or leaves the window as seen
    /// from `current_pos`.
    #[inline]
    pub fn chain_prev(&self, pos: u64, current_pos: u64) -> Option<u64> {
        let prev_val = self.prev[pos as usize & self.prev_mask];
        if prev_val == 0 {
            return None;
        }
        let prev_pos = prev_val - HASH_OFFSET;
        // A slot overwritten by a newer position links forward, not back.
        if prev_pos >= pos {
            return None;
        }
        if current_pos - prev_pos > self.prev_mask as u64 {
            return None;
        }
        Some(prev_pos)
    }

    /// Whether `pos` is still reachable from `current_pos`.
    #[inline]
    pub fn in_window(&self, pos: u64, current_pos: u64) -> bool {
        pos < current_pos && current_pos - pos <= self.prev_mask as u64
    }

    /// Bytes held by the tables.
    pub fn footprint(&self) -> usize {
        (self.head.capacity() + self.prev.capacity()) * std::mem::size_of::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_depends_on_three_bytes_only() {
        assert_eq!(hash3(b"abcX"), hash3(b"abcY"));
        assert!(hash3(b"abc") < 1 << HASH_BITS);
    }

    #[test]
    fn insert_lookup() {
        let mut t = HashChain::new(256);
        assert!(t.lookup(42).is_none());
        t.insert(42, 100);
        assert_eq!(t.lookup(42), Some(100));
    }

    #[test]
    fn reset_clears_heads() {
        let mut t = HashChain::new(256);
        t.insert(42, 100);
        t.reset();
        assert!(t.lookup(42).is_none());
    }

    #[test]
    fn chaining() {
        let mut t = HashChain::new(256);
        t.insert(42, 10);
        t.insert(42, 50);
        assert_eq!(t.lookup(42), Some(50));
        assert_eq!(t.chain_prev(50, 50), Some(10));
        assert!(t.chain_prev(10, 50).is_none());
    }

    #[test]
    fn chain_stale_rejection() {
        let mut t = HashChain::new(16);
        t.insert(42, 0);
        t.insert(42, 100);
        // 100 positions back is far outside a 16-byte window.
        assert!(t.chain_prev(100, 100).is_none());
    }

    #[test]
    fn chain_boundary_is_stale() {
        let mut t = HashChain::new(16);
        t.insert(42, 0);
        t.insert(42, 16);
        assert!(t.chain_prev(16, 16).is_none());
        assert!(t.in_window(1, 16));
        assert!(!t.in_window(0, 16));
    }

    #[test]
    fn overwritten_slot_does_not_link_forward() {
        let mut t = HashChain::new(16);
        t.insert(1, 3);
        t.insert(2, 10);
        t.insert(2, 19); // reuses the prev slot of 3, linking to 10
        t.insert(2, 20);
        assert!(t.chain_prev(3, 20).is_none());
    }
}
