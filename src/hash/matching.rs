// Greedy LZ77 match finder over a sliding input buffer.
//
// The buffer holds up to one window of history behind the current position
// plus the lookahead not yet tokenized.  Positions handed to the hash
// chains are absolute stream offsets; `base` is the absolute offset of
// `buf[0]`.
//
// Per position:
//   1. Hash the next 3 bytes and walk the chain most-recent-first, at most
//      `max_chain` candidates, keeping the longest match (ties keep the
//      nearer one).
//   2. Emit a Match if the best is at least MIN_MATCH bytes, else a Literal.
//   3. Insert the covered positions into the chains (all of them for
//      matches up to `max_insert`, otherwise just the first).

use super::config::{MAX_MATCH, MIN_LOOKAHEAD, MIN_MATCH, MatcherConfig};
use super::table::{HashChain, hash3};
use crate::block::token::Token;

/// Length of the common prefix of `a` and `b`, capped at `max`.
#[inline]
fn common_prefix(a: &[u8], b: &[u8], max: usize) -> usize {
    a.iter()
        .zip(b)
        .take(max)
        .take_while(|(x, y)| x == y)
        .count()
}

// ---------------------------------------------------------------------------
// Match finder
// ---------------------------------------------------------------------------

/// Sliding-window match finder.
///
/// Feed bytes with `accept()`, then pull tokens with `next_token()` while
/// `has_token()` says enough lookahead is buffered.
#[derive(Debug)]
pub struct MatchFinder {
    config: MatcherConfig,
    window_size: usize,
    chain: HashChain,
    buf: Vec<u8>,
    /// Absolute stream offset of `buf[0]`.
    base: u64,
    /// Next position of `buf` to tokenize.
    pos: usize,
}

impl MatchFinder {
    /// `window_size` must be a power of two.
    pub fn new(config: MatcherConfig, window_size: usize) -> Self {
        Self {
            config,
            window_size,
            chain: HashChain::new(window_size),
            buf: Vec::with_capacity(Self::buffer_capacity(window_size)),
            base: 0,
            pos: 0,
        }
    }

    /// History plus room for one more window of input and a full lookahead.
    fn buffer_capacity(window_size: usize) -> usize {
        2 * window_size + MIN_LOOKAHEAD
    }

    /// Copy as much of `data` into the buffer as fits, sliding out history
    /// older than one window first if needed.  Returns bytes taken.
    pub fn accept(&mut self, data: &[u8]) -> usize {
        let cap = Self::buffer_capacity(self.window_size);
        if self.buf.len() + data.len() > cap && self.pos > self.window_size {
            let drop = self.pos - self.window_size;
            self.buf.drain(..drop);
            self.base += drop as u64;
            self.pos -= drop;
        }
        let take = (cap - self.buf.len()).min(data.len());
        self.buf.extend_from_slice(&data[..take]);
        take
    }

    /// Bytes buffered but not yet tokenized.
    #[inline]
    pub fn lookahead(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether `next_token()` may run.  Outside of `finishing`, a full
    /// MIN_LOOKAHEAD is required so matches are never truncated by a chunk
    /// boundary.
    #[inline]
    pub fn has_token(&self, finishing: bool) -> bool {
        if finishing {
            self.lookahead() > 0
        } else {
            self.lookahead() >= MIN_LOOKAHEAD
        }
    }

    /// Produce the token at the current position together with the raw
    /// bytes it covers.
    pub fn next_token(&mut self) -> Option<(Token, &[u8])> {
        let avail = self.lookahead();
        if avail == 0 {
            return None;
        }
        let start = self.pos;

        let token = if self.config.is_store() || avail < MIN_MATCH {
            Token::Literal(self.buf[start])
        } else {
            let (len, dist) = self.longest_match(avail.min(MAX_MATCH));
            if len >= MIN_MATCH {
                self.insert_covered(start, len);
                Token::Match {
                    length: len as u16,
                    distance: dist as u16,
                }
            } else {
                Token::Literal(self.buf[start])
            }
        };

        let covered = token.covered_len();
        self.pos += covered;
        Some((token, &self.buf[start..start + covered]))
    }

    /// Search the chain for the current position and insert it.
    /// Returns `(length, distance)`; length is 0 when nothing matched.
    fn longest_match(&mut self, max_len: usize) -> (usize, usize) {
        let pos = self.pos;
        let abs = self.base + pos as u64;
        let bucket = hash3(&self.buf[pos..]);

        let mut best_len = MIN_MATCH - 1;
        let mut best_dist = 0usize;
        let mut chain_left = self.config.max_chain;
        let mut cand = self
            .chain
            .lookup(bucket)
            .filter(|&c| self.chain.in_window(c, abs));

        while let Some(c) = cand {
            if chain_left == 0 || c < self.base {
                break;
            }
            chain_left -= 1;
            let ci = (c - self.base) as usize;

            // Cheap reject: a longer match must agree at best_len.
            if self.buf[ci + best_len] == self.buf[pos + best_len] {
                let len = common_prefix(&self.buf[ci..], &self.buf[pos..], max_len);
                if len > best_len {
                    best_len = len;
                    best_dist = pos - ci;
                    if len >= self.config.nice_length || len == max_len {
                        break;
                    }
                }
            }
            cand = self.chain.chain_prev(c, abs);
        }

        self.chain.insert(bucket, abs);
        if best_len >= MIN_MATCH {
            (best_len, best_dist)
        } else {
            (0, 0)
        }
    }

    /// Insert positions inside a match that starts at `start`.
    fn insert_covered(&mut self, start: usize, len: usize) {
        if len > self.config.max_insert {
            return;
        }
        for p in start + 1..start + len {
            if p + MIN_MATCH > self.buf.len() {
                break;
            }
            self.chain.insert(hash3(&self.buf[p..]), self.base + p as u64);
        }
    }

    /// Absolute offset of the next byte to tokenize.
    pub fn position(&self) -> u64 {
        self.base + self.pos as u64
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Bytes held by the buffer and the hash chains.
    pub fn footprint(&self) -> usize {
        self.buf.capacity() + self.chain.footprint()
    }

    /// Return to the freshly constructed state, keeping allocations.
    pub fn reset(&mut self) {
        self.chain.reset();
        self.buf.clear();
        self.base = 0;
        self.pos = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
