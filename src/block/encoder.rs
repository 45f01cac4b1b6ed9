// Block encoder.
//
// Collects the tokens of one block together with the raw bytes they cover,
// then writes the block in whichever of stored / fixed / dynamic coding is
// exactly the smallest at the current bit position.

use log::{debug, trace};

use crate::bitstream::BitWriter;
use crate::error::Result;
use crate::hash::config::MAX_MATCH;
use crate::huffman::{CodeTable, MAX_CL_CODE_LEN, MAX_CODE_LEN, NUM_CL_SYMBOLS, build_lengths};

use super::token::{END_OF_BLOCK, MAX_DIST_CODE, MAX_LITLEN_SYMBOL, Token, distance_code, length_symbol};
use super::{BlockKind, CL_ORDER, MAX_STORED_LEN};

const NUM_LITLEN_USED: usize = MAX_LITLEN_SYMBOL as usize + 1;
const NUM_DIST_USED: usize = MAX_DIST_CODE as usize + 1;

/// Bits of the 3-bit block header.
const BLOCK_HEADER_BITS: u64 = 3;

/// Code-length repeat symbols.
const REPEAT_PREV: u8 = 16;
const REPEAT_ZERO_SHORT: u8 = 17;
const REPEAT_ZERO_LONG: u8 = 18;

/// Extra bits carried by each code-length symbol.
fn cl_extra_bits(symbol: u8) -> u32 {
    match symbol {
        REPEAT_PREV => 2,
        REPEAT_ZERO_SHORT => 3,
        REPEAT_ZERO_LONG => 7,
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Dynamic table header
// ---------------------------------------------------------------------------

/// Everything needed to write a dynamic block's table header.
struct DynamicTables {
    litlen: CodeTable,
    dist: CodeTable,
    cl: CodeTable,
    hlit: usize,
    hdist: usize,
    hclen: usize,
    /// Run-length coded code lengths: (symbol, extra bits value).
    rle: Vec<(u8, u8)>,
    header_bits: u64,
}

impl DynamicTables {
    fn build(litlen_freq: &[u32], dist_freq: &[u32]) -> Self {
        let litlen_lengths = build_lengths(litlen_freq, MAX_CODE_LEN);
        let mut dist_lengths = build_lengths(dist_freq, MAX_CODE_LEN);
        if dist_lengths.iter().all(|&l| l == 0) {
            dist_lengths[0] = 1;
        }

        let hlit = last_used(&litlen_lengths).max(257);
        let hdist = last_used(&dist_lengths).max(1);

        let mut all = Vec::with_capacity(hlit + hdist);
        all.extend_from_slice(&litlen_lengths[..hlit]);
        all.extend_from_slice(&dist_lengths[..hdist]);
        let rle = run_length_encode(&all);

        let mut cl_freq = [0u32; NUM_CL_SYMBOLS];
        for &(sym, _) in &rle {
            cl_freq[sym as usize] += 1;
        }
        let cl_lengths = build_lengths(&cl_freq, MAX_CL_CODE_LEN);
        let hclen = CL_ORDER
            .iter()
            .rposition(|&s| cl_lengths[s] != 0)
            .map_or(0, |i| i + 1)
            .max(4);

        let cl = CodeTable::from_lengths(&cl_lengths);
        let rle_bits: u64 = rle
            .iter()
            .map(|&(sym, _)| u64::from(cl.len_of(u16::from(sym))) + u64::from(cl_extra_bits(sym)))
            .sum();
        let header_bits = 5 + 5 + 4 + 3 * hclen as u64 + rle_bits;

        trace!("dynamic tables: hlit={hlit} hdist={hdist} hclen={hclen} header={header_bits} bits");

        Self {
            litlen: CodeTable::from_lengths(&litlen_lengths),
            dist: CodeTable::from_lengths(&dist_lengths),
            cl,
            hlit,
            hdist,
            hclen,
            rle,
            header_bits,
        }
    }

    fn write(&self, w: &mut BitWriter) -> Result<()> {
        w.write_bits((self.hlit - 257) as u32, 5);
        w.write_bits((self.hdist - 1) as u32, 5);
        w.write_bits((self.hclen - 4) as u32, 4);
        for &sym in &CL_ORDER[..self.hclen] {
            w.write_bits(u32::from(self.cl.len_of(sym as u16)), 3);
        }
        for &(sym, extra) in &self.rle {
            self.cl.encode(w, u16::from(sym))?;
            w.write_bits(u32::from(extra), cl_extra_bits(sym));
        }
        Ok(())
    }
}

/// One past the last nonzero entry.
fn last_used(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&l| l != 0).map_or(0, |i| i + 1)
}

/// Run-length code a sequence of code lengths with the repeat symbols
/// 16 (previous length 3-6 times), 17 (zero 3-10 times) and 18 (zero
/// 11-138 times).
fn run_length_encode(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut out = Vec::with_capacity(lengths.len());
    let mut i = 0;
    while i < lengths.len() {
        let len = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == len).count();
        i += run;

        if len == 0 {
            let mut left = run;
            while left >= 11 {
                let n = left.min(138);
                out.push((REPEAT_ZERO_LONG, (n - 11) as u8));
                left -= n;
            }
            if left >= 3 {
                out.push((REPEAT_ZERO_SHORT, (left - 3) as u8));
                left = 0;
            }
            out.extend(std::iter::repeat_n((0, 0), left));
        } else {
            out.push((len, 0));
            let mut left = run - 1;
            while left >= 3 {
                let n = left.min(6);
                out.push((REPEAT_PREV, (n - 3) as u8));
                left -= n;
            }
            out.extend(std::iter::repeat_n((len, 0), left));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Block encoder
// ---------------------------------------------------------------------------

/// Chosen coding for one block.
enum Plan {
    Stored,
    Fixed,
    Dynamic(Box<DynamicTables>),
}

impl Plan {
    fn kind(&self) -> BlockKind {
        match self {
            Plan::Stored => BlockKind::Stored,
            Plan::Fixed => BlockKind::Fixed,
            Plan::Dynamic(_) => BlockKind::Dynamic,
        }
    }
}

/// Accumulates one block and writes it with the cheapest coding.
#[derive(Debug)]
pub struct BlockEncoder {
    tokens: Vec<Token>,
    raw: Vec<u8>,
    litlen_freq: [u32; NUM_LITLEN_USED],
    dist_freq: [u32; NUM_DIST_USED],
    /// Length and distance extra bits of the collected tokens.
    extra_bits: u64,
    fixed_litlen: CodeTable,
    fixed_dist: CodeTable,
    stored_only: bool,
}

impl BlockEncoder {
    /// `block_size` sizes the buffers so they never grow afterwards.
    /// `stored_only` forces stored blocks (compression level 0).
    pub fn new(block_size: usize, stored_only: bool) -> Self {
        Self {
            tokens: Vec::with_capacity(block_size),
            raw: Vec::with_capacity(block_size + MAX_MATCH),
            litlen_freq: [0; NUM_LITLEN_USED],
            dist_freq: [0; NUM_DIST_USED],
            extra_bits: 0,
            fixed_litlen: CodeTable::fixed_litlen(),
            fixed_dist: CodeTable::fixed_dist(),
            stored_only,
        }
    }

    /// Add a token and the raw bytes it stands for.
    pub fn push(&mut self, token: Token, raw: &[u8]) {
        debug_assert_eq!(token.covered_len(), raw.len());
        match token {
            Token::Literal(b) => self.litlen_freq[b as usize] += 1,
            Token::Match { length, distance } => {
                let ls = length_symbol(length);
                let dc = distance_code(distance);
                self.litlen_freq[ls.symbol as usize] += 1;
                self.dist_freq[dc.symbol as usize] += 1;
                self.extra_bits += u64::from(ls.extra_bits) + u64::from(dc.extra_bits);
            }
        }
        self.tokens.push(token);
        self.raw.extend_from_slice(raw);
    }

    /// Uncompressed bytes collected so far.
    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Exact size of a stored block written after `pending` bits.
    fn stored_cost(&self, pending: u32) -> Option<u64> {
        if self.raw.len() > MAX_STORED_LEN {
            return None;
        }
        let after_header = (u64::from(pending) + BLOCK_HEADER_BITS) % 8;
        let pad = (8 - after_header) % 8;
        Some(BLOCK_HEADER_BITS + pad + 32 + 8 * self.raw.len() as u64)
    }

    fn huffman_cost(&self, litlen: &CodeTable, dist: &CodeTable) -> u64 {
        BLOCK_HEADER_BITS
            + litlen.cost(&self.litlen_freq)
            + dist.cost(&self.dist_freq)
            + self.extra_bits
    }

    /// Pick the cheapest coding; ties prefer stored, then fixed.
    fn choose(&self, stored: Option<u64>) -> Plan {
        if self.stored_only && stored.is_some() {
            return Plan::Stored;
        }
        let fixed = self.huffman_cost(&self.fixed_litlen, &self.fixed_dist);
        let tables = DynamicTables::build(&self.litlen_freq, &self.dist_freq);
        let dynamic = tables.header_bits + self.huffman_cost(&tables.litlen, &tables.dist);
        trace!("block costs: stored={stored:?} fixed={fixed} dynamic={dynamic}");

        let (mut plan, mut best) = (Plan::Fixed, fixed);
        if let Some(stored) = stored
            && stored <= best
        {
            (plan, best) = (Plan::Stored, stored);
        }
        if dynamic < best {
            plan = Plan::Dynamic(Box::new(tables));
        }
        plan
    }

    /// Write the collected block and clear for the next one.
    pub fn write_block(&mut self, w: &mut BitWriter, is_final: bool) -> Result<BlockKind> {
        self.litlen_freq[END_OF_BLOCK as usize] += 1;
        let start_bits = w.bits_written();

        let plan = self.choose(self.stored_cost(w.pending_bits()));
        let kind = plan.kind();
        w.write_bits(kind.tag(), 2);
        w.write_bits(u32::from(is_final), 1);
        match &plan {
            Plan::Stored => self.write_stored_body(w),
            Plan::Fixed => self.write_tokens(w, &self.fixed_litlen, &self.fixed_dist)?,
            Plan::Dynamic(tables) => {
                tables.write(w)?;
                self.write_tokens(w, &tables.litlen, &tables.dist)?;
            }
        }

        debug!(
            "{} block{}: {} raw bytes, {} tokens, {} bits",
            kind.name(),
            if is_final { " (final)" } else { "" },
            self.raw.len(),
            self.tokens.len(),
            w.bits_written() - start_bits
        );
        self.clear();
        Ok(kind)
    }

    fn write_stored_body(&self, w: &mut BitWriter) {
        let len = self.raw.len() as u16;
        w.flush_to_byte();
        w.write_bits(u32::from(len), 16);
        w.write_bits(u32::from(!len), 16);
        w.write_bytes(&self.raw);
    }

    fn write_tokens(&self, w: &mut BitWriter, litlen: &CodeTable, dist: &CodeTable) -> Result<()> {
        for token in &self.tokens {
            match *token {
                Token::Literal(b) => litlen.encode(w, u16::from(b))?,
                Token::Match { length, distance } => {
                    let ls = length_symbol(length);
                    litlen.encode(w, ls.symbol)?;
                    w.write_bits(u32::from(ls.extra_value), u32::from(ls.extra_bits));
                    let dc = distance_code(distance);
                    dist.encode(w, dc.symbol)?;
                    w.write_bits(u32::from(dc.extra_value), u32::from(dc.extra_bits));
                }
            }
        }
        litlen.encode(w, END_OF_BLOCK)
    }

    /// Drop the collected block.
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.raw.clear();
        self.litlen_freq = [0; NUM_LITLEN_USED];
        self.dist_freq = [0; NUM_DIST_USED];
        self.extra_bits = 0;
    }

    /// Bytes held by the token and raw buffers.
    pub fn footprint(&self) -> usize {
        self.tokens.capacity() * std::mem::size_of::<Token>() + self.raw.capacity()
    }
}
