// Canonical code assignment and encoder-side code tables.

use crate::bitstream::{BitWriter, reverse_bits};
use crate::error::{CodecError, Result};

use super::{MAX_CODE_LEN, fixed_dist_lengths, fixed_litlen_lengths};

/// Assign canonical codes to a set of code lengths.
///
/// Codes are handed out in order of increasing length, and within one
/// length in order of increasing symbol index.  Symbols with length 0 get
/// code 0 and must never be emitted.  The returned codes are in natural
/// (MSB-first) bit order.
pub fn canonical_codes(lengths: &[u8]) -> Vec<u16> {
    let mut bl_count = [0u16; MAX_CODE_LEN as usize + 1];
    for &len in lengths {
        if len > 0 {
            bl_count[len as usize] += 1;
        }
    }

    let mut next_code = [0u32; MAX_CODE_LEN as usize + 1];
    let mut code = 0u32;
    for bits in 1..=MAX_CODE_LEN as usize {
        code = (code + u32::from(bl_count[bits - 1])) << 1;
        next_code[bits] = code;
    }

    lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                0
            } else {
                let c = next_code[len as usize];
                next_code[len as usize] = c + 1;
                c as u16
            }
        })
        .collect()
}

/// Encoder-side table: per-symbol code (bit-reversed for LSB-first output)
/// and length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<u16>,
    lengths: Vec<u8>,
}

impl CodeTable {
    /// Build from code lengths.
    pub fn from_lengths(lengths: &[u8]) -> Self {
        let codes = canonical_codes(lengths)
            .into_iter()
            .zip(lengths)
            .map(|(code, &len)| reverse_bits(u32::from(code), u32::from(len)) as u16)
            .collect();
        Self {
            codes,
            lengths: lengths.to_vec(),
        }
    }

    /// The fixed literal/length table.
    pub fn fixed_litlen() -> Self {
        Self::from_lengths(&fixed_litlen_lengths())
    }

    /// The fixed distance table.
    pub fn fixed_dist() -> Self {
        Self::from_lengths(&fixed_dist_lengths())
    }

    /// Emit the code for `symbol`.
    ///
    /// Fails with `UnknownSymbol` when the symbol has no code in this table.
    #[inline]
    pub fn encode(&self, w: &mut BitWriter, symbol: u16) -> Result<()> {
        match self.lengths.get(symbol as usize) {
            Some(&len) if len > 0 => {
                w.write_bits(u32::from(self.codes[symbol as usize]), u32::from(len));
                Ok(())
            }
            _ => Err(CodecError::UnknownSymbol(symbol)),
        }
    }

    /// Code length of `symbol` (0 if absent).
    #[inline]
    pub fn len_of(&self, symbol: u16) -> u8 {
        self.lengths.get(symbol as usize).copied().unwrap_or(0)
    }

    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    /// Total bits needed to emit every symbol `freqs[s]` times.
    pub fn cost(&self, freqs: &[u32]) -> u64 {
        freqs
            .iter()
            .zip(&self.lengths)
            .map(|(&f, &l)| u64::from(f) * u64::from(l))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitReader;

    #[test]
    fn canonical_assignment_follows_length_then_index() {
        let lengths = [3, 3, 3, 3, 3, 2, 4, 4];
        let codes = canonical_codes(&lengths);
        assert_eq!(
            codes,
            vec![0b010, 0b011, 0b100, 0b101, 0b110, 0b00, 0b1110, 0b1111]
        );
    }

    #[test]
    fn zero_length_symbols_get_no_code() {
        let codes = canonical_codes(&[0, 1, 0, 1]);
        assert_eq!(codes, vec![0, 0, 0, 1]);
    }

    #[test]
    fn fixed_litlen_codes_match_known_values() {
        let codes = canonical_codes(&fixed_litlen_lengths());
        assert_eq!(codes[0], 0b0011_0000);
        assert_eq!(codes[143], 0b1011_1111);
        assert_eq!(codes[144], 0b1_1001_0000);
        assert_eq!(codes[256], 0b000_0000);
        assert_eq!(codes[279], 0b001_0111);
        assert_eq!(codes[280], 0b1100_0000);
    }

    #[test]
    fn encode_writes_code_msb_first_on_the_wire() {
        // Symbol 5 has code "00"; symbol 6 has code "1110".
        let table = CodeTable::from_lengths(&[3, 3, 3, 3, 3, 2, 4, 4]);
        let mut w = BitWriter::new();
        table.encode(&mut w, 6).unwrap();
        table.encode(&mut w, 5).unwrap();
        w.flush_to_byte();
        let bytes = w.take_bytes();

        let mut r = BitReader::new();
        r.feed(&bytes);
        // First bit on the wire is the code's most significant bit.
        assert_eq!(r.read_bit().unwrap(), 1);
        assert_eq!(r.read_bit().unwrap(), 1);
        assert_eq!(r.read_bit().unwrap(), 1);
        assert_eq!(r.read_bit().unwrap(), 0);
        assert_eq!(r.read_bits(2).unwrap(), 0);
    }

    #[test]
    fn encoding_absent_symbol_fails() {
        let table = CodeTable::from_lengths(&[1, 0, 1]);
        let mut w = BitWriter::new();
        assert_eq!(table.encode(&mut w, 1), Err(CodecError::UnknownSymbol(1)));
        assert_eq!(table.encode(&mut w, 40), Err(CodecError::UnknownSymbol(40)));
        assert_eq!(w.bits_written(), 0);
    }

    #[test]
    fn cost_weights_lengths_by_frequency() {
        let table = CodeTable::fixed_litlen();
        let mut freqs = vec![0u32; 288];
        freqs[b'a' as usize] = 10;
        freqs[200] = 2;
        freqs[256] = 1;
        assert_eq!(table.cost(&freqs), 10 * 8 + 2 * 9 + 7);
    }
}
