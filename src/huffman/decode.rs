// Bit-serial canonical decoder.
//
// Keeps only the number of codes of each length and the symbols sorted by
// (length, index).  Decoding walks one bit at a time: at each length the
// canonical codes form a contiguous range starting at `first`, so a code
// is recognised as soon as `code - first < count[len]`.

use log::trace;

use crate::bitstream::BitReader;
use crate::error::{CodecError, Result};

use super::MAX_CODE_LEN;

/// Decoding table built from a list of code lengths.
#[derive(Debug, Clone)]
pub struct HuffmanDecoder {
    counts: [u16; MAX_CODE_LEN as usize + 1],
    symbols: Vec<u16>,
}

impl HuffmanDecoder {
    /// Build a decoder.  Lengths above `MAX_CODE_LEN` or an
    /// over-subscribed set of lengths is a `CorruptStream`; incomplete
    /// codes are accepted and fail only if an unassigned code is read.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        let mut counts = [0u16; MAX_CODE_LEN as usize + 1];
        for &len in lengths {
            if len > MAX_CODE_LEN {
                return Err(CodecError::corrupt(format!("code length {len} too long")));
            }
            counts[len as usize] += 1;
        }
        counts[0] = 0;

        let mut left: i32 = 1;
        for &count in &counts[1..] {
            left <<= 1;
            left -= i32::from(count);
            if left < 0 {
                return Err(CodecError::corrupt("over-subscribed code lengths"));
            }
        }

        let mut offsets = [0u16; MAX_CODE_LEN as usize + 2];
        for len in 1..=MAX_CODE_LEN as usize {
            offsets[len + 1] = offsets[len] + counts[len];
        }
        let used = offsets[MAX_CODE_LEN as usize + 1] as usize;
        let mut symbols = vec![0u16; used];
        for (sym, &len) in lengths.iter().enumerate() {
            if len > 0 {
                let slot = &mut offsets[len as usize];
                symbols[*slot as usize] = sym as u16;
                *slot += 1;
            }
        }

        trace!("huffman decoder: {used} codes, {left} unused leaves");
        Ok(Self { counts, symbols })
    }

    /// Read one symbol.
    ///
    /// `UnexpectedEndOfStream` if input runs out mid-code (the caller is
    /// expected to rewind), `InvalidCode` if no code matches.
    pub fn decode(&self, r: &mut BitReader) -> Result<u16> {
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;
        for &count in &self.counts[1..] {
            code |= r.read_bit()? as i32;
            let count = i32::from(count);
            if code - first < count {
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }
        Err(CodecError::InvalidCode)
    }

    /// Number of symbols that have a code.
    pub fn used_symbols(&self) -> usize {
        self.symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitWriter;
    use crate::huffman::{CodeTable, fixed_litlen_lengths};

    #[test]
    fn decodes_what_the_encoder_table_writes() {
        let lengths = [3, 3, 3, 3, 3, 2, 4, 4];
        let table = CodeTable::from_lengths(&lengths);
        let dec = HuffmanDecoder::from_lengths(&lengths).unwrap();

        let message = [5u16, 0, 7, 6, 4, 5, 1, 2, 3];
        let mut w = BitWriter::new();
        for &s in &message {
            table.encode(&mut w, s).unwrap();
        }
        w.flush_to_byte();

        let mut r = BitReader::new();
        r.feed(&w.take_bytes());
        for &s in &message {
            assert_eq!(dec.decode(&mut r).unwrap(), s);
        }
    }

    #[test]
    fn fixed_literal_table_round_trips_every_symbol() {
        let lengths = fixed_litlen_lengths();
        let table = CodeTable::fixed_litlen();
        let dec = HuffmanDecoder::from_lengths(&lengths).unwrap();
        let mut w = BitWriter::new();
        for s in 0..288u16 {
            table.encode(&mut w, s).unwrap();
        }
        w.flush_to_byte();
        let mut r = BitReader::new();
        r.feed(&w.take_bytes());
        for s in 0..288u16 {
            assert_eq!(dec.decode(&mut r).unwrap(), s);
        }
    }

    #[test]
    fn over_subscribed_lengths_are_corrupt() {
        let err = HuffmanDecoder::from_lengths(&[1, 1, 1]).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn incomplete_code_rejects_unassigned_pattern() {
        // One 1-bit code "0"; the pattern "1..." is unassigned.
        let dec = HuffmanDecoder::from_lengths(&[0, 1]).unwrap();
        let mut r = BitReader::new();
        r.feed(&[0b0000_0010, 0xFF, 0xFF]);
        assert_eq!(dec.decode(&mut r).unwrap(), 1);
        assert_eq!(dec.decode(&mut r), Err(CodecError::InvalidCode));
    }

    #[test]
    fn empty_code_never_decodes() {
        let dec = HuffmanDecoder::from_lengths(&[0; 30]).unwrap();
        assert_eq!(dec.used_symbols(), 0);
        let mut r = BitReader::new();
        r.feed(&[0, 0]);
        assert_eq!(dec.decode(&mut r), Err(CodecError::InvalidCode));
    }

    #[test]
    fn truncated_code_reports_end_of_stream() {
        let dec = HuffmanDecoder::from_lengths(&fixed_litlen_lengths()).unwrap();
        let mut r = BitReader::new();
        assert_eq!(dec.decode(&mut r), Err(CodecError::UnexpectedEndOfStream));
    }
}
