// Block parsing.
//
// Each function either consumes exactly one syntactic unit or fails; the
// streaming decompressor wraps calls in mark/rewind so a unit cut short by
// the end of the buffered input is parsed again once more input arrives.

use log::trace;

use crate::bitstream::BitReader;
use crate::error::{CodecError, Result};
use crate::huffman::{HuffmanDecoder, NUM_CL_SYMBOLS, fixed_dist_lengths, fixed_litlen_lengths};

use super::token::{END_OF_BLOCK, MAX_DIST_CODE, MAX_LITLEN_SYMBOL, distance_base, length_base};
use super::{BlockKind, CL_ORDER};

/// Read the 2-bit type tag and the final flag.
pub fn read_block_header(r: &mut BitReader) -> Result<(BlockKind, bool)> {
    let tag = r.read_bits(2)?;
    let is_final = r.read_bit()? == 1;
    Ok((BlockKind::from_tag(tag)?, is_final))
}

/// Skip to the byte boundary and read LEN / NLEN of a stored block.
pub fn read_stored_len(r: &mut BitReader) -> Result<u16> {
    r.align_to_byte();
    let len = r.read_bits(16)? as u16;
    let nlen = r.read_bits(16)? as u16;
    if len != !nlen {
        return Err(CodecError::corrupt(format!(
            "stored block length {len:#06x} does not match its complement {nlen:#06x}"
        )));
    }
    Ok(len)
}

/// Decoding tables for a Huffman-coded block.
#[derive(Debug, Clone)]
pub struct BlockTables {
    litlen: HuffmanDecoder,
    dist: HuffmanDecoder,
}

impl BlockTables {
    /// The fixed literal/length and distance tables.
    pub fn fixed() -> Result<Self> {
        Ok(Self {
            litlen: HuffmanDecoder::from_lengths(&fixed_litlen_lengths())?,
            dist: HuffmanDecoder::from_lengths(&fixed_dist_lengths())?,
        })
    }

    /// Parse a dynamic block's table header.
    pub fn read_dynamic(r: &mut BitReader) -> Result<Self> {
        let hlit = r.read_bits(5)? as usize + 257;
        let hdist = r.read_bits(5)? as usize + 1;
        let hclen = r.read_bits(4)? as usize + 4;
        if hlit > MAX_LITLEN_SYMBOL as usize + 1 || hdist > MAX_DIST_CODE as usize + 1 {
            return Err(CodecError::corrupt(format!(
                "too many length or distance codes ({hlit}, {hdist})"
            )));
        }

        let mut cl_lengths = [0u8; NUM_CL_SYMBOLS];
        for &sym in &CL_ORDER[..hclen] {
            cl_lengths[sym] = r.read_bits(3)? as u8;
        }
        let cl = HuffmanDecoder::from_lengths(&cl_lengths)?;

        let total = hlit + hdist;
        let mut lengths = vec![0u8; total];
        let mut i = 0;
        while i < total {
            let sym = cl.decode(r)?;
            let (value, repeat) = match sym {
                0..=15 => (sym as u8, 1),
                16 => {
                    if i == 0 {
                        return Err(CodecError::corrupt("repeat with no previous length"));
                    }
                    (lengths[i - 1], 3 + r.read_bits(2)? as usize)
                }
                17 => (0, 3 + r.read_bits(3)? as usize),
                _ => (0, 11 + r.read_bits(7)? as usize),
            };
            if i + repeat > total {
                return Err(CodecError::corrupt("code length repeat overruns the table"));
            }
            lengths[i..i + repeat].fill(value);
            i += repeat;
        }

        if lengths[END_OF_BLOCK as usize] == 0 {
            return Err(CodecError::corrupt("missing end-of-block code"));
        }

        trace!("dynamic block tables: hlit={hlit} hdist={hdist} hclen={hclen}");
        Ok(Self {
            litlen: HuffmanDecoder::from_lengths(&lengths[..hlit])?,
            dist: HuffmanDecoder::from_lengths(&lengths[hlit..])?,
        })
    }
}

/// One decoded unit of a Huffman-coded block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Literal(u8),
    Match { length: u16, distance: u16 },
    EndOfBlock,
}

/// Decode a literal, a complete length/distance pair, or end-of-block.
///
/// Distances are not checked against the history here; the caller owns
/// the window.
pub fn decode_token(r: &mut BitReader, tables: &BlockTables) -> Result<Decoded> {
    let sym = tables.litlen.decode(r)?;
    if sym < END_OF_BLOCK {
        return Ok(Decoded::Literal(sym as u8));
    }
    if sym == END_OF_BLOCK {
        return Ok(Decoded::EndOfBlock);
    }
    let (base, extra) = length_base(sym)?;
    let length = base + r.read_bits(u32::from(extra))? as u16;

    let dsym = tables.dist.decode(r)?;
    let (dbase, dextra) = distance_base(dsym)?;
    let distance = dbase + r.read_bits(u32::from(dextra))? as u16;
    Ok(Decoded::Match { length, distance })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitWriter;
    use crate::huffman::CodeTable;

    #[test]
    fn header_is_tag_then_final_flag() {
        let mut w = BitWriter::new();
        w.write_bits(2, 2);
        w.write_bits(1, 1);
        w.flush_to_byte();
        let mut r = BitReader::new();
        r.feed(&w.take_bytes());
        assert_eq!(read_block_header(&mut r).unwrap(), (BlockKind::Dynamic, true));
    }

    #[test]
    fn reserved_tag_is_rejected() {
        let mut r = BitReader::new();
        r.feed(&[0b011]);
        assert!(read_block_header(&mut r).unwrap_err().is_corruption());
    }

    #[test]
    fn stored_length_complement_is_checked() {
        let mut r = BitReader::new();
        r.feed(&[0x05, 0x00, 0xFA, 0xFF]);
        assert_eq!(read_stored_len(&mut r).unwrap(), 5);

        let mut r = BitReader::new();
        r.feed(&[0x05, 0x00, 0xFA, 0xFE]);
        assert!(read_stored_len(&mut r).unwrap_err().is_corruption());
    }

    #[test]
    fn fixed_tables_decode_literal_match_and_end() {
        let lit = CodeTable::fixed_litlen();
        let dist = CodeTable::fixed_dist();
        let mut w = BitWriter::new();
        lit.encode(&mut w, u16::from(b'Z')).unwrap();
        // Length 12 = symbol 265 + 1 extra bit of value 1.
        lit.encode(&mut w, 265).unwrap();
        w.write_bits(1, 1);
        // Distance 6 = code 4 + 1 extra bit of value 1.
        dist.encode(&mut w, 4).unwrap();
        w.write_bits(1, 1);
        lit.encode(&mut w, 256).unwrap();
        w.flush_to_byte();

        let tables = BlockTables::fixed().unwrap();
        let mut r = BitReader::new();
        r.feed(&w.take_bytes());
        assert_eq!(decode_token(&mut r, &tables).unwrap(), Decoded::Literal(b'Z'));
        assert_eq!(
            decode_token(&mut r, &tables).unwrap(),
            Decoded::Match {
                length: 12,
                distance: 6
            }
        );
        assert_eq!(decode_token(&mut r, &tables).unwrap(), Decoded::EndOfBlock);
    }

    #[test]
    fn reserved_fixed_symbols_are_corrupt() {
        let lit = CodeTable::fixed_litlen();
        let dist = CodeTable::fixed_dist();
        let tables = BlockTables::fixed().unwrap();

        let mut w = BitWriter::new();
        lit.encode(&mut w, 286).unwrap();
        w.flush_to_byte();
        let mut r = BitReader::new();
        r.feed(&w.take_bytes());
        assert!(decode_token(&mut r, &tables).unwrap_err().is_corruption());

        let mut w = BitWriter::new();
        lit.encode(&mut w, 257).unwrap();
        dist.encode(&mut w, 30).unwrap();
        w.flush_to_byte();
        let mut r = BitReader::new();
        r.feed(&w.take_bytes());
        assert!(decode_token(&mut r, &tables).unwrap_err().is_corruption());
    }

    #[test]
    fn dynamic_header_rejects_leading_repeat() {
        let mut w = BitWriter::new();
        w.write_bits(0, 5); // hlit = 257
        w.write_bits(0, 5); // hdist = 1
        w.write_bits(0, 4); // hclen = 4: symbols 16, 17, 18, 0
        // Give symbol 16 and symbol 0 one-bit codes.
        w.write_bits(1, 3);
        w.write_bits(0, 3);
        w.write_bits(0, 3);
        w.write_bits(1, 3);
        // Canonical: symbol 0 -> "0", symbol 16 -> "1".
        w.write_bits(1, 1);
        w.write_bits(0, 2);
        w.flush_to_byte();
        let mut r = BitReader::new();
        r.feed(&w.take_bytes());
        assert!(BlockTables::read_dynamic(&mut r).unwrap_err().is_corruption());
    }

    #[test]
    fn dynamic_header_requires_end_of_block_code() {
        let mut w = BitWriter::new();
        w.write_bits(0, 5); // hlit = 257
        w.write_bits(0, 5); // hdist = 1
        w.write_bits(0, 4); // hclen = 4
        // Symbol 0 ("0") and symbol 18 ("1"), one bit each.
        w.write_bits(0, 3);
        w.write_bits(0, 3);
        w.write_bits(1, 3);
        w.write_bits(1, 3);
        // 138 + 119 = 257 zeros, then one zero distance length.
        w.write_bits(1, 1);
        w.write_bits(127, 7);
        w.write_bits(1, 1);
        w.write_bits(108, 7);
        w.write_bits(0, 1);
        w.flush_to_byte();
        let mut r = BitReader::new();
        r.feed(&w.take_bytes());
        let err = BlockTables::read_dynamic(&mut r).unwrap_err();
        assert_eq!(err, CodecError::corrupt("missing end-of-block code"));
    }
}
