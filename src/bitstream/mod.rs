// Bit-level I/O for the block codec.
//
// Both directions are LSB-first: the first bit written lands in bit 0 of
// the first output byte.  Prefix codes are stored bit-reversed by the
// symbol coder so that they can be emitted with a single `write_bits`.
//
// - `writer`: BitWriter, packs values into bytes, drains completed bytes
// - `reader`: BitReader, buffered, rewindable bit consumer

pub mod reader;
pub mod writer;

pub use reader::{BitMark, BitReader};
pub use writer::BitWriter;

/// Reverse the low `len` bits of `code`.
#[inline]
pub fn reverse_bits(code: u32, len: u32) -> u32 {
    if len == 0 {
        return 0;
    }
    code.reverse_bits() >> (32 - len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_small_codes() {
        assert_eq!(reverse_bits(0b1, 1), 0b1);
        assert_eq!(reverse_bits(0b10, 2), 0b01);
        assert_eq!(reverse_bits(0b1101, 4), 0b1011);
        assert_eq!(reverse_bits(0b0011_0000, 8), 0b0000_1100);
        assert_eq!(reverse_bits(0, 0), 0);
    }

    #[test]
    fn writer_reader_agree_on_bit_order() {
        let mut w = BitWriter::new();
        w.write_bits(0b101, 3);
        w.write_bits(0x1234, 16);
        w.write_bits(0, 1);
        w.write_bits(0x7F, 7);
        w.flush_to_byte();
        let bytes = w.take_bytes();

        let mut r = BitReader::new();
        r.feed(&bytes);
        assert_eq!(r.read_bits(3).unwrap(), 0b101);
        assert_eq!(r.read_bits(16).unwrap(), 0x1234);
        assert_eq!(r.read_bits(1).unwrap(), 0);
        assert_eq!(r.read_bits(7).unwrap(), 0x7F);
    }
}
