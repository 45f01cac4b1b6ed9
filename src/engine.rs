// One-shot engine API.
//
// Wraps the streaming Compressor/Decompressor for callers that already
// hold the whole input in memory.

use crate::compress::{CompressOptions, Compressor, Decompressor};
use crate::error::Result;

// ---------------------------------------------------------------------------
// High-level compress
// ---------------------------------------------------------------------------

/// Compress `data` with default options.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    compress_with_options(data, &CompressOptions::default())
}

/// Compress with custom options.
pub fn compress_with_options(data: &[u8], opts: &CompressOptions) -> Result<Vec<u8>> {
    let mut enc = Compressor::new(*opts)?;
    let mut out = enc.compress(data)?;
    out.extend(enc.finish()?);
    Ok(out)
}

// ---------------------------------------------------------------------------
// High-level decompress
// ---------------------------------------------------------------------------

/// Decompress a complete stream.
///
/// Fails with `UnexpectedEndOfStream` if `data` stops before the final
/// block.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut dec = Decompressor::new();
    let out = dec.decompress(data)?;
    dec.finish()?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    fn roundtrip(data: &[u8]) {
        let packed = compress(data).expect("compress failed");
        let unpacked = decompress(&packed).expect("decompress failed");
        assert_eq!(
            unpacked,
            data,
            "roundtrip mismatch (input={}, packed={})",
            data.len(),
            packed.len()
        );
    }

    #[test]
    fn roundtrip_text() {
        roundtrip(b"The quick brown fox jumps over the lazy dog.");
    }

    #[test]
    fn roundtrip_empty() {
        roundtrip(b"");
    }

    #[test]
    fn roundtrip_single_byte() {
        roundtrip(b"x");
    }

    #[test]
    fn roundtrip_binary_cycle() {
        let data: Vec<u8> = (0..=255).cycle().take(70_000).collect();
        roundtrip(&data);
    }

    #[test]
    fn roundtrip_run_data() {
        roundtrip(&[0xAA; 200]);
    }

    #[test]
    fn roundtrip_all_levels() {
        let data = b"ABCDEFGHIJKLMNOP--CHANGED--UVWXYZ0123456789abcdefghijklmnop ABCDEFGHIJKLMNOP";
        for level in 0..=9 {
            let opts = CompressOptions::with_level(level);
            let packed = compress_with_options(data, &opts).expect("compress failed");
            let unpacked = decompress(&packed).expect("decompress failed");
            assert_eq!(unpacked, data, "level {level} roundtrip failed");
        }
    }

    #[test]
    fn repetitive_data_shrinks() {
        let data: Vec<u8> = b"abcdefgh".iter().cycle().take(8192).copied().collect();
        let packed = compress(&data).unwrap();
        assert!(
            packed.len() < data.len() / 20,
            "packed ({}) should be much smaller than input ({})",
            packed.len(),
            data.len()
        );
    }

    #[test]
    fn truncated_input_is_reported() {
        let packed = compress(b"some data that will be cut short").unwrap();
        assert_eq!(
            decompress(&packed[..packed.len() - 1]),
            Err(CodecError::UnexpectedEndOfStream)
        );
    }
}
