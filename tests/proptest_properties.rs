use proptest::prelude::*;
use streamflate::compress::{CompressOptions, Compressor, Decompressor};
use streamflate::engine;

fn pack(data: &[u8], opts: CompressOptions, chunk: usize) -> Vec<u8> {
    let mut enc = Compressor::new(opts).unwrap();
    let mut out = Vec::new();
    for piece in data.chunks(chunk.max(1)) {
        out.extend(enc.compress(piece).unwrap());
    }
    out.extend(enc.finish().unwrap());
    out
}

fn unpack(packed: &[u8], chunk: usize) -> Vec<u8> {
    let mut dec = Decompressor::new();
    let mut out = Vec::new();
    for piece in packed.chunks(chunk.max(1)) {
        dec.decompress_into(piece, &mut out).unwrap();
    }
    dec.finish().unwrap();
    out
}

/// Bytes drawn from a small alphabet so the matcher finds work to do.
fn low_entropy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'c'), any::<u8>()], 0..max_len)
}

proptest! {
    #[test]
    fn prop_roundtrip_any_chunking(
        data in proptest::collection::vec(any::<u8>(), 0..8192),
        level in 0u32..=9u32,
        window_bits in 8u8..=15u8,
        c_chunk in 1usize..5000,
        d_chunk in 1usize..5000,
    ) {
        let opts = CompressOptions { level, window_bits, ..Default::default() };
        let packed = pack(&data, opts, c_chunk);
        prop_assert_eq!(unpack(&packed, d_chunk), data);
    }

    #[test]
    fn prop_roundtrip_low_entropy_small_blocks(
        data in low_entropy(20_000),
        level in 1u32..=9u32,
        block_size in 64usize..4096,
    ) {
        let opts = CompressOptions { level, block_size, window_bits: 9 };
        let packed = pack(&data, opts, data.len());
        prop_assert_eq!(unpack(&packed, 1024), data);
    }

    #[test]
    fn prop_output_bounded_by_stored_size(
        data in proptest::collection::vec(any::<u8>(), 0..20_000),
        level in 0u32..=9u32,
    ) {
        // At worst every block is stored: 5 bytes of framing per block.
        let packed = engine::compress_with_options(&data, &CompressOptions::with_level(level)).unwrap();
        let blocks = data.len() / 1024 + 1;
        prop_assert!(
            packed.len() <= data.len() + 5 * blocks + 4,
            "packed={} input={}", packed.len(), data.len()
        );
    }

    #[test]
    fn prop_decoder_never_panics(
        mut junk in proptest::collection::vec(any::<u8>(), 0..2048),
        split in 0usize..2048,
    ) {
        if junk.len() >= 2 {
            junk[0] = 0xB7;
            junk[1] = 0x17;
        }
        let split = split.min(junk.len());
        let mut dec = Decompressor::new();
        let _ = dec
            .decompress(&junk[..split])
            .and_then(|_| dec.decompress(&junk[split..]))
            .and_then(|_| dec.finish());
    }
}

#[test]
#[ignore = "performance properties are workload and machine dependent"]
fn perf_property_decode_not_pathological() {
    use std::time::Instant;
    let data: Vec<u8> = (0..16 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    let packed = engine::compress(&data).unwrap();
    let t0 = Instant::now();
    let unpacked = engine::decompress(&packed).unwrap();
    let dt = t0.elapsed();
    assert_eq!(unpacked, data);
    assert!(dt.as_secs_f64() < 20.0, "decode took {:?}", dt);
}
