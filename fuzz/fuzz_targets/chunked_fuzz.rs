#![no_main]
use libfuzzer_sys::fuzz_target;
use streamflate::compress::{CompressOptions, Compressor, Decompressor};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    // Control bytes pick the chunk sizes on each side.
    let c_chunk = 1 + data[0] as usize * 7;
    let d_chunk = 1 + data[1] as usize;
    let level = (data[2] % 10) as u32;
    let payload = &data[3..];

    let mut enc = Compressor::new(CompressOptions::with_level(level)).unwrap();
    let mut packed = Vec::new();
    for piece in payload.chunks(c_chunk) {
        packed.extend(enc.compress(piece).unwrap());
    }
    packed.extend(enc.finish().unwrap());

    let mut dec = Decompressor::new();
    let mut out = Vec::new();
    for piece in packed.chunks(d_chunk) {
        dec.decompress_into(piece, &mut out).unwrap();
    }
    dec.finish().unwrap();
    assert_eq!(out, payload);
    assert_eq!(dec.bytes_consumed(), packed.len() as u64);
});
