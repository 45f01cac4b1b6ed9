#![no_main]
use libfuzzer_sys::fuzz_target;
use streamflate::compress::Decompressor;
use streamflate::engine;

fuzz_target!(|data: &[u8]| {
    // Fuzz the decoder with arbitrary bytes.
    // The decoder must never panic: only return errors.
    let _ = engine::decompress(data);

    // Same bytes behind a valid header, fed in two pieces.
    let mut framed = vec![0xB7, 0x17];
    framed.extend_from_slice(data);
    let split = framed.len() / 2;
    let mut dec = Decompressor::new();
    let _ = dec
        .decompress(&framed[..split])
        .and_then(|_| dec.decompress(&framed[split..]))
        .and_then(|_| dec.finish());
});
