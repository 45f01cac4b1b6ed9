#![no_main]
use libfuzzer_sys::fuzz_target;
use streamflate::compress::CompressOptions;
use streamflate::engine;

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let level = (data[0] % 10) as u32;
    let window_bits = 8 + data[1] % 8;
    let block_size = 64 + (data[2] as usize) * 64;
    let payload = &data[3..];

    let opts = CompressOptions {
        level,
        window_bits,
        block_size,
    };
    let packed = engine::compress_with_options(payload, &opts).unwrap();
    let unpacked = engine::decompress(&packed).unwrap();
    assert_eq!(unpacked, payload);
});
