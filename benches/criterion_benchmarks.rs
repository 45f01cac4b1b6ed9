use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use streamflate::compress::{CompressOptions, Compressor, Decompressor};
use streamflate::engine;
use streamflate::hash::table::{HashChain, hash3};
use streamflate::huffman::build::build_lengths;
use std::fs;
use std::path::Path;

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

/// Random bytes from a skewed 16-symbol alphabet with repeated runs, so
/// every block type and the match finder get exercised.
fn gen_text_like(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        let r = (s >> 33) as usize;
        if r % 4 == 0 && out.len() > 64 {
            let back = 1 + r % 64;
            let len = 3 + (r >> 8) % 32;
            let start = out.len() - back;
            for i in 0..len {
                let b = out[start + i];
                out.push(b);
            }
        } else {
            out.push(b"etaoinshrdlucmfw"[(r >> 4) % 16]);
        }
    }
    out.truncate(size);
    out
}

fn compress_level(data: &[u8], level: u32) -> Vec<u8> {
    engine::compress_with_options(data, &CompressOptions::with_level(level)).unwrap()
}

fn write_ratio_snapshot() {
    let data = gen_text_like(2 * 1024 * 1024, 123);
    let mut csv = String::from("level,packed_bytes,input_bytes,ratio\n");
    for level in 0u32..=9 {
        let packed = compress_level(&data, level);
        let ratio = packed.len() as f64 / data.len() as f64;
        csv.push_str(&format!("{level},{},{},{}\n", packed.len(), data.len(), ratio));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_compression_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("compression_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let data = gen_text_like(size, 1);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let packed = compress_level(black_box(&data), 6);
                black_box(packed);
            });
        });
    }
    g.finish();
}

fn bench_decompression_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("decompression_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let data = gen_text_like(size, 2);
        let packed = compress_level(&data, 6);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let out = engine::decompress(black_box(&packed)).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_ratio_vs_level(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("compression_ratio_vs_level");
    let data = gen_text_like(2 * 1024 * 1024, 3);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for level in 0u32..=9u32 {
        g.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, level| {
            b.iter(|| {
                let packed = compress_level(&data, *level);
                let ratio = packed.len() as f64 / data.len() as f64;
                black_box(ratio);
            });
        });
    }
    g.finish();
}

fn bench_chunked_streaming(c: &mut Criterion) {
    let mut g = c.benchmark_group("chunked_streaming");
    let data = gen_text_like(4 * 1024 * 1024, 4);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for chunk in [512usize, 16 * 1024, 256 * 1024] {
        g.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, chunk| {
            b.iter(|| {
                let mut enc = Compressor::new(CompressOptions::default()).unwrap();
                let mut dec = Decompressor::new();
                let mut produced = 0usize;
                for piece in data.chunks(*chunk) {
                    let packed = enc.compress(piece).unwrap();
                    produced += dec.decompress(&packed).unwrap().len();
                }
                let tail = enc.finish().unwrap();
                produced += dec.decompress(&tail).unwrap().len();
                dec.finish().unwrap();
                black_box(produced);
            });
        });
    }
    g.finish();
}

fn bench_hash_chain(c: &mut Criterion) {
    let mut g = c.benchmark_group("hash_chain_insert_lookup");
    let data = gen_data(1 << 16, 5);
    for window_bits in [10u32, 12, 15] {
        g.bench_with_input(
            BenchmarkId::from_parameter(window_bits),
            &window_bits,
            |b, bits| {
                b.iter(|| {
                    let mut chain = HashChain::new(1 << *bits);
                    let mut hits = 0u64;
                    for pos in 0..data.len() - 2 {
                        let bucket = hash3(&data[pos..]);
                        if chain.lookup(bucket).is_some() {
                            hits += 1;
                        }
                        chain.insert(bucket, pos as u64);
                    }
                    black_box(hits);
                });
            },
        );
    }
    g.finish();
}

fn bench_huffman_build(c: &mut Criterion) {
    let mut g = c.benchmark_group("huffman_length_limited_build");
    for symbols in [30usize, 286] {
        let freqs: Vec<u32> = (0..symbols as u32).map(|i| 1 + (i * 7919) % 1000).collect();
        g.bench_with_input(BenchmarkId::from_parameter(symbols), &freqs, |b, freqs| {
            b.iter(|| black_box(build_lengths(black_box(freqs), 15)));
        });
    }
    g.finish();
}

fn bench_incompressible(c: &mut Criterion) {
    let mut g = c.benchmark_group("incompressible_input");
    let data = gen_data(4 * 1024 * 1024, 6);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for level in [0u32, 1, 6] {
        g.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, level| {
            b.iter(|| black_box(compress_level(&data, *level)));
        });
    }
    g.finish();
}

criterion_group!(
    benches,
    bench_compression_speed,
    bench_decompression_speed,
    bench_ratio_vs_level,
    bench_chunked_streaming,
    bench_hash_chain,
    bench_huffman_build,
    bench_incompressible
);
criterion_main!(benches);
