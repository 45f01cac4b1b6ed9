// Reader/writer and file-level helpers.
//
// Drives the streaming Compressor/Decompressor over `Read`/`Write` in fixed
// chunks, reporting progress after each one.  The file helpers wrap those
// loops with buffered I/O and optionally compute a streaming SHA-256 of the
// uncompressed side (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
#[cfg(feature = "parallel")]
use std::path::PathBuf;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::compress::{CompressOptions, Compressor, Decompressor};
use crate::error::CodecError;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Bytes read from the input per engine call.
pub const CHUNK_SIZE: usize = 16 * 1024;

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Snapshot of the engine counters, passed to progress callbacks after
/// every chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Input bytes accepted by the engine so far.
    pub bytes_consumed: u64,
    /// Output bytes emitted by the engine so far.
    pub bytes_produced: u64,
}

impl Progress {
    /// Fraction of `total` input bytes consumed, clamped to `[0, 1]`.
    ///
    /// Returns `None` when `total` is zero.
    pub fn fraction(&self, total: u64) -> Option<f64> {
        if total == 0 {
            return None;
        }
        Some((self.bytes_consumed as f64 / total as f64).min(1.0))
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_stream()` and `compress_file()`.
#[derive(Debug, Clone)]
pub struct CompressStats {
    /// Uncompressed input size in bytes.
    pub input_size: u64,
    /// Compressed output size in bytes, header included.
    pub output_size: u64,
    /// Number of blocks written.
    pub blocks: u64,
    /// SHA-256 of the uncompressed input (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decompress_stream()` and `decompress_file()`.
#[derive(Debug, Clone)]
pub struct DecompressStats {
    /// Compressed bytes that belonged to the stream.
    pub input_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// Number of blocks decoded.
    pub blocks: u64,
    /// SHA-256 of the reconstructed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

impl CompressStats {
    /// Compressed size over uncompressed size; `None` for empty input.
    pub fn ratio(&self) -> Option<f64> {
        if self.input_size == 0 {
            None
        } else {
            Some(self.output_size as f64 / self.input_size as f64)
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for stream and file operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The codec rejected the input or the options.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// Compress everything `reader` yields into `writer`.
///
/// Input is read `CHUNK_SIZE` bytes at a time; `progress` is called after
/// each chunk and once more after the final block.
pub fn compress_stream<R, W, F>(
    mut reader: R,
    mut writer: W,
    opts: CompressOptions,
    mut progress: F,
) -> Result<CompressStats, IoError>
where
    R: Read,
    W: Write,
    F: FnMut(&Progress),
{
    let mut enc = Compressor::new(opts)?;

    #[cfg(feature = "file-io")]
    let mut input_hasher = sha2::Sha256::new();

    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = read_chunk(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }
        #[cfg(feature = "file-io")]
        {
            input_hasher.update(&buf[..n]);
        }
        let out = enc.compress(&buf[..n])?;
        writer.write_all(&out)?;
        progress(&Progress {
            bytes_consumed: enc.bytes_consumed(),
            bytes_produced: enc.bytes_produced(),
        });
    }

    let tail = enc.finish()?;
    writer.write_all(&tail)?;
    writer.flush()?;
    progress(&Progress {
        bytes_consumed: enc.bytes_consumed(),
        bytes_produced: enc.bytes_produced(),
    });

    #[cfg(feature = "file-io")]
    let input_sha256 = Some(input_hasher.finalize().into());
    #[cfg(not(feature = "file-io"))]
    let input_sha256: Option<[u8; 32]> = None;

    Ok(CompressStats {
        input_size: enc.bytes_consumed(),
        output_size: enc.bytes_produced(),
        blocks: enc.blocks_written(),
        input_sha256,
    })
}

/// Decompress one stream from `reader` into `writer`.
///
/// Fails with `CodecError::UnexpectedEndOfStream` if the reader runs dry
/// before the final block, and with `CodecError::CorruptStream` if any
/// bytes follow the final block, wherever the chunk boundaries fall.
pub fn decompress_stream<R, W, F>(
    mut reader: R,
    writer: W,
    mut progress: F,
) -> Result<DecompressStats, IoError>
where
    R: Read,
    W: Write,
    F: FnMut(&Progress),
{
    let mut dec = Decompressor::new();

    #[cfg(feature = "file-io")]
    let mut output_hasher = sha2::Sha256::new();
    #[cfg(feature = "file-io")]
    let mut writer = HashingWriter {
        inner: writer,
        hasher: &mut output_hasher,
    };
    #[cfg(not(feature = "file-io"))]
    let mut writer = writer;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut out = Vec::with_capacity(CHUNK_SIZE * 4);
    let mut total_read = 0u64;
    loop {
        let n = read_chunk(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }
        if dec.is_done() {
            return Err(trailing_data(n as u64).into());
        }
        total_read += n as u64;
        out.clear();
        dec.decompress_into(&buf[..n], &mut out)?;
        writer.write_all(&out)?;
        progress(&Progress {
            bytes_consumed: dec.bytes_consumed(),
            bytes_produced: dec.bytes_produced(),
        });
        // The decompressor stops counting input at the final block.
        if dec.is_done() && dec.bytes_consumed() < total_read {
            return Err(trailing_data(total_read - dec.bytes_consumed()).into());
        }
    }
    dec.finish()?;
    writer.flush()?;

    #[cfg(feature = "file-io")]
    let output_sha256 = {
        drop(writer);
        Some(output_hasher.finalize().into())
    };
    #[cfg(not(feature = "file-io"))]
    let output_sha256: Option<[u8; 32]> = None;

    Ok(DecompressStats {
        input_size: dec.bytes_consumed(),
        output_size: dec.bytes_produced(),
        blocks: dec.blocks_decoded(),
        output_sha256,
    })
}

fn trailing_data(len: u64) -> CodecError {
    CodecError::corrupt(format!("{len} trailing bytes after final block"))
}

/// Fill as much of `buf` as the reader gives in one call, retrying on
/// `Interrupted`.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Compress `input_path` into `output_path`.
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    opts: CompressOptions,
) -> Result<CompressStats, IoError> {
    compress_file_with_progress(input_path, output_path, opts, |_| {})
}

/// Like `compress_file()`, calling `progress` after every chunk.
pub fn compress_file_with_progress<F: FnMut(&Progress)>(
    input_path: &Path,
    output_path: &Path,
    opts: CompressOptions,
    progress: F,
) -> Result<CompressStats, IoError> {
    // Reject bad options before truncating the output file.
    opts.validate()?;
    let input = BufReader::with_capacity(BUF_SIZE, File::open(input_path)?);
    let output = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    compress_stream(input, output, opts, progress)
}

/// Decompress `input_path` into `output_path`.
pub fn decompress_file(input_path: &Path, output_path: &Path) -> Result<DecompressStats, IoError> {
    decompress_file_with_progress(input_path, output_path, |_| {})
}

/// Like `decompress_file()`, calling `progress` after every chunk.
pub fn decompress_file_with_progress<F: FnMut(&Progress)>(
    input_path: &Path,
    output_path: &Path,
    progress: F,
) -> Result<DecompressStats, IoError> {
    let input = BufReader::with_capacity(BUF_SIZE, File::open(input_path)?);
    let output = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    decompress_stream(input, output, progress)
}

/// Compress each `(input, output)` pair as an independent stream on the
/// rayon thread pool.  Results come back in job order.
#[cfg(feature = "parallel")]
pub fn compress_files_parallel(
    jobs: &[(PathBuf, PathBuf)],
    opts: CompressOptions,
) -> Vec<Result<CompressStats, IoError>> {
    jobs.par_iter()
        .map(|(input, output)| compress_file(input, output, opts))
        .collect()
}

// ---------------------------------------------------------------------------
// Hashing writer (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
struct HashingWriter<'a, W: Write> {
    inner: W,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
