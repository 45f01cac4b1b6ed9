// Streaming compressor.
//
// Compressor provides a push-based API:
//   - Input is fed in arbitrary chunks via compress()
//   - The match finder runs as soon as a full lookahead is buffered
//   - Each full block is written immediately and its bytes returned
//   - Constant memory: one window of history, one lookahead, one block

use log::debug;

use crate::bitstream::BitWriter;
use crate::block::BlockEncoder;
use crate::block::MAX_STORED_LEN;
use crate::error::{CodecError, Result};
use crate::hash::MatchFinder;
use crate::hash::config::{self, DEFAULT_LEVEL, MAX_LEVEL, MAX_MATCH, MatcherConfig};
use crate::header::{self, MAX_WINDOW_BITS, StreamHeader};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Default input bytes per block (32 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 32 * 1024;

/// Largest block size: a block may overshoot by one match and must still
/// fit a single stored block.
pub const MAX_BLOCK_SIZE: usize = MAX_STORED_LEN - MAX_MATCH;

/// Configuration for the streaming compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Compression level (0-9). Level 0 = store only (no matching).
    pub level: u32,
    /// log2 of the history window (8-15).
    pub window_bits: u8,
    /// Input bytes collected before a block is closed.
    pub block_size: usize,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            window_bits: MAX_WINDOW_BITS,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl CompressOptions {
    /// Options at the given level, defaults otherwise.
    pub fn with_level(level: u32) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Reject out-of-range values with `UnsupportedFormat`.
    pub fn validate(&self) -> Result<()> {
        if self.level > MAX_LEVEL {
            return Err(CodecError::UnsupportedFormat(format!(
                "compression level {} outside 0..={MAX_LEVEL}",
                self.level
            )));
        }
        header::check_window_bits(self.window_bits)?;
        if !(1..=MAX_BLOCK_SIZE).contains(&self.block_size) {
            return Err(CodecError::UnsupportedFormat(format!(
                "block size {} outside 1..={MAX_BLOCK_SIZE}",
                self.block_size
            )));
        }
        Ok(())
    }

    /// Matcher profile for `level`.
    pub fn matcher(&self) -> MatcherConfig {
        config::config_for_level(self.level)
    }
}

// ---------------------------------------------------------------------------
// Compressor
// ---------------------------------------------------------------------------

/// Stream lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Nothing fed since construction or `reset()`.
    Idle,
    /// Input accepted, final block not yet written.
    InBlock,
    /// `finish()` has run.
    Finished,
}

/// Streaming compressor.
///
/// Feed input with `compress()`, then call `finish()` exactly once.  The
/// concatenation of every returned chunk is the compressed stream.
///
/// # Example
/// ```
/// use streamflate::compress::{CompressOptions, Compressor, Decompressor};
///
/// let mut enc = Compressor::new(CompressOptions::default()).unwrap();
/// let mut packed = enc.compress(b"hello hello hello").unwrap();
/// packed.extend(enc.finish().unwrap());
///
/// let mut dec = Decompressor::new();
/// assert_eq!(dec.decompress(&packed).unwrap(), b"hello hello hello");
/// dec.finish().unwrap();
/// ```
#[derive(Debug)]
pub struct Compressor {
    opts: CompressOptions,
    header: StreamHeader,
    finder: MatchFinder,
    block: BlockEncoder,
    writer: BitWriter,
    state: StreamState,
    header_written: bool,
    bytes_consumed: u64,
    bytes_produced: u64,
    blocks_written: u64,
}

impl Compressor {
    /// Create a compressor after validating `opts`.
    pub fn new(opts: CompressOptions) -> Result<Self> {
        opts.validate()?;
        let header = StreamHeader::new(opts.window_bits)?;
        Ok(Self::build(opts, header))
    }

    fn build(opts: CompressOptions, header: StreamHeader) -> Self {
        let matcher = opts.matcher();
        Self {
            opts,
            header,
            finder: MatchFinder::new(matcher, header.window_size()),
            block: BlockEncoder::new(opts.block_size, matcher.is_store()),
            writer: BitWriter::with_capacity(opts.block_size + 64),
            state: StreamState::Idle,
            header_written: false,
            bytes_consumed: 0,
            bytes_produced: 0,
            blocks_written: 0,
        }
    }

    /// Feed a chunk; returns the compressed bytes completed so far (possibly
    /// none).
    pub fn compress(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        if self.state == StreamState::Finished {
            return Err(CodecError::StreamFinished);
        }
        self.write_header_once();

        let mut input = chunk;
        while !input.is_empty() {
            let n = self.finder.accept(input);
            input = &input[n..];
            self.bytes_consumed += n as u64;
            self.state = StreamState::InBlock;
            self.drain_tokens(false)?;
        }
        Ok(self.take_output())
    }

    /// Flush everything as a final block and pad to a byte boundary.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        if self.state == StreamState::Finished {
            return Err(CodecError::StreamFinished);
        }
        self.write_header_once();
        self.drain_tokens(true)?;
        self.block.write_block(&mut self.writer, true)?;
        self.blocks_written += 1;
        self.writer.flush_to_byte();
        self.state = StreamState::Finished;

        let out = self.take_output();
        debug!(
            "stream finished: {} bytes in, {} bytes out, {} blocks",
            self.bytes_consumed, self.bytes_produced, self.blocks_written
        );
        Ok(out)
    }

    /// Return to the freshly constructed state, keeping allocations.
    pub fn reset(&mut self) {
        self.finder.reset();
        self.block.clear();
        self.writer.reset();
        self.state = StreamState::Idle;
        self.header_written = false;
        self.bytes_consumed = 0;
        self.bytes_produced = 0;
        self.blocks_written = 0;
    }

    fn write_header_once(&mut self) {
        if !self.header_written {
            self.writer.write_bytes(&self.header.encode());
            self.header_written = true;
        }
    }

    /// Move tokens from the match finder into the block, writing each block
    /// as it fills.
    fn drain_tokens(&mut self, finishing: bool) -> Result<()> {
        while self.finder.has_token(finishing) {
            let Some((token, raw)) = self.finder.next_token() else {
                break;
            };
            self.block.push(token, raw);
            if self.block.raw_len() >= self.opts.block_size {
                self.block.write_block(&mut self.writer, false)?;
                self.blocks_written += 1;
            }
        }
        Ok(())
    }

    fn take_output(&mut self) -> Vec<u8> {
        let out = self.writer.take_bytes();
        self.bytes_produced += out.len() as u64;
        out
    }

    /// Uncompressed bytes accepted so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Compressed bytes returned so far.
    pub fn bytes_produced(&self) -> u64 {
        self.bytes_produced
    }

    /// Blocks written so far.
    pub fn blocks_written(&self) -> u64 {
        self.blocks_written
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn options(&self) -> &CompressOptions {
        &self.opts
    }

    /// Capacity of the internal buffers, in bytes.  Depends on the options
    /// only, never on how much input has passed through.
    pub fn memory_footprint(&self) -> usize {
        self.finder.footprint() + self.block.footprint() + self.writer.capacity()
    }
}

impl Default for Compressor {
    fn default() -> Self {
        let opts = CompressOptions::default();
        Self::build(
            opts,
            StreamHeader {
                window_bits: opts.window_bits,
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
