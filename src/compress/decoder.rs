// Streaming decompressor.
//
// Decompressor is a resumable state machine:
//   Header -> BlockStart -> (Stored | Codes) -> BlockStart ... -> Done
//
// Every syntactic unit (the stream header, a block header including its
// tables, one token) is parsed as a transaction against the bit reader.
// If the buffered input runs out mid-unit the reader is rewound to the
// unit's start and the call returns what it decoded so far; the unit is
// parsed again when the next chunk arrives.

use log::{debug, warn};

use crate::bitstream::BitReader;
use crate::block::BlockKind;
use crate::block::decoder::{BlockTables, Decoded, decode_token, read_block_header, read_stored_len};
use crate::error::{CodecError, Result};
use crate::header::{HEADER_LEN, MIN_WINDOW_BITS, StreamHeader};

use super::window::Window;

#[derive(Debug)]
enum DecodeState {
    Header,
    BlockStart,
    Stored { remaining: usize, is_final: bool },
    Codes { tables: Box<BlockTables>, is_final: bool },
    Done,
}

/// Result of one parsing step.
enum Step {
    Progress,
    NeedInput,
}

/// Streaming decompressor with progress counters.
///
/// Feed compressed chunks with `decompress()`/`decompress_into()`, then
/// call `finish()` to confirm the final block arrived.
#[derive(Debug)]
pub struct Decompressor {
    reader: BitReader,
    window: Window,
    state: DecodeState,
    /// Set by the first fatal error; cleared by `reset()`.
    poisoned: Option<CodecError>,
    bytes_consumed: u64,
    bytes_produced: u64,
    blocks_decoded: u64,
}

impl Decompressor {
    pub fn new() -> Self {
        Self {
            reader: BitReader::new(),
            window: Window::new(1 << MIN_WINDOW_BITS),
            state: DecodeState::Header,
            poisoned: None,
            bytes_consumed: 0,
            bytes_produced: 0,
            blocks_decoded: 0,
        }
    }

    /// Decode as much of `chunk` (plus earlier leftovers) as possible.
    ///
    /// On error the bytes decoded earlier in this call are dropped with the
    /// returned buffer, although `bytes_produced()` still counts them.  Use
    /// `decompress_into()` to keep partial output.
    pub fn decompress(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.decompress_into(chunk, &mut out)?;
        Ok(out)
    }

    /// Like `decompress`, but appends to `out`.  Bytes appended before an
    /// error stay in `out`.  Returns the number of bytes appended.
    pub fn decompress_into(&mut self, chunk: &[u8], out: &mut Vec<u8>) -> Result<usize> {
        if let Some(err) = &self.poisoned {
            return Err(err.clone());
        }
        if matches!(self.state, DecodeState::Done) {
            return if chunk.is_empty() {
                Ok(0)
            } else {
                Err(CodecError::StreamFinished)
            };
        }

        self.reader.feed(chunk);
        self.bytes_consumed += chunk.len() as u64;
        let start = out.len();
        let result = self.run(out);
        let produced = out.len() - start;
        self.bytes_produced += produced as u64;

        match result {
            Ok(()) => {
                if matches!(self.state, DecodeState::Done) {
                    // Anything after the final block is not part of the stream.
                    self.bytes_consumed -= self.reader.unread_bytes() as u64;
                    self.reader.reset();
                    debug!(
                        "stream decoded: {} bytes in, {} bytes out, {} blocks",
                        self.bytes_consumed, self.bytes_produced, self.blocks_decoded
                    );
                } else {
                    self.reader.compact();
                }
                Ok(produced)
            }
            Err(err) => {
                warn!("decompressor stopped after {} bytes: {err}", self.bytes_produced);
                self.poisoned = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Confirm the stream is complete.
    ///
    /// Fails with `UnexpectedEndOfStream` if the final block has not been
    /// decoded.
    pub fn finish(&mut self) -> Result<()> {
        if let Some(err) = &self.poisoned {
            return Err(err.clone());
        }
        match self.state {
            DecodeState::Done => Ok(()),
            _ => Err(CodecError::UnexpectedEndOfStream),
        }
    }

    /// Return to the freshly constructed state.
    pub fn reset(&mut self) {
        self.reader.reset();
        self.window.reset();
        self.state = DecodeState::Header;
        self.poisoned = None;
        self.bytes_consumed = 0;
        self.bytes_produced = 0;
        self.blocks_decoded = 0;
    }

    fn run(&mut self, out: &mut Vec<u8>) -> Result<()> {
        loop {
            let mark = self.reader.mark();
            match self.step(out) {
                Ok(Step::Progress) => {}
                Ok(Step::NeedInput) => return Ok(()),
                Err(CodecError::UnexpectedEndOfStream) => {
                    self.reader.rewind(mark);
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Parse one unit.
    fn step(&mut self, out: &mut Vec<u8>) -> Result<Step> {
        match &mut self.state {
            DecodeState::Header => {
                let mut bytes = [0u8; HEADER_LEN];
                for b in &mut bytes {
                    *b = self.reader.read_bits(8)? as u8;
                }
                let header = StreamHeader::decode(bytes)?;
                if self.window.size() != header.window_size() {
                    self.window = Window::new(header.window_size());
                }
                self.state = DecodeState::BlockStart;
            }
            DecodeState::BlockStart => {
                let (kind, is_final) = read_block_header(&mut self.reader)?;
                self.state = match kind {
                    BlockKind::Stored => DecodeState::Stored {
                        remaining: read_stored_len(&mut self.reader)? as usize,
                        is_final,
                    },
                    BlockKind::Fixed => DecodeState::Codes {
                        tables: Box::new(BlockTables::fixed()?),
                        is_final,
                    },
                    BlockKind::Dynamic => DecodeState::Codes {
                        tables: Box::new(BlockTables::read_dynamic(&mut self.reader)?),
                        is_final,
                    },
                };
            }
            DecodeState::Stored {
                remaining,
                is_final,
            } => {
                if *remaining == 0 {
                    let is_final = *is_final;
                    self.end_block(is_final);
                    return Ok(Step::Progress);
                }
                let want = (*remaining).min(self.reader.unread_bytes());
                if want == 0 {
                    return Ok(Step::NeedInput);
                }
                let start = out.len();
                out.resize(start + want, 0);
                let n = self.reader.read_aligned_into(&mut out[start..]);
                out.truncate(start + n);
                self.window.extend(&out[start..]);
                *remaining -= n;
            }
            DecodeState::Codes { tables, is_final } => {
                match decode_token(&mut self.reader, tables)? {
                    Decoded::Literal(b) => {
                        out.push(b);
                        self.window.push(b);
                    }
                    Decoded::Match { length, distance } => {
                        self.window
                            .copy_match(distance as usize, length as usize, out)?;
                    }
                    Decoded::EndOfBlock => {
                        let is_final = *is_final;
                        self.end_block(is_final);
                    }
                }
            }
            DecodeState::Done => return Ok(Step::NeedInput),
        }
        Ok(Step::Progress)
    }

    fn end_block(&mut self, is_final: bool) {
        self.blocks_decoded += 1;
        self.state = if is_final {
            DecodeState::Done
        } else {
            DecodeState::BlockStart
        };
    }

    /// Compressed bytes that belong to the stream, as accepted so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Decompressed bytes returned so far.
    pub fn bytes_produced(&self) -> u64 {
        self.bytes_produced
    }

    /// Blocks fully decoded so far.
    pub fn blocks_decoded(&self) -> u64 {
        self.blocks_decoded
    }

    /// True once the final block has been decoded.
    pub fn is_done(&self) -> bool {
        matches!(self.state, DecodeState::Done)
    }

    /// Capacity of the internal buffers, in bytes.
    pub fn memory_footprint(&self) -> usize {
        self.reader.capacity() + self.window.footprint()
    }
}

impl Default for Decompressor {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
