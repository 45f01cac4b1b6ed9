// Streaming engine.
//
// This module provides the push-based streaming API, building on the
// match finder and block codec:
//
// - `encoder`: Compressor, chunked compress with bounded memory
// - `decoder`: Decompressor, resumable chunked decompress
// - `window`: ring buffer of decoded history

pub mod decoder;
pub mod encoder;
pub mod window;

pub use decoder::Decompressor;
pub use encoder::{CompressOptions, Compressor, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, StreamState};
