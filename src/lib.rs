//! Streamflate: a streaming, bounded-memory DEFLATE-style codec in Rust.
//!
//! The crate provides:
//! - LZ77 match finding over a sliding window (`hash`)
//! - Canonical, length-limited Huffman coding (`huffman`) over an LSB-first
//!   bit stream (`bitstream`)
//! - Stored/fixed/dynamic block coding (`block`)
//! - Push-based streaming APIs with bounded memory (`compress`)
//! - One-shot helpers (`engine`) and reader/file helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use streamflate::{CompressOptions, Compressor, Decompressor};
//!
//! let mut enc = Compressor::new(CompressOptions::default()).unwrap();
//! let mut packed = enc.compress(b"hello hello hello hello").unwrap();
//! packed.extend(enc.finish().unwrap());
//!
//! let mut dec = Decompressor::new();
//! let unpacked = dec.decompress(&packed).unwrap();
//! dec.finish().unwrap();
//! assert_eq!(unpacked, b"hello hello hello hello");
//! ```

pub mod bitstream;
pub mod block;
pub mod compress;
pub mod engine;
pub mod error;
pub mod hash;
pub mod header;
pub mod huffman;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;

pub use compress::{CompressOptions, Compressor, Decompressor};
pub use error::{CodecError, Result};
