// Stream header.
//
// Two bytes precede the first block:
//
//   byte 0  magic 0xB7
//   byte 1  high nibble: format version (1)
//           low nibble:  window class, window_bits - 8 (0..=7)

use crate::error::{CodecError, Result};

/// First byte of every stream.
pub const MAGIC: u8 = 0xB7;

/// Format version written by this crate.
pub const FORMAT_VERSION: u8 = 1;

/// Encoded header length in bytes.
pub const HEADER_LEN: usize = 2;

/// Smallest supported window (256 bytes).
pub const MIN_WINDOW_BITS: u8 = 8;

/// Largest supported window (32 KiB).
pub const MAX_WINDOW_BITS: u8 = 15;

/// Parsed stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    pub window_bits: u8,
}

impl StreamHeader {
    pub fn new(window_bits: u8) -> Result<Self> {
        check_window_bits(window_bits)?;
        Ok(Self { window_bits })
    }

    /// Window size in bytes.
    pub fn window_size(&self) -> usize {
        1 << self.window_bits
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        [
            MAGIC,
            FORMAT_VERSION << 4 | (self.window_bits - MIN_WINDOW_BITS),
        ]
    }

    pub fn decode(bytes: [u8; HEADER_LEN]) -> Result<Self> {
        if bytes[0] != MAGIC {
            return Err(CodecError::UnsupportedFormat(format!(
                "bad magic byte {:#04x}",
                bytes[0]
            )));
        }
        let version = bytes[1] >> 4;
        if version != FORMAT_VERSION {
            return Err(CodecError::UnsupportedFormat(format!(
                "unknown format version {version}"
            )));
        }
        let class = bytes[1] & 0x0F;
        Self::new(class + MIN_WINDOW_BITS)
    }
}

/// Reject window sizes outside `MIN_WINDOW_BITS..=MAX_WINDOW_BITS`.
pub fn check_window_bits(window_bits: u8) -> Result<()> {
    if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
        return Err(CodecError::UnsupportedFormat(format!(
            "window bits {window_bits} outside {MIN_WINDOW_BITS}..={MAX_WINDOW_BITS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_header_bytes() {
        let h = StreamHeader::new(15).unwrap();
        assert_eq!(h.encode(), [0xB7, 0x17]);
        assert_eq!(h.window_size(), 32 * 1024);
    }

    #[test]
    fn decode_accepts_every_window_class() {
        for bits in MIN_WINDOW_BITS..=MAX_WINDOW_BITS {
            let h = StreamHeader::new(bits).unwrap();
            assert_eq!(StreamHeader::decode(h.encode()).unwrap(), h);
        }
    }

    #[test]
    fn bad_magic_is_unsupported() {
        assert!(matches!(
            StreamHeader::decode([0x1F, 0x17]),
            Err(CodecError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn bad_version_is_unsupported() {
        assert!(matches!(
            StreamHeader::decode([MAGIC, 0x27]),
            Err(CodecError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn oversized_window_class_is_unsupported() {
        assert!(matches!(
            StreamHeader::decode([MAGIC, 0x18]),
            Err(CodecError::UnsupportedFormat(_))
        ));
        assert!(StreamHeader::new(7).is_err());
        assert!(StreamHeader::new(16).is_err());
    }
}
