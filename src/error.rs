// Codec error taxonomy.
//
// Every fallible codec operation returns `CodecError`.  None of these are
// retried internally: the codec performs no I/O, so a caller that sees
// `UnexpectedEndOfStream` from `Decompressor::finish` either supplies more
// data to a fresh instance or gives up.

use thiserror::Error;

/// Errors produced by the compressor, decompressor and their components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input ended mid-token or mid-header and no more input will arrive.
    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,

    /// A block tag, length field, table or back-reference is malformed.
    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    /// Bits read from the stream do not match any code in the active table.
    #[error("invalid prefix code")]
    InvalidCode,

    /// Stream header magic/version/window class not understood, or an
    /// option outside the supported range.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Encoder asked to emit a symbol with no code in the active table.
    #[error("symbol {0} has no code in the active table")]
    UnknownSymbol(u16),

    /// Operation attempted after the stream was finished.
    #[error("stream already finished")]
    StreamFinished,
}

impl CodecError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptStream(msg.into())
    }

    /// True for errors that mean the compressed data itself is bad.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::CorruptStream(_) | Self::InvalidCode)
    }
}

/// Result alias used throughout the codec.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            CodecError::UnexpectedEndOfStream.to_string(),
            "unexpected end of stream"
        );
        assert_eq!(
            CodecError::corrupt("reserved block type").to_string(),
            "corrupt stream: reserved block type"
        );
        assert_eq!(
            CodecError::UnknownSymbol(300).to_string(),
            "symbol 300 has no code in the active table"
        );
    }

    #[test]
    fn corruption_classification() {
        assert!(CodecError::InvalidCode.is_corruption());
        assert!(CodecError::corrupt("x").is_corruption());
        assert!(!CodecError::StreamFinished.is_corruption());
        assert!(!CodecError::UnexpectedEndOfStream.is_corruption());
    }
}
