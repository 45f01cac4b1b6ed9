// Canonical prefix codes (the symbol coder).
//
// - `build`: length-limited code lengths from symbol frequencies
// - `code`: canonical code assignment, encoder tables, fixed tables
// - `decode`: bit-serial canonical decoder
//
// Only code lengths ever travel in the stream; both sides derive the
// actual codes with `canonical_codes`.

pub mod build;
pub mod code;
pub mod decode;

pub use build::build_lengths;
pub use code::{CodeTable, canonical_codes};
pub use decode::HuffmanDecoder;

/// Longest code allowed for literal/length and distance alphabets.
pub const MAX_CODE_LEN: u8 = 15;

/// Longest code allowed for the code-length alphabet.
pub const MAX_CL_CODE_LEN: u8 = 7;

/// Literal/length alphabet size including the two reserved symbols.
pub const NUM_LITLEN_SYMBOLS: usize = 288;

/// Distance alphabet size including the two reserved symbols.
pub const NUM_DIST_SYMBOLS: usize = 32;

/// Code-length alphabet size (lengths 0-15 plus repeat codes 16-18).
pub const NUM_CL_SYMBOLS: usize = 19;

/// Code lengths of the fixed literal/length table.
pub fn fixed_litlen_lengths() -> [u8; NUM_LITLEN_SYMBOLS] {
    let mut lengths = [0u8; NUM_LITLEN_SYMBOLS];
    for (sym, len) in lengths.iter_mut().enumerate() {
        *len = match sym {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
    }
    lengths
}

/// Code lengths of the fixed distance table.
pub fn fixed_dist_lengths() -> [u8; NUM_DIST_SYMBOLS] {
    [5u8; NUM_DIST_SYMBOLS]
}

/// Kraft sum of a set of code lengths, scaled by `2^MAX_CODE_LEN`.
///
/// Equals `1 << MAX_CODE_LEN` for a complete code and is smaller for an
/// incomplete one.  Anything larger is not a prefix code.
pub fn kraft_sum(lengths: &[u8]) -> u64 {
    lengths
        .iter()
        .filter(|&&l| l > 0)
        .map(|&l| 1u64 << (MAX_CODE_LEN - l.min(MAX_CODE_LEN)))
        .sum()
}
