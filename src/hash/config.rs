// Matcher profiles and match-finder limits.
//
// Each compression level maps to a profile that bounds how hard the match
// finder searches.

/// Shortest match worth a length/distance pair.
pub const MIN_MATCH: usize = 3;

/// Longest encodable match.
pub const MAX_MATCH: usize = 258;

/// Bytes of lookahead the finder wants before emitting a token outside of
/// `finish()`, so a maximal match is never cut short by a chunk boundary.
pub const MIN_LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1;

/// Bits of the 3-byte hash (head table has `1 << HASH_BITS` buckets).
pub const HASH_BITS: u32 = 15;

/// Highest accepted compression level.
pub const MAX_LEVEL: u32 = 9;

/// Default compression level.
pub const DEFAULT_LEVEL: u32 = 6;

/// Matcher profile configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherConfig {
    /// Name for display purposes.
    pub name: &'static str,
    /// Maximum candidates examined per position.  0 disables matching and
    /// forces stored blocks.
    pub max_chain: usize,
    /// Match length considered "long enough" to stop searching.
    pub nice_length: usize,
    /// Matches up to this length have every covered position inserted
    /// into the hash chains; longer ones only their first position.
    pub max_insert: usize,
}

impl MatcherConfig {
    /// Whether this profile writes stored blocks only.
    pub fn is_store(&self) -> bool {
        self.max_chain == 0
    }
}

/// Compression levels mapping to profiles.
///
/// - Level 0: store (no matching, stored blocks)
/// - Level 1: fastest
/// - Level 2: faster
/// - Levels 3-5: fast
/// - Level 6: default
/// - Levels 7-9: slow
pub fn config_for_level(level: u32) -> MatcherConfig {
    match level {
        0 => STORE,
        1 => FASTEST,
        2 => FASTER,
        3..=5 => FAST,
        6 => DEFAULT,
        _ => SLOW,
    }
}

// ---------------------------------------------------------------------------
// Profile definitions
// ---------------------------------------------------------------------------

pub const STORE: MatcherConfig = MatcherConfig {
    name: "store",
    max_chain: 0,
    nice_length: 0,
    max_insert: 0,
};

pub const FASTEST: MatcherConfig = MatcherConfig {
    name: "fastest",
    max_chain: 4,
    nice_length: 8,
    max_insert: 4,
};

pub const FASTER: MatcherConfig = MatcherConfig {
    name: "faster",
    max_chain: 8,
    nice_length: 16,
    max_insert: 5,
};

pub const FAST: MatcherConfig = MatcherConfig {
    name: "fast",
    max_chain: 32,
    nice_length: 32,
    max_insert: 16,
};

pub const DEFAULT: MatcherConfig = MatcherConfig {
    name: "default",
    max_chain: 128,
    nice_length: 128,
    max_insert: MAX_MATCH,
};

pub const SLOW: MatcherConfig = MatcherConfig {
    name: "slow",
    max_chain: 1024,
    nice_length: MAX_MATCH,
    max_insert: MAX_MATCH,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookahead_covers_a_maximal_match() {
        assert_eq!(MIN_LOOKAHEAD, 262);
        assert!(MIN_LOOKAHEAD > MAX_MATCH + MIN_MATCH);
    }

    #[test]
    fn searching_profiles_stay_within_match_limits() {
        for p in [FASTEST, FASTER, FAST, DEFAULT, SLOW] {
            assert!(p.max_chain > 0, "profile {} never searches", p.name);
            assert!(
                (MIN_MATCH..=MAX_MATCH).contains(&p.nice_length),
                "profile {} has bad nice_length",
                p.name
            );
            assert!(p.max_insert <= MAX_MATCH);
        }
        assert!(STORE.is_store());
    }

    #[test]
    fn default_profile_chain_is_128() {
        assert_eq!(config_for_level(DEFAULT_LEVEL).max_chain, 128);
    }

    #[test]
    fn level_mapping() {
        assert_eq!(config_for_level(0).name, "store");
        assert_eq!(config_for_level(1).name, "fastest");
        assert_eq!(config_for_level(2).name, "faster");
        assert_eq!(config_for_level(3).name, "fast");
        assert_eq!(config_for_level(5).name, "fast");
        assert_eq!(config_for_level(6).name, "default");
        assert_eq!(config_for_level(7).name, "slow");
        assert_eq!(config_for_level(9).name, "slow");
    }
}
