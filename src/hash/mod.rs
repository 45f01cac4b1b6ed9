// Hash-chain LZ77 match finding.
//
// This module provides:
// - Matcher profiles and level mapping
// - Head/prev hash chains over absolute stream positions
// - The greedy sliding-window match finder

pub mod config;
pub mod matching;
pub mod table;

pub use config::{MatcherConfig, config_for_level};
pub use matching::MatchFinder;
