//! Pattern matching for Ethereum addresses.
//!
//! Supports:
//! - Prefix: Match right after `0x`
//! - Suffix: Match at the end of the address
//! - Contains: Match anywhere in the address
//! - Any combination of the above, and OR across several patterns

mod criteria;
mod pattern;

pub use criteria::{parse_pattern_list, CriteriaSpec, PatternSpec, SearchCriteria};
pub use pattern::{MatchPattern, Pattern, PatternReport, ADDRESS_HEX_LEN};

#[derive(Debug, thiserror::Error)]
pub enum CriteriaError {
    #[error("Pattern has no prefix, suffix or contains value")]
    EmptyPattern,
    #[error("No valid patterns: at least one pattern needs a prefix, suffix or contains value")]
    NoValidPatterns,
    #[error("Invalid {field} {value:?}: only hex characters (0-9, a-f) are allowed")]
    NonHex { field: &'static str, value: String },
    #[error("Invalid {field}: {len} characters is longer than an address (40)")]
    TooLong { field: &'static str, len: usize },
    #[error("Malformed criteria JSON: {0}")]
    Json(#[from] serde_json::Error),
}
