//! Pattern matching implementation.

use serde::{Deserialize, Serialize};

use crate::crypto::Address;

use super::CriteriaError;

/// Number of hex characters in an address.
pub const ADDRESS_HEX_LEN: usize = 40;

/// A user supplied prefix/suffix/contains constraint.
///
/// Empty fields are wildcards. A pattern with every field empty is invalid
/// and never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchPattern {
    /// Characters immediately after `0x`
    pub prefix: String,
    /// Characters at the end of the address
    pub suffix: String,
    /// Characters anywhere in the address
    pub contains: String,
    /// Fold pattern fields to lowercase before matching
    pub case_insensitive: bool,
}

impl MatchPattern {
    /// Pattern matching addresses that start with `prefix`.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Pattern matching addresses that end with `suffix`.
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            ..Self::default()
        }
    }

    /// Pattern matching addresses containing `contains`.
    pub fn contains(contains: impl Into<String>) -> Self {
        Self {
            contains: contains.into(),
            ..Self::default()
        }
    }

    /// Sets the case folding flag.
    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Returns true when at least one field is set.
    pub fn is_valid(&self) -> bool {
        !(self.prefix.is_empty() && self.suffix.is_empty() && self.contains.is_empty())
    }

    /// Strict input validation for user facing surfaces.
    ///
    /// The matcher itself tolerates anything; this rejects input that could
    /// never produce a match so the user is told up front.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        if !self.is_valid() {
            return Err(CriteriaError::EmptyPattern);
        }
        for (field, value) in [
            ("prefix", self.prefix.as_str()),
            ("suffix", self.suffix.as_str()),
            // `contains` may reach into the `0x` marker
            ("contains", strip_marker(&self.contains)),
        ] {
            if !value.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(CriteriaError::NonHex {
                    field,
                    value: value.to_owned(),
                });
            }
            if value.len() > ADDRESS_HEX_LEN {
                return Err(CriteriaError::TooLong {
                    field,
                    len: value.len(),
                });
            }
        }
        if self.prefix.len() + self.suffix.len() > ADDRESS_HEX_LEN {
            return Err(CriteriaError::TooLong {
                field: "prefix+suffix",
                len: self.prefix.len() + self.suffix.len(),
            });
        }
        Ok(())
    }

    /// Compiles the pattern for repeated matching.
    pub fn compile(&self) -> Pattern {
        Pattern::new(self.clone())
    }

    /// Matches a single address. Compiles on every call; use [`Pattern`] in loops.
    pub fn matches(&self, address: &Address) -> bool {
        self.compile().matches(address)
    }

    /// Per-field breakdown of how `address` fares against this pattern.
    pub fn explain(&self, address: &Address) -> PatternReport {
        self.compile().explain(address)
    }

    /// Short description such as `prefix: dead, suffix: beef`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.prefix.is_empty() {
            parts.push(format!("prefix: {}", self.prefix));
        }
        if !self.suffix.is_empty() {
            parts.push(format!("suffix: {}", self.suffix));
        }
        if !self.contains.is_empty() {
            parts.push(format!("contains: {}", self.contains));
        }
        if parts.is_empty() {
            return "(empty)".into();
        }
        if self.case_insensitive {
            parts.push("case insensitive".into());
        }
        parts.join(", ")
    }
}

/// Outcome of each non-empty field of a pattern; `None` marks a wildcard field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternReport {
    pub prefix: Option<bool>,
    pub suffix: Option<bool>,
    pub contains: Option<bool>,
    pub matched: bool,
}

/// A compiled pattern for efficient matching.
///
/// Addresses are always lowercase, so case folding only ever touches the
/// pattern fields, once, here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: MatchPattern,
    prefix: String,
    suffix: String,
    contains: String,
    valid: bool,
}

impl Pattern {
    /// Creates a compiled pattern.
    pub fn new(source: MatchPattern) -> Self {
        let fold = |s: &str| {
            if source.case_insensitive {
                s.to_ascii_lowercase()
            } else {
                s.to_owned()
            }
        };

        Self {
            prefix: fold(&source.prefix),
            suffix: fold(&source.suffix),
            contains: fold(&source.contains),
            valid: source.is_valid(),
            source,
        }
    }

    /// Returns the pattern as supplied by the user.
    pub fn source(&self) -> &MatchPattern {
        &self.source
    }

    /// Returns false for the degenerate all-empty pattern.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Matches an address against this pattern.
    #[inline]
    pub fn matches(&self, address: &Address) -> bool {
        self.matches_ascii(&address.hex_prefixed_bytes())
    }

    /// Matches a lowercase `0x` prefixed address string.
    #[inline]
    pub fn matches_hex(&self, address: &str) -> bool {
        self.matches_ascii(address.as_bytes())
    }

    /// `prefix` is anchored after `0x` and `suffix` at the end; `contains`
    /// scans the whole string, marker included. Cheapest check first.
    #[inline]
    pub(crate) fn matches_ascii(&self, address: &[u8]) -> bool {
        if !self.valid {
            return false;
        }
        let digits = address.strip_prefix(b"0x").unwrap_or(address);

        if !self.prefix.is_empty() && !digits.starts_with(self.prefix.as_bytes()) {
            return false;
        }
        if !self.suffix.is_empty() && !digits.ends_with(self.suffix.as_bytes()) {
            return false;
        }
        if !self.contains.is_empty() && !contains_bytes(address, self.contains.as_bytes()) {
            return false;
        }
        true
    }

    /// Evaluates every field without short-circuiting.
    pub fn explain(&self, address: &Address) -> PatternReport {
        let full = address.hex_prefixed_bytes();
        let digits = &full[2..];
        let check = |field: &str, test: &dyn Fn(&[u8]) -> bool| {
            (!field.is_empty()).then(|| test(field.as_bytes()))
        };

        PatternReport {
            prefix: check(self.prefix.as_str(), &|f: &[u8]| digits.starts_with(f)),
            suffix: check(self.suffix.as_str(), &|f: &[u8]| digits.ends_with(f)),
            contains: check(self.contains.as_str(), &|f: &[u8]| contains_bytes(&full, f)),
            matched: self.matches_ascii(&full),
        }
    }

    /// Probability that a uniformly random address satisfies this pattern.
    ///
    /// Approximates `contains` as independent placements; exact enough for
    /// a difficulty estimate.
    pub fn probability(&self) -> f64 {
        if !self.valid {
            return 0.0;
        }
        let anchored = self.prefix.len() + self.suffix.len();
        if anchored > ADDRESS_HEX_LEN || self.contains.len() > ADDRESS_HEX_LEN {
            return 0.0;
        }
        let mut p = 16f64.powi(-(anchored as i32));
        if !self.contains.is_empty() {
            p *= self.contains_probability();
        }
        if !self.source.case_insensitive && self.has_uppercase() {
            return 0.0;
        }
        p
    }

    fn contains_probability(&self) -> f64 {
        let needle = self.contains.as_str();
        // "0" always hits the marker; "0x..." and "x..." pin the first digits.
        if needle == "0" {
            return 1.0;
        }
        let pinned = needle.strip_prefix("0x").or_else(|| needle.strip_prefix('x'));
        if let Some(rest) = pinned {
            return 16f64.powi(-(rest.len() as i32));
        }
        let positions = (ADDRESS_HEX_LEN + 1 - needle.len()) as f64;
        (positions * 16f64.powi(-(needle.len() as i32))).min(1.0)
    }

    fn has_uppercase(&self) -> bool {
        [&self.prefix, &self.suffix, &self.contains]
            .iter()
            .any(|s| s.chars().any(|c| c.is_ascii_uppercase()))
    }
}

/// Drops a leading `0x` or `x` (any case), leaving the hex digits.
fn strip_marker(s: &str) -> &str {
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    s.strip_prefix(['x', 'X']).unwrap_or(s)
}

#[inline]
fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_address(hex_str: &str) -> Address {
        Address::from_hex(hex_str).unwrap()
    }

    #[test]
    fn test_prefix_match() {
        let pattern = MatchPattern::prefix("dead");
        let addr = make_address("deadbeef00000000000000000000000000000000");
        assert!(pattern.matches(&addr));
    }

    #[test]
    fn test_prefix_no_match() {
        let pattern = MatchPattern::prefix("dead");
        let addr = make_address("beefdeadbeef0000000000000000000000000000");
        assert!(!pattern.matches(&addr));
    }

    #[test]
    fn test_prefix_case_handling() {
        let addr = make_address("deadbeef00000000000000000000000000000000");
        assert!(!MatchPattern::prefix("DEAD").matches(&addr));
        assert!(MatchPattern::prefix("DEAD").case_insensitive(true).matches(&addr));
    }

    #[test]
    fn test_suffix_match() {
        let pattern = MatchPattern::suffix("beef");
        let addr = make_address("0000000000000000000000000000000000debeef");
        assert!(pattern.matches(&addr));
        assert!(!MatchPattern::suffix("BEEF").matches(&addr));
        assert!(MatchPattern::suffix("BeEf").case_insensitive(true).matches(&addr));
    }

    #[test]
    fn test_contains_match() {
        let pattern = MatchPattern::contains("cafe");
        // 20 bytes = 40 hex chars: 18 zeros + cafe + 18 zeros = 36 + 4 = 40
        let addr = make_address("000000000000000000cafe000000000000000000");
        assert!(pattern.matches(&addr));
    }

    #[test]
    fn test_contains_spans_0x_marker() {
        let addr = make_address("1111111111111111111111111111111111111111");
        assert!(MatchPattern::contains("0").matches(&addr));
        assert!(MatchPattern::contains("0x1").matches(&addr));
        assert!(MatchPattern::contains("x11").matches(&addr));
        assert!(!MatchPattern::contains("0x2").matches(&addr));
        assert!(MatchPattern::contains("0X1").case_insensitive(true).matches(&addr));

        let report = MatchPattern::contains("0x1").explain(&addr);
        assert_eq!(report.contains, Some(true));
        assert!(report.matched);

        // The marker is not part of the anchored fields.
        assert!(!MatchPattern::prefix("0x").matches(&addr));
        assert!(MatchPattern::contains("0x1").validate().is_ok());
        assert!(MatchPattern::prefix("0x1").validate().is_err());
    }

    #[test]
    fn test_all_fields_must_hold() {
        let pattern = MatchPattern {
            prefix: "dead".into(),
            suffix: "0000".into(),
            contains: "beef".into(),
            case_insensitive: false,
        };
        assert!(pattern.matches(&make_address("deadbeef00000000000000000000000000000000")));
        assert!(!pattern.matches(&make_address("dead000000000000000000000000000000000000")));
        assert!(!pattern.matches(&make_address("deadbeef00000000000000000000000000000001")));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let pattern = MatchPattern::default();
        assert!(!pattern.is_valid());
        for hex in [
            "0000000000000000000000000000000000000000",
            "deadbeef00000000000000000000000000000000",
            "ffffffffffffffffffffffffffffffffffffffff",
        ] {
            assert!(!pattern.matches(&make_address(hex)));
        }
        assert!(!MatchPattern::default().case_insensitive(true).compile().matches_hex("0x"));
    }

    #[test]
    fn test_overlong_pattern_never_matches() {
        let addr = make_address("0000000000000000000000000000000000000000");
        assert!(!MatchPattern::prefix("0".repeat(41)).matches(&addr));
        assert!(MatchPattern::prefix("0".repeat(41)).validate().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(MatchPattern::prefix("dead").validate().is_ok());
        assert!(matches!(
            MatchPattern::default().validate(),
            Err(CriteriaError::EmptyPattern)
        ));
        assert!(matches!(
            MatchPattern::contains("xyz").validate(),
            Err(CriteriaError::NonHex { field: "contains", .. })
        ));
        let pattern = MatchPattern {
            prefix: "a".repeat(30),
            suffix: "b".repeat(11),
            ..MatchPattern::default()
        };
        assert!(pattern.validate().is_err());
    }

    #[test]
    fn test_explain_reports_each_field() {
        let pattern = MatchPattern {
            prefix: "dead".into(),
            contains: "cafe".into(),
            ..MatchPattern::default()
        };
        let report = pattern.explain(&make_address("deadbeef00000000000000000000000000000000"));
        assert_eq!(report.prefix, Some(true));
        assert_eq!(report.suffix, None);
        assert_eq!(report.contains, Some(false));
        assert!(!report.matched);
    }

    #[test]
    fn test_probability() {
        let p = MatchPattern::prefix("dead").compile().probability();
        assert!((p - 1.0 / 65536.0).abs() < 1e-12);
        assert_eq!(MatchPattern::prefix("DEAD").compile().probability(), 0.0);
        assert_eq!(MatchPattern::default().compile().probability(), 0.0);
        assert_eq!(MatchPattern::contains("0").compile().probability(), 1.0);
        let pinned = MatchPattern::contains("0xab").compile().probability();
        assert!((pinned - 1.0 / 256.0).abs() < 1e-12);
    }
}
