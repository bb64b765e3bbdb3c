//! Search criteria: one pattern, or several combined with OR.

use serde::{Deserialize, Serialize};

use crate::crypto::Address;

use super::{CriteriaError, MatchPattern, Pattern};

/// What a search is looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// A single pattern.
    Single(Pattern),
    /// Matches when any pattern matches, tried in order.
    Any(Vec<Pattern>),
}

impl SearchCriteria {
    /// Criteria with a single pattern.
    pub fn single(pattern: MatchPattern) -> Self {
        SearchCriteria::Single(pattern.compile())
    }

    /// Criteria matching any of `patterns`.
    pub fn any(patterns: impl IntoIterator<Item = MatchPattern>) -> Self {
        SearchCriteria::Any(patterns.into_iter().map(|p| p.compile()).collect())
    }

    /// Parses criteria from the JSON shape used by the result file and UI:
    /// `{prefix, suffix, contains, caseInsensitive, multiplePatterns: [...]}`.
    pub fn from_json(json: &str) -> Result<Self, CriteriaError> {
        let spec: CriteriaSpec = serde_json::from_str(json)?;
        Ok(spec.into_criteria())
    }

    /// Returns the compiled patterns in evaluation order.
    pub fn patterns(&self) -> &[Pattern] {
        match self {
            SearchCriteria::Single(pattern) => std::slice::from_ref(pattern),
            SearchCriteria::Any(patterns) => patterns,
        }
    }

    /// Matches an address against the criteria.
    #[inline]
    pub fn matches(&self, address: &Address) -> bool {
        let hex = address.hex_prefixed_bytes();
        match self {
            SearchCriteria::Single(pattern) => pattern.matches_ascii(&hex),
            SearchCriteria::Any(patterns) => patterns.iter().any(|p| p.matches_ascii(&hex)),
        }
    }

    /// Matches a lowercase `0x` prefixed address string.
    #[inline]
    pub fn matches_hex(&self, address: &str) -> bool {
        match self {
            SearchCriteria::Single(pattern) => pattern.matches_hex(address),
            SearchCriteria::Any(patterns) => patterns.iter().any(|p| p.matches_hex(address)),
        }
    }

    /// Fails unless at least one pattern can match something.
    ///
    /// A degenerate all-empty pattern is harmless to the matcher (it never
    /// matches) but a search built from nothing else would spin forever.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        if self.patterns().iter().any(Pattern::is_valid) {
            Ok(())
        } else {
            Err(CriteriaError::NoValidPatterns)
        }
    }

    /// Expected number of attempts before the first match.
    pub fn estimated_difficulty(&self) -> u64 {
        let p: f64 = self.patterns().iter().map(Pattern::probability).sum();
        if p <= 0.0 {
            u64::MAX
        } else {
            (1.0 / p.min(1.0)).min(u64::MAX as f64) as u64
        }
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        match self.estimated_difficulty() {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }

    /// One line summary for status output.
    pub fn describe(&self) -> String {
        match self {
            SearchCriteria::Single(pattern) => pattern.source().describe(),
            SearchCriteria::Any(patterns) => format!("{} different patterns", patterns.len()),
        }
    }
}

/// Wire form of the criteria, as accepted from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CriteriaSpec {
    pub prefix: String,
    pub suffix: String,
    pub contains: String,
    pub case_insensitive: bool,
    pub multiple_patterns: Option<Vec<PatternSpec>>,
}

/// One entry of `multiplePatterns`; a missing `caseInsensitive` inherits the
/// criteria-level flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternSpec {
    pub prefix: String,
    pub suffix: String,
    pub contains: String,
    pub case_insensitive: Option<bool>,
}

impl PatternSpec {
    fn into_pattern(self, inherited_case_insensitive: bool) -> MatchPattern {
        MatchPattern {
            prefix: self.prefix,
            suffix: self.suffix,
            contains: self.contains,
            case_insensitive: self.case_insensitive.unwrap_or(inherited_case_insensitive),
        }
    }
}

impl CriteriaSpec {
    /// Converts the wire form. An empty `multiplePatterns` list falls back to
    /// the single-pattern fields.
    pub fn into_criteria(self) -> SearchCriteria {
        let case_insensitive = self.case_insensitive;
        match self.multiple_patterns {
            Some(patterns) if !patterns.is_empty() => SearchCriteria::any(
                patterns
                    .into_iter()
                    .map(|p| p.into_pattern(case_insensitive)),
            ),
            _ => SearchCriteria::single(MatchPattern {
                prefix: self.prefix,
                suffix: self.suffix,
                contains: self.contains,
                case_insensitive,
            }),
        }
    }
}

/// Parses a JSON pattern list, accepting either an array or a single object.
pub fn parse_pattern_list(json: &str) -> Result<Vec<MatchPattern>, CriteriaError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<MatchPattern>),
        One(MatchPattern),
    }

    let parsed: OneOrMany = serde_json::from_str(json)?;
    Ok(match parsed {
        OneOrMany::Many(patterns) => patterns,
        OneOrMany::One(pattern) => vec![pattern],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_address(hex_str: &str) -> Address {
        Address::from_hex(hex_str).unwrap()
    }

    #[test]
    fn test_any_is_or() {
        let criteria = SearchCriteria::any([MatchPattern::prefix("000"), MatchPattern::contains("cafe")]);
        assert!(criteria.matches(&make_address("000123456789abcdef0123456789abcdef012345")));
        assert!(criteria.matches(&make_address("123456789abcdef0cafe23456789abcdef012345")));
        assert!(!criteria.matches(&make_address("123456789abcdef0123456789abcdef012345678")));
    }

    #[test]
    fn test_contains_sees_the_0x_marker() {
        let addr = make_address("1111111111111111111111111111111111111111");
        for needle in ["0", "0x1"] {
            let criteria = SearchCriteria::single(MatchPattern::contains(needle));
            assert!(criteria.matches(&addr));
            assert!(criteria.matches_hex(&addr.to_hex_prefixed()));
        }
        let either = SearchCriteria::any([MatchPattern::prefix("2"), MatchPattern::contains("0x1")]);
        assert!(either.matches(&addr));
    }

    #[test]
    fn test_any_skips_empty_patterns() {
        let criteria = SearchCriteria::any([MatchPattern::default(), MatchPattern::suffix("45")]);
        assert!(criteria.validate().is_ok());
        assert!(criteria.matches(&make_address("000123456789abcdef0123456789abcdef012345")));
        assert!(!criteria.matches(&make_address("0001234567890000000000000000000000000000")));
    }

    #[test]
    fn test_empty_single_pattern_is_rejected_but_harmless() {
        let criteria = SearchCriteria::single(MatchPattern::default());
        assert!(matches!(criteria.validate(), Err(CriteriaError::NoValidPatterns)));
        assert!(!criteria.matches(&make_address("0000000000000000000000000000000000000000")));
        assert!(matches!(
            SearchCriteria::any(Vec::new()).validate(),
            Err(CriteriaError::NoValidPatterns)
        ));
    }

    #[test]
    fn test_from_json_single() {
        let criteria =
            SearchCriteria::from_json(r#"{"prefix":"DEAD","caseInsensitive":true}"#).unwrap();
        assert!(matches!(criteria, SearchCriteria::Single(_)));
        assert!(criteria.matches(&make_address("deadbeef00000000000000000000000000000000")));
    }

    #[test]
    fn test_from_json_multi_inherits_case_flag() {
        let criteria = SearchCriteria::from_json(
            r#"{"caseInsensitive":true,"multiplePatterns":[{"prefix":"ABC"},{"suffix":"FF","caseInsensitive":false}]}"#,
        )
        .unwrap();
        let patterns = criteria.patterns();
        assert_eq!(patterns.len(), 2);
        assert!(patterns[0].source().case_insensitive);
        assert!(!patterns[1].source().case_insensitive);
        assert!(criteria.matches(&make_address("abc0000000000000000000000000000000000000")));
        assert!(!criteria.matches(&make_address("00000000000000000000000000000000000000ff")));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            SearchCriteria::from_json("[not json"),
            Err(CriteriaError::Json(_))
        ));
    }

    #[test]
    fn test_parse_pattern_list() {
        assert_eq!(parse_pattern_list(r#"{"prefix":"00"}"#).unwrap().len(), 1);
        let list = parse_pattern_list(r#"[{"prefix":"000"},{"contains":"cafe"}]"#).unwrap();
        assert_eq!(list[1], MatchPattern::contains("cafe"));
    }

    #[test]
    fn test_difficulty() {
        let criteria = SearchCriteria::single(MatchPattern::prefix("dead"));
        assert_eq!(criteria.estimated_difficulty(), 65536); // 16^4
        let either = SearchCriteria::any([MatchPattern::prefix("dead"), MatchPattern::prefix("beef")]);
        assert_eq!(either.estimated_difficulty(), 32768);
        assert_eq!(
            SearchCriteria::single(MatchPattern::default()).estimated_difficulty(),
            u64::MAX
        );
    }

    #[test]
    fn test_describe() {
        let criteria = SearchCriteria::single(MatchPattern {
            prefix: "dead".into(),
            suffix: "beef".into(),
            ..MatchPattern::default()
        });
        assert_eq!(criteria.describe(), "prefix: dead, suffix: beef");
        let many = SearchCriteria::any([MatchPattern::prefix("0"), MatchPattern::prefix("1")]);
        assert_eq!(many.describe(), "2 different patterns");
    }
}
