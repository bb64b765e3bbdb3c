//! Runtime configuration for the vanity address generator.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::crypto::RandomSource;
use crate::matcher::{parse_pattern_list, CriteriaError, MatchPattern, SearchCriteria};
use crate::worker::SearchOptions;

/// Generate Ethereum vanity addresses locally
#[derive(Parser, Debug, Clone)]
#[command(name = "vanity_eth", author, version, about, long_about = None)]
pub struct Config {
    /// Address starts with this prefix (after 0x)
    #[arg(short, long, default_value = "")]
    pub prefix: String,

    /// Address ends with this suffix
    #[arg(short, long, default_value = "")]
    pub suffix: String,

    /// Address contains this string
    #[arg(short, long, default_value = "")]
    pub contains: String,

    /// JSON array of patterns to match any of, e.g. '[{"prefix":"000"},{"prefix":"abc"}]'
    #[arg(short, long)]
    pub multi_pattern: Option<String>,

    /// Use a common pattern instead of -p/-s/-c/-m (always case insensitive)
    #[arg(long, value_enum, conflicts_with_all = ["prefix", "suffix", "contains", "multi_pattern"])]
    pub preset: Option<Preset>,

    /// Case insensitive matching
    #[arg(short = 'i', long, default_value = "false")]
    pub case_insensitive: bool,

    /// Number of addresses to generate (0 = run until stopped)
    #[arg(short, long, default_value = "1")]
    pub num: u64,

    /// Output file path
    #[arg(short, long, default_value = "found_addresses.json")]
    pub output: PathBuf,

    /// Keep records already in the output file instead of starting fresh
    #[arg(short, long, default_value = "false")]
    pub append: bool,

    /// Number of worker threads (default: min(4, CPU cores))
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Progress display interval in seconds
    #[arg(short, long, default_value = "1")]
    pub display_interval: u64,

    /// Attempts per worker between progress reports
    #[arg(short, long, default_value = "10000")]
    pub batch_size: u64,

    /// Deterministic RNG seed. Reproducible, so never use the keys it finds.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Config {
    /// Returns the number of workers, defaulting to min(4, CPU count)
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| num_cpus::get().min(4))
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count() == 0 {
            return Err(ConfigError::InvalidValue("--workers must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue("--batch-size must be at least 1".into()));
        }
        for pattern in self.patterns()? {
            pattern.validate()?;
        }
        Ok(())
    }

    /// Returns the patterns given on the command line, with the
    /// `--case-insensitive` flag applied.
    ///
    /// `--multi-pattern` wins over the single pattern flags. Inside it,
    /// empty entries are dropped so one valid entry is enough.
    pub fn patterns(&self) -> Result<Vec<MatchPattern>, ConfigError> {
        if let Some(preset) = self.preset {
            return Ok(preset.patterns());
        }
        match &self.multi_pattern {
            Some(json) => {
                let patterns: Vec<MatchPattern> = parse_pattern_list(json)?
                    .into_iter()
                    .filter(MatchPattern::is_valid)
                    .map(|p| {
                        let case_insensitive = p.case_insensitive || self.case_insensitive;
                        p.case_insensitive(case_insensitive)
                    })
                    .collect();
                if patterns.is_empty() {
                    return Err(CriteriaError::NoValidPatterns.into());
                }
                Ok(patterns)
            }
            None => Ok(vec![MatchPattern {
                prefix: self.prefix.clone(),
                suffix: self.suffix.clone(),
                contains: self.contains.clone(),
                case_insensitive: self.case_insensitive,
            }]),
        }
    }

    /// Builds the search criteria.
    pub fn criteria(&self) -> Result<SearchCriteria, ConfigError> {
        let mut patterns = self.patterns()?;
        let criteria = if patterns.len() == 1 && self.multi_pattern.is_none() {
            SearchCriteria::single(patterns.remove(0))
        } else {
            SearchCriteria::any(patterns)
        };
        criteria.validate()?;
        Ok(criteria)
    }

    /// Returns the search tunables.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            batch_size: self.batch_size,
            report_interval: Duration::from_secs(self.display_interval),
            random: self
                .seed
                .map_or(RandomSource::Entropy, RandomSource::Seeded),
            ..SearchOptions::default()
        }
    }
}

/// Frequently requested patterns.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Starts with 000
    Zeros,
    /// Ends with 000
    TrailingZeros,
    /// Contains dead
    Dead,
    /// Contains beef
    Beef,
    /// Contains cafe
    Cafe,
    /// Contains 1337
    Leet,
    /// Starts with 000 or abc
    ZerosOrAbc,
    /// Contains dead, beef or cafe
    Words,
}

impl Preset {
    /// The preset's patterns, all case insensitive.
    pub fn patterns(self) -> Vec<MatchPattern> {
        let patterns = match self {
            Preset::Zeros => vec![MatchPattern::prefix("000")],
            Preset::TrailingZeros => vec![MatchPattern::suffix("000")],
            Preset::Dead => vec![MatchPattern::contains("dead")],
            Preset::Beef => vec![MatchPattern::contains("beef")],
            Preset::Cafe => vec![MatchPattern::contains("cafe")],
            Preset::Leet => vec![MatchPattern::contains("1337")],
            Preset::ZerosOrAbc => vec![MatchPattern::prefix("000"), MatchPattern::prefix("abc")],
            Preset::Words => ["dead", "beef", "cafe"]
                .into_iter()
                .map(MatchPattern::contains)
                .collect(),
        };
        patterns
            .into_iter()
            .map(|p| p.case_insensitive(true))
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] CriteriaError),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
