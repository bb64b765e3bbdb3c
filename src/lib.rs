//! # vanity_eth
//!
//! Parallel Ethereum vanity address search.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation, address derivation and checksums
//! - `matcher`: Patterns and search criteria
//! - `worker`: Workers, worker pool and the search coordinator
//! - `sink`: Where found records go
//! - `config`: Command line configuration

pub mod config;
pub mod crypto;
pub mod matcher;
pub mod sink;
pub mod worker;

pub use config::{Config, ConfigError, Preset};
pub use crypto::{Address, Keypair, KeypairGenerator, RandomSource};
pub use matcher::{CriteriaError, MatchPattern, Pattern, SearchCriteria};
pub use sink::{JsonFileSink, MemorySink, ResultSink, SinkError};
pub use worker::{
    FoundRecord, SearchCoordinator, SearchError, SearchEvent, SearchOptions, SearchOutcome,
    SearchSummary, StopHandle,
};
