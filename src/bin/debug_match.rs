//! Explains why an address does or does not match a set of patterns.
//!
//! Usage:
//!   debug_match 0x1234...abcd '[{"prefix":"000"},{"contains":"cafe"}]'

use std::process;

use clap::Parser;

use vanity_eth::matcher::parse_pattern_list;
use vanity_eth::Address;

/// Check an address against vanity patterns
#[derive(Parser, Debug)]
#[command(name = "debug_match", version, about)]
struct Args {
    /// Ethereum address, with or without 0x
    address: Address,

    /// JSON pattern object or array of objects
    patterns: String,

    /// Compare pattern letters as given instead of lowercasing them
    #[arg(long, default_value = "false")]
    case_sensitive: bool,
}

fn main() {
    let args = Args::parse();

    let address = args.address;
    let patterns = match parse_pattern_list(&args.patterns) {
        Ok(patterns) => patterns,
        Err(e) => {
            eprintln!("Error parsing patterns: {}", e);
            eprintln!("Please provide a valid JSON array or object");
            process::exit(1);
        }
    };

    println!("Checking address: {}", address.to_hex_prefixed());
    println!("Pattern matches:");

    let mut any_matches = false;
    for (i, pattern) in patterns.into_iter().enumerate() {
        let pattern = if args.case_sensitive {
            pattern
        } else {
            pattern.case_insensitive(true)
        };
        let report = pattern.explain(&address);
        any_matches |= report.matched;

        if report.matched {
            println!("+ Pattern #{} MATCHES:", i + 1);
        } else if !pattern.is_valid() {
            println!("- Pattern #{} is empty and never matches", i + 1);
        } else {
            println!("- Pattern #{} DOES NOT MATCH:", i + 1);
        }
        print_field("Prefix", &pattern.prefix, report.prefix);
        print_field("Suffix", &pattern.suffix, report.suffix);
        print_field("Contains", &pattern.contains, report.contains);
        println!();
    }

    if any_matches {
        println!("ADDRESS MATCHES AT LEAST ONE PATTERN");
    } else {
        println!("ADDRESS DOES NOT MATCH ANY PATTERNS");
        process::exit(2);
    }
}

fn print_field(label: &str, value: &str, outcome: Option<bool>) {
    if let Some(matched) = outcome {
        let verdict = if matched { "matches" } else { "does not match" };
        println!("  - {}: {:?} ({})", label, value, verdict);
    }
}

