//! Ethereum Vanity Address Generator CLI
//!
//! Usage:
//!   vanity_eth -p dead                  # Find address starting with "dead"
//!   vanity_eth -s beef -n 5             # Find 5 addresses ending with "beef"
//!   vanity_eth -c cafe -i               # Contains "cafe", any case
//!   vanity_eth -m '[{"prefix":"000"},{"prefix":"abc"}]'
//!   vanity_eth --preset words           # Contains dead, beef or cafe

use std::process;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use vanity_eth::{
    Config, FoundRecord, JsonFileSink, SearchCoordinator, SearchEvent, SearchSummary,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }
    let criteria = match config.criteria() {
        Ok(criteria) => criteria,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let sink = if config.append {
        match JsonFileSink::open(&config.output) {
            Ok(sink) => sink,
            Err(e) => {
                eprintln!("Error loading existing addresses: {}", e);
                process::exit(1);
            }
        }
    } else {
        JsonFileSink::create(&config.output)
    };

    // Print startup info
    println!("Ethereum Vanity Address Generator");
    println!("==================================");
    for (i, pattern) in criteria.patterns().iter().enumerate() {
        println!("Pattern {}:  {}", i + 1, pattern.source().describe());
    }
    println!("Difficulty: {}", criteria.difficulty_description());
    println!("Target:     {} address(es)", config.num);
    println!("Output:     {}", config.output.display());
    if let Some(seed) = config.seed {
        println!("Seed:       {} (reproducible, do not use these keys)", seed);
    }

    let mut coordinator = SearchCoordinator::with_options(sink, config.search_options());
    let start = match coordinator.start(criteria, config.worker_count(), config.num) {
        Ok(start) => start,
        Err(e) => {
            eprintln!("Failed to start search: {}", e);
            process::exit(1);
        }
    };

    if let Some(stop) = coordinator.stop_handle() {
        if let Err(e) = ctrlc::set_handler(move || stop.stop()) {
            warn!(error = %e, "could not install Ctrl-C handler");
        }
    }

    for event in start.events.iter() {
        match event {
            SearchEvent::Started { worker_count, .. } => {
                println!("Workers:    {}", worker_count);
                println!();
                println!("Searching... (Press Ctrl+C to stop)\n");
            }
            SearchEvent::Progress {
                total_attempts,
                throughput,
            } => {
                println!(
                    "Checked {} addresses ({}/s)",
                    format_number(total_attempts),
                    format_number(throughput as u64)
                );
            }
            SearchEvent::Found {
                record,
                found_count,
                target_count,
            } => print_result(&record, found_count, target_count),
            SearchEvent::Completed {
                found_count,
                total_attempts,
            } => {
                println!(
                    "\nTarget reached! Found {} address(es) in {} attempts.",
                    found_count,
                    format_number(total_attempts)
                );
            }
            SearchEvent::Stopped { found_count } => {
                println!("\nStopped. Found {} address(es).", found_count);
            }
            SearchEvent::Error { message } => eprintln!("Error: {}", message),
        }
    }

    if let Some(summary) = coordinator.wait() {
        print_summary(&summary, &config);
    }
}

fn print_result(record: &FoundRecord, found_count: u64, target_count: u64) {
    if target_count > 0 {
        println!("=== Match #{}/{} ===", found_count, target_count);
    } else {
        println!("=== Match #{} ===", found_count);
    }
    println!("Address:     {}", record.address);
    println!("Private Key: {}", record.private_key);
    println!("Worker:      {}", record.worker_id);
    println!("Attempt:     {}", record.found_at_attempt);
    println!();
}

fn print_summary(summary: &SearchSummary, config: &Config) {
    println!("\n--- Final Statistics ---");
    println!("Total keys generated: {}", format_number(summary.total_attempts));
    println!("Total matches found:  {}", summary.found_count);
    println!("Time elapsed:         {:.2}s", summary.elapsed.as_secs_f64());
    println!(
        "Average speed:        {}/s",
        format_number(summary.keys_per_second() as u64)
    );
    if summary.found_count > 0 {
        println!("Results saved to:     {}", config.output.display());
    }
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
