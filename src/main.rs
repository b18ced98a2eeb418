//! Currency ledger demo binary
//!
//! Runs a fixed pool of worker threads against the concurrent ledger engine
//! for a while, then reports lock contention statistics.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --workers 16 --duration-secs 10
//! cargo run -- --storage memory --seed 42
//! RUST_LOG=currency_ledger=debug cargo run
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid seed rates, etc.)

use currency_ledger::cli;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = cli::parse_args();
    if let Err(e) = cli::run(&args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
