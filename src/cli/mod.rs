//! CLI session runner
//!
//! Parses arguments, seeds the rate table, spawns the worker pool, lets the
//! random workload run for the configured duration, then shuts the pool
//! down and reports lock statistics.

mod args;

pub use args::{CliArgs, StorageType};

use crate::core::ledger::LedgerService;
use crate::core::rate_store::RateStore;
use crate::core::traits::AccountRepository;
use crate::persistence::{FileAccountStore, InMemoryAccountStore};
use crate::types::{Currency, CurrencyPair, LedgerError};
use crate::workload::{run_worker, ActionGenerator};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Parse command-line arguments using clap
///
/// On invalid arguments or `--help`, clap prints the message and exits the
/// process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Seed rates the demo starts from, quoted in both directions
const SEED_RATES: [(&str, &str, &str); 8] = [
    ("USD", "EUR", "0.95"),
    ("EUR", "USD", "1.05"),
    ("USD", "GBP", "0.78"),
    ("GBP", "USD", "1.27"),
    ("USD", "JPY", "147.30"),
    ("JPY", "USD", "0.0068"),
    ("EUR", "GBP", "0.84"),
    ("GBP", "EUR", "1.18"),
];

/// Run a full demo session with the parsed arguments
///
/// # Errors
///
/// Returns an error if the seed rate table is invalid (a bug in the
/// constants); workload errors never propagate here.
pub fn run(args: &CliArgs) -> Result<(), LedgerError> {
    let rates = Arc::new(seed_rates()?);
    match args.storage {
        StorageType::File => {
            let store = FileAccountStore::new(args.data_dir.clone());
            run_session(args, store, rates)
        }
        StorageType::Memory => run_session(args, InMemoryAccountStore::new(), rates),
    }
    Ok(())
}

fn seed_rates() -> Result<RateStore, LedgerError> {
    let mut rates = Vec::with_capacity(SEED_RATES.len());
    for (from, to, rate) in SEED_RATES {
        let pair = CurrencyPair::new(Currency::from_code(from)?, Currency::from_code(to)?);
        // A malformed constant becomes zero and fails rate validation below
        let rate = Decimal::from_str(rate).unwrap_or(Decimal::ZERO);
        rates.push((pair, rate));
    }
    RateStore::with_rates(rates)
}

fn run_session<R: AccountRepository + 'static>(
    args: &CliArgs,
    store: R,
    rates: Arc<RateStore>,
) {
    let ledger = Arc::new(LedgerService::new(store, Arc::clone(&rates)));
    let generator = Arc::new(ActionGenerator::new(rates.currencies(), args.max_accounts));
    let stop = Arc::new(AtomicBool::new(false));

    let workers = args.worker_count();
    let mut seed_rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(workers, duration_secs = args.duration_secs, "starting workload");

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let generator = Arc::clone(&generator);
            let stop = Arc::clone(&stop);
            let mut rng = StdRng::seed_from_u64(seed_rng.gen());
            thread::spawn(move || run_worker(&generator, &ledger, &mut rng, &stop))
        })
        .collect();

    thread::sleep(Duration::from_secs(args.duration_secs));

    info!("shutting down");
    stop.store(true, Ordering::Relaxed);
    ledger.cancel_waiters();
    let counts: Vec<u64> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap_or(0))
        .collect();
    info!("pool shut down");

    report(&ledger, &counts);
}

fn report<R: AccountRepository>(ledger: &LedgerService<R>, action_counts: &[u64]) {
    let lock = ledger.lock_stats();
    let write = ledger.rates().write_stats();
    let read = ledger.rates().read_stats();

    info!(
        "avg account wait time {:.3} ms",
        lock.avg_wait().as_secs_f64() * 1000.0
    );
    info!(
        "account lock was contended {} of {} times",
        lock.contended, lock.acquisitions
    );
    info!(
        "avg exchange rate write wait time {:.3} ms",
        write.avg_wait().as_secs_f64() * 1000.0
    );
    info!("write was locked by another thread {} times", write.contended);
    info!(
        "avg exchange rate read wait time {:.3} ms",
        read.avg_wait().as_secs_f64() * 1000.0
    );
    info!("read was locked by another thread {} times", read.contended);

    let avg_actions = if action_counts.is_empty() {
        0.0
    } else {
        action_counts.iter().sum::<u64>() as f64 / action_counts.len() as f64
    };
    info!("avg action count performed by a thread {avg_actions:.3}");
}
