//! Random demo workload
//!
//! The harness side of the engine: a weighted random mix of ledger and rate
//! operations (`generator`) and the worker loop each pool thread runs until
//! shutdown.

pub mod generator;

pub use generator::{ActionGenerator, LedgerAction};

use crate::core::ledger::LedgerService;
use crate::core::traits::AccountRepository;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::error;

/// Run random actions until `stop` is set or the service is shut down
///
/// Domain errors are logged and the loop continues: they are an expected
/// part of the random mix. An infrastructure error (interrupted lock wait,
/// storage failure) ends the loop. Returns how many actions this worker
/// attempted.
pub fn run_worker<G: Rng, R: AccountRepository>(
    generator: &ActionGenerator,
    ledger: &LedgerService<R>,
    rng: &mut G,
    stop: &AtomicBool,
) -> u64 {
    let mut count = 0;
    while !stop.load(Ordering::Relaxed) {
        let action = generator.next_action(rng);
        count += 1;
        if let Err(err) = generator.perform(action, rng, ledger) {
            if err.is_infrastructure() {
                break;
            }
            error!("encountered error: {err}");
        }
    }
    count
}
