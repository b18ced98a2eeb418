//! Core engine module
//!
//! The concurrency-bearing components of the ledger:
//! - `id_lock` - per-account mutual exclusion with sorted multi-id acquisition
//! - `rate_store` - per-pair read/write locked exchange-rate table
//! - `ledger` - the operation orchestrator
//! - `stats` - lock-wait instrumentation shared by both lock components
//! - `traits` - the account repository seam

pub mod id_lock;
pub mod ledger;
pub mod rate_store;
pub mod stats;
pub mod traits;

pub use id_lock::{IdLockGuard, IdLockTable};
pub use ledger::LedgerService;
pub use rate_store::RateStore;
pub use stats::WaitStats;
pub use traits::AccountRepository;
