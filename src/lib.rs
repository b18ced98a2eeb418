//! Currency Ledger Library
//! # Overview
//!
//! A concurrent multi-currency ledger engine: many threads open accounts,
//! move funds between currencies, and transfer between accounts while a
//! shared exchange-rate table is read and updated.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Currency, Amount, Account, Statement, errors)
//! - [`core`] - Concurrency-bearing components:
//!   - [`core::id_lock`] - per-account mutual exclusion with sorted multi-id
//!     acquisition (the deadlock-avoidance protocol)
//!   - [`core::rate_store`] - per-pair read/write locked rate table
//!   - [`core::ledger`] - the operation orchestrator
//! - [`persistence`] - file and in-memory account repositories
//! - [`workload`] - weighted random demo workload
//! - [`cli`] - CLI arguments parsing and the demo session runner
//!
//! # Concurrency model
//!
//! Operations on the same account are serialized by a per-id lock with
//! broadcast wake (no fairness guarantee); operations on different accounts
//! run in parallel. Rate lookups share a per-pair read lock; rate updates
//! take the pair's write lock without affecting other pairs. The one
//! invariant everything rests on: any operation locking several accounts
//! sorts the ids into one global total order before acquiring.

// Module declarations
pub mod cli;
pub mod core;
pub mod persistence;
pub mod types;
pub mod workload;

pub use crate::core::{AccountRepository, IdLockGuard, IdLockTable, LedgerService, RateStore, WaitStats};
pub use persistence::{FileAccountStore, InMemoryAccountStore};
pub use types::{Account, Amount, Currency, CurrencyPair, LedgerError, Statement, StorageError};
