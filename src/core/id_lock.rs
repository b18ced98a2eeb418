//! Per-account mutual exclusion
//!
//! [`IdLockTable`] grants exclusive, non-reentrant access keyed by account
//! id. It is a monitor: one mutex guards the set of held ids, and a condvar
//! broadcasts on every release. All waiters wake and re-check, and the next
//! holder is whichever thread re-checks first; there is no FIFO fairness
//! guarantee.
//!
//! Acquisition returns an [`IdLockGuard`]; dropping the guard is the
//! release. This makes acquisition scoped: the lock is released on every
//! exit path of an operation, including errors and panics.
//!
//! The table is not reentrant. A thread that acquires an id it already
//! holds deadlocks against itself, so no logical operation may lock the
//! same id twice. Operations that need several ids at once must go through
//! [`IdLockTable::acquire_many`], which sorts the ids into one global total
//! order before acquiring, the invariant that makes concurrent dual-id
//! operations deadlock-free.

use crate::core::stats::{ContentionMeter, WaitStats};
use crate::types::LedgerError;
use parking_lot::{Condvar, Mutex};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::trace;
use uuid::Uuid;

/// Table of held account ids with blocking acquisition
#[derive(Debug, Default)]
pub struct IdLockTable {
    held: Mutex<HashSet<Uuid>>,
    released: Condvar,
    cancelled: AtomicBool,
    meter: ContentionMeter,
}

impl IdLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `id` is free, then mark it held
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Interrupted`] if [`cancel_waiters`] was called
    /// before or while this thread was waiting. Nothing is marked held in
    /// that case.
    ///
    /// [`cancel_waiters`]: IdLockTable::cancel_waiters
    pub fn acquire(&self, id: Uuid) -> Result<IdLockGuard<'_>, LedgerError> {
        let start = Instant::now();
        let mut contended = false;
        {
            let mut held = self.held.lock();
            loop {
                if self.cancelled.load(Ordering::Relaxed) {
                    return Err(LedgerError::Interrupted);
                }
                if !held.contains(&id) {
                    break;
                }
                contended = true;
                self.released.wait(&mut held);
            }
            held.insert(id);
        }
        if contended {
            let waited = start.elapsed();
            self.meter.record_contended(waited);
            trace!(account = %id, waited_ns = waited.as_nanos() as u64, "account lock acquired after wait");
        } else {
            self.meter.record_immediate();
            trace!(account = %id, "account lock acquired");
        }
        Ok(IdLockGuard { table: self, id })
    }

    /// Acquire several ids at once, in canonical order
    ///
    /// The ids are sorted (and deduplicated) before acquisition, so every
    /// caller locking the same set of accounts acquires them in the same
    /// order regardless of which account is logically "source" or "target".
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Interrupted`] if cancelled while waiting for
    /// any of the ids; guards already obtained are dropped (released) before
    /// the error propagates.
    pub fn acquire_many(&self, ids: &[Uuid]) -> Result<Vec<IdLockGuard<'_>>, LedgerError> {
        let mut order: Vec<Uuid> = ids.to_vec();
        order.sort_unstable();
        order.dedup();

        let mut guards = Vec::with_capacity(order.len());
        for id in order {
            // An early Err drops `guards`, releasing everything acquired so far
            guards.push(self.acquire(id)?);
        }
        Ok(guards)
    }

    /// Cancel every current and future waiter
    ///
    /// Threads blocked in [`acquire`](IdLockTable::acquire) wake and return
    /// [`LedgerError::Interrupted`]; later acquisition attempts fail the
    /// same way. Guards already handed out stay valid and still release
    /// normally on drop.
    pub fn cancel_waiters(&self) {
        let _held = self.held.lock();
        self.cancelled.store(true, Ordering::Relaxed);
        self.released.notify_all();
    }

    /// Wait-time statistics for this table
    pub fn stats(&self) -> WaitStats {
        self.meter.snapshot()
    }

    fn release(&self, id: Uuid) {
        let mut held = self.held.lock();
        if held.remove(&id) {
            trace!(account = %id, "account lock released");
            // Broadcast: every waiter re-checks, whichever wins the mutex
            // race first becomes the next holder
            self.released.notify_all();
        }
    }
}

/// Exclusive hold on one account id; dropping it releases the id
#[derive(Debug)]
pub struct IdLockGuard<'a> {
    table: &'a IdLockTable,
    id: Uuid,
}

impl IdLockGuard<'_> {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for IdLockGuard<'_> {
    fn drop(&mut self) {
        self.table.release(self.id);
    }
}
