//! Exchange-rate table with per-pair reader/writer locking
//!
//! [`RateStore`] maps a directional [`CurrencyPair`] to a positive decimal
//! rate. Every pair is guarded by its own `RwLock`, created lazily on first
//! touch and retained for the process lifetime, so readers of one pair share
//! access, a writer excludes only that pair, and contention on one pair
//! never blocks operations on a different pair.
//!
//! The pair-to-lock mapping itself is a concurrent map: the entry API gives
//! the atomic check-or-create that lazy lock creation needs when two threads
//! first touch the same pair simultaneously.
//!
//! Identity pairs (same currency on both sides) always convert at 1.0 and
//! never touch the lock table.

use crate::core::stats::{ContentionMeter, WaitStats};
use crate::types::{Amount, Currency, CurrencyPair, LedgerError};
use dashmap::DashMap;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

type PairLock = Arc<RwLock<Option<Decimal>>>;

/// Table of directional exchange rates, one reader/writer lock per pair
#[derive(Debug, Default)]
pub struct RateStore {
    pairs: DashMap<CurrencyPair, PairLock>,
    read_meter: ContentionMeter,
    write_meter: ContentionMeter,
}

impl RateStore {
    /// Create an empty store with no configured rates
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with initial rates
    ///
    /// Each entry goes through the same validation as
    /// [`set_rate`](RateStore::set_rate).
    pub fn with_rates<I>(rates: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (CurrencyPair, Decimal)>,
    {
        let store = Self::new();
        for (pair, rate) in rates {
            store.set_rate(pair, rate)?;
        }
        Ok(store)
    }

    /// Replace the rate stored for a pair
    ///
    /// Validation happens before any lock is taken: a rejected input never
    /// touches the lock table.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SameCurrencyRate`] when both sides of the
    /// pair are equal and [`LedgerError::RateNotPositive`] when the rate is
    /// zero or negative.
    pub fn set_rate(&self, pair: CurrencyPair, rate: Decimal) -> Result<(), LedgerError> {
        if pair.is_identity() {
            return Err(LedgerError::same_currency_rate(pair.from_currency()));
        }
        if rate <= Decimal::ZERO {
            return Err(LedgerError::rate_not_positive(rate));
        }
        let lock = self.pair_lock(pair);
        let mut slot = self.lock_write(pair, &lock);
        let previous = slot.replace(rate);
        debug!(%pair, ?previous, %rate, "exchange rate set");
        Ok(())
    }

    /// Look up the rate for a pair
    ///
    /// An identity pair returns exactly 1.0 without touching the lock
    /// table.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RateNotFound`] when no rate is configured.
    pub fn rate(&self, pair: CurrencyPair) -> Result<Decimal, LedgerError> {
        if pair.is_identity() {
            return Ok(Decimal::ONE);
        }
        let lock = self.pair_lock(pair);
        let slot = self.lock_read(pair, &lock);
        slot.ok_or_else(|| LedgerError::rate_not_found(pair))
    }

    /// Convert an amount into the target currency
    ///
    /// Identity conversions return the amount unchanged. Otherwise the
    /// `(amount.currency, target)` pair's shared lock is taken and the
    /// value is multiplied by the stored rate.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RateNotFound`] when no rate is configured for
    /// the pair.
    pub fn convert(&self, amount: Amount, target: Currency) -> Result<Amount, LedgerError> {
        if amount.currency() == target {
            return Ok(amount);
        }
        let pair = CurrencyPair::new(amount.currency(), target);
        let lock = self.pair_lock(pair);
        let slot = self.lock_read(pair, &lock);
        let rate = slot.ok_or_else(|| LedgerError::rate_not_found(pair))?;
        trace!(%pair, %rate, value = %amount.value(), "converting");
        Ok(Amount::new(target, amount.value() * rate))
    }

    /// Every currency that appears in a configured rate
    pub fn currencies(&self) -> Vec<Currency> {
        let mut set = BTreeSet::new();
        for entry in self.pairs.iter() {
            if entry.value().read().is_some() {
                set.insert(entry.key().from_currency());
                set.insert(entry.key().to_currency());
            }
        }
        set.into_iter().collect()
    }

    /// Read-side wait statistics
    pub fn read_stats(&self) -> WaitStats {
        self.read_meter.snapshot()
    }

    /// Write-side wait statistics
    pub fn write_stats(&self) -> WaitStats {
        self.write_meter.snapshot()
    }

    /// Number of pairs whose lock entry has been created
    #[cfg(test)]
    fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    fn pair_lock(&self, pair: CurrencyPair) -> PairLock {
        self.pairs
            .entry(pair)
            .or_insert_with(|| Arc::new(RwLock::new(None)))
            .clone()
    }

    fn lock_read<'a>(
        &self,
        pair: CurrencyPair,
        lock: &'a RwLock<Option<Decimal>>,
    ) -> parking_lot::RwLockReadGuard<'a, Option<Decimal>> {
        match lock.try_read() {
            Some(guard) => {
                self.read_meter.record_immediate();
                guard
            }
            None => {
                let start = Instant::now();
                let guard = lock.read();
                let waited = start.elapsed();
                self.read_meter.record_contended(waited);
                trace!(%pair, waited_ns = waited.as_nanos() as u64, "read lock acquired after wait");
                guard
            }
        }
    }

    fn lock_write<'a>(
        &self,
        pair: CurrencyPair,
        lock: &'a RwLock<Option<Decimal>>,
    ) -> parking_lot::RwLockWriteGuard<'a, Option<Decimal>> {
        match lock.try_write() {
            Some(guard) => {
                self.write_meter.record_immediate();
                guard
            }
            None => {
                let start = Instant::now();
                let guard = lock.write();
                let waited = start.elapsed();
                self.write_meter.record_contended(waited);
                trace!(%pair, waited_ns = waited.as_nanos() as u64, "write lock acquired after wait");
                guard
            }
        }
    }
}
