//! The [`Account`] entity
//!
//! An account holds balances in one or more currencies under one owning id.
//! The funds map upholds a single invariant: a currency never appears with
//! a zero or negative balance. A balance that reaches exactly zero is
//! removed from the map instead of being stored. The map is private and
//! only mutated through [`Account::deposit`] and [`Account::withdraw`].
//!
//! Accounts are only ever mutated while the id's lock is held (enforced by
//! the service layer, not by this type).

use crate::types::amount::Amount;
use crate::types::currency::Currency;
use crate::types::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A ledger account: an id, a main currency, and per-currency balances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    id: Uuid,
    main_currency: Currency,
    funds: HashMap<Currency, Decimal>,
}

impl Account {
    /// Create an empty account with the given id and main currency
    pub fn new(id: Uuid, main_currency: Currency) -> Self {
        Account {
            id,
            main_currency,
            funds: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn main_currency(&self) -> Currency {
        self.main_currency
    }

    /// Add a strictly positive amount to the balance in its currency
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AmountNotPositive`] if the amount is zero or
    /// negative; the account is unchanged.
    pub fn deposit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        validate_positive(amount)?;
        self.funds
            .entry(amount.currency())
            .and_modify(|balance| *balance += amount.value())
            .or_insert_with(|| amount.value());
        Ok(())
    }

    /// Subtract a strictly positive amount from the balance in its currency
    ///
    /// A balance that reaches exactly zero is removed from the funds map.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AmountNotPositive`] for a zero or negative
    /// amount, and [`LedgerError::InsufficientFunds`] when the balance in
    /// that currency (or the whole entry) is smaller than the amount. The
    /// sufficiency check happens before any subtraction, so the account is
    /// unchanged on failure.
    pub fn withdraw(&mut self, amount: Amount) -> Result<(), LedgerError> {
        validate_positive(amount)?;
        let currency = amount.currency();
        let balance = self.funds.get(&currency).copied().ok_or_else(|| {
            LedgerError::insufficient_funds(self.id, currency, amount.value())
        })?;
        let remaining = balance - amount.value();
        if remaining < Decimal::ZERO {
            return Err(LedgerError::insufficient_funds(
                self.id,
                currency,
                amount.value(),
            ));
        }
        if remaining > Decimal::ZERO {
            self.funds.insert(currency, remaining);
        } else {
            self.funds.remove(&currency);
        }
        Ok(())
    }

    /// The balance held in one currency, if any
    pub fn balance(&self, currency: Currency) -> Option<Decimal> {
        self.funds.get(&currency).copied()
    }

    /// Snapshot of every (currency, balance) entry, sorted by currency code
    pub fn balances(&self) -> Vec<(Currency, Decimal)> {
        let mut entries: Vec<(Currency, Decimal)> =
            self.funds.iter().map(|(ccy, val)| (*ccy, *val)).collect();
        entries.sort_by_key(|(ccy, _)| *ccy);
        entries
    }

    /// Whether any currency balance is present
    pub fn has_funds(&self) -> bool {
        !self.funds.is_empty()
    }
}

fn validate_positive(amount: Amount) -> Result<(), LedgerError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(LedgerError::amount_not_positive(amount))
    }
}
