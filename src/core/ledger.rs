//! Ledger operations
//!
//! [`LedgerService`] orchestrates every account operation: it validates
//! inputs, acquires the right locks in the right order, converts currencies
//! through the [`RateStore`], mutates the in-memory [`Account`], persists it
//! through the [`AccountRepository`], and releases locks on every exit path
//! (the guards are RAII).
//!
//! There is no long-lived per-account state machine; each operation is a
//! short critical section. Operations on the same account are totally
//! ordered by the id lock; operations on different accounts proceed
//! concurrently. The only dual-lock operation, [`transfer`], acquires both
//! ids through the sorted-order protocol of
//! [`IdLockTable::acquire_many`], which is what keeps opposite-direction
//! transfers deadlock-free.
//!
//! Known gap, kept on purpose: when a conversion or deposit fails after an
//! earlier withdrawal in the same operation has already been persisted
//! (`exchange`, `transfer`, `withdraw_all`), the withdrawal is not
//! compensated. The engine is best-effort between those two persists; see
//! DESIGN.md.
//!
//! [`transfer`]: LedgerService::transfer

use crate::core::id_lock::IdLockTable;
use crate::core::rate_store::RateStore;
use crate::core::stats::WaitStats;
use crate::core::traits::AccountRepository;
use crate::types::{Account, Amount, Currency, LedgerError, Statement};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// The ledger orchestrator, generic over its account store
pub struct LedgerService<R> {
    repository: R,
    rates: Arc<RateStore>,
    locks: IdLockTable,
}

impl<R: AccountRepository> LedgerService<R> {
    /// Create a service over a repository and a shared rate store
    pub fn new(repository: R, rates: Arc<RateStore>) -> Self {
        LedgerService {
            repository,
            rates,
            locks: IdLockTable::new(),
        }
    }

    /// The rate store this service converts through
    pub fn rates(&self) -> &RateStore {
        &self.rates
    }

    /// Wait-time statistics for the account lock table
    pub fn lock_stats(&self) -> WaitStats {
        self.locks.stats()
    }

    /// Cancel every thread currently blocked on an account lock
    ///
    /// Blocked and subsequent operations fail with
    /// [`LedgerError::Interrupted`]; operations already inside their
    /// critical section run to completion and release normally.
    pub fn cancel_waiters(&self) {
        self.locks.cancel_waiters();
    }

    /// Open a new account holding the given opening balance
    ///
    /// The balance's currency becomes the account's main currency. A zero
    /// balance opens an empty account; a positive one is deposited.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeBalance`] for a negative opening
    /// balance, before any lock is taken.
    pub fn open_account(&self, balance: Amount) -> Result<Uuid, LedgerError> {
        if balance.is_negative() {
            return Err(LedgerError::negative_balance(balance));
        }
        let id = Uuid::new_v4();
        let _guard = self.locks.acquire(id)?;
        debug!(account = %id, %balance, "opening account");
        let mut account = Account::new(id, balance.currency());
        self.repository.save(&account)?;
        if balance.is_positive() {
            self.deposit_into(&mut account, balance)?;
        }
        Ok(id)
    }

    /// Build an ordered balance snapshot of an account
    pub fn statement(&self, id: Uuid) -> Result<Statement, LedgerError> {
        let _guard = self.locks.acquire(id)?;
        debug!(account = %id, "building statement");
        let account = self.load(id)?;
        Ok(Statement::for_account(&account))
    }

    /// Deposit a strictly positive amount
    pub fn deposit(&self, id: Uuid, amount: Amount) -> Result<(), LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::amount_not_positive(amount));
        }
        let _guard = self.locks.acquire(id)?;
        let mut account = self.load(id)?;
        self.deposit_into(&mut account, amount)
    }

    /// Withdraw a strictly positive amount, returning what was withdrawn
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientFunds`] when the balance in the
    /// amount's currency is too small; the account is unchanged.
    pub fn withdraw(&self, id: Uuid, amount: Amount) -> Result<Amount, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::amount_not_positive(amount));
        }
        let _guard = self.locks.acquire(id)?;
        let mut account = self.load(id)?;
        self.withdraw_from(&mut account, amount)
    }

    /// Withdraw every balance, converted into the main currency and summed
    pub fn withdraw_all(&self, id: Uuid) -> Result<Amount, LedgerError> {
        let _guard = self.locks.acquire(id)?;
        let mut account = self.load(id)?;
        self.drain_funds(&mut account)
    }

    /// Exchange part of an account's funds into another currency
    ///
    /// A same-currency exchange is a no-op that returns the amount
    /// unchanged. Otherwise the amount is withdrawn, converted, and the
    /// converted amount deposited back, all under one lock acquisition.
    pub fn exchange(&self, id: Uuid, amount: Amount, target: Currency) -> Result<Amount, LedgerError> {
        if amount.currency() == target {
            warn!(account = %id, %target, "skipping exchange, source and target currencies are the same");
            return Ok(amount);
        }
        let _guard = self.locks.acquire(id)?;
        debug!(account = %id, %amount, %target, "exchanging");
        let mut account = self.load(id)?;
        let withdrawn = self.withdraw_from(&mut account, amount)?;
        let converted = self.rates.convert(withdrawn, target)?;
        self.deposit_into(&mut account, converted)?;
        Ok(converted)
    }

    /// Move funds between two accounts
    ///
    /// A self-transfer is a no-op that returns the amount unchanged. Both
    /// account locks are acquired in sorted id order regardless of
    /// direction, so concurrent opposite transfers cannot deadlock.
    ///
    /// If the source account holds the transfer currency the amount is
    /// withdrawn directly; otherwise the equivalent in the source's main
    /// currency is withdrawn instead. Whatever was withdrawn is converted
    /// into the transfer currency (when it differs) before being deposited
    /// into the target. Returns the originally requested amount.
    pub fn transfer(
        &self,
        source_id: Uuid,
        target_id: Uuid,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        if source_id == target_id {
            warn!(account = %source_id, "skipping transfer, source and target accounts are the same");
            return Ok(amount);
        }
        let _guards = self.locks.acquire_many(&[source_id, target_id])?;
        debug!(source = %source_id, target = %target_id, %amount, "transferring");

        let mut source = self.load(source_id)?;
        let mut target = self.load(target_id)?;
        let transfer_currency = amount.currency();

        let source_withdrawal = if source.balance(transfer_currency).is_some() {
            amount
        } else {
            self.rates.convert(amount, source.main_currency())?
        };
        let withdrawn = self.withdraw_from(&mut source, source_withdrawal)?;

        let deposit = self.rates.convert(withdrawn, transfer_currency)?;
        self.deposit_into(&mut target, deposit)?;
        Ok(amount)
    }

    /// Drain an account to zero and remove its record
    ///
    /// Every balance is withdrawn and converted into the main currency as
    /// in [`withdraw_all`](LedgerService::withdraw_all); the then-empty
    /// record is deleted. Returns the drained total.
    pub fn close_account(&self, id: Uuid) -> Result<Amount, LedgerError> {
        let _guard = self.locks.acquire(id)?;
        debug!(account = %id, "closing account");
        let mut account = self.load(id)?;
        let drained = self.drain_funds(&mut account)?;
        self.delete_record(&account)?;
        Ok(drained)
    }

    /// Delete an account record that holds no funds
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountNotEmpty`] while any currency balance
    /// remains.
    pub fn delete_account(&self, id: Uuid) -> Result<(), LedgerError> {
        let _guard = self.locks.acquire(id)?;
        let account = self.load(id)?;
        self.delete_record(&account)
    }

    fn load(&self, id: Uuid) -> Result<Account, LedgerError> {
        self.repository
            .get(id)?
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    fn deposit_into(&self, account: &mut Account, amount: Amount) -> Result<(), LedgerError> {
        debug!(account = %account.id(), %amount, "depositing");
        account.deposit(amount)?;
        self.repository.save(account)?;
        Ok(())
    }

    fn withdraw_from(&self, account: &mut Account, amount: Amount) -> Result<Amount, LedgerError> {
        debug!(account = %account.id(), %amount, "withdrawing");
        account.withdraw(amount)?;
        self.repository.save(account)?;
        Ok(amount)
    }

    /// Withdraw every balance in full, converting non-main currencies into
    /// the main currency and summing. Persists after each withdrawal.
    fn drain_funds(&self, account: &mut Account) -> Result<Amount, LedgerError> {
        debug!(account = %account.id(), "withdrawing all funds");
        let main = account.main_currency();
        let mut total = Decimal::ZERO;
        for (currency, balance) in account.balances() {
            let withdrawn = self.withdraw_from(account, Amount::new(currency, balance))?;
            let in_main = self.rates.convert(withdrawn, main)?;
            total += in_main.value();
        }
        Ok(Amount::new(main, total))
    }

    fn delete_record(&self, account: &Account) -> Result<(), LedgerError> {
        debug!(account = %account.id(), "deleting account");
        if account.has_funds() {
            return Err(LedgerError::account_not_empty(account.id()));
        }
        self.repository.delete(account)?;
        Ok(())
    }
}
