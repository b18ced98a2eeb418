//! Random action generation
//!
//! Drives the demo workload: each call picks one weighted-random ledger or
//! rate operation and executes it against the service with random inputs.
//! The mix deliberately produces invalid inputs too (zero and negative
//! amounts, identity rate pairs, transfers without a configured rate), so
//! the error paths stay exercised under concurrency.
//!
//! The generator shares one capped account list across all workers; ids are
//! added when an open succeeds and removed when a close or delete succeeds.

use crate::core::ledger::LedgerService;
use crate::core::traits::AccountRepository;
use crate::types::{Amount, Currency, CurrencyPair, LedgerError};
use parking_lot::Mutex;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

/// One step of the random workload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAction {
    SetRate,
    ReadRate,
    OpenAccount,
    DeleteAccount,
    CloseAccount,
    Deposit,
    Withdraw,
    WithdrawAll,
    Exchange,
    Transfer,
}

/// (action, relative weight) mix of the workload
const ACTION_WEIGHTS: [(LedgerAction, u32); 10] = [
    (LedgerAction::SetRate, 30),
    (LedgerAction::ReadRate, 30),
    (LedgerAction::OpenAccount, 15),
    (LedgerAction::DeleteAccount, 5),
    (LedgerAction::CloseAccount, 7),
    (LedgerAction::Deposit, 30),
    (LedgerAction::Withdraw, 20),
    (LedgerAction::WithdrawAll, 10),
    (LedgerAction::Exchange, 45),
    (LedgerAction::Transfer, 45),
];

/// Weighted-random source of ledger operations over a shared account pool
pub struct ActionGenerator {
    currencies: Vec<Currency>,
    accounts: Mutex<Vec<Uuid>>,
    max_accounts: usize,
    distribution: WeightedIndex<u32>,
}

impl ActionGenerator {
    /// Create a generator drawing currencies from `currencies` and keeping
    /// at most `max_accounts` accounts open at a time
    ///
    /// `currencies` must be non-empty (it comes from the seeded rate
    /// table).
    pub fn new(currencies: Vec<Currency>, max_accounts: usize) -> Self {
        debug_assert!(!currencies.is_empty());
        let distribution = WeightedIndex::new(ACTION_WEIGHTS.iter().map(|(_, weight)| *weight))
            .expect("static weights are non-zero");
        ActionGenerator {
            currencies,
            accounts: Mutex::new(Vec::new()),
            max_accounts,
            distribution,
        }
    }

    /// Pick the next action of the mix
    pub fn next_action<G: Rng>(&self, rng: &mut G) -> LedgerAction {
        ACTION_WEIGHTS[self.distribution.sample(rng)].0
    }

    /// Execute one action against the service
    ///
    /// Domain errors propagate to the caller (the worker loop logs them and
    /// carries on); they are an expected part of the random mix.
    pub fn perform<G: Rng, R: AccountRepository>(
        &self,
        action: LedgerAction,
        rng: &mut G,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        match action {
            LedgerAction::SetRate => self.change_rate(rng, ledger),
            LedgerAction::ReadRate => self.read_rate(rng, ledger),
            LedgerAction::OpenAccount => self.open_account(rng, ledger),
            LedgerAction::DeleteAccount => self.delete_account(rng, ledger),
            LedgerAction::CloseAccount => self.close_account(rng, ledger),
            LedgerAction::Deposit => self.deposit(rng, ledger),
            LedgerAction::Withdraw => self.withdraw(rng, ledger),
            LedgerAction::WithdrawAll => self.withdraw_all(rng, ledger),
            LedgerAction::Exchange => self.exchange(rng, ledger),
            LedgerAction::Transfer => self.transfer(rng, ledger),
        }
    }

    fn change_rate<G: Rng, R: AccountRepository>(
        &self,
        rng: &mut G,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        let pair = CurrencyPair::new(self.random_currency(rng), self.random_currency(rng));
        let rate = ledger.rates().rate(pair)?;
        // Nudge by up to ±1%
        let basis_points = Decimal::new(rng.gen_range(-100..=100), 4);
        let nudged = rate + rate * basis_points;
        info!(%pair, %nudged, "setting exchange rate");
        ledger.rates().set_rate(pair, nudged)
    }

    fn read_rate<G: Rng, R: AccountRepository>(
        &self,
        rng: &mut G,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        let pair = CurrencyPair::new(self.random_currency(rng), self.random_currency(rng));
        let rate = ledger.rates().rate(pair)?;
        info!(%pair, %rate, "read exchange rate");
        Ok(())
    }

    fn open_account<G: Rng, R: AccountRepository>(
        &self,
        rng: &mut G,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        if self.accounts.lock().len() >= self.max_accounts {
            warn!("can't open new account: account limit reached");
            return Ok(());
        }
        let balance = self.random_amount(rng);
        let id = ledger.open_account(balance)?;
        self.accounts.lock().push(id);
        info!(account = %id, %balance, "opened account");
        self.log_statement(id, ledger)
    }

    fn delete_account<G: Rng, R: AccountRepository>(
        &self,
        rng: &mut G,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        let Some(id) = self.random_account(rng) else {
            warn!("can't delete random account: not enough accounts");
            return Ok(());
        };
        self.log_statement(id, ledger)?;
        ledger.delete_account(id)?;
        self.forget(id);
        info!(account = %id, "deleted account");
        Ok(())
    }

    fn close_account<G: Rng, R: AccountRepository>(
        &self,
        rng: &mut G,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        let Some(id) = self.random_account(rng) else {
            warn!("can't close random account: not enough accounts");
            return Ok(());
        };
        self.log_statement(id, ledger)?;
        let drained = ledger.close_account(id)?;
        self.forget(id);
        info!(account = %id, %drained, "closed account");
        Ok(())
    }

    fn deposit<G: Rng, R: AccountRepository>(
        &self,
        rng: &mut G,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        let Some(id) = self.random_account(rng) else {
            warn!("can't deposit to random account: not enough accounts");
            return Ok(());
        };
        let amount = self.random_amount(rng);
        ledger.deposit(id, amount)?;
        info!(account = %id, %amount, "deposited");
        self.log_statement(id, ledger)
    }

    fn withdraw<G: Rng, R: AccountRepository>(
        &self,
        rng: &mut G,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        let Some(id) = self.random_account(rng) else {
            warn!("can't withdraw from random account: not enough accounts");
            return Ok(());
        };
        let amount = self.random_amount(rng);
        let withdrawn = ledger.withdraw(id, amount)?;
        info!(account = %id, %withdrawn, "withdrew");
        self.log_statement(id, ledger)
    }

    fn withdraw_all<G: Rng, R: AccountRepository>(
        &self,
        rng: &mut G,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        let Some(id) = self.random_account(rng) else {
            warn!("can't withdraw all from random account: not enough accounts");
            return Ok(());
        };
        let withdrawn = ledger.withdraw_all(id)?;
        info!(account = %id, %withdrawn, "withdrew all funds");
        self.log_statement(id, ledger)
    }

    fn exchange<G: Rng, R: AccountRepository>(
        &self,
        rng: &mut G,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        let Some(id) = self.random_account(rng) else {
            warn!("can't exchange on random account: not enough accounts");
            return Ok(());
        };
        let amount = self.random_amount(rng);
        let target = self.random_currency(rng);
        let exchanged = ledger.exchange(id, amount, target)?;
        info!(account = %id, %amount, %exchanged, "exchanged");
        self.log_statement(id, ledger)
    }

    fn transfer<G: Rng, R: AccountRepository>(
        &self,
        rng: &mut G,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        let (Some(source), Some(target)) = (self.random_account(rng), self.random_account(rng))
        else {
            warn!("can't transfer between random accounts: not enough accounts");
            return Ok(());
        };
        let amount = self.random_amount(rng);
        ledger.transfer(source, target, amount)?;
        info!(%source, %target, %amount, "transferred");
        self.log_statement(source, ledger)?;
        self.log_statement(target, ledger)
    }

    fn log_statement<R: AccountRepository>(
        &self,
        id: Uuid,
        ledger: &LedgerService<R>,
    ) -> Result<(), LedgerError> {
        let statement = ledger.statement(id)?;
        info!("\n{statement}");
        Ok(())
    }

    fn random_currency<G: Rng>(&self, rng: &mut G) -> Currency {
        self.currencies[rng.gen_range(0..self.currencies.len())]
    }

    fn random_account<G: Rng>(&self, rng: &mut G) -> Option<Uuid> {
        let accounts = self.accounts.lock();
        if accounts.is_empty() {
            None
        } else {
            Some(accounts[rng.gen_range(0..accounts.len())])
        }
    }

    fn forget(&self, id: Uuid) {
        self.accounts.lock().retain(|known| *known != id);
    }

    fn random_amount<G: Rng>(&self, rng: &mut G) -> Amount {
        Amount::new(self.random_currency(rng), random_value(rng))
    }
}

/// A random decimal with 1-6 integer digits and 1-2 decimal places;
/// 80% positive, 10% zero, 10% negative
fn random_value<G: Rng>(rng: &mut G) -> Decimal {
    let digits = rng.gen_range(1..=6u32);
    let scale = rng.gen_range(1..=2u32);
    let mantissa = rng.gen_range(0..10i64.pow(digits + scale));
    let value = Decimal::new(mantissa, scale);
    match rng.gen_range(0..10) {
        0 => Decimal::ZERO,
        1 => -value,
        _ => value,
    }
}
