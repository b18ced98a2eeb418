//! Error types for the ledger engine
//!
//! All failures surface as [`LedgerError`]. Variants fall into four
//! categories:
//!
//! - **Validation errors** (non-positive amount, same-currency rate pair,
//!   non-positive rate, bad currency code): detected before any lock is
//!   taken where possible.
//! - **Not-found errors** (unknown account, missing rate): surfaced after a
//!   lookup fails.
//! - **State-conflict errors** (insufficient funds, account still holds
//!   funds): surfaced while the account lock is held; the lock is still
//!   released, and no partial mutation occurs.
//! - **Infrastructure errors** (interrupted lock wait, storage failure):
//!   not expected to be handled case-by-case; see
//!   [`LedgerError::is_infrastructure`].

use crate::types::amount::Amount;
use crate::types::currency::{Currency, CurrencyPair};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Main error type for ledger operations
///
/// Each variant carries the context needed to diagnose the failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// A deposit or withdrawal amount was zero or negative
    #[error("amount is not positive: {amount}")]
    AmountNotPositive {
        /// The offending amount
        amount: Amount,
    },

    /// An opening balance was negative (zero is allowed)
    #[error("opening balance is negative: {balance}")]
    NegativeBalance {
        /// The offending balance
        balance: Amount,
    },

    /// A withdrawal exceeded the balance held in that currency
    ///
    /// The check happens strictly before any subtraction, so the account
    /// is unchanged when this is returned.
    #[error("insufficient {currency} funds in account {account} for {requested}")]
    InsufficientFunds {
        /// The account the withdrawal targeted
        account: Uuid,
        /// The currency being withdrawn
        currency: Currency,
        /// The requested value
        requested: Decimal,
    },

    /// No account record exists for the id
    #[error("account not found: {id}")]
    AccountNotFound {
        /// The unknown id
        id: Uuid,
    },

    /// No rate is configured for the pair
    #[error("no exchange rate configured for {pair}")]
    RateNotFound {
        /// The directional pair that was looked up
        pair: CurrencyPair,
    },

    /// A rate was supplied for a pair with identical sides
    #[error("exchange rate pair has the same currency on both sides: {currency}")]
    SameCurrencyRate {
        /// The repeated currency
        currency: Currency,
    },

    /// A rate value was zero or negative
    #[error("exchange rate is not positive: {rate}")]
    RateNotPositive {
        /// The offending rate
        rate: Decimal,
    },

    /// An account with remaining balances cannot be deleted
    #[error("account {id} still holds funds and cannot be closed")]
    AccountNotEmpty {
        /// The account with a non-empty funds map
        id: Uuid,
    },

    /// A currency code failed validation
    #[error("invalid currency code: '{code}'")]
    InvalidCurrency {
        /// The rejected code
        code: String,
    },

    /// A thread waiting for an account lock was cancelled
    ///
    /// The operation aborted without mutating shared state; any locks it
    /// had already acquired were released.
    #[error("operation interrupted while waiting for an account lock")]
    Interrupted,

    /// The account repository failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Failures raised by an [`AccountRepository`](crate::core::AccountRepository)
///
/// Messages are carried as strings so the error stays `Clone`/`PartialEq`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// An I/O operation on a record file or the data directory failed
    #[error("{operation} failed for {path}: {message}")]
    Io {
        /// The repository operation that failed
        operation: &'static str,
        /// The path involved
        path: String,
        /// Description of the underlying I/O error
        message: String,
    },

    /// A record file exists but does not decode to an account
    #[error("corrupt account record {path}: {message}")]
    Corrupt {
        /// The path of the unreadable record
        path: String,
        /// Description of the decoding error
        message: String,
    },
}

impl StorageError {
    /// Create an Io error from an underlying `std::io::Error`
    pub fn io(operation: &'static str, path: &std::path::Path, source: &std::io::Error) -> Self {
        StorageError::Io {
            operation,
            path: path.display().to_string(),
            message: source.to_string(),
        }
    }

    /// Create a Corrupt error from a decoding failure
    pub fn corrupt(path: &std::path::Path, source: &serde_json::Error) -> Self {
        StorageError::Corrupt {
            path: path.display().to_string(),
            message: source.to_string(),
        }
    }
}

// Helper constructors for common errors

impl LedgerError {
    /// Create an AmountNotPositive error
    pub fn amount_not_positive(amount: Amount) -> Self {
        LedgerError::AmountNotPositive { amount }
    }

    /// Create a NegativeBalance error
    pub fn negative_balance(balance: Amount) -> Self {
        LedgerError::NegativeBalance { balance }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: Uuid, currency: Currency, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            currency,
            requested,
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(id: Uuid) -> Self {
        LedgerError::AccountNotFound { id }
    }

    /// Create a RateNotFound error
    pub fn rate_not_found(pair: CurrencyPair) -> Self {
        LedgerError::RateNotFound { pair }
    }

    /// Create a SameCurrencyRate error
    pub fn same_currency_rate(currency: Currency) -> Self {
        LedgerError::SameCurrencyRate { currency }
    }

    /// Create a RateNotPositive error
    pub fn rate_not_positive(rate: Decimal) -> Self {
        LedgerError::RateNotPositive { rate }
    }

    /// Create an AccountNotEmpty error
    pub fn account_not_empty(id: Uuid) -> Self {
        LedgerError::AccountNotEmpty { id }
    }

    /// Create an InvalidCurrency error
    pub fn invalid_currency(code: &str) -> Self {
        LedgerError::InvalidCurrency {
            code: code.to_string(),
        }
    }

    /// Whether this error is infrastructural rather than a domain failure
    ///
    /// Domain errors (validation, not-found, state conflicts) are expected
    /// under a random workload and recoverable by the caller; interruption
    /// and storage failures are not.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, LedgerError::Interrupted | LedgerError::Storage(_))
    }
}
