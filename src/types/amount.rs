//! The [`Amount`] value type
//!
//! An `Amount` is an immutable (currency, value) pair used as the input and
//! output of every ledger operation. The value is a `rust_decimal::Decimal`,
//! so same-currency arithmetic is exact.

use crate::types::currency::Currency;
use rust_decimal::Decimal;
use std::fmt;

/// An immutable (currency, decimal value) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    currency: Currency,
    value: Decimal,
}

impl Amount {
    pub fn new(currency: Currency, value: Decimal) -> Self {
        Amount { currency, value }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    /// Strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}
