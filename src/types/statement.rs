//! Account statements
//!
//! A [`Statement`] is an ordered snapshot of an account taken while its lock
//! is held: the main currency comes first, remaining currencies follow in
//! lexicographic code order. Rendering is plain text via `Display`.

use crate::types::account::Account;
use crate::types::currency::Currency;
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use std::fmt;

const CCY_COL: usize = 10;
const BALANCE_COL: usize = 20;

/// An ordered balance snapshot of one account
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    id: String,
    main_currency: Currency,
    timestamp: DateTime<Local>,
    balances: Vec<(Currency, Decimal)>,
}

impl Statement {
    /// Snapshot an account, ordering balances main-currency-first
    ///
    /// The caller is expected to hold the account's lock, so the snapshot
    /// is consistent.
    pub fn for_account(account: &Account) -> Self {
        let main = account.main_currency();
        let mut balances = account.balances();
        // balances() is already sorted by code; float the main currency up
        balances.sort_by_key(|(ccy, _)| *ccy != main);
        Statement {
            id: account.id().to_string(),
            main_currency: main,
            timestamp: Local::now(),
            balances,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn main_currency(&self) -> Currency {
        self.main_currency
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// The ordered (currency, balance) entries
    pub fn balances(&self) -> &[(Currency, Decimal)] {
        &self.balances
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        let divider = format!("\t+{}+{}+", "-".repeat(CCY_COL), "-".repeat(BALANCE_COL));
        writeln!(f, "{rule}")?;
        writeln!(f, "\tAccount: {} ({})", self.id, self.main_currency)?;
        writeln!(f, "\tDate: {}", self.timestamp.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "\tBalance:")?;
        writeln!(f, "{divider}")?;
        writeln!(
            f,
            "\t|{:^ccy$}|{:^bal$}|",
            "Currency",
            "Balance",
            ccy = CCY_COL,
            bal = BALANCE_COL
        )?;
        writeln!(f, "{divider}")?;
        for (currency, balance) in &self.balances {
            writeln!(
                f,
                "\t|{:<ccy$}|{:>bal$}|",
                currency.code(),
                balance.to_string(),
                ccy = CCY_COL,
                bal = BALANCE_COL
            )?;
        }
        writeln!(f, "{divider}")?;
        write!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::amount::Amount;
    use std::str::FromStr;
    use uuid::Uuid;

    fn ccy(code: &str) -> Currency {
        Currency::from_code(code).unwrap()
    }

    fn amount(code: &str, value: &str) -> Amount {
        Amount::new(ccy(code), Decimal::from_str(value).unwrap())
    }

    #[test]
    fn test_main_currency_first_then_lexicographic() {
        let mut account = Account::new(Uuid::new_v4(), ccy("USD"));
        account.deposit(amount("JPY", "3")).unwrap();
        account.deposit(amount("GBP", "2")).unwrap();
        account.deposit(amount("USD", "1")).unwrap();

        let statement = Statement::for_account(&account);
        let order: Vec<&str> = statement
            .balances()
            .iter()
            .map(|(ccy, _)| ccy.code())
            .collect();
        assert_eq!(order, vec!["USD", "GBP", "JPY"]);
    }

    #[test]
    fn test_rendering_includes_every_balance() {
        let mut account = Account::new(Uuid::new_v4(), ccy("USD"));
        account.deposit(amount("USD", "70.00")).unwrap();
        account.deposit(amount("EUR", "9.50")).unwrap();

        let rendered = Statement::for_account(&account).to_string();
        assert!(rendered.contains(&account.id().to_string()));
        assert!(rendered.contains("USD"));
        assert!(rendered.contains("70.00"));
        assert!(rendered.contains("EUR"));
        assert!(rendered.contains("9.50"));
    }

    #[test]
    fn test_empty_account_statement_has_no_rows() {
        let account = Account::new(Uuid::new_v4(), ccy("USD"));
        let statement = Statement::for_account(&account);
        assert!(statement.balances().is_empty());
    }
}
