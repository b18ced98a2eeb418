//! End-to-end ledger scenarios
//!
//! Exercises complete operation flows through the public API: open/
//! deposit/withdraw round trips, conversions, transfers with and without
//! configured rates, and the account lifecycle (close, delete). Each
//! scenario is a generic function run against both repository backends:
//! the in-memory store and the file store in a temp directory.

use currency_ledger::core::AccountRepository;
use currency_ledger::persistence::{FileAccountStore, InMemoryAccountStore};
use currency_ledger::{Amount, Currency, CurrencyPair, LedgerError, LedgerService, RateStore};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;

fn ccy(code: &str) -> Currency {
    Currency::from_code(code).unwrap()
}

fn amount(code: &str, value: &str) -> Amount {
    Amount::new(ccy(code), Decimal::from_str(value).unwrap())
}

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

fn rates(entries: &[(&str, &str, &str)]) -> Arc<RateStore> {
    Arc::new(
        RateStore::with_rates(
            entries
                .iter()
                .map(|(from, to, rate)| (CurrencyPair::new(ccy(from), ccy(to)), dec(rate))),
        )
        .unwrap(),
    )
}

/// Balances from a fresh statement, for assertions
fn balances<R: AccountRepository>(
    service: &LedgerService<R>,
    id: uuid::Uuid,
) -> Result<Vec<(Currency, Decimal)>, LedgerError> {
    Ok(service.statement(id)?.balances().to_vec())
}

fn open_withdraw_statement_scenario<R: AccountRepository>(service: &LedgerService<R>) {
    let id = service.open_account(amount("USD", "100.00")).unwrap();

    let withdrawn = service.withdraw(id, amount("USD", "30.00")).unwrap();
    assert_eq!(withdrawn, amount("USD", "30.00"));

    assert_eq!(
        balances(service, id).unwrap(),
        vec![(ccy("USD"), dec("70.00"))]
    );
}

#[test]
fn test_open_withdraw_statement_scenario() {
    let store = rates(&[]);
    open_withdraw_statement_scenario(&LedgerService::new(
        InMemoryAccountStore::new(),
        Arc::clone(&store),
    ));

    let dir = TempDir::new().unwrap();
    open_withdraw_statement_scenario(&LedgerService::new(
        FileAccountStore::new(dir.path()),
        store,
    ));
}

fn conversion_scenario<R: AccountRepository>(service: &LedgerService<R>) {
    let id = service.open_account(amount("USD", "10.00")).unwrap();
    let exchanged = service
        .exchange(id, amount("USD", "10.00"), ccy("EUR"))
        .unwrap();
    assert_eq!(exchanged.currency(), ccy("EUR"));
    assert_eq!(exchanged.value(), dec("9.50"));
}

#[test]
fn test_conversion_scenario() {
    let store = rates(&[("USD", "EUR", "0.95")]);
    conversion_scenario(&LedgerService::new(
        InMemoryAccountStore::new(),
        Arc::clone(&store),
    ));

    let dir = TempDir::new().unwrap();
    conversion_scenario(&LedgerService::new(FileAccountStore::new(dir.path()), store));
}

fn negative_deposit_scenario<R: AccountRepository>(service: &LedgerService<R>) {
    let id = service.open_account(amount("USD", "10.00")).unwrap();

    let error = service.deposit(id, amount("USD", "-5.00")).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("-5.00"), "message: {message}");
    assert!(message.contains("not positive"), "message: {message}");

    // Balance unchanged
    assert_eq!(
        balances(service, id).unwrap(),
        vec![(ccy("USD"), dec("10.00"))]
    );
}

#[test]
fn test_negative_deposit_scenario() {
    let store = rates(&[]);
    negative_deposit_scenario(&LedgerService::new(
        InMemoryAccountStore::new(),
        Arc::clone(&store),
    ));

    let dir = TempDir::new().unwrap();
    negative_deposit_scenario(&LedgerService::new(FileAccountStore::new(dir.path()), store));
}

fn transfer_without_rate_scenario<R: AccountRepository>(service: &LedgerService<R>) {
    // The source holds no USD and no USD rates are configured
    let a = service.open_account(amount("EUR", "50.00")).unwrap();
    let b = service.open_account(amount("USD", "20.00")).unwrap();

    let result = service.transfer(a, b, amount("USD", "10.00"));
    assert!(matches!(result, Err(LedgerError::RateNotFound { .. })));

    assert_eq!(
        balances(service, a).unwrap(),
        vec![(ccy("EUR"), dec("50.00"))]
    );
    assert_eq!(
        balances(service, b).unwrap(),
        vec![(ccy("USD"), dec("20.00"))]
    );
}

#[test]
fn test_transfer_without_rate_scenario() {
    let store = rates(&[]);
    transfer_without_rate_scenario(&LedgerService::new(
        InMemoryAccountStore::new(),
        Arc::clone(&store),
    ));

    let dir = TempDir::new().unwrap();
    transfer_without_rate_scenario(&LedgerService::new(
        FileAccountStore::new(dir.path()),
        store,
    ));
}

fn transfer_insufficient_funds_scenario<R: AccountRepository>(service: &LedgerService<R>) {
    let a = service.open_account(amount("USD", "5.00")).unwrap();
    let b = service.open_account(amount("USD", "20.00")).unwrap();

    let result = service.transfer(a, b, amount("USD", "10.00"));
    assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));

    assert_eq!(
        balances(service, a).unwrap(),
        vec![(ccy("USD"), dec("5.00"))]
    );
    assert_eq!(
        balances(service, b).unwrap(),
        vec![(ccy("USD"), dec("20.00"))]
    );
}

#[test]
fn test_transfer_insufficient_funds_scenario() {
    let store = rates(&[]);
    transfer_insufficient_funds_scenario(&LedgerService::new(
        InMemoryAccountStore::new(),
        Arc::clone(&store),
    ));

    let dir = TempDir::new().unwrap();
    transfer_insufficient_funds_scenario(&LedgerService::new(
        FileAccountStore::new(dir.path()),
        store,
    ));
}

fn close_account_scenario<R: AccountRepository>(service: &LedgerService<R>) {
    let id = service.open_account(amount("USD", "100.00")).unwrap();
    service.deposit(id, amount("EUR", "10.00")).unwrap();

    // close drains every balance to zero as part of the same call
    let total = service.close_account(id).unwrap();
    assert_eq!(total.currency(), ccy("USD"));
    assert_eq!(total.value(), dec("111.00"));

    assert!(matches!(
        balances(service, id),
        Err(LedgerError::AccountNotFound { .. })
    ));
}

#[test]
fn test_close_account_scenario() {
    let store = rates(&[("EUR", "USD", "1.10")]);
    close_account_scenario(&LedgerService::new(
        InMemoryAccountStore::new(),
        Arc::clone(&store),
    ));

    let dir = TempDir::new().unwrap();
    close_account_scenario(&LedgerService::new(FileAccountStore::new(dir.path()), store));
}

fn round_trip_scenario<R: AccountRepository>(service: &LedgerService<R>) {
    let id = service.open_account(amount("USD", "100.10")).unwrap();

    let slice = amount("USD", "0.01");
    for _ in 0..10 {
        service.withdraw(id, slice).unwrap();
        service.deposit(id, slice).unwrap();
    }

    assert_eq!(
        balances(service, id).unwrap(),
        vec![(ccy("USD"), dec("100.10"))]
    );
}

#[test]
fn test_withdraw_deposit_round_trip_is_exact() {
    let store = rates(&[]);
    round_trip_scenario(&LedgerService::new(
        InMemoryAccountStore::new(),
        Arc::clone(&store),
    ));

    let dir = TempDir::new().unwrap();
    round_trip_scenario(&LedgerService::new(FileAccountStore::new(dir.path()), store));
}

#[test]
fn test_file_store_persists_across_service_instances() {
    let dir = TempDir::new().unwrap();
    let store = rates(&[]);

    let id = {
        let service = LedgerService::new(FileAccountStore::new(dir.path()), Arc::clone(&store));
        service.open_account(amount("USD", "42.00")).unwrap()
    };

    // A fresh service over the same directory sees the record
    let service = LedgerService::new(FileAccountStore::new(dir.path()), store);
    assert_eq!(
        service.statement(id).unwrap().balances(),
        &[(ccy("USD"), dec("42.00"))]
    );
}
