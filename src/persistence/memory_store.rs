//! In-memory account repository
//!
//! Backed by a concurrent map, so it satisfies the repository contract
//! without any file I/O. Used by tests and by the demo harness in
//! `--storage memory` mode.

use crate::core::traits::AccountRepository;
use crate::types::{Account, StorageError};
use dashmap::DashMap;
use uuid::Uuid;

/// Account repository holding records in a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: DashMap<Uuid, Account>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountRepository for InMemoryAccountStore {
    fn exists(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self.accounts.contains_key(&id))
    }

    fn get(&self, id: Uuid) -> Result<Option<Account>, StorageError> {
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    fn get_all(&self) -> Result<Vec<Account>, StorageError> {
        Ok(self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn save(&self, account: &Account) -> Result<(), StorageError> {
        self.accounts.insert(account.id(), account.clone());
        Ok(())
    }

    fn delete(&self, account: &Account) -> Result<usize, StorageError> {
        Ok(self.accounts.remove(&account.id()).map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Amount, Currency};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn account() -> Account {
        let mut account = Account::new(Uuid::new_v4(), Currency::from_code("USD").unwrap());
        account
            .deposit(Amount::new(
                Currency::from_code("USD").unwrap(),
                Decimal::from_str("10.00").unwrap(),
            ))
            .unwrap();
        account
    }

    #[test]
    fn test_save_get_delete_cycle() {
        let store = InMemoryAccountStore::new();
        let account = account();

        assert!(!store.exists(account.id()).unwrap());
        store.save(&account).unwrap();
        assert_eq!(store.get(account.id()).unwrap(), Some(account.clone()));

        assert_eq!(store.delete(&account).unwrap(), 1);
        assert_eq!(store.delete(&account).unwrap(), 0);
        assert_eq!(store.get(account.id()).unwrap(), None);
    }

    #[test]
    fn test_get_all_returns_every_record() {
        let store = InMemoryAccountStore::new();
        let first = account();
        let second = account();
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        let mut all = store.get_all().unwrap();
        all.sort_by_key(|account| account.id());
        let mut expected = vec![first, second];
        expected.sort_by_key(|account| account.id());
        assert_eq!(all, expected);
    }
}
