//! File-backed account repository
//!
//! One JSON record per account, named `<uuid>.acc`, under a data directory
//! created on first save. Files whose stem is not a valid UUID are ignored
//! by [`get_all`](crate::core::AccountRepository::get_all), so the directory
//! can be shared with other artifacts.
//!
//! The store performs no locking of its own: the service layer guarantees
//! that at most one thread touches any given account's file at a time.

use crate::core::traits::AccountRepository;
use crate::types::{Account, StorageError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const EXTENSION: &str = "acc";

/// Account repository storing one JSON file per account
#[derive(Debug, Clone)]
pub struct FileAccountStore {
    dir: PathBuf,
}

impl FileAccountStore {
    /// Create a store rooted at `dir`
    ///
    /// The directory is created lazily on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileAccountStore { dir: dir.into() }
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }

    fn read_record(&self, path: &Path) -> Result<Account, StorageError> {
        debug!(path = %path.display(), "reading account record");
        let contents =
            fs::read_to_string(path).map_err(|e| StorageError::io("read", path, &e))?;
        serde_json::from_str(&contents).map_err(|e| StorageError::corrupt(path, &e))
    }

    /// Whether `path` looks like a record file: `<uuid>.acc` with a regular
    /// file behind it
    fn is_record(path: &Path) -> bool {
        path.is_file()
            && path.extension().is_some_and(|ext| ext == EXTENSION)
            && path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| Uuid::parse_str(stem).is_ok())
    }
}

impl AccountRepository for FileAccountStore {
    fn exists(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self.record_path(id).is_file())
    }

    fn get(&self, id: Uuid) -> Result<Option<Account>, StorageError> {
        let path = self.record_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        self.read_record(&path).map(Some)
    }

    fn get_all(&self) -> Result<Vec<Account>, StorageError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries =
            fs::read_dir(&self.dir).map_err(|e| StorageError::io("get_all", &self.dir, &e))?;
        let mut accounts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io("get_all", &self.dir, &e))?;
            let path = entry.path();
            if Self::is_record(&path) {
                accounts.push(self.read_record(&path)?);
            }
        }
        Ok(accounts)
    }

    fn save(&self, account: &Account) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io("save", &self.dir, &e))?;
        let path = self.record_path(account.id());
        debug!(path = %path.display(), "writing account record");
        let contents = serde_json::to_string(account)
            .map_err(|e| StorageError::corrupt(&path, &e))?;
        fs::write(&path, contents).map_err(|e| StorageError::io("save", &path, &e))
    }

    fn delete(&self, account: &Account) -> Result<usize, StorageError> {
        let path = self.record_path(account.id());
        if !path.is_file() {
            return Ok(0);
        }
        debug!(path = %path.display(), "deleting account record");
        fs::remove_file(&path).map_err(|e| StorageError::io("delete", &path, &e))?;
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Amount, Currency};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn account_with_funds() -> Account {
        let mut account = Account::new(Uuid::new_v4(), Currency::from_code("USD").unwrap());
        account
            .deposit(Amount::new(
                Currency::from_code("USD").unwrap(),
                Decimal::from_str("100.00").unwrap(),
            ))
            .unwrap();
        account
    }

    #[test]
    fn test_save_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FileAccountStore::new(dir.path());
        let account = account_with_funds();

        store.save(&account).unwrap();
        assert_eq!(store.get(account.id()).unwrap(), Some(account));
    }

    #[test]
    fn test_get_missing_account_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileAccountStore::new(dir.path());
        assert_eq!(store.get(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn test_exists_tracks_save_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = FileAccountStore::new(dir.path());
        let account = account_with_funds();

        assert!(!store.exists(account.id()).unwrap());
        store.save(&account).unwrap();
        assert!(store.exists(account.id()).unwrap());

        assert_eq!(store.delete(&account).unwrap(), 1);
        assert!(!store.exists(account.id()).unwrap());
    }

    #[test]
    fn test_delete_missing_account_removes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = FileAccountStore::new(dir.path());
        assert_eq!(store.delete(&account_with_funds()).unwrap(), 0);
    }

    #[test]
    fn test_save_is_idempotent_upsert() {
        let dir = TempDir::new().unwrap();
        let store = FileAccountStore::new(dir.path());
        let mut account = account_with_funds();

        store.save(&account).unwrap();
        account
            .deposit(Amount::new(
                Currency::from_code("EUR").unwrap(),
                Decimal::from_str("5.00").unwrap(),
            ))
            .unwrap();
        store.save(&account).unwrap();

        assert_eq!(store.get(account.id()).unwrap(), Some(account));
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_get_all_ignores_foreign_files() {
        let dir = TempDir::new().unwrap();
        let store = FileAccountStore::new(dir.path());
        let account = account_with_funds();
        store.save(&account).unwrap();

        std::fs::write(dir.path().join("notes.txt"), "not an account").unwrap();
        std::fs::write(dir.path().join("not-a-uuid.acc"), "{}").unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all, vec![account]);
    }

    #[test]
    fn test_get_all_on_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileAccountStore::new(dir.path().join("never-created"));
        assert_eq!(store.get_all().unwrap(), Vec::new());
    }

    #[test]
    fn test_corrupt_record_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = FileAccountStore::new(dir.path());
        let id = Uuid::new_v4();
        std::fs::write(dir.path().join(format!("{id}.acc")), "not json").unwrap();

        let result = store.get(id);
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }
}
