//! The account repository seam
//!
//! [`LedgerService`](crate::core::LedgerService) persists accounts through
//! this trait and assumes nothing about the backing store: in particular,
//! not that it is internally synchronized. The service guarantees that two
//! threads never hold the same account's lock at once while touching the
//! repository, so implementations only need `&self` methods that are safe
//! for *different* ids concurrently.

use crate::types::{Account, StorageError};
use uuid::Uuid;

/// Load, save, and delete account records by id
pub trait AccountRepository: Send + Sync {
    /// Whether a record exists for the id
    fn exists(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Load the record for an id, if present
    fn get(&self, id: Uuid) -> Result<Option<Account>, StorageError>;

    /// Load every stored record
    fn get_all(&self) -> Result<Vec<Account>, StorageError>;

    /// Store a record, replacing any previous one (idempotent upsert)
    fn save(&self, account: &Account) -> Result<(), StorageError>;

    /// Remove the record; returns how many were removed (0 or 1)
    fn delete(&self, account: &Account) -> Result<usize, StorageError>;
}

// A shared handle to a repository is itself a repository, so a store can be
// observed from outside the service that owns it.
impl<T: AccountRepository + ?Sized> AccountRepository for std::sync::Arc<T> {
    fn exists(&self, id: Uuid) -> Result<bool, StorageError> {
        (**self).exists(id)
    }

    fn get(&self, id: Uuid) -> Result<Option<Account>, StorageError> {
        (**self).get(id)
    }

    fn get_all(&self) -> Result<Vec<Account>, StorageError> {
        (**self).get_all()
    }

    fn save(&self, account: &Account) -> Result<(), StorageError> {
        (**self).save(account)
    }

    fn delete(&self, account: &Account) -> Result<usize, StorageError> {
        (**self).delete(account)
    }
}
