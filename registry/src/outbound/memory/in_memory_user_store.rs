//! Process-local user store.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::record_table::RecordTable;
use crate::domain::ports::{InsertCondition, InsertOutcome, UserStore, UserStoreError};
use crate::domain::{Identity, UserRecord, UserRegistration};

/// [`UserStore`] backed by a lock-protected in-memory table.
///
/// Inserts take the write lock for the whole check-and-insert. A poisoned
/// lock is recovered: a commit is a single push, so a panicking holder
/// cannot leave a half-written record behind.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: RwLock<RecordTable>,
}

impl InMemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RecordTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RecordTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UserStore for InMemoryUserStore {
    fn insert(
        &self,
        registration: UserRegistration,
        condition: InsertCondition,
    ) -> Result<InsertOutcome, UserStoreError> {
        let outcome = self.write().try_insert(registration, condition)?;
        if let InsertOutcome::Inserted(record) = &outcome {
            debug!(
                identity = %record.identity(),
                sequence = record.registered_at().sequence,
                "record committed in memory"
            );
        }
        Ok(outcome)
    }

    fn find(&self, identity: &Identity) -> Option<UserRecord> {
        self.read().find(identity)
    }

    fn identities(&self) -> Vec<Identity> {
        self.read().identities()
    }

    fn records(&self) -> Vec<UserRecord> {
        self.read().records().to_vec()
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}
