//! Driven port for the keyed record store behind the registry.
//!
//! The store owns the only check-and-insert in the system. Adapters must
//! evaluate the [`InsertCondition`], assign the next sequence number and
//! insert the record as one indivisible step, so two racing registrations of
//! the same identity can never both succeed. The interface is synchronous:
//! every adapter holds its own lock for the duration of a mutation.

use crate::domain::user::{Identity, UserRecord, UserRegistration};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user store adapters.
    pub enum UserStoreError {
        /// The adapter could not persist the change; nothing was inserted.
        Persistence {
            /// Adapter-specific detail.
            message: String,
        } => "user store persistence failed: {message}",
        /// The stored state violates a registry invariant.
        Corrupted {
            /// Description of the broken invariant.
            message: String,
        } => "user store is corrupted: {message}",
    }
}

/// Precondition evaluated atomically with an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertCondition {
    /// Insert only when the identity has no record.
    IdentityAbsent,
    /// Insert only when the store holds no records at all.
    RegistryEmpty,
}

/// Result of a conditional insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was inserted at the next position.
    Inserted(UserRecord),
    /// The identity already had this record; nothing changed.
    IdentityTaken(UserRecord),
    /// The store was not empty; nothing changed.
    RegistryNotEmpty,
}

/// Keyed, insertion-ordered store of committed user records.
#[cfg_attr(test, mockall::automock)]
pub trait UserStore: Send + Sync {
    /// Insert `registration` if `condition` holds, assigning the next
    /// 1-based sequence number.
    fn insert(
        &self,
        registration: UserRegistration,
        condition: InsertCondition,
    ) -> Result<InsertOutcome, UserStoreError>;

    /// Fetch the record for `identity`, if any.
    fn find(&self, identity: &Identity) -> Option<UserRecord>;

    /// Every registered identity, oldest first.
    fn identities(&self) -> Vec<Identity>;

    /// Every record, oldest first.
    fn records(&self) -> Vec<UserRecord>;

    /// Number of records.
    fn len(&self) -> usize;

    /// Whether the store holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
