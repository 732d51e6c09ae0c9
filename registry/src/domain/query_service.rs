//! Read-only view of the registry.

use std::sync::Arc;

use crate::domain::user::{Identity, UserRecord};
use crate::domain::user_registry::UserRegistry;

/// Lookups and listings that never mutate and never fail.
#[derive(Clone)]
pub struct QueryService {
    registry: Arc<UserRegistry>,
}

impl QueryService {
    /// Read from `registry`.
    pub fn new(registry: Arc<UserRegistry>) -> Self {
        Self { registry }
    }

    /// Record for `identity`, if registered.
    pub fn lookup(&self, identity: &Identity) -> Option<UserRecord> {
        self.registry.lookup(identity)
    }

    /// Every registered identity, oldest first.
    pub fn all(&self) -> Vec<Identity> {
        self.registry.all()
    }

    /// Every record, oldest first.
    pub fn records(&self) -> Vec<UserRecord> {
        self.registry.records()
    }

    /// Number of registered users.
    pub fn count(&self) -> usize {
        self.registry.len()
    }

    /// Whether `identity` is registered.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.lookup(identity).is_some()
    }
}
