//! The registry of participants.
//!
//! [`UserRegistry`] validates role codes, hands registrations to the
//! [`UserStore`] for the atomic insert-if-absent, and reports every outcome
//! to the [`AuditLog`]. Authorisation is not checked here; mutations other
//! than genesis are reached through
//! [`AccessGuard`](crate::domain::AccessGuard).

use std::sync::Arc;

use mockable::Clock;
use tracing::error;

use crate::domain::error::RegistrationError;
use crate::domain::ports::{AuditLog, InsertCondition, InsertOutcome, UserStore, UserStoreError};
use crate::domain::role::Role;
use crate::domain::user::{
    DisplayName, Identity, RegistrationRequest, UserRecord, UserRegistration,
};
use crate::domain::user_events::{
    GenesisBootstrappedEvent, RegistrationRejectedEvent, RegistryEvent, RejectionReason,
    UserRegisteredEvent,
};

/// Outbound dependencies of a [`UserRegistry`].
#[derive(Clone)]
pub struct RegistryPorts {
    /// Record store performing the atomic inserts.
    pub store: Arc<dyn UserStore>,
    /// Sink for registry events.
    pub audit_log: Arc<dyn AuditLog>,
    /// Source of registration timestamps.
    pub clock: Arc<dyn Clock>,
}

/// Participant registry bound to one owner.
///
/// ## Invariants
/// - Each identity maps to at most one record, and that record never
///   changes once committed.
/// - Every stored role is a member of [`Role::ALL`].
/// - [`UserRegistry::all`] lists identities in commit order.
pub struct UserRegistry {
    owner: Identity,
    store: Arc<dyn UserStore>,
    audit_log: Arc<dyn AuditLog>,
    clock: Arc<dyn Clock>,
}

impl UserRegistry {
    /// Create a registry owned by `owner`, the only identity allowed to
    /// perform genesis.
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use registry::domain::ports::NoOpAuditLog;
    /// use registry::domain::{Identity, RegistryPorts, UserRegistry};
    /// use registry::outbound::memory::InMemoryUserStore;
    ///
    /// let owner = Identity::new("0xA1").expect("valid identity");
    /// let registry = UserRegistry::new(
    ///     owner.clone(),
    ///     RegistryPorts {
    ///         store: Arc::new(InMemoryUserStore::new()),
    ///         audit_log: Arc::new(NoOpAuditLog),
    ///         clock: Arc::new(DefaultClock),
    ///     },
    /// );
    /// assert_eq!(registry.owner(), &owner);
    /// assert!(registry.is_empty());
    /// ```
    pub fn new(owner: Identity, ports: RegistryPorts) -> Self {
        let RegistryPorts {
            store,
            audit_log,
            clock,
        } = ports;
        Self {
            owner,
            store,
            audit_log,
            clock,
        }
    }

    /// Identity that owns this registry.
    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    /// Seed the first manager.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::NotRegistryOwner`] when `deployer` is not the
    ///   owner.
    /// - [`RegistrationError::GenesisClosed`] when any record exists.
    /// - [`RegistrationError::Store`] when the store fails.
    pub fn bootstrap_genesis(
        &self,
        deployer: &Identity,
        identity: Identity,
        display_name: DisplayName,
    ) -> Result<UserRecord, RegistrationError> {
        if deployer != &self.owner {
            return Err(self.reject(
                deployer,
                &identity,
                RegistrationError::NotRegistryOwner {
                    caller: deployer.clone(),
                },
            ));
        }

        let registration =
            UserRegistration::new(identity.clone(), display_name, Role::Manager, self.clock.utc());
        match self.insert(registration, InsertCondition::RegistryEmpty)? {
            InsertOutcome::Inserted(record) => {
                self.audit_log
                    .record(&RegistryEvent::GenesisBootstrapped(GenesisBootstrappedEvent {
                        deployer: deployer.clone(),
                        record: record.clone(),
                    }));
                Ok(record)
            }
            InsertOutcome::RegistryNotEmpty => {
                Err(self.reject(deployer, &identity, RegistrationError::GenesisClosed))
            }
            InsertOutcome::IdentityTaken(_) => Err(Self::unexpected_outcome(
                "store reported a taken identity for a genesis insert",
            )),
        }
    }

    /// Register a user on behalf of an already authorised `registrar`.
    ///
    /// The role code is validated before anything touches the store.
    pub(crate) fn register(
        &self,
        registrar: &Identity,
        request: RegistrationRequest,
    ) -> Result<UserRecord, RegistrationError> {
        let (identity, display_name, code) = request.into_parts();
        let Ok(role) = Role::try_from(code) else {
            return Err(self.reject(registrar, &identity, RegistrationError::InvalidRole { code }));
        };

        let registration =
            UserRegistration::new(identity.clone(), display_name, role, self.clock.utc());
        match self.insert(registration, InsertCondition::IdentityAbsent)? {
            InsertOutcome::Inserted(record) => {
                self.audit_log
                    .record(&RegistryEvent::UserRegistered(UserRegisteredEvent {
                        registrar: registrar.clone(),
                        record: record.clone(),
                    }));
                Ok(record)
            }
            InsertOutcome::IdentityTaken(_) => Err(self.reject(
                registrar,
                &identity,
                RegistrationError::DuplicateIdentity {
                    identity: identity.clone(),
                },
            )),
            InsertOutcome::RegistryNotEmpty => Err(Self::unexpected_outcome(
                "store reported a non-empty registry for an identity insert",
            )),
        }
    }

    /// Record audit output for a rejected attempt and hand the error back.
    pub(crate) fn reject(
        &self,
        caller: &Identity,
        identity: &Identity,
        error: RegistrationError,
    ) -> RegistrationError {
        if let Some(reason) = RejectionReason::from_error(&error) {
            self.audit_log
                .record(&RegistryEvent::RegistrationRejected(
                    RegistrationRejectedEvent::new(caller.clone(), identity.clone(), reason),
                ));
        }
        error
    }

    fn insert(
        &self,
        registration: UserRegistration,
        condition: InsertCondition,
    ) -> Result<InsertOutcome, RegistrationError> {
        let identity = registration.identity().clone();
        self.store.insert(registration, condition).map_err(|err| {
            error!(identity = %identity, error = %err, "user store rejected insert");
            RegistrationError::Store(err)
        })
    }

    fn unexpected_outcome(message: &str) -> RegistrationError {
        error!(message, "user store broke its insert contract");
        RegistrationError::Store(UserStoreError::corrupted(message))
    }

    /// Record for `identity`, if registered.
    pub fn lookup(&self, identity: &Identity) -> Option<UserRecord> {
        self.store.find(identity)
    }

    /// Every registered identity, oldest first.
    pub fn all(&self) -> Vec<Identity> {
        self.store.identities()
    }

    /// Every record, oldest first.
    pub fn records(&self) -> Vec<UserRecord> {
        self.store.records()
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no user is registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "user_registry_tests.rs"]
mod tests;
