//! Role-based authorisation in front of registry mutations.
//!
//! The guard resolves the caller's role from the registry itself and
//! compares ranks against the role an operation requires. Reads do not pass
//! through here.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::error::RegistrationError;
use crate::domain::role::Role;
use crate::domain::user::{DisplayName, Identity, RegistrationRequest, UserRecord};
use crate::domain::user_registry::UserRegistry;

/// Mutations protected by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardedOperation {
    /// Add a participant to the registry.
    RegisterUser,
}

impl GuardedOperation {
    /// Least privileged role allowed to perform the operation.
    #[must_use]
    pub const fn required_role(self) -> Role {
        match self {
            Self::RegisterUser => Role::Manager,
        }
    }

    /// Human-readable operation name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RegisterUser => "register users",
        }
    }
}

impl fmt::Display for GuardedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reasons the guard refuses a caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// The caller has no record.
    #[error("{caller} is not a registered participant")]
    UnknownCaller {
        /// Caller identity.
        caller: Identity,
    },
    /// The caller's role ranks below the operation's requirement.
    #[error("{caller} holds role {role}, which may not {operation}")]
    Unauthorized {
        /// Caller identity.
        caller: Identity,
        /// Role the caller holds.
        role: Role,
        /// Operation that was attempted.
        operation: GuardedOperation,
    },
}

/// Authorising front door for registry mutations.
#[derive(Clone)]
pub struct AccessGuard {
    registry: Arc<UserRegistry>,
}

impl AccessGuard {
    /// Guard mutations of `registry`.
    pub fn new(registry: Arc<UserRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve the caller's role and check it against `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] when the caller is unknown or its role ranks
    /// too low.
    pub fn authorize(
        &self,
        caller: &Identity,
        operation: GuardedOperation,
    ) -> Result<Role, AccessDenied> {
        let record = self
            .registry
            .lookup(caller)
            .ok_or_else(|| AccessDenied::UnknownCaller {
                caller: caller.clone(),
            })?;
        let role = record.role();
        if role.satisfies(operation.required_role()) {
            Ok(role)
        } else {
            Err(AccessDenied::Unauthorized {
                caller: caller.clone(),
                role,
                operation,
            })
        }
    }

    /// Register a user if `caller` may.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::UnknownCaller`] or
    /// [`RegistrationError::Unauthorized`] when the caller is refused, and
    /// any error of the underlying registration otherwise.
    pub fn register(
        &self,
        caller: &Identity,
        request: RegistrationRequest,
    ) -> Result<UserRecord, RegistrationError> {
        if let Err(denied) = self.authorize(caller, GuardedOperation::RegisterUser) {
            return Err(self
                .registry
                .reject(caller, request.identity(), denied.into()));
        }
        self.registry.register(caller, request)
    }

    /// Seed the first manager. Ownership replaces the role check here.
    ///
    /// # Errors
    ///
    /// See [`UserRegistry::bootstrap_genesis`].
    pub fn bootstrap_genesis(
        &self,
        deployer: &Identity,
        identity: Identity,
        display_name: DisplayName,
    ) -> Result<UserRecord, RegistrationError> {
        self.registry
            .bootstrap_genesis(deployer, identity, display_name)
    }
}
