//! Registration outcomes returned by the registry and its access guard.
//!
//! Every failure is a structured variant so callers can tell "already
//! registered" apart from misuse or a broken store without inspecting
//! message text.

use thiserror::Error;

use crate::domain::access_guard::{AccessDenied, GuardedOperation};
use crate::domain::ports::UserStoreError;
use crate::domain::role::{Role, RoleCode};
use crate::domain::user::Identity;

/// How a caller is expected to treat a [`RegistrationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Expected outcome of normal use; report it and carry on.
    Expected,
    /// Input that validated callers never produce; fix the caller.
    ProgrammerError,
    /// The store cannot be trusted; stop.
    Fatal,
}

/// Failures of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The identity already has a record; the record is unchanged.
    #[error("user already exists: {identity}")]
    DuplicateIdentity {
        /// Identity that was submitted again.
        identity: Identity,
    },
    /// The submitted role code does not name a known role.
    #[error("role code {code} is not a known role")]
    InvalidRole {
        /// Offending code.
        code: RoleCode,
    },
    /// The caller is registered but its role is not privileged enough.
    #[error("{caller} holds role {role}, which may not {operation}")]
    Unauthorized {
        /// Caller identity.
        caller: Identity,
        /// Role the caller holds.
        role: Role,
        /// Operation that was attempted.
        operation: GuardedOperation,
    },
    /// The caller has no record at all.
    #[error("{caller} is not a registered participant")]
    UnknownCaller {
        /// Caller identity.
        caller: Identity,
    },
    /// Someone other than the registry owner attempted genesis.
    #[error("{caller} does not own this registry")]
    NotRegistryOwner {
        /// Caller identity.
        caller: Identity,
    },
    /// Genesis was attempted on a registry that already has records.
    #[error("genesis has already been performed for this registry")]
    GenesisClosed,
    /// The store failed or is inconsistent.
    #[error(transparent)]
    Store(#[from] UserStoreError),
}

impl RegistrationError {
    /// Classify the failure for the caller.
    ///
    /// # Examples
    /// ```
    /// use registry::domain::{ErrorDisposition, Identity, RegistrationError};
    ///
    /// let err = RegistrationError::DuplicateIdentity {
    ///     identity: Identity::new("0xA1").expect("valid identity"),
    /// };
    /// assert_eq!(err.disposition(), ErrorDisposition::Expected);
    /// ```
    #[must_use]
    pub const fn disposition(&self) -> ErrorDisposition {
        match self {
            Self::DuplicateIdentity { .. }
            | Self::Unauthorized { .. }
            | Self::UnknownCaller { .. }
            | Self::NotRegistryOwner { .. }
            | Self::GenesisClosed => ErrorDisposition::Expected,
            Self::InvalidRole { .. } => ErrorDisposition::ProgrammerError,
            Self::Store(_) => ErrorDisposition::Fatal,
        }
    }

    /// Whether the failure means "this identity is already registered".
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateIdentity { .. })
    }
}

impl From<AccessDenied> for RegistrationError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::UnknownCaller { caller } => Self::UnknownCaller { caller },
            AccessDenied::Unauthorized {
                caller,
                role,
                operation,
            } => Self::Unauthorized {
                caller,
                role,
                operation,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn identity(raw: &str) -> Identity {
        Identity::new(raw).expect("valid identity")
    }

    #[rstest]
    #[case(RegistrationError::DuplicateIdentity { identity: identity("0xA1") }, ErrorDisposition::Expected)]
    #[case(RegistrationError::UnknownCaller { caller: identity("0xB2") }, ErrorDisposition::Expected)]
    #[case(RegistrationError::NotRegistryOwner { caller: identity("0xB2") }, ErrorDisposition::Expected)]
    #[case(RegistrationError::GenesisClosed, ErrorDisposition::Expected)]
    #[case(RegistrationError::InvalidRole { code: RoleCode::new(7) }, ErrorDisposition::ProgrammerError)]
    #[case(RegistrationError::Store(UserStoreError::persistence("disk full")), ErrorDisposition::Fatal)]
    fn classifies_failures(#[case] error: RegistrationError, #[case] expected: ErrorDisposition) {
        assert_eq!(error.disposition(), expected);
    }

    #[rstest]
    fn duplicate_message_keeps_the_familiar_wording() {
        let error = RegistrationError::DuplicateIdentity {
            identity: identity("0xA1"),
        };
        assert!(error.is_duplicate());
        assert_eq!(error.to_string(), "user already exists: 0xA1");
    }

    #[rstest]
    fn access_denials_map_to_distinct_variants() {
        let unknown: RegistrationError = AccessDenied::UnknownCaller {
            caller: identity("0xC3"),
        }
        .into();
        assert_eq!(
            unknown,
            RegistrationError::UnknownCaller {
                caller: identity("0xC3")
            }
        );

        let unauthorized: RegistrationError = AccessDenied::Unauthorized {
            caller: identity("0xC3"),
            role: Role::Customer,
            operation: GuardedOperation::RegisterUser,
        }
        .into();
        assert_eq!(
            unauthorized.to_string(),
            "0xC3 holds role customer, which may not register users"
        );
        assert!(!unauthorized.is_duplicate());
    }
}
