//! Domain events emitted by the registry.
//!
//! Events stay transport agnostic so audit adapters can log, store or
//! forward them without re-deriving domain decisions.

use crate::domain::error::RegistrationError;
use crate::domain::user::{Identity, UserRecord};

/// Normalised reasons a registration can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The identity already has a record.
    DuplicateIdentity,
    /// The role code is not a known role.
    InvalidRole,
    /// The caller's role may not perform the operation.
    Unauthorized,
    /// The caller has no record.
    UnknownCaller,
    /// Genesis attempted by someone other than the owner.
    NotRegistryOwner,
    /// Genesis attempted on a non-empty registry.
    GenesisClosed,
}

impl RejectionReason {
    /// Machine-readable rejection code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateIdentity => "duplicate_identity",
            Self::InvalidRole => "invalid_role",
            Self::Unauthorized => "unauthorized",
            Self::UnknownCaller => "unknown_caller",
            Self::NotRegistryOwner => "not_registry_owner",
            Self::GenesisClosed => "genesis_closed",
        }
    }

    /// Human-readable policy message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::DuplicateIdentity => "Identity is already registered.",
            Self::InvalidRole => "Role code does not name a known role.",
            Self::Unauthorized => "Only managers may register users.",
            Self::UnknownCaller => "Caller is not a registered participant.",
            Self::NotRegistryOwner => "Only the registry owner may perform genesis.",
            Self::GenesisClosed => "Genesis has already been performed.",
        }
    }

    /// Reason for a registration failure, or `None` for store failures
    /// which are not rejections.
    #[must_use]
    pub fn from_error(error: &RegistrationError) -> Option<Self> {
        match error {
            RegistrationError::DuplicateIdentity { .. } => Some(Self::DuplicateIdentity),
            RegistrationError::InvalidRole { .. } => Some(Self::InvalidRole),
            RegistrationError::Unauthorized { .. } => Some(Self::Unauthorized),
            RegistrationError::UnknownCaller { .. } => Some(Self::UnknownCaller),
            RegistrationError::NotRegistryOwner { .. } => Some(Self::NotRegistryOwner),
            RegistrationError::GenesisClosed => Some(Self::GenesisClosed),
            RegistrationError::Store(_) => None,
        }
    }
}

/// Event emitted when the owner seeds the first manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisBootstrappedEvent {
    /// Owner that performed genesis.
    pub deployer: Identity,
    /// The first record.
    pub record: UserRecord,
}

/// Event emitted when a manager registers a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRegisteredEvent {
    /// Manager that submitted the registration.
    pub registrar: Identity,
    /// The committed record.
    pub record: UserRecord,
}

/// Event emitted when a registration or genesis attempt is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRejectedEvent {
    /// Identity that submitted the attempt.
    pub caller: Identity,
    /// Identity the attempt tried to register.
    pub identity: Identity,
    /// Normalised reason for rejection.
    pub reason: RejectionReason,
    /// Human-friendly error message.
    pub message: &'static str,
}

impl RegistrationRejectedEvent {
    /// Build a rejection carrying the reason's policy message.
    #[must_use]
    pub fn new(caller: Identity, identity: Identity, reason: RejectionReason) -> Self {
        Self {
            caller,
            identity,
            message: reason.message(),
            reason,
        }
    }

    /// Machine-readable rejection code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.reason.code()
    }
}

/// Registry domain events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// The first manager was seeded.
    GenesisBootstrapped(GenesisBootstrappedEvent),
    /// A user was registered.
    UserRegistered(UserRegisteredEvent),
    /// An attempt was refused.
    RegistrationRejected(RegistrationRejectedEvent),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserStoreError;
    use crate::domain::role::RoleCode;
    use rstest::rstest;

    fn identity() -> Identity {
        Identity::new("0xA1").expect("identity")
    }

    #[rstest]
    #[case(RegistrationError::DuplicateIdentity { identity: identity() }, Some(RejectionReason::DuplicateIdentity))]
    #[case(RegistrationError::InvalidRole { code: RoleCode::new(3) }, Some(RejectionReason::InvalidRole))]
    #[case(RegistrationError::UnknownCaller { caller: identity() }, Some(RejectionReason::UnknownCaller))]
    #[case(RegistrationError::NotRegistryOwner { caller: identity() }, Some(RejectionReason::NotRegistryOwner))]
    #[case(RegistrationError::GenesisClosed, Some(RejectionReason::GenesisClosed))]
    #[case(RegistrationError::Store(UserStoreError::corrupted("gap")), None)]
    fn maps_errors_to_reasons(
        #[case] error: RegistrationError,
        #[case] expected: Option<RejectionReason>,
    ) {
        assert_eq!(RejectionReason::from_error(&error), expected);
    }

    #[rstest]
    #[case(RejectionReason::DuplicateIdentity, "duplicate_identity")]
    #[case(RejectionReason::InvalidRole, "invalid_role")]
    #[case(RejectionReason::Unauthorized, "unauthorized")]
    #[case(RejectionReason::UnknownCaller, "unknown_caller")]
    #[case(RejectionReason::NotRegistryOwner, "not_registry_owner")]
    #[case(RejectionReason::GenesisClosed, "genesis_closed")]
    fn rejection_events_carry_code_and_message(
        #[case] reason: RejectionReason,
        #[case] code: &str,
    ) {
        let event = RegistrationRejectedEvent::new(identity(), identity(), reason);
        assert_eq!(event.code(), code);
        assert_eq!(event.message, reason.message());
    }

    #[test]
    fn messages_are_available_in_const_context() {
        const GENESIS_CLOSED: &str = RejectionReason::GenesisClosed.message();
        assert_eq!(GENESIS_CLOSED, "Genesis has already been performed.");
    }
}
