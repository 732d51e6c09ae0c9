//! Registry domain: roles, identities, records and the services that guard
//! and query them.
//!
//! Purpose: keep registration rules free of storage and transport details.
//! Adapters plug in through [`ports`].

pub mod access_guard;
pub mod error;
pub mod ports;
pub mod query_service;
pub mod role;
pub mod user;
pub mod user_events;
pub mod user_registry;

pub use self::access_guard::{AccessDenied, AccessGuard, GuardedOperation};
pub use self::error::{ErrorDisposition, RegistrationError};
pub use self::query_service::QueryService;
pub use self::role::{Role, RoleCode, RoleError, is_valid_role};
pub use self::user::{
    DISPLAY_NAME_MAX, DISPLAY_NAME_MIN, DisplayName, IDENTITY_HEX_DIGITS_MAX, Identity,
    RegistrationRequest, RegistrationStamp, UserRecord, UserRegistration, UserValidationError,
};
pub use self::user_events::{
    GenesisBootstrappedEvent, RegistrationRejectedEvent, RegistryEvent, RejectionReason,
    UserRegisteredEvent,
};
pub use self::user_registry::{RegistryPorts, UserRegistry};
