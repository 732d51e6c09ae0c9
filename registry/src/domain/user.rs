//! Participant identities and registry records.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::role::{Role, RoleCode};

/// Reasons an address or display name is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// The identity string is empty.
    #[error("identity must not be empty")]
    EmptyIdentity,
    /// The identity has surrounding whitespace or lacks the `0x` prefix.
    #[error("identity must start with 0x")]
    IdentityMissingPrefix,
    /// The identity has no digits after the prefix, or a non-hex digit.
    #[error("identity needs one or more hex digits after 0x")]
    IdentityInvalidDigits,
    /// The identity has more hex digits than an account address.
    #[error("identity is limited to {max} hex digits")]
    IdentityTooLong {
        /// Maximum number of hex digits.
        max: usize,
    },
    /// The display name is empty once trimmed.
    #[error("display name is blank")]
    EmptyDisplayName,
    /// The display name is shorter than the minimum.
    #[error("display name needs at least {min} characters")]
    DisplayNameTooShort {
        /// Minimum number of characters.
        min: usize,
    },
    /// The display name is longer than the maximum.
    #[error("display name is limited to {max} characters")]
    DisplayNameTooLong {
        /// Maximum number of characters.
        max: usize,
    },
    /// The display name contains characters outside the allowed set.
    #[error("display name accepts letters, digits, spaces and underscores only")]
    DisplayNameInvalidCharacters,
}

/// Maximum number of hex digits in an identity (a 20-byte account address).
pub const IDENTITY_HEX_DIGITS_MAX: usize = 40;
/// Fewest characters a display name may have.
pub const DISPLAY_NAME_MIN: usize = 3;
/// Most characters a display name may have.
pub const DISPLAY_NAME_MAX: usize = 32;

static DISPLAY_NAME_CHARSET: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_ ]+$").ok());

/// Validated string wrappers share their conversions; only the check differs.
macro_rules! validated_string {
    ($name:ident, $check:path) => {
        impl $name {
            fn from_owned(value: String) -> Result<Self, UserValidationError> {
                $check(&value)?;
                Ok(Self(value))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = UserValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::from_owned(value)
            }
        }
    };
}

/// Externally supplied account address identifying a participant.
///
/// Equality is exact: `0xA1` and `0xa1` are different identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Parse an account address.
    pub fn new(identity: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(identity.as_ref().to_owned())
    }
}

fn check_identity(raw: &str) -> Result<(), UserValidationError> {
    if raw.is_empty() {
        return Err(UserValidationError::EmptyIdentity);
    }
    let digits = raw
        .strip_prefix("0x")
        .ok_or(UserValidationError::IdentityMissingPrefix)?;
    match digits.len() {
        0 => Err(UserValidationError::IdentityInvalidDigits),
        _ if !digits.bytes().all(|b| b.is_ascii_hexdigit()) => {
            Err(UserValidationError::IdentityInvalidDigits)
        }
        len if len > IDENTITY_HEX_DIGITS_MAX => Err(UserValidationError::IdentityTooLong {
            max: IDENTITY_HEX_DIGITS_MAX,
        }),
        _ => Ok(()),
    }
}

validated_string!(Identity, check_identity);

/// Name shown for a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Check and wrap a display name.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(display_name.into())
    }
}

fn check_display_name(raw: &str) -> Result<(), UserValidationError> {
    if raw.trim().is_empty() {
        return Err(UserValidationError::EmptyDisplayName);
    }
    match raw.chars().count() {
        n if n < DISPLAY_NAME_MIN => Err(UserValidationError::DisplayNameTooShort {
            min: DISPLAY_NAME_MIN,
        }),
        n if n > DISPLAY_NAME_MAX => Err(UserValidationError::DisplayNameTooLong {
            max: DISPLAY_NAME_MAX,
        }),
        _ if DISPLAY_NAME_CHARSET
            .as_ref()
            .is_some_and(|charset| charset.is_match(raw)) =>
        {
            Ok(())
        }
        _ => Err(UserValidationError::DisplayNameInvalidCharacters),
    }
}

validated_string!(DisplayName, check_display_name);

/// When a record entered the registry.
///
/// `sequence` is the 1-based insertion position and is authoritative for
/// ordering; `timestamp` is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct RegistrationStamp {
    /// 1-based insertion position.
    pub sequence: u64,
    /// Clock reading taken when the registration was submitted.
    pub timestamp: DateTime<Utc>,
}

/// A committed registry entry.
///
/// ## Invariants
/// - Created exactly once per identity and never mutated afterwards.
/// - `role` is always one of [`Role::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct UserRecord {
    identity: Identity,
    display_name: DisplayName,
    role: Role,
    registered_at: RegistrationStamp,
}

impl UserRecord {
    /// Participant identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Display name supplied at registration.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Role granted at registration.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Insertion stamp.
    pub fn registered_at(&self) -> RegistrationStamp {
        self.registered_at
    }
}

/// A validated registration awaiting its sequence number from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRegistration {
    identity: Identity,
    display_name: DisplayName,
    role: Role,
    timestamp: DateTime<Utc>,
}

impl UserRegistration {
    /// Build a pending registration.
    pub fn new(
        identity: Identity,
        display_name: DisplayName,
        role: Role,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            identity,
            display_name,
            role,
            timestamp,
        }
    }

    /// Identity being registered.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Commit the registration at the given insertion position.
    pub fn into_record(self, sequence: u64) -> UserRecord {
        UserRecord {
            identity: self.identity,
            display_name: self.display_name,
            role: self.role,
            registered_at: RegistrationStamp {
                sequence,
                timestamp: self.timestamp,
            },
        }
    }
}

/// Caller input for a registration: validated identity and display name
/// plus the role code exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    identity: Identity,
    display_name: DisplayName,
    role: RoleCode,
}

impl RegistrationRequest {
    /// Build a request from validated components.
    pub fn new(identity: Identity, display_name: DisplayName, role: impl Into<RoleCode>) -> Self {
        Self {
            identity,
            display_name,
            role: role.into(),
        }
    }

    /// Fallible constructor enforcing identity and display name invariants.
    ///
    /// The role code is carried through unvalidated; the registry rejects
    /// unknown codes with a dedicated error.
    pub fn try_from_strings(
        identity: impl AsRef<str>,
        display_name: impl Into<String>,
        role: impl Into<RoleCode>,
    ) -> Result<Self, UserValidationError> {
        let identity = Identity::new(identity)?;
        let display_name = DisplayName::new(display_name)?;
        Ok(Self::new(identity, display_name, role))
    }

    /// Identity to register.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Display name to register.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Role code as submitted.
    pub fn role(&self) -> RoleCode {
        self.role
    }

    pub(crate) fn into_parts(self) -> (Identity, DisplayName, RoleCode) {
        (self.identity, self.display_name, self.role)
    }
}
