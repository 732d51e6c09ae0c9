//! Closed role model for registry participants.
//!
//! Callers submit roles as a raw [`RoleCode`], the numeric value the
//! deployment tooling has always used (`1` for managers, `2` for customers).
//! A code only becomes a [`Role`] after validation, so the set of roles held
//! by registered users can never grow beyond the enumeration below. Adding a
//! role is a code change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role held by a registered participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May perform administrative mutations such as registering users.
    Manager,
    /// Ordinary participant without administrative privileges.
    Customer,
}

impl Role {
    /// Every known role, in declaration order.
    pub const ALL: [Self; 2] = [Self::Manager, Self::Customer];

    /// Ordinal used for authorisation comparisons. Higher means more
    /// privilege.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Manager => 2,
            Self::Customer => 1,
        }
    }

    /// Whether this role is at least as privileged as `required`.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }

    /// Wire code for this role.
    #[must_use]
    pub const fn code(self) -> RoleCode {
        match self {
            Self::Manager => RoleCode::MANAGER,
            Self::Customer => RoleCode::CUSTOMER,
        }
    }

    /// Lower-case role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<RoleCode> for Role {
    type Error = RoleError;

    fn try_from(code: RoleCode) -> Result<Self, Self::Error> {
        match code {
            RoleCode::MANAGER => Ok(Self::Manager),
            RoleCode::CUSTOMER => Ok(Self::Customer),
            other => Err(RoleError::InvalidCode { code: other }),
        }
    }
}

/// Raw role value as submitted by a caller, not yet validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleCode(u8);

impl RoleCode {
    /// Code submitted for [`Role::Manager`].
    pub const MANAGER: Self = Self(1);
    /// Code submitted for [`Role::Customer`].
    pub const CUSTOMER: Self = Self(2);

    /// Wrap a raw code.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// The raw numeric value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for RoleCode {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<Role> for RoleCode {
    fn from(role: Role) -> Self {
        role.code()
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses a role name (`manager`, `customer`, any case) or a numeric code.
///
/// Numeric codes outside the known set still parse; they are rejected when a
/// registration validates them.
///
/// # Examples
/// ```
/// use registry::domain::RoleCode;
///
/// assert_eq!("Manager".parse::<RoleCode>(), Ok(RoleCode::MANAGER));
/// assert_eq!("2".parse::<RoleCode>(), Ok(RoleCode::CUSTOMER));
/// assert_eq!("9".parse::<RoleCode>(), Ok(RoleCode::new(9)));
/// assert!("auditor".parse::<RoleCode>().is_err());
/// ```
impl FromStr for RoleCode {
    type Err = RoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Ok(Self(code));
        }
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .map(Role::code)
            .ok_or_else(|| RoleError::UnknownName {
                value: value.to_owned(),
            })
    }
}

/// Errors raised while interpreting role input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// The numeric code does not name a known role.
    #[error("role code {code} is not a known role")]
    InvalidCode {
        /// Offending code.
        code: RoleCode,
    },
    /// The text is neither a role name nor a numeric code.
    #[error("'{value}' is not a role name or code")]
    UnknownName {
        /// Offending input.
        value: String,
    },
}

/// Whether `code` names one of the known roles.
#[must_use]
pub fn is_valid_role(code: RoleCode) -> bool {
    Role::try_from(code).is_ok()
}
