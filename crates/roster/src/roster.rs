//! Roster types and JSON parsing.
//!
//! The roster is loaded from JSON and keeps its entries in file order, which
//! is the order the deployment registers them in.

use std::fmt;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs::Dir};
use serde::Deserialize;

use crate::error::RosterError;

/// Current supported roster version.
pub const SUPPORTED_VERSION: u32 = 1;

/// A deployment roster: the deployer plus the users to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    version: u32,
    deployer: String,
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Parses a roster from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if:
    /// - The JSON is malformed or required fields are missing
    /// - The version is unsupported
    /// - The deployer address is blank
    /// - The users array is empty
    /// - Any entry has a blank address or display name
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let raw: RawRoster = serde_json::from_str(json).map_err(|e| RosterError::ParseError {
            message: e.to_string(),
        })?;

        Self::from_raw(raw)
    }

    /// Loads a roster from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Utf8Path) -> Result<Self, RosterError> {
        let io_error = |message: String| RosterError::IoError {
            path: path.to_path_buf(),
            message,
        };
        let file_name = path
            .file_name()
            .ok_or_else(|| io_error("roster path must be a file".to_owned()))?;
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|e| io_error(e.to_string()))?;
        let contents = dir
            .read_to_string(file_name)
            .map_err(|e| io_error(e.to_string()))?;

        Self::from_json(&contents)
    }

    fn from_raw(raw: RawRoster) -> Result<Self, RosterError> {
        if raw.version != SUPPORTED_VERSION {
            return Err(RosterError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }

        if raw.deployer.trim().is_empty() {
            return Err(RosterError::MissingDeployer);
        }

        if raw.users.is_empty() {
            return Err(RosterError::EmptyUsers);
        }

        let entries = raw
            .users
            .into_iter()
            .enumerate()
            .map(|(index, user)| {
                if user.address.trim().is_empty() {
                    return Err(RosterError::BlankAddress { index });
                }
                if user.display_name.trim().is_empty() {
                    return Err(RosterError::BlankDisplayName { index });
                }
                Ok(RosterEntry {
                    address: user.address,
                    display_name: user.display_name,
                    role: user.role,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: raw.version,
            deployer: raw.deployer,
            entries,
        })
    }

    /// Returns the roster version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the deployer address as written in the roster.
    #[must_use]
    pub fn deployer(&self) -> &str {
        &self.deployer
    }

    /// Returns the user entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }
}

/// A single participant listed in the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    address: String,
    display_name: String,
    role: RosterRole,
}

impl RosterEntry {
    /// Returns the participant address as written in the roster.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the participant display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the role as written in the roster.
    #[must_use]
    pub const fn role(&self) -> &RosterRole {
        &self.role
    }
}

/// Role value as written in the roster: a numeric code or a role name.
///
/// The roster does not interpret the value; the registry decides whether it
/// names a known role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RosterRole {
    /// Numeric role code, e.g. `1` for a manager.
    Code(u8),
    /// Role name, e.g. `"customer"`.
    Name(String),
}

impl fmt::Display for RosterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Raw JSON representation for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoster {
    version: u32,
    deployer: String,
    users: Vec<RawRosterEntry>,
}

/// Raw JSON representation of a roster entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRosterEntry {
    address: String,
    display_name: String,
    role: RosterRole,
}
