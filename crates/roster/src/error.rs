//! Error types for roster parsing.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or validating a deployment roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// The roster file could not be read.
    #[error("failed to read roster file at '{path}': {message}")]
    IoError {
        /// Path to the roster file.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The roster JSON is malformed or missing required fields.
    #[error("invalid roster JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The roster version is not supported.
    #[error("unsupported roster version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the roster.
        actual: u32,
    },

    /// The deployer address is blank.
    #[error("roster deployer address must not be blank")]
    MissingDeployer,

    /// The roster lists no users.
    #[error("roster contains no users")]
    EmptyUsers,

    /// A user entry has a blank address.
    #[error("roster entry {index} has a blank address")]
    BlankAddress {
        /// Index of the offending entry.
        index: usize,
    },

    /// A user entry has a blank display name.
    #[error("roster entry {index} has a blank display name")]
    BlankDisplayName {
        /// Index of the offending entry.
        index: usize,
    },
}
