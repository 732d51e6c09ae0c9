//! Registry administration settings loaded via OrthoConfig.

use std::path::PathBuf;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Identity, UserValidationError};

const DEFAULT_STATE_PATH: &str = "registry-state.json";

/// Problems with configured values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The configured owner is not a valid identity.
    #[error("configured owner {value} is invalid: {source}")]
    InvalidOwner {
        /// Configured text.
        value: String,
        /// Validation failure.
        #[source]
        source: UserValidationError,
    },
    /// The configured owner disagrees with the snapshot.
    #[error("configured owner {configured} does not match snapshot owner {stored}")]
    OwnerConflict {
        /// Owner from configuration.
        configured: Identity,
        /// Owner stored in the snapshot.
        stored: Identity,
    },
    /// The state path is not valid UTF-8.
    #[error("state path {path} is not valid UTF-8")]
    NonUtf8StatePath {
        /// Lossy rendering of the path.
        path: String,
    },
}

/// Settings for the `registry-admin` tool.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRY")]
pub struct RegistrySettings {
    /// Snapshot file holding the registry state.
    pub state_path: Option<PathBuf>,
    /// Address of the registry owner (the deployer).
    pub owner: Option<String>,
    /// Emit logs as JSON instead of human-readable text.
    #[ortho_config(default = false)]
    pub json_logs: bool,
}

impl RegistrySettings {
    /// Configured snapshot path, falling back to `registry-state.json`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NonUtf8StatePath`] for paths that are not
    /// UTF-8.
    pub fn state_path(&self) -> Result<Utf8PathBuf, SettingsError> {
        let path = self
            .state_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH));
        Utf8PathBuf::from_path_buf(path).map_err(|path| SettingsError::NonUtf8StatePath {
            path: path.to_string_lossy().into_owned(),
        })
    }

    /// Configured owner, validated.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidOwner`] when the value is not an
    /// identity.
    pub fn owner(&self) -> Result<Option<Identity>, SettingsError> {
        self.owner
            .as_deref()
            .map(|value| {
                Identity::new(value.trim()).map_err(|source| SettingsError::InvalidOwner {
                    value: value.to_owned(),
                    source,
                })
            })
            .transpose()
    }
}

/// Pick the registry owner from configuration and the stored snapshot.
///
/// # Errors
///
/// Returns [`SettingsError::OwnerConflict`] when both are present and differ.
pub fn resolve_owner(
    configured: Option<Identity>,
    stored: Option<Identity>,
) -> Result<Option<Identity>, SettingsError> {
    match (configured, stored) {
        (Some(configured), Some(stored)) if configured != stored => {
            Err(SettingsError::OwnerConflict { configured, stored })
        }
        (Some(owner), _) | (None, Some(owner)) => Ok(Some(owner)),
        (None, None) => Ok(None),
    }
}
