//! Command-line adapter for registry administration.
//!
//! Commands return their output as lines so the binary only has to print
//! them. Mutating commands go through the access guard; `list` and `show`
//! only read.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use roster::{Roster, RosterError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{RegistrySettings, SettingsError, resolve_owner};
use crate::deployment::{DeploymentError, deploy_roster};
use crate::domain::{
    Identity, RegistrationError, RegistrationRequest, RegistryPorts, RoleCode, UserRecord,
    UserValidationError,
};
use crate::outbound::audit::TracingAuditLog;
use crate::outbound::snapshot::{JsonSnapshotUserStore, SnapshotError};
use crate::services::RegistryServices;

/// `registry-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "registry-admin",
    about = "Administer the participant registry snapshot",
    version
)]
pub struct Cli {
    /// Snapshot file; overrides the configured state path.
    #[arg(long, global = true, value_name = "path")]
    pub state: Option<Utf8PathBuf>,
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Administration commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Register every user listed in a roster file.
    Deploy {
        /// Roster JSON file.
        #[arg(long, value_name = "path")]
        roster: Utf8PathBuf,
    },
    /// Register one user on behalf of a manager.
    Register {
        /// Address of the manager submitting the registration.
        #[arg(long, value_name = "address")]
        caller: String,
        /// Address to register.
        #[arg(long, value_name = "address")]
        address: String,
        /// Display name to register.
        #[arg(long, value_name = "name")]
        name: String,
        /// Role name (`manager`, `customer`) or numeric code.
        #[arg(long, value_name = "role")]
        role: RoleCode,
    },
    /// List registered users in registration order.
    List,
    /// Show one registered user.
    Show {
        /// Address to look up.
        address: String,
    },
}

/// Failures surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration is invalid.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The roster could not be loaded.
    #[error(transparent)]
    Roster(#[from] RosterError),
    /// The snapshot could not be opened.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// The deployment stopped early.
    #[error(transparent)]
    Deployment(#[from] DeploymentError),
    /// The registration was refused or failed.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    /// An address or display name argument is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] UserValidationError),
    /// No owner is configured and the snapshot does not exist yet.
    #[error("no registry owner configured and no snapshot at {path}; set REGISTRY_OWNER")]
    MissingOwner {
        /// Snapshot path that was checked.
        path: Utf8PathBuf,
    },
}

/// Execute `cli` and return the lines to print.
///
/// # Errors
///
/// Returns [`CliError`] when configuration, input, the snapshot or the
/// registration itself fails. A duplicate registration is reported as a
/// warning line instead.
pub fn run(cli: &Cli, settings: &RegistrySettings) -> Result<Vec<String>, CliError> {
    let state_path = match &cli.state {
        Some(path) => path.clone(),
        None => settings.state_path()?,
    };
    let configured = settings.owner()?;
    debug!(path = %state_path, "using registry snapshot");

    match &cli.command {
        Command::Deploy { roster } => deploy(&state_path, configured, roster),
        Command::Register {
            caller,
            address,
            name,
            role,
        } => register(&state_path, configured, caller, address, name, *role),
        Command::List => list(&state_path, configured),
        Command::Show { address } => show(&state_path, configured, address),
    }
}

fn open_services(path: &Utf8Path, owner: &Identity) -> Result<RegistryServices, CliError> {
    let store = JsonSnapshotUserStore::open(path, owner)?;
    Ok(RegistryServices::new(
        owner.clone(),
        RegistryPorts {
            store: Arc::new(store),
            audit_log: Arc::new(TracingAuditLog),
            clock: Arc::new(DefaultClock),
        },
    ))
}

/// Services for an existing snapshot, or `None` when there is none yet.
fn open_existing(
    path: &Utf8Path,
    configured: Option<Identity>,
) -> Result<Option<RegistryServices>, CliError> {
    let Some(stored) = JsonSnapshotUserStore::read_owner(path)? else {
        return Ok(None);
    };
    let owner = resolve_owner(configured, Some(stored.clone()))?.unwrap_or(stored);
    open_services(path, &owner).map(Some)
}

fn deploy(
    path: &Utf8Path,
    configured: Option<Identity>,
    roster_path: &Utf8Path,
) -> Result<Vec<String>, CliError> {
    let roster = Roster::from_file(roster_path)?;
    let stored = JsonSnapshotUserStore::read_owner(path)?;
    let owner = match resolve_owner(configured, stored)? {
        Some(owner) => owner,
        None => Identity::new(roster.deployer())?,
    };
    let services = open_services(path, &owner)?;
    let report = deploy_roster(&services, &roster)?;

    let mut lines = vec![format!("Registry owned by {owner} at {path}")];
    lines.extend(report.summary_lines());
    Ok(lines)
}

fn register(
    path: &Utf8Path,
    configured: Option<Identity>,
    caller: &str,
    address: &str,
    name: &str,
    role: RoleCode,
) -> Result<Vec<String>, CliError> {
    let caller = Identity::new(caller)?;
    let request = RegistrationRequest::try_from_strings(address, name, role)?;
    let stored = JsonSnapshotUserStore::read_owner(path)?;
    let has_snapshot = stored.is_some();
    let owner = resolve_owner(configured, stored)?.ok_or_else(|| CliError::MissingOwner {
        path: path.to_path_buf(),
    })?;
    // No snapshot means an empty registry: refuse without creating the file.
    let services = if has_snapshot {
        open_services(path, &owner)?
    } else {
        debug!(path = %path, "no snapshot yet; registering against an empty registry");
        RegistryServices::in_memory(owner)
    };

    match services.guard().register(&caller, request) {
        Ok(record) => Ok(vec![format!("User added: {}", record.display_name())]),
        Err(err) if err.is_duplicate() => {
            warn!(address, "registration skipped: identity already exists");
            Ok(vec![format!("Warning: {name} already exists.")])
        }
        Err(err) => Err(err.into()),
    }
}

fn list(path: &Utf8Path, configured: Option<Identity>) -> Result<Vec<String>, CliError> {
    let Some(services) = open_existing(path, configured)? else {
        return Ok(Vec::new());
    };
    Ok(services
        .queries()
        .records()
        .iter()
        .map(describe)
        .collect())
}

fn show(
    path: &Utf8Path,
    configured: Option<Identity>,
    address: &str,
) -> Result<Vec<String>, CliError> {
    let identity = Identity::new(address)?;
    let Some(services) = open_existing(path, configured)? else {
        return Ok(Vec::new());
    };
    Ok(match services.queries().lookup(&identity) {
        Some(record) => vec![describe(&record)],
        None => vec![format!("{identity} is not registered")],
    })
}

fn describe(record: &UserRecord) -> String {
    let stamp = record.registered_at();
    format!(
        "{}. {} {} ({}) registered {}",
        stamp.sequence,
        record.identity(),
        record.display_name(),
        record.role(),
        stamp.timestamp.to_rfc3339(),
    )
}
