//! Registers a deployment roster against the registry.
//!
//! The flow matches the long-standing deployment script: seed the first
//! manager, then register everyone else on that manager's behalf, warning
//! about users that already exist instead of failing. Re-running a
//! deployment is therefore safe.

use std::fmt;

use roster::{Roster, RosterEntry, RosterRole};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{
    DisplayName, ErrorDisposition, Identity, RegistrationError, RegistrationRequest, Role,
    RoleCode, RoleError, UserRecord, UserValidationError,
};
use crate::services::RegistryServices;

/// Reasons a deployment stops before reaching the end of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeploymentError {
    /// The roster's deployer is not a valid identity.
    #[error("roster deployer {deployer} is invalid: {source}")]
    InvalidDeployer {
        /// Deployer as written in the roster.
        deployer: String,
        /// Validation failure.
        #[source]
        source: UserValidationError,
    },
    /// The roster was written for a different registry owner.
    #[error("roster deployer {deployer} does not own this registry (owner is {owner})")]
    DeployerMismatch {
        /// Deployer named by the roster.
        deployer: Identity,
        /// Owner of the registry.
        owner: Identity,
    },
    /// The registry is empty and the first entry cannot seed it.
    #[error("first roster entry {address} cannot seed the registry: {message}")]
    InvalidGenesisEntry {
        /// Address of the first entry.
        address: String,
        /// Why the entry is unusable.
        message: String,
    },
    /// No roster entry can act as registrar.
    #[error("roster lists no valid manager to register users with")]
    NoRegistrar,
    /// A registration failed in a way that makes continuing unsafe.
    #[error("registering roster entry {index} ({address}) failed: {source}")]
    Registration {
        /// Zero-based roster position.
        index: usize,
        /// Address as written in the roster.
        address: String,
        /// Underlying failure.
        #[source]
        source: RegistrationError,
    },
}

/// What happened to one roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The entry was registered.
    Registered(UserRecord),
    /// The identity was already registered; nothing changed.
    AlreadyPresent,
    /// The entry was refused; deployment continued.
    Rejected {
        /// Human-readable reason.
        reason: String,
    },
}

/// Outcome for one roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    /// Zero-based roster position.
    pub index: usize,
    /// Address as written in the roster.
    pub address: String,
    /// Display name as written in the roster.
    pub display_name: String,
    /// What happened.
    pub outcome: EntryOutcome,
}

impl fmt::Display for EntryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            EntryOutcome::Registered(_) => write!(f, "User added: {}", self.display_name),
            EntryOutcome::AlreadyPresent => {
                write!(f, "Warning: {} already exists.", self.display_name)
            }
            EntryOutcome::Rejected { reason } => {
                write!(f, "Error adding {}: {reason}", self.display_name)
            }
        }
    }
}

/// Result of a completed deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReport {
    /// Per-entry outcomes in roster order.
    pub entries: Vec<EntryReport>,
    /// Every registered identity after the deployment, oldest first.
    pub users: Vec<Identity>,
}

impl DeploymentReport {
    /// Entries that were newly registered.
    pub fn registered(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, EntryOutcome::Registered(_)))
    }

    /// Console summary: one line per entry, then the address list.
    pub fn summary_lines(&self) -> Vec<String> {
        let addresses = self
            .users
            .iter()
            .map(Identity::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.entries
            .iter()
            .map(ToString::to_string)
            .chain(std::iter::once(format!("User Addresses: [{addresses}]")))
            .collect()
    }
}

/// Entry whose identity and display name validated.
struct ParsedEntry {
    identity: Identity,
    display_name: DisplayName,
    role: RoleCode,
}

#[derive(Debug, Error)]
enum EntryError {
    #[error(transparent)]
    Validation(#[from] UserValidationError),
    #[error(transparent)]
    Role(#[from] RoleError),
}

fn parse_entry(entry: &RosterEntry) -> Result<ParsedEntry, EntryError> {
    let role = match entry.role() {
        RosterRole::Code(code) => RoleCode::new(*code),
        RosterRole::Name(name) => name.parse()?,
    };
    Ok(ParsedEntry {
        identity: Identity::new(entry.address())?,
        display_name: DisplayName::new(entry.display_name())?,
        role,
    })
}

fn report(index: usize, entry: &RosterEntry, outcome: EntryOutcome) -> EntryReport {
    EntryReport {
        index,
        address: entry.address().to_owned(),
        display_name: entry.display_name().to_owned(),
        outcome,
    }
}

/// Register every roster entry.
///
/// # Errors
///
/// Returns [`DeploymentError`] when the roster does not belong to this
/// registry, cannot seed an empty registry, names no usable manager, or a
/// registration fails with a non-recoverable error. Entries processed before
/// the failure stay registered.
pub fn deploy_roster(
    services: &RegistryServices,
    roster: &Roster,
) -> Result<DeploymentReport, DeploymentError> {
    let deployer =
        Identity::new(roster.deployer()).map_err(|source| DeploymentError::InvalidDeployer {
            deployer: roster.deployer().to_owned(),
            source,
        })?;
    if &deployer != services.owner() {
        return Err(DeploymentError::DeployerMismatch {
            deployer,
            owner: services.owner().clone(),
        });
    }

    let mut reports = Vec::with_capacity(roster.entries().len());
    let mut remaining = roster.entries().iter().enumerate();

    if services.queries().count() == 0 {
        let (index, first) = remaining.next().ok_or(DeploymentError::NoRegistrar)?;
        let outcome = seed(services, &deployer, index, first)?;
        reports.push(report(index, first, outcome));
    }

    let registrar = roster
        .entries()
        .iter()
        .filter_map(|entry| parse_entry(entry).ok())
        .find(|entry| entry.role == RoleCode::MANAGER)
        .map(|entry| entry.identity)
        .ok_or(DeploymentError::NoRegistrar)?;
    info!(registrar = %registrar, "registering roster entries");

    for (index, entry) in remaining {
        let outcome = register_entry(services, &registrar, index, entry)?;
        reports.push(report(index, entry, outcome));
    }

    let users = services.queries().all();
    info!(users = users.len(), "deployment finished");
    Ok(DeploymentReport {
        entries: reports,
        users,
    })
}

fn seed(
    services: &RegistryServices,
    deployer: &Identity,
    index: usize,
    entry: &RosterEntry,
) -> Result<EntryOutcome, DeploymentError> {
    let invalid = |message: String| DeploymentError::InvalidGenesisEntry {
        address: entry.address().to_owned(),
        message,
    };
    let parsed = parse_entry(entry).map_err(|err| invalid(err.to_string()))?;
    if Role::try_from(parsed.role) != Ok(Role::Manager) {
        return Err(invalid(format!(
            "role {} is not the manager role",
            entry.role()
        )));
    }

    match services
        .guard()
        .bootstrap_genesis(deployer, parsed.identity, parsed.display_name)
    {
        Ok(record) => {
            info!(identity = %record.identity(), "User added: {}", entry.display_name());
            Ok(EntryOutcome::Registered(record))
        }
        Err(err) => classify(index, entry, err),
    }
}

fn register_entry(
    services: &RegistryServices,
    registrar: &Identity,
    index: usize,
    entry: &RosterEntry,
) -> Result<EntryOutcome, DeploymentError> {
    let parsed = match parse_entry(entry) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(index, address = entry.address(), error = %err, "roster entry is invalid");
            return Ok(EntryOutcome::Rejected {
                reason: err.to_string(),
            });
        }
    };
    let request = RegistrationRequest::new(parsed.identity, parsed.display_name, parsed.role);
    match services.guard().register(registrar, request) {
        Ok(record) => {
            info!(identity = %record.identity(), "User added: {}", entry.display_name());
            Ok(EntryOutcome::Registered(record))
        }
        Err(err) => classify(index, entry, err),
    }
}

fn classify(
    index: usize,
    entry: &RosterEntry,
    err: RegistrationError,
) -> Result<EntryOutcome, DeploymentError> {
    match err.disposition() {
        ErrorDisposition::Expected if err.is_duplicate() => {
            warn!(address = entry.address(), "Warning: {} already exists.", entry.display_name());
            Ok(EntryOutcome::AlreadyPresent)
        }
        ErrorDisposition::Expected => {
            warn!(address = entry.address(), error = %err, "Error adding {}", entry.display_name());
            Ok(EntryOutcome::Rejected {
                reason: err.to_string(),
            })
        }
        ErrorDisposition::ProgrammerError | ErrorDisposition::Fatal => {
            error!(index, address = entry.address(), error = %err, "deployment aborted");
            Err(DeploymentError::Registration {
                index,
                address: entry.address().to_owned(),
                source: err,
            })
        }
    }
}
