//! Role-gated participant registry.
//!
//! Participants are identified by account addresses and hold exactly one
//! role. Registration is an atomic insert-if-absent: a second registration
//! of the same identity fails with a dedicated duplicate error and leaves
//! the first record untouched, however the two attempts interleave.
//!
//! The crate follows a hexagonal layout:
//! - [`domain`] holds roles, identities, records, the registry, its access
//!   guard and query service, and the ports they depend on.
//! - [`outbound`] implements the ports: in-memory and JSON snapshot stores
//!   and audit sinks.
//! - [`inbound`] drives the domain from the `registry-admin` command line.
//! - [`deployment`] registers a roster file the way the deployment tooling
//!   always has.

pub mod config;
pub mod deployment;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod services;

pub use services::RegistryServices;
