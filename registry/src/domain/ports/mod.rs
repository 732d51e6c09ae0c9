//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod audit_log;
mod user_store;

pub use audit_log::{AuditLog, NoOpAuditLog};
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{InsertCondition, InsertOutcome, UserStore, UserStoreError};
