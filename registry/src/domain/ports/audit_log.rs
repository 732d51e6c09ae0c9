//! Driven port for observing registry outcomes.
//!
//! Implementations may log, record for tests, or discard. Recording never
//! fails from the registry's point of view; adapters swallow their own
//! errors so auditing cannot change a registration outcome.

use crate::domain::user_events::RegistryEvent;

/// Sink for committed registrations and rejections.
pub trait AuditLog: Send + Sync {
    /// Record one event.
    fn record(&self, event: &RegistryEvent);
}

/// Audit log that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAuditLog;

impl AuditLog for NoOpAuditLog {
    fn record(&self, _event: &RegistryEvent) {}
}
