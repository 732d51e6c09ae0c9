//! Audit log that emits structured `tracing` events.

use tracing::{info, warn};

use crate::domain::ports::AuditLog;
use crate::domain::{RegistryEvent, UserRecord};

/// Writes commits at `info` and rejections at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditLog;

fn sequence(record: &UserRecord) -> u64 {
    record.registered_at().sequence
}

impl AuditLog for TracingAuditLog {
    fn record(&self, event: &RegistryEvent) {
        match event {
            RegistryEvent::GenesisBootstrapped(event) => info!(
                deployer = %event.deployer,
                identity = %event.record.identity(),
                display_name = %event.record.display_name(),
                role = %event.record.role(),
                sequence = sequence(&event.record),
                "genesis manager registered"
            ),
            RegistryEvent::UserRegistered(event) => info!(
                registrar = %event.registrar,
                identity = %event.record.identity(),
                display_name = %event.record.display_name(),
                role = %event.record.role(),
                sequence = sequence(&event.record),
                "user registered"
            ),
            RegistryEvent::RegistrationRejected(event) => warn!(
                caller = %event.caller,
                identity = %event.identity,
                code = event.code(),
                "registration rejected: {}",
                event.message
            ),
        }
    }
}
