//! Composition of the registry services over one shared registry.

use std::sync::Arc;

use mockable::DefaultClock;

use crate::domain::ports::AuditLog;
use crate::domain::{AccessGuard, Identity, QueryService, RegistryPorts, UserRegistry};
use crate::outbound::audit::TracingAuditLog;
use crate::outbound::memory::InMemoryUserStore;

/// The registry together with its guarded mutation path and its read path.
#[derive(Clone)]
pub struct RegistryServices {
    registry: Arc<UserRegistry>,
    guard: AccessGuard,
    queries: QueryService,
}

impl RegistryServices {
    /// Wire the services over a registry owned by `owner`.
    pub fn new(owner: Identity, ports: RegistryPorts) -> Self {
        let registry = Arc::new(UserRegistry::new(owner, ports));
        Self {
            guard: AccessGuard::new(Arc::clone(&registry)),
            queries: QueryService::new(Arc::clone(&registry)),
            registry,
        }
    }

    /// Services over a fresh in-memory store, auditing to `tracing`.
    pub fn in_memory(owner: Identity) -> Self {
        Self::in_memory_with_audit(owner, Arc::new(TracingAuditLog))
    }

    /// Services over a fresh in-memory store with the given audit log.
    pub fn in_memory_with_audit(owner: Identity, audit_log: Arc<dyn AuditLog>) -> Self {
        Self::new(
            owner,
            RegistryPorts {
                store: Arc::new(InMemoryUserStore::new()),
                audit_log,
                clock: Arc::new(DefaultClock),
            },
        )
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<UserRegistry> {
        &self.registry
    }

    /// Guarded entry point for mutations.
    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// Read-only queries.
    pub fn queries(&self) -> &QueryService {
        &self.queries
    }

    /// Identity that owns the registry.
    pub fn owner(&self) -> &Identity {
        self.registry.owner()
    }
}
