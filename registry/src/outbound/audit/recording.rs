//! Audit log that keeps events in memory.

use std::sync::{Mutex, PoisonError};

use crate::domain::RegistryEvent;
use crate::domain::ports::AuditLog;

/// Collects every recorded event, in order. Used by tests and by callers
/// that want to inspect what a run did.
#[derive(Debug, Default)]
pub struct RecordingAuditLog {
    events: Mutex<Vec<RegistryEvent>>,
}

impl RecordingAuditLog {
    /// Copy of the events recorded so far.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuditLog for RecordingAuditLog {
    fn record(&self, event: &RegistryEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, RegistrationRejectedEvent, RejectionReason};

    #[test]
    fn keeps_events_in_order() {
        let log = RecordingAuditLog::default();
        let caller = Identity::new("0xA1").expect("identity");
        for reason in [RejectionReason::GenesisClosed, RejectionReason::UnknownCaller] {
            log.record(&RegistryEvent::RegistrationRejected(
                RegistrationRejectedEvent::new(caller.clone(), caller.clone(), reason),
            ));
        }

        let reasons: Vec<RejectionReason> = log
            .events()
            .into_iter()
            .filter_map(|event| match event {
                RegistryEvent::RegistrationRejected(event) => Some(event.reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![RejectionReason::GenesisClosed, RejectionReason::UnknownCaller]
        );
    }
}
