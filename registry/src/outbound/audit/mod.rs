//! Audit log adapters.

mod recording;
mod tracing_audit_log;

pub use recording::RecordingAuditLog;
pub use tracing_audit_log::TracingAuditLog;
