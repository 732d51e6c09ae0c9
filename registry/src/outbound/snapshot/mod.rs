//! JSON snapshot store adapter.

mod atomic_io;
mod error;
mod file_lock;
mod json_snapshot_user_store;

pub use error::SnapshotError;
pub use json_snapshot_user_store::{JsonSnapshotUserStore, SNAPSHOT_VERSION};
