//! Advisory lock serialising snapshot writers across processes.
//!
//! Every store opened on the same snapshot takes an exclusive OS-level lock
//! (`flock` on Unix, `LockFileEx` on Windows) on a sibling `.lock` file
//! before it reads, checks and rewrites the snapshot. The lock is released
//! when the guard drops, or by the OS if the process dies.

use std::fs::File;
use std::io;

use cap_std::fs::{Dir, OpenOptions};
use fs2::FileExt;
use tracing::{debug, warn};

/// Exclusive hold on a snapshot's lock file.
#[derive(Debug)]
pub(crate) struct SnapshotLock {
    file: File,
    name: String,
}

impl SnapshotLock {
    /// Block until the lock file `name` in `dir` is exclusively held.
    pub(crate) fn acquire(dir: &Dir, name: &str) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.create(true).write(true).truncate(false);
        let file = dir.open_with(name, &options)?.into_std();
        FileExt::lock_exclusive(&file)?;
        debug!(lock = name, "snapshot lock acquired");
        Ok(Self {
            file,
            name: name.to_owned(),
        })
    }
}

impl Drop for SnapshotLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            // Closing the handle below still releases the lock.
            warn!(lock = %self.name, error = %err, "failed to release snapshot lock");
        }
    }
}
