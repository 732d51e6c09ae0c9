//! Atomic snapshot writes.
//!
//! Contents go to a hidden temporary file beside the target, are synced,
//! and then renamed over the target. Readers see either the previous
//! snapshot or the new one, never a partial write.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use cap_std::fs::{Dir, OpenOptions};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary file that removes itself unless it was renamed into place.
struct PendingFile<'dir> {
    dir: &'dir Dir,
    name: String,
    committed: bool,
}

impl<'dir> PendingFile<'dir> {
    fn create(dir: &'dir Dir, target_name: &str, contents: &str) -> io::Result<Self> {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let name = format!(".{target_name}.tmp.{}.{counter}", std::process::id());
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        let mut file = dir.open_with(&name, &options)?;
        let pending = Self {
            dir,
            name,
            committed: false,
        };
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        Ok(pending)
    }

    fn persist(mut self, target_name: &str) -> io::Result<()> {
        replace(self.dir, &self.name, target_name)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PendingFile<'_> {
    fn drop(&mut self) {
        if !self.committed {
            // Cleanup failure leaves a stray hidden file only.
            drop(self.dir.remove_file(&self.name));
        }
    }
}

/// Replace `target_name` in `dir` with `contents`.
pub(crate) fn write_atomic(dir: &Dir, target_name: &str, contents: &str) -> io::Result<()> {
    PendingFile::create(dir, target_name, contents)?.persist(target_name)?;
    sync_directory(dir);
    Ok(())
}

#[cfg(windows)]
fn replace(dir: &Dir, from: &str, to: &str) -> io::Result<()> {
    // Windows rename refuses to overwrite.
    match dir.remove_file(to) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(from, dir, to)
}

#[cfg(not(windows))]
fn replace(dir: &Dir, from: &str, to: &str) -> io::Result<()> {
    dir.rename(from, dir, to)
}

fn sync_directory(dir: &Dir) {
    // Best effort; the rename is already visible.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
}
