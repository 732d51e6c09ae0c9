//! User store persisted as a JSON snapshot file.
//!
//! The snapshot file is the source of truth. Each insert takes the
//! snapshot's advisory lock, reloads and revalidates the file, applies the
//! insert and rewrites the file atomically, so stores in different
//! processes never commit over each other. Readers use the table published
//! by the last successful commit and never wait on disk I/O.

use std::io;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::atomic_io::write_atomic;
use super::error::SnapshotError;
use super::file_lock::SnapshotLock;
use crate::domain::ports::{InsertCondition, InsertOutcome, UserStore, UserStoreError};
use crate::domain::{Identity, UserRecord, UserRegistration};
use crate::outbound::memory::record_table::RecordTable;

/// Snapshot format version written and accepted by this adapter.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotDocument {
    version: u32,
    owner: Identity,
    users: Vec<UserRecord>,
}

#[derive(Debug, Serialize)]
struct SnapshotView<'a> {
    version: u32,
    owner: &'a Identity,
    users: &'a [UserRecord],
}

/// Where the snapshot lives: an open parent directory plus the file name.
#[derive(Debug)]
struct SnapshotLocation {
    dir: Dir,
    file_name: String,
    lock_name: String,
    path: Utf8PathBuf,
}

impl SnapshotLocation {
    fn open(path: &Utf8Path) -> Result<Self, SnapshotError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| SnapshotError::InvalidPath {
                path: path.to_path_buf(),
            })?
            .to_owned();
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| {
            SnapshotError::Io {
                path: parent.to_path_buf(),
                message: err.to_string(),
            }
        })?;
        Ok(Self {
            dir,
            lock_name: format!("{file_name}.lock"),
            file_name,
            path: path.to_path_buf(),
        })
    }

    fn lock(&self) -> Result<SnapshotLock, SnapshotError> {
        SnapshotLock::acquire(&self.dir, &self.lock_name).map_err(|err| SnapshotError::Io {
            path: self.lock_path(),
            message: err.to_string(),
        })
    }

    fn lock_path(&self) -> Utf8PathBuf {
        self.path.with_file_name(&self.lock_name)
    }

    fn read(&self) -> Result<Option<SnapshotDocument>, SnapshotError> {
        let contents = match self.dir.read_to_string(&self.file_name) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(&err)),
        };
        self.parse(&contents).map(Some)
    }

    /// Load the stored table, checking it belongs to `owner`.
    fn load(&self, owner: &Identity) -> Result<Option<RecordTable>, SnapshotError> {
        let Some(document) = self.read()? else {
            return Ok(None);
        };
        if &document.owner != owner {
            return Err(SnapshotError::OwnerMismatch {
                expected: owner.clone(),
                stored: document.owner,
            });
        }
        RecordTable::from_records(document.users)
            .map(Some)
            .map_err(|source| SnapshotError::Corrupted {
                path: self.path.clone(),
                source,
            })
    }

    fn parse(&self, contents: &str) -> Result<SnapshotDocument, SnapshotError> {
        let value: serde_json::Value =
            serde_json::from_str(contents).map_err(|err| self.parse_error(&err))?;
        let version = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| SnapshotError::Parse {
                path: self.path.clone(),
                message: "missing numeric version".to_owned(),
            })?;
        if version != u64::from(SNAPSHOT_VERSION) {
            return Err(SnapshotError::UnsupportedVersion {
                expected: SNAPSHOT_VERSION,
                actual: version,
            });
        }
        serde_json::from_value(value).map_err(|err| self.parse_error(&err))
    }

    fn write(&self, owner: &Identity, users: &[UserRecord]) -> Result<(), SnapshotError> {
        let view = SnapshotView {
            version: SNAPSHOT_VERSION,
            owner,
            users,
        };
        let contents = serde_json::to_string_pretty(&view).map_err(|err| SnapshotError::Io {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        write_atomic(&self.dir, &self.file_name, &contents).map_err(|err| self.io_error(&err))
    }

    fn io_error(&self, err: &io::Error) -> SnapshotError {
        SnapshotError::Io {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }

    fn parse_error(&self, err: &serde_json::Error) -> SnapshotError {
        SnapshotError::Parse {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

/// [`UserStore`] backed by a JSON snapshot file that may be shared with
/// other stores and processes.
#[derive(Debug)]
pub struct JsonSnapshotUserStore {
    location: SnapshotLocation,
    owner: Identity,
    /// Serialises this store's writers before they contend for the file lock.
    writer: Mutex<()>,
    published: RwLock<Arc<RecordTable>>,
}

impl JsonSnapshotUserStore {
    /// Open the snapshot at `path` for `owner`, creating an empty snapshot
    /// when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the file cannot be read or written, is
    /// malformed, breaks a registry invariant, or belongs to another owner.
    pub fn open(path: &Utf8Path, owner: &Identity) -> Result<Self, SnapshotError> {
        let location = SnapshotLocation::open(path)?;
        let table = {
            let _lock = location.lock()?;
            if let Some(table) = location.load(owner)? {
                debug!(path = %path, records = table.len(), "loaded registry snapshot");
                table
            } else {
                location.write(owner, &[])?;
                info!(path = %path, owner = %owner, "created empty registry snapshot");
                RecordTable::default()
            }
        };

        Ok(Self {
            location,
            owner: owner.clone(),
            writer: Mutex::new(()),
            published: RwLock::new(Arc::new(table)),
        })
    }

    /// Owner recorded in the snapshot at `path`, or `None` if there is no
    /// snapshot yet.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the file exists but cannot be read or
    /// parsed.
    pub fn read_owner(path: &Utf8Path) -> Result<Option<Identity>, SnapshotError> {
        Ok(SnapshotLocation::open(path)?
            .read()?
            .map(|document| document.owner))
    }

    /// Owner this store was opened for.
    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Utf8Path {
        &self.location.path
    }

    /// Path of the advisory lock file writers hold while committing.
    pub fn lock_path(&self) -> Utf8PathBuf {
        self.location.lock_path()
    }

    fn current(&self) -> Arc<RecordTable> {
        Arc::clone(&self.published.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn publish(&self, table: RecordTable) {
        *self.published.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
    }

    /// Reload the table from disk; the caller must hold the snapshot lock.
    fn reload(&self) -> Result<RecordTable, SnapshotError> {
        self.location
            .load(&self.owner)?
            .ok_or_else(|| SnapshotError::Io {
                path: self.location.path.clone(),
                message: "snapshot file disappeared".to_owned(),
            })
    }
}

impl UserStore for JsonSnapshotUserStore {
    fn insert(
        &self,
        registration: UserRegistration,
        condition: InsertCondition,
    ) -> Result<InsertOutcome, UserStoreError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _lock = self.location.lock()?;
        let mut table = self.reload()?;

        let outcome = table.try_insert(registration, condition)?;
        if let InsertOutcome::Inserted(record) = &outcome {
            if let Err(err) = self.location.write(&self.owner, table.records()) {
                warn!(
                    identity = %record.identity(),
                    error = %err,
                    "snapshot write failed; nothing committed"
                );
                return Err(UserStoreError::persistence(err.to_string()));
            }
            debug!(
                identity = %record.identity(),
                sequence = record.registered_at().sequence,
                path = %self.location.path,
                "record committed to snapshot"
            );
        }
        self.publish(table);
        Ok(outcome)
    }

    fn find(&self, identity: &Identity) -> Option<UserRecord> {
        self.current().find(identity)
    }

    fn identities(&self) -> Vec<Identity> {
        self.current().identities()
    }

    fn records(&self) -> Vec<UserRecord> {
        self.current().records().to_vec()
    }

    fn len(&self) -> usize {
        self.current().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, Role};
    use chrono::Utc;
    use rstest::rstest;
    use tempfile::TempDir;

    fn state_path(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().join("registry-state.json"))
            .expect("utf-8 temp path")
    }

    fn owner() -> Identity {
        Identity::new("0xA1").expect("identity")
    }

    #[rstest]
    fn creates_an_empty_snapshot_for_a_new_path() {
        let temp = TempDir::new().expect("temp dir");
        let path = state_path(&temp);

        let store = JsonSnapshotUserStore::open(&path, &owner()).expect("open");

        assert!(store.is_empty());
        assert_eq!(store.path(), path.as_path());
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read"))
                .expect("valid json");
        assert_eq!(
            written,
            serde_json::json!({ "version": 1, "owner": "0xA1", "users": [] })
        );
    }

    #[rstest]
    fn reports_missing_snapshot_owner_as_none() {
        let temp = TempDir::new().expect("temp dir");
        assert_eq!(
            JsonSnapshotUserStore::read_owner(&state_path(&temp)),
            Ok(None)
        );
    }

    #[rstest]
    #[case::future_version(
        r#"{"version": 2, "owner": "0xA1", "users": []}"#,
        |err: &SnapshotError| matches!(err, SnapshotError::UnsupportedVersion { actual: 2, .. })
    )]
    #[case::not_json("nope", |err: &SnapshotError| matches!(err, SnapshotError::Parse { .. }))]
    #[case::bad_role(
        r#"{"version": 1, "owner": "0xA1", "users": [{"identity": "0xA1", "displayName": "Roni", "role": "auditor", "registeredAt": {"sequence": 1, "timestamp": "2026-10-19T09:30:00Z"}}]}"#,
        |err: &SnapshotError| matches!(err, SnapshotError::Parse { .. })
    )]
    #[case::gap(
        r#"{"version": 1, "owner": "0xA1", "users": [{"identity": "0xA1", "displayName": "Roni", "role": "manager", "registeredAt": {"sequence": 2, "timestamp": "2026-10-19T09:30:00Z"}}]}"#,
        |err: &SnapshotError| matches!(err, SnapshotError::Corrupted { .. })
    )]
    fn rejects_invalid_snapshots(
        #[case] contents: &str,
        #[case] is_expected: fn(&SnapshotError) -> bool,
    ) {
        let temp = TempDir::new().expect("temp dir");
        let path = state_path(&temp);
        std::fs::write(&path, contents).expect("write snapshot");

        let error = JsonSnapshotUserStore::open(&path, &owner()).expect_err("invalid snapshot");

        assert!(is_expected(&error), "unexpected error: {error:?}");
    }

    #[rstest]
    fn persists_each_commit() {
        let temp = TempDir::new().expect("temp dir");
        let path = state_path(&temp);
        let store = JsonSnapshotUserStore::open(&path, &owner()).expect("open");

        store
            .insert(
                UserRegistration::new(
                    owner(),
                    DisplayName::new("Roni").expect("name"),
                    Role::Manager,
                    Utc::now(),
                ),
                InsertCondition::RegistryEmpty,
            )
            .expect("insert");

        let reopened = JsonSnapshotUserStore::open(&path, &owner()).expect("reopen");
        assert_eq!(reopened.identities(), vec![owner()]);
        assert_eq!(reopened.records(), store.records());
    }
}
