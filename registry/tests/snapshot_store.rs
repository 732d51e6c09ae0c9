//! JSON snapshot store persistence and recovery.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use camino::Utf8PathBuf;
use chrono::{TimeZone, Utc};
use fs2::FileExt;
use registry::domain::ports::{InsertCondition, InsertOutcome, UserStore, UserStoreError};
use registry::domain::{DisplayName, Identity, Role, UserRegistration};
use registry::outbound::snapshot::{JsonSnapshotUserStore, SnapshotError};
use rstest::{fixture, rstest};
use tempfile::TempDir;

const OWNER: &str = "0x32aF180b7F075E4a000041c392aEf5E27B27F910";

struct StateDir {
    temp: TempDir,
    path: Utf8PathBuf,
}

#[fixture]
fn state_dir() -> StateDir {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 temp dir");
    let nested = root.join("state");
    std::fs::create_dir(&nested).expect("create state dir");
    StateDir {
        path: nested.join("registry-state.json"),
        temp,
    }
}

fn owner() -> Identity {
    Identity::new(OWNER).expect("identity")
}

fn registration(raw: &str, role: Role) -> UserRegistration {
    named(raw, "Snapshot User", role)
}

fn named(raw: &str, name: &str, role: Role) -> UserRegistration {
    UserRegistration::new(
        Identity::new(raw).expect("identity"),
        DisplayName::new(name).expect("name"),
        role,
        Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0)
            .single()
            .expect("valid time"),
    )
}

#[rstest]
fn reopening_restores_records_in_order(state_dir: StateDir) {
    let store = JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect("open");
    store
        .insert(registration(OWNER, Role::Manager), InsertCondition::RegistryEmpty)
        .expect("genesis insert");
    store
        .insert(registration("0xB2", Role::Customer), InsertCondition::IdentityAbsent)
        .expect("second insert");
    drop(store);

    let reopened = JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect("reopen");

    assert_eq!(
        reopened.identities(),
        vec![owner(), Identity::new("0xB2").expect("identity")]
    );
    let sequences: Vec<u64> = reopened
        .records()
        .iter()
        .map(|record| record.registered_at().sequence)
        .collect();
    assert_eq!(sequences, vec![1, 2]);
    assert_eq!(
        JsonSnapshotUserStore::read_owner(&state_dir.path),
        Ok(Some(owner()))
    );
}

#[rstest]
fn duplicates_are_not_persisted(state_dir: StateDir) {
    let store = JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect("open");
    store
        .insert(registration(OWNER, Role::Manager), InsertCondition::RegistryEmpty)
        .expect("genesis insert");
    let before = std::fs::read_to_string(&state_dir.path).expect("read snapshot");

    let outcome = store
        .insert(registration(OWNER, Role::Customer), InsertCondition::IdentityAbsent)
        .expect("insert");

    assert!(matches!(outcome, InsertOutcome::IdentityTaken(ref existing) if existing.role() == Role::Manager));
    assert_eq!(
        std::fs::read_to_string(&state_dir.path).expect("read snapshot"),
        before
    );
}

#[rstest]
fn failed_commits_leave_the_store_unchanged(state_dir: StateDir) {
    let store = JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect("open");
    store
        .insert(registration(OWNER, Role::Manager), InsertCondition::RegistryEmpty)
        .expect("genesis insert");
    let parent = state_dir.path.parent().expect("state file has a parent");
    std::fs::remove_dir_all(parent).expect("remove state dir");

    let result = store.insert(
        registration("0xB2", Role::Customer),
        InsertCondition::IdentityAbsent,
    );

    assert!(matches!(result, Err(UserStoreError::Persistence { .. })));
    assert_eq!(store.len(), 1);
    assert!(store.find(&Identity::new("0xB2").expect("identity")).is_none());
    drop(state_dir.temp);
}

#[rstest]
fn a_different_owner_cannot_open_the_snapshot(state_dir: StateDir) {
    JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect("create");
    let intruder = Identity::new("0xB2").expect("identity");

    let error = JsonSnapshotUserStore::open(&state_dir.path, &intruder).expect_err("mismatch");

    assert_eq!(
        error,
        SnapshotError::OwnerMismatch {
            expected: intruder,
            stored: owner(),
        }
    );
}

#[rstest]
fn snapshots_with_duplicate_identities_are_corrupted(state_dir: StateDir) {
    let record = |sequence: u64| {
        serde_json::json!({
            "identity": "0xB2",
            "displayName": "Bob Customer",
            "role": "customer",
            "registeredAt": { "sequence": sequence, "timestamp": "2026-10-19T10:00:00Z" }
        })
    };
    let document = serde_json::json!({
        "version": 1,
        "owner": OWNER,
        "users": [record(1), record(2)],
    });
    std::fs::write(&state_dir.path, document.to_string()).expect("write snapshot");

    let error = JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect_err("corrupted");

    assert!(matches!(error, SnapshotError::Corrupted { .. }));
}

#[rstest]
fn stores_sharing_a_snapshot_never_both_commit_an_identity(state_dir: StateDir) {
    let first = JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect("open first");
    let second = JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect("open second");

    let won = first
        .insert(named("0xB2", "First", Role::Customer), InsertCondition::IdentityAbsent)
        .expect("first insert");
    let lost = second
        .insert(named("0xB2", "Second", Role::Customer), InsertCondition::IdentityAbsent)
        .expect("second insert");

    assert!(matches!(won, InsertOutcome::Inserted(_)));
    assert!(matches!(
        lost,
        InsertOutcome::IdentityTaken(ref existing) if existing.display_name().as_ref() == "First"
    ));

    first
        .insert(registration("0xC3", Role::Customer), InsertCondition::IdentityAbsent)
        .expect("insert through first");
    second
        .insert(registration("0xD4", Role::Customer), InsertCondition::IdentityAbsent)
        .expect("insert through second");

    let reopened = JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect("reopen");
    let identity = |raw: &str| Identity::new(raw).expect("identity");
    assert_eq!(
        reopened.identities(),
        vec![identity("0xB2"), identity("0xC3"), identity("0xD4")]
    );
    assert_eq!(
        reopened
            .find(&identity("0xB2"))
            .map(|record| record.display_name().as_ref().to_owned()),
        Some("First".to_owned())
    );
    let sequences: Vec<u64> = reopened
        .records()
        .iter()
        .map(|record| record.registered_at().sequence)
        .collect();
    assert_eq!(sequences, vec![1, 2, 3]);
}

#[rstest]
fn genesis_through_a_second_store_sees_the_first(state_dir: StateDir) {
    let first = JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect("open first");
    let second = JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect("open second");

    first
        .insert(registration(OWNER, Role::Manager), InsertCondition::RegistryEmpty)
        .expect("genesis");
    let outcome = second
        .insert(registration("0xB2", Role::Manager), InsertCondition::RegistryEmpty)
        .expect("second genesis");

    assert_eq!(outcome, InsertOutcome::RegistryNotEmpty);
    assert_eq!(second.identities(), vec![owner()]);
}

#[rstest]
fn readers_are_served_while_a_writer_waits_for_the_lock(state_dir: StateDir) {
    let store = JsonSnapshotUserStore::open(&state_dir.path, &owner()).expect("open");
    store
        .insert(registration(OWNER, Role::Manager), InsertCondition::RegistryEmpty)
        .expect("genesis insert");
    let held = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(store.lock_path())
        .expect("open lock file");
    FileExt::lock_exclusive(&held).expect("hold snapshot lock");
    let (started_tx, started_rx) = mpsc::channel();

    thread::scope(|scope| {
        let store = &store;
        let writer = scope.spawn(move || {
            started_tx.send(()).expect("signal start");
            store.insert(
                registration("0xB2", Role::Customer),
                InsertCondition::IdentityAbsent,
            )
        });
        started_rx.recv().expect("writer started");
        thread::sleep(Duration::from_millis(50));

        assert_eq!(store.len(), 1);
        assert_eq!(store.identities(), vec![owner()]);
        assert!(store.find(&Identity::new("0xB2").expect("identity")).is_none());
        assert!(!writer.is_finished(), "writer must still wait for the lock");

        FileExt::unlock(&held).expect("release snapshot lock");
        let outcome = writer
            .join()
            .expect("writer thread")
            .expect("insert after release");
        assert!(matches!(outcome, InsertOutcome::Inserted(_)));
    });

    assert_eq!(store.len(), 2);
}
