//! Insertion-ordered record table shared by the store adapters.
//!
//! The table is plain data; callers hold a lock around it. Records live in
//! a `Vec` in commit order with a hash index from identity to position, so
//! a commit is one push plus one index insert.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use thiserror::Error;

use crate::domain::ports::{InsertCondition, InsertOutcome, UserStoreError};
use crate::domain::{Identity, UserRecord, UserRegistration};

/// Structural problems found when rebuilding a table from stored records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableIntegrityError {
    /// Two stored records share an identity.
    #[error("identity {identity} appears more than once")]
    DuplicateIdentity {
        /// Repeated identity.
        identity: Identity,
    },
    /// Sequence numbers are not exactly `1..=n` in order.
    #[error("record {index} has sequence {found}, expected {expected}")]
    SequenceGap {
        /// Zero-based position of the offending record.
        index: usize,
        /// Sequence the position requires.
        expected: u64,
        /// Sequence found in the record.
        found: u64,
    },
}

#[derive(Debug, Default)]
pub(crate) struct RecordTable {
    records: Vec<UserRecord>,
    index: HashMap<Identity, usize>,
}

impl RecordTable {
    pub(crate) fn from_records(records: Vec<UserRecord>) -> Result<Self, TableIntegrityError> {
        let mut table = Self::default();
        for (position, record) in records.into_iter().enumerate() {
            let expected = sequence_for(position);
            let found = record.registered_at().sequence;
            if found != expected {
                return Err(TableIntegrityError::SequenceGap {
                    index: position,
                    expected,
                    found,
                });
            }
            match table.index.entry(record.identity().clone()) {
                Entry::Occupied(entry) => {
                    return Err(TableIntegrityError::DuplicateIdentity {
                        identity: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(position);
                }
            }
            table.records.push(record);
        }
        Ok(table)
    }

    /// Check `condition` and insert in one step.
    pub(crate) fn try_insert(
        &mut self,
        registration: UserRegistration,
        condition: InsertCondition,
    ) -> Result<InsertOutcome, UserStoreError> {
        if condition == InsertCondition::RegistryEmpty && !self.records.is_empty() {
            return Ok(InsertOutcome::RegistryNotEmpty);
        }

        let position = self.records.len();
        match self.index.entry(registration.identity().clone()) {
            Entry::Occupied(entry) => {
                let existing = self.records.get(*entry.get()).cloned().ok_or_else(|| {
                    UserStoreError::corrupted(format!(
                        "index for {} points past the end of the table",
                        entry.key()
                    ))
                })?;
                Ok(InsertOutcome::IdentityTaken(existing))
            }
            Entry::Vacant(entry) => {
                entry.insert(position);
                let record = registration.into_record(sequence_for(position));
                self.records.push(record.clone());
                Ok(InsertOutcome::Inserted(record))
            }
        }
    }

    pub(crate) fn find(&self, identity: &Identity) -> Option<UserRecord> {
        self.index
            .get(identity)
            .and_then(|position| self.records.get(*position))
            .cloned()
    }

    pub(crate) fn identities(&self) -> Vec<Identity> {
        self.records
            .iter()
            .map(|record| record.identity().clone())
            .collect()
    }

    pub(crate) fn records(&self) -> &[UserRecord] {
        &self.records
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

fn sequence_for(position: usize) -> u64 {
    // usize never exceeds u64 on supported targets.
    u64::try_from(position).map_or(u64::MAX, |position| position.saturating_add(1))
}
