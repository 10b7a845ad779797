//! # Redb Entity Store
//!
//! Disk-backed `EntityStore` using redb for ACID persistence.
//!
//! Aggregates are serialized with postcard and stored under their u64 id.
//! The compare-and-swap on the version token runs inside a single write
//! transaction: the stored copy is read, compared, and replaced before the
//! commit, so two racing writers cannot both pass the check.
//!
//! In-memory state (the id counter) is updated only after a successful
//! commit, never before.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::appraisal::Appraisal;
use crate::store::EntityStore;
use crate::types::{AppraisalId, MeritError};

// =============================================================================
// TABLE DEFINITIONS
// =============================================================================

/// Appraisals: id -> postcard-serialized Appraisal
const APPRAISALS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("appraisals");

/// Metadata: key -> u64 value (id counter)
const METADATA_TABLE: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_ID_KEY: &str = "next_appraisal_id";

// =============================================================================
// REDB STORE
// =============================================================================

/// Disk-backed entity store.
pub struct RedbStore {
    db: Database,
    /// Highest id handed out so far. Persisted in the metadata table.
    next_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    ///
    /// Bootstraps the tables on first open and reloads the id counter on
    /// every open, so ids keep ascending across process restarts.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MeritError> {
        let db = Database::create(path).map_err(|e| MeritError::IoError(e.to_string()))?;

        let txn = db
            .begin_write()
            .map_err(|e| MeritError::IoError(e.to_string()))?;
        {
            let _ = txn
                .open_table(APPRAISALS_TABLE)
                .map_err(|e| MeritError::IoError(e.to_string()))?;
            let _ = txn
                .open_table(METADATA_TABLE)
                .map_err(|e| MeritError::IoError(e.to_string()))?;
        }
        txn.commit().map_err(|e| MeritError::IoError(e.to_string()))?;

        let read = db
            .begin_read()
            .map_err(|e| MeritError::IoError(e.to_string()))?;
        let metadata = read
            .open_table(METADATA_TABLE)
            .map_err(|e| MeritError::IoError(e.to_string()))?;
        let next_id = metadata
            .get(NEXT_ID_KEY)
            .map_err(|e| MeritError::IoError(e.to_string()))?
            .map(|guard| guard.value())
            .unwrap_or(0);

        Ok(Self { db, next_id })
    }

    /// Number of stored appraisals.
    pub fn len(&self) -> Result<usize, MeritError> {
        let read = self
            .db
            .begin_read()
            .map_err(|e| MeritError::IoError(e.to_string()))?;
        let table = read
            .open_table(APPRAISALS_TABLE)
            .map_err(|e| MeritError::IoError(e.to_string()))?;
        let count = table
            .len()
            .map_err(|e| MeritError::IoError(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or(usize::MAX))
    }
}

impl EntityStore for RedbStore {
    fn insert(&mut self, appraisal: &mut Appraisal) -> Result<AppraisalId, MeritError> {
        let next = self.next_id.saturating_add(1);
        let id = AppraisalId(next);
        appraisal.assign_id(id);

        let bytes = postcard::to_allocvec(appraisal)
            .map_err(|e| MeritError::SerializationError(e.to_string()))?;

        let txn = self
            .db
            .begin_write()
            .map_err(|e| MeritError::IoError(e.to_string()))?;
        {
            let mut table = txn
                .open_table(APPRAISALS_TABLE)
                .map_err(|e| MeritError::IoError(e.to_string()))?;
            table
                .insert(id.0, bytes.as_slice())
                .map_err(|e| MeritError::IoError(e.to_string()))?;

            let mut metadata = txn
                .open_table(METADATA_TABLE)
                .map_err(|e| MeritError::IoError(e.to_string()))?;
            metadata
                .insert(NEXT_ID_KEY, next)
                .map_err(|e| MeritError::IoError(e.to_string()))?;
        }
        txn.commit().map_err(|e| MeritError::IoError(e.to_string()))?;

        self.next_id = next;
        Ok(id)
    }

    fn load(&self, id: AppraisalId) -> Result<Appraisal, MeritError> {
        let read = self
            .db
            .begin_read()
            .map_err(|e| MeritError::IoError(e.to_string()))?;
        let table = read
            .open_table(APPRAISALS_TABLE)
            .map_err(|e| MeritError::IoError(e.to_string()))?;

        let Some(guard) = table
            .get(id.0)
            .map_err(|e| MeritError::IoError(e.to_string()))?
        else {
            return Err(MeritError::AppraisalNotFound(id));
        };

        postcard::from_bytes(guard.value())
            .map_err(|e| MeritError::DeserializationError(e.to_string()))
    }

    fn save(&mut self, appraisal: &mut Appraisal) -> Result<(), MeritError> {
        let id = appraisal.id();

        // Serialize the advanced copy up front; the caller's copy is only
        // touched after the commit succeeds.
        let mut committed = appraisal.clone();
        committed.bump_version();
        let bytes = postcard::to_allocvec(&committed)
            .map_err(|e| MeritError::SerializationError(e.to_string()))?;

        let txn = self
            .db
            .begin_write()
            .map_err(|e| MeritError::IoError(e.to_string()))?;
        {
            let mut table = txn
                .open_table(APPRAISALS_TABLE)
                .map_err(|e| MeritError::IoError(e.to_string()))?;

            let Some(guard) = table
                .get(id.0)
                .map_err(|e| MeritError::IoError(e.to_string()))?
            else {
                return Err(MeritError::AppraisalNotFound(id));
            };
            let stored: Appraisal = postcard::from_bytes(guard.value())
                .map_err(|e| MeritError::DeserializationError(e.to_string()))?;
            drop(guard);

            if stored.version() != appraisal.version() {
                return Err(MeritError::Conflict {
                    appraisal: id,
                    submitted: appraisal.version(),
                    stored: stored.version(),
                });
            }

            table
                .insert(id.0, bytes.as_slice())
                .map_err(|e| MeritError::IoError(e.to_string()))?;
        }
        txn.commit().map_err(|e| MeritError::IoError(e.to_string()))?;

        *appraisal = committed;
        Ok(())
    }

    fn list(&self) -> Result<Vec<AppraisalId>, MeritError> {
        let read = self
            .db
            .begin_read()
            .map_err(|e| MeritError::IoError(e.to_string()))?;
        let table = read
            .open_table(APPRAISALS_TABLE)
            .map_err(|e| MeritError::IoError(e.to_string()))?;

        let mut ids = Vec::new();
        for item in table
            .iter()
            .map_err(|e| MeritError::IoError(e.to_string()))?
        {
            let (key, _) = item.map_err(|e| MeritError::IoError(e.to_string()))?;
            ids.push(AppraisalId(key.value()));
        }
        Ok(ids)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::{AppraisalKind, EmployeeId, EmployeeRef, Timestamp, Version};

    fn fresh() -> Appraisal {
        Appraisal::create(
            AppraisalId::UNASSIGNED,
            AppraisalKind::Annual,
            EmployeeRef::new(EmployeeId(1), false),
            EmployeeRef::new(EmployeeId(2), true),
            EmployeeRef::new(EmployeeId(3), true),
            Some("FY26".to_string()),
            Timestamp::new(0),
            Timestamp::new(1000),
            Timestamp::new(0),
        )
        .expect("create appraisal")
    }

    #[test]
    fn insert_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = RedbStore::open(dir.path().join("merit.redb")).expect("open");

        let mut appraisal = fresh();
        let id = store.insert(&mut appraisal).expect("insert");
        assert_eq!(id, AppraisalId(1));

        let loaded = store.load(id).expect("load");
        assert_eq!(loaded, appraisal);
        assert_eq!(store.len().expect("len"), 1);
    }

    #[test]
    fn load_missing_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RedbStore::open(dir.path().join("merit.redb")).expect("open");

        let result = store.load(AppraisalId(5));
        assert!(matches!(
            result,
            Err(MeritError::AppraisalNotFound(AppraisalId(5)))
        ));
    }

    #[test]
    fn ids_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("merit.redb");

        {
            let mut store = RedbStore::open(&path).expect("open");
            let mut first = fresh();
            store.insert(&mut first).expect("insert");
        }

        let mut store = RedbStore::open(&path).expect("reopen");
        let mut second = fresh();
        let id = store.insert(&mut second).expect("insert after reopen");
        assert_eq!(id, AppraisalId(2));
        assert_eq!(
            store.list().expect("list"),
            vec![AppraisalId(1), AppraisalId(2)]
        );
    }

    #[test]
    fn stale_save_is_a_conflict() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = RedbStore::open(dir.path().join("merit.redb")).expect("open");

        let mut appraisal = fresh();
        let id = store.insert(&mut appraisal).expect("insert");

        let mut winner = store.load(id).expect("load winner");
        let mut loser = store.load(id).expect("load loser");

        store.save(&mut winner).expect("first save");
        assert_eq!(winner.version(), Version::new(1));

        let result = store.save(&mut loser);
        match result {
            Err(MeritError::Conflict {
                submitted, stored, ..
            }) => {
                assert_eq!(submitted, Version::new(0));
                assert_eq!(stored, Version::new(1));
            }
            other => panic!("expected conflict, got {other:?}"),
        }

        // The losing copy and the stored aggregate are both unchanged.
        assert_eq!(loser.version(), Version::new(0));
        assert_eq!(store.load(id).expect("reload").version(), Version::new(1));
    }
}
