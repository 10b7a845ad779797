//! # Entity Store
//!
//! The persistence seam of the core. A store hands out owned copies of
//! aggregates and takes mutated copies back under compare-and-swap on the
//! version token: the copy's version must still match the stored one, or
//! the save fails with `Conflict` and the caller reloads and retries.
//!
//! The version token is owned here, not by the aggregate. A committed save
//! advances it by one; a rejected save leaves both copies untouched.
//!
//! All map-backed state uses `BTreeMap` for deterministic iteration.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::appraisal::Appraisal;
use crate::types::{AppraisalId, MeritError};

// =============================================================================
// ENTITYSTORE TRAIT
// =============================================================================

/// The EntityStore trait defines aggregate persistence.
///
/// All fallible operations return `Result<T, MeritError>` to support both
/// in-memory and persistent storage backends uniformly.
pub trait EntityStore {
    /// Insert a newly created appraisal.
    /// Assigns the definitive id from the store's counter, writing it into
    /// the aggregate in place, and returns it.
    fn insert(&mut self, appraisal: &mut Appraisal) -> Result<AppraisalId, MeritError>;

    /// Load an owned copy of an appraisal.
    fn load(&self, id: AppraisalId) -> Result<Appraisal, MeritError>;

    /// Persist a mutated copy under compare-and-swap on the version token.
    /// On success the copy's version is advanced to the newly stored one.
    fn save(&mut self, appraisal: &mut Appraisal) -> Result<(), MeritError>;

    /// All appraisal ids, ascending.
    fn list(&self) -> Result<Vec<AppraisalId>, MeritError>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// The in-memory entity store.
///
/// Uses `BTreeMap` exclusively for deterministic ordering.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    /// Aggregate storage: AppraisalId -> Appraisal
    appraisals: BTreeMap<AppraisalId, Appraisal>,

    /// Next id to assign, starting at 1. Id 0 stays the unassigned marker.
    next_id: u64,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored appraisals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.appraisals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.appraisals.is_empty()
    }
}

impl EntityStore for InMemoryStore {
    fn insert(&mut self, appraisal: &mut Appraisal) -> Result<AppraisalId, MeritError> {
        self.next_id = self.next_id.saturating_add(1);
        let id = AppraisalId(self.next_id);
        appraisal.assign_id(id);
        self.appraisals.insert(id, appraisal.clone());
        Ok(id)
    }

    fn load(&self, id: AppraisalId) -> Result<Appraisal, MeritError> {
        self.appraisals
            .get(&id)
            .cloned()
            .ok_or(MeritError::AppraisalNotFound(id))
    }

    fn save(&mut self, appraisal: &mut Appraisal) -> Result<(), MeritError> {
        let id = appraisal.id();
        let Some(stored) = self.appraisals.get_mut(&id) else {
            return Err(MeritError::AppraisalNotFound(id));
        };

        if stored.version() != appraisal.version() {
            return Err(MeritError::Conflict {
                appraisal: id,
                submitted: appraisal.version(),
                stored: stored.version(),
            });
        }

        appraisal.bump_version();
        *stored = appraisal.clone();
        Ok(())
    }

    fn list(&self) -> Result<Vec<AppraisalId>, MeritError> {
        Ok(self.appraisals.keys().copied().collect())
    }
}

// =============================================================================
// SHARED STORE
// =============================================================================

/// A cloneable handle over one `InMemoryStore`, serializing all access
/// through a mutex. This is what makes the compare-and-swap meaningful:
/// two handles to the same store race on the version token, and exactly
/// one of two concurrent saves of the same version commits.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<InMemoryStore>>,
}

impl SharedStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryStore> {
        // A poisoned lock means another thread panicked mid-operation; the
        // store itself is still a consistent map, so keep serving.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EntityStore for SharedStore {
    fn insert(&mut self, appraisal: &mut Appraisal) -> Result<AppraisalId, MeritError> {
        self.lock().insert(appraisal)
    }

    fn load(&self, id: AppraisalId) -> Result<Appraisal, MeritError> {
        self.lock().load(id)
    }

    fn save(&mut self, appraisal: &mut Appraisal) -> Result<(), MeritError> {
        self.lock().save(appraisal)
    }

    fn list(&self) -> Result<Vec<AppraisalId>, MeritError> {
        self.lock().list()
    }
}

// =============================================================================
// TESTS
// =============================================================================
