//! # Appraisal Service
//!
//! The composition root. A service combines an entity store backend with
//! the three collaborators the core does not implement itself: the role
//! resolver (identity), the clock (time), and the event sink (audit).
//!
//! Every operation follows the same protocol: load one aggregate, run the
//! gate-composed mutation on the copy, persist under compare-and-swap,
//! then emit the event. A failure at any step discards the copy, so the
//! store never sees partial state; a `Conflict` from the save means a
//! concurrent writer committed first and the caller should reload and
//! retry.

use std::path::Path;

use crate::access::{compute_field_access, FieldAccess};
use crate::appraisal::{Appraisal, AssessmentInput};
use crate::clock::Clock;
use crate::events::{AppraisalEvent, EventSink, NullSink};
use crate::primitives::DEFAULT_REVIEW_TERM_SECS;
use crate::roles::{ActorRole, RoleResolver};
use crate::status::Status;
use crate::storage::RedbStore;
use crate::store::{EntityStore, SharedStore};
use crate::types::{
    AppraisalId, AppraisalKind, EmployeeId, EntryId, Goal, MeritError, Timestamp, Weightage,
};

// =============================================================================
// STORE BACKEND
// =============================================================================

/// Entity store backend for a service.
#[derive(Debug)]
pub enum StoreBackend {
    /// In-memory store behind a shared handle (fast, volatile).
    InMemory(SharedStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::InMemory(SharedStore::new())
    }
}

// NOTE: StoreBackend does NOT implement Clone.
// RedbStore (database handle) cannot be safely cloned; share an
// in-memory store by cloning the SharedStore handle before wrapping it.

impl EntityStore for StoreBackend {
    fn insert(&mut self, appraisal: &mut Appraisal) -> Result<AppraisalId, MeritError> {
        match self {
            Self::InMemory(store) => store.insert(appraisal),
            Self::Persistent(store) => store.insert(appraisal),
        }
    }

    fn load(&self, id: AppraisalId) -> Result<Appraisal, MeritError> {
        match self {
            Self::InMemory(store) => store.load(id),
            Self::Persistent(store) => store.load(id),
        }
    }

    fn save(&mut self, appraisal: &mut Appraisal) -> Result<(), MeritError> {
        match self {
            Self::InMemory(store) => store.save(appraisal),
            Self::Persistent(store) => store.save(appraisal),
        }
    }

    fn list(&self) -> Result<Vec<AppraisalId>, MeritError> {
        match self {
            Self::InMemory(store) => store.list(),
            Self::Persistent(store) => store.list(),
        }
    }
}

// =============================================================================
// CREATE REQUEST
// =============================================================================

/// Inputs for `create_appraisal`.
///
/// Periods are optional: a missing start defaults to now, a missing end to
/// one review term after the start.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub appraisee: EmployeeId,
    pub appraiser: EmployeeId,
    pub reviewer: EmployeeId,
    pub kind: AppraisalKind,
    pub range: Option<String>,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
}

// =============================================================================
// APPRAISAL SERVICE
// =============================================================================

/// The appraisal service: one store backend plus the external collaborators.
///
/// Note: AppraisalService does NOT implement Clone. To race two writers in
/// a test, build two services over clones of one `SharedStore` handle.
pub struct AppraisalService {
    backend: StoreBackend,
    resolver: Box<dyn RoleResolver>,
    clock: Box<dyn Clock>,
    sink: Box<dyn EventSink>,
}

impl std::fmt::Debug for AppraisalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppraisalService")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl AppraisalService {
    /// Create a service over an explicit backend and collaborator set.
    #[must_use]
    pub fn new(
        backend: StoreBackend,
        resolver: Box<dyn RoleResolver>,
        clock: Box<dyn Clock>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            backend,
            resolver,
            clock,
            sink,
        }
    }

    /// Create a service with a fresh in-memory store and no event sink.
    #[must_use]
    pub fn in_memory(resolver: Box<dyn RoleResolver>, clock: Box<dyn Clock>) -> Self {
        Self::new(
            StoreBackend::default(),
            resolver,
            clock,
            Box::new(NullSink),
        )
    }

    /// Create a service with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path. All committed
    /// mutations are persisted to disk.
    pub fn with_redb(
        path: impl AsRef<Path>,
        resolver: Box<dyn RoleResolver>,
        clock: Box<dyn Clock>,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, MeritError> {
        let store = RedbStore::open(path)?;
        Ok(Self::new(
            StoreBackend::Persistent(store),
            resolver,
            clock,
            sink,
        ))
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StoreBackend::Persistent(_))
    }

    /// Get a reference to the store backend.
    #[must_use]
    pub fn backend(&self) -> &StoreBackend {
        &self.backend
    }

    // =========================================================================
    // CREATION
    // =========================================================================

    /// Create a new appraisal in Draft.
    ///
    /// Resolves all three parties through the role resolver, which is also
    /// where the appraiser's manager capability comes from.
    pub fn create_appraisal(&mut self, request: CreateRequest) -> Result<Appraisal, MeritError> {
        let appraisee = self.resolver.resolve(request.appraisee)?;
        let appraiser = self.resolver.resolve(request.appraiser)?;
        let reviewer = self.resolver.resolve(request.reviewer)?;

        let now = self.clock.now();
        let period_start = request.period_start.unwrap_or(now);
        let period_end = request
            .period_end
            .unwrap_or_else(|| period_start.plus(DEFAULT_REVIEW_TERM_SECS));

        let mut appraisal = Appraisal::create(
            AppraisalId::UNASSIGNED,
            request.kind,
            appraisee,
            appraiser,
            reviewer,
            request.range,
            period_start,
            period_end,
            now,
        )?;
        let id = self.backend.insert(&mut appraisal)?;

        self.sink.record(&AppraisalEvent::Created {
            appraisal: id,
            kind: request.kind,
            appraisee: appraisee.id,
            appraiser: appraiser.id,
            reviewer: reviewer.id,
        });
        Ok(appraisal)
    }

    // =========================================================================
    // GOAL SET
    // =========================================================================

    /// Attach a catalog goal.
    pub fn attach_goal(
        &mut self,
        id: AppraisalId,
        actor: EmployeeId,
        goal: Goal,
    ) -> Result<Appraisal, MeritError> {
        let mut appraisal = self.backend.load(id)?;
        let goal_id = goal.id;
        let weightage = goal.weightage;

        let entry = appraisal.attach_goal(actor, goal, self.clock.now())?;
        self.backend.save(&mut appraisal)?;

        self.sink.record(&AppraisalEvent::GoalAttached {
            appraisal: id,
            entry,
            goal: goal_id,
            weightage,
        });
        Ok(appraisal)
    }

    /// Remove an attached goal. Draft only.
    pub fn remove_goal(
        &mut self,
        id: AppraisalId,
        actor: EmployeeId,
        entry: EntryId,
    ) -> Result<Appraisal, MeritError> {
        let mut appraisal = self.backend.load(id)?;
        appraisal.remove_goal(actor, entry, self.clock.now())?;
        self.backend.save(&mut appraisal)?;

        self.sink
            .record(&AppraisalEvent::GoalRemoved { appraisal: id, entry });
        Ok(appraisal)
    }

    /// Change an attached goal's weightage. Draft only.
    pub fn update_goal_weightage(
        &mut self,
        id: AppraisalId,
        actor: EmployeeId,
        entry: EntryId,
        weightage: Weightage,
    ) -> Result<Appraisal, MeritError> {
        let mut appraisal = self.backend.load(id)?;
        let from = appraisal.goal(entry).map(|g| g.goal.weightage);

        appraisal.update_goal_weightage(actor, entry, weightage, self.clock.now())?;
        self.backend.save(&mut appraisal)?;

        if let Some(from) = from {
            self.sink.record(&AppraisalEvent::GoalReweighted {
                appraisal: id,
                entry,
                from,
                to: weightage,
            });
        }
        Ok(appraisal)
    }

    // =========================================================================
    // EVALUATIONS
    // =========================================================================

    /// Record the appraisee's per-goal self ratings and comments.
    pub fn record_self_assessment(
        &mut self,
        id: AppraisalId,
        actor: EmployeeId,
        items: Vec<AssessmentInput>,
    ) -> Result<Appraisal, MeritError> {
        let mut appraisal = self.backend.load(id)?;
        let entries: Vec<_> = items.iter().map(|i| i.entry).collect();

        appraisal.record_self_assessment(actor, &items, self.clock.now())?;
        self.backend.save(&mut appraisal)?;

        self.sink.record(&AppraisalEvent::SelfAssessmentRecorded {
            appraisal: id,
            entries,
        });
        Ok(appraisal)
    }

    /// Record the appraiser's per-goal ratings plus the overall verdict.
    pub fn record_appraiser_evaluation(
        &mut self,
        id: AppraisalId,
        actor: EmployeeId,
        items: Vec<AssessmentInput>,
        overall_rating: u8,
        overall_comment: &str,
    ) -> Result<Appraisal, MeritError> {
        let mut appraisal = self.backend.load(id)?;
        let entries: Vec<_> = items.iter().map(|i| i.entry).collect();

        appraisal.record_appraiser_evaluation(
            actor,
            &items,
            overall_rating,
            overall_comment,
            self.clock.now(),
        )?;
        self.backend.save(&mut appraisal)?;

        self.sink
            .record(&AppraisalEvent::AppraiserEvaluationRecorded {
                appraisal: id,
                entries,
            });
        Ok(appraisal)
    }

    /// Record the reviewer's overall verdict.
    pub fn record_reviewer_evaluation(
        &mut self,
        id: AppraisalId,
        actor: EmployeeId,
        overall_rating: u8,
        overall_comment: &str,
    ) -> Result<Appraisal, MeritError> {
        let mut appraisal = self.backend.load(id)?;
        appraisal.record_reviewer_evaluation(
            actor,
            overall_rating,
            overall_comment,
            self.clock.now(),
        )?;
        self.backend.save(&mut appraisal)?;

        self.sink
            .record(&AppraisalEvent::ReviewerEvaluationRecorded { appraisal: id });
        Ok(appraisal)
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Request the transition to `target` on behalf of `actor`.
    pub fn request_transition(
        &mut self,
        id: AppraisalId,
        target: Status,
        actor: EmployeeId,
    ) -> Result<Appraisal, MeritError> {
        let mut appraisal = self.backend.load(id)?;
        let from = appraisal.status();
        let role = appraisal.role_of(actor);

        appraisal.advance(actor, target, self.clock.now())?;
        self.backend.save(&mut appraisal)?;

        self.sink.record(&AppraisalEvent::StatusAdvanced {
            appraisal: id,
            from,
            to: target,
            actor,
            role,
        });
        Ok(appraisal)
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Load an appraisal.
    pub fn get_appraisal(&self, id: AppraisalId) -> Result<Appraisal, MeritError> {
        self.backend.load(id)
    }

    /// Resolve a viewer's role and field access against an appraisal.
    #[must_use]
    pub fn access_for(appraisal: &Appraisal, viewer: EmployeeId) -> (ActorRole, FieldAccess) {
        let role = appraisal.role_of(viewer);
        (role, compute_field_access(appraisal.status(), role))
    }

    /// All appraisal ids, ascending.
    pub fn list(&self) -> Result<Vec<AppraisalId>, MeritError> {
        self.backend.list()
    }

    /// Ids of appraisals the employee is a party to, ascending.
    pub fn list_for(&self, employee: EmployeeId) -> Result<Vec<AppraisalId>, MeritError> {
        let mut ids = Vec::new();
        for id in self.backend.list()? {
            let appraisal = self.backend.load(id)?;
            if appraisal.role_of(employee) != ActorRole::Other {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

// =============================================================================
// TESTS
// =============================================================================
