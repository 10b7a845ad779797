//! # Appraisal Events
//!
//! The core does not log. Every committed mutation yields one typed event,
//! handed to an `EventSink` collaborator after the store accepts the save.
//! What the sink does with it (structured log line, audit row, nothing) is
//! outside the core's contract.

use std::sync::Mutex;

use serde::Serialize;

use crate::roles::ActorRole;
use crate::status::Status;
use crate::types::{AppraisalId, AppraisalKind, EmployeeId, EntryId, GoalId, Weightage};

// =============================================================================
// EVENTS
// =============================================================================

/// A committed mutation, described with the values an audit trail needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AppraisalEvent {
    /// A new appraisal entered Draft.
    Created {
        appraisal: AppraisalId,
        kind: AppraisalKind,
        appraisee: EmployeeId,
        appraiser: EmployeeId,
        reviewer: EmployeeId,
    },
    /// A catalog goal was attached.
    GoalAttached {
        appraisal: AppraisalId,
        entry: EntryId,
        goal: GoalId,
        weightage: Weightage,
    },
    /// An attached goal was removed.
    GoalRemoved {
        appraisal: AppraisalId,
        entry: EntryId,
    },
    /// An attached goal's weightage changed.
    GoalReweighted {
        appraisal: AppraisalId,
        entry: EntryId,
        from: Weightage,
        to: Weightage,
    },
    /// The appraisee recorded self-assessments.
    SelfAssessmentRecorded {
        appraisal: AppraisalId,
        entries: Vec<EntryId>,
    },
    /// The appraiser recorded per-goal ratings and the overall verdict.
    AppraiserEvaluationRecorded {
        appraisal: AppraisalId,
        entries: Vec<EntryId>,
    },
    /// The reviewer recorded the closing verdict.
    ReviewerEvaluationRecorded { appraisal: AppraisalId },
    /// A transition committed.
    StatusAdvanced {
        appraisal: AppraisalId,
        from: Status,
        to: Status,
        actor: EmployeeId,
        role: ActorRole,
    },
}

impl AppraisalEvent {
    /// Stable lowercase name, matching the serialized tag.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::GoalAttached { .. } => "goal_attached",
            Self::GoalRemoved { .. } => "goal_removed",
            Self::GoalReweighted { .. } => "goal_reweighted",
            Self::SelfAssessmentRecorded { .. } => "self_assessment_recorded",
            Self::AppraiserEvaluationRecorded { .. } => "appraiser_evaluation_recorded",
            Self::ReviewerEvaluationRecorded { .. } => "reviewer_evaluation_recorded",
            Self::StatusAdvanced { .. } => "status_advanced",
        }
    }

    /// The appraisal the event belongs to.
    #[must_use]
    pub const fn appraisal_id(&self) -> AppraisalId {
        match self {
            Self::Created { appraisal, .. }
            | Self::GoalAttached { appraisal, .. }
            | Self::GoalRemoved { appraisal, .. }
            | Self::GoalReweighted { appraisal, .. }
            | Self::SelfAssessmentRecorded { appraisal, .. }
            | Self::AppraiserEvaluationRecorded { appraisal, .. }
            | Self::ReviewerEvaluationRecorded { appraisal }
            | Self::StatusAdvanced { appraisal, .. } => *appraisal,
        }
    }
}

// =============================================================================
// SINKS
// =============================================================================

/// Recipient of committed-mutation events.
///
/// Sinks are infallible by contract: a sink that cannot record must drop
/// the event rather than fail the operation that produced it.
pub trait EventSink: Send + Sync {
    /// Record one event.
    fn record(&self, event: &AppraisalEvent);
}

impl<S: EventSink> EventSink for std::sync::Arc<S> {
    fn record(&self, event: &AppraisalEvent) {
        (**self).record(event);
    }
}

/// A sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &AppraisalEvent) {}
}

/// A sink that keeps events in memory, for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AppraisalEvent>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything recorded so far.
    #[must_use]
    pub fn take(&self) -> Vec<AppraisalEvent> {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *events)
    }

    /// Number of events recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &AppraisalEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}

// =============================================================================
// TESTS
// =============================================================================
