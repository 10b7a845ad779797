//! # Status Transition State Machine
//!
//! The appraisal lifecycle is a strict linear chain:
//!
//! | Status | Advanced by | Precondition |
//! |--------|-------------|--------------|
//! | Draft | appraiser | weightage total == 100% |
//! | Submitted | appraisee | none (acknowledgement) |
//! | AppraiseeSelfAssessment | appraisee | every goal self-assessed |
//! | AppraiserEvaluation | appraiser | every goal + overall assessed |
//! | ReviewerEvaluation | reviewer | overall assessed |
//! | Complete | — | terminal |
//!
//! Each status has at most one outgoing edge, so every skip-ahead or reverse
//! request fails the same way: there is no edge to match. The precondition
//! bodies live in the validation engine; this module owns the edge table and
//! the order of checks.

use crate::roles::ActorRole;
use crate::types::{EmployeeId, MeritError};
use serde::{Deserialize, Serialize};

// =============================================================================
// STATUS ENUM
// =============================================================================

/// One of the six phases of an appraisal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Goal setting; the only phase in which the goal set may change.
    Draft,
    /// Goals fixed, waiting for the appraisee to acknowledge.
    Submitted,
    /// The appraisee rates their own goals.
    AppraiseeSelfAssessment,
    /// The appraiser rates every goal and records an overall verdict.
    AppraiserEvaluation,
    /// The reviewer records the closing overall verdict.
    ReviewerEvaluation,
    /// Terminal; everything read-only forever.
    Complete,
}

impl Status {
    /// All statuses in chain order, for exhaustive table checks.
    pub const ALL: [Self; 6] = [
        Self::Draft,
        Self::Submitted,
        Self::AppraiseeSelfAssessment,
        Self::AppraiserEvaluation,
        Self::ReviewerEvaluation,
        Self::Complete,
    ];

    /// Stable lowercase name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::AppraiseeSelfAssessment => "appraisee_self_assessment",
            Self::AppraiserEvaluation => "appraiser_evaluation",
            Self::ReviewerEvaluation => "reviewer_evaluation",
            Self::Complete => "complete",
        }
    }

    /// Position in the chain, starting at 0 for Draft.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Draft => 0,
            Self::Submitted => 1,
            Self::AppraiseeSelfAssessment => 2,
            Self::AppraiserEvaluation => 3,
            Self::ReviewerEvaluation => 4,
            Self::Complete => 5,
        }
    }

    /// Get the next status in the chain, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::Submitted),
            Self::Submitted => Some(Self::AppraiseeSelfAssessment),
            Self::AppraiseeSelfAssessment => Some(Self::AppraiserEvaluation),
            Self::AppraiserEvaluation => Some(Self::ReviewerEvaluation),
            Self::ReviewerEvaluation => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// Get the previous status in the chain, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Draft => None,
            Self::Submitted => Some(Self::Draft),
            Self::AppraiseeSelfAssessment => Some(Self::Submitted),
            Self::AppraiserEvaluation => Some(Self::AppraiseeSelfAssessment),
            Self::ReviewerEvaluation => Some(Self::AppraiserEvaluation),
            Self::Complete => Some(Self::ReviewerEvaluation),
        }
    }

    /// Check if this status is terminal (Complete).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete)
    }

    /// The single outgoing edge from this status, if any.
    #[must_use]
    pub const fn outgoing(self) -> Option<TransitionEdge> {
        match self {
            Self::Draft => Some(TransitionEdge {
                to: Self::Submitted,
                actor: ActorRole::Appraiser,
            }),
            Self::Submitted => Some(TransitionEdge {
                to: Self::AppraiseeSelfAssessment,
                actor: ActorRole::Appraisee,
            }),
            Self::AppraiseeSelfAssessment => Some(TransitionEdge {
                to: Self::AppraiserEvaluation,
                actor: ActorRole::Appraisee,
            }),
            Self::AppraiserEvaluation => Some(TransitionEdge {
                to: Self::ReviewerEvaluation,
                actor: ActorRole::Appraiser,
            }),
            Self::ReviewerEvaluation => Some(TransitionEdge {
                to: Self::Complete,
                actor: ActorRole::Reviewer,
            }),
            Self::Complete => None,
        }
    }

    /// The role the current phase designates as its writer, if any.
    ///
    /// This is the authorized actor of the outgoing edge; Complete
    /// designates nobody.
    #[must_use]
    pub const fn designated_role(self) -> Option<ActorRole> {
        match self.outgoing() {
            Some(edge) => Some(edge.actor),
            None => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Status {
    type Err = MeritError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "appraisee_self_assessment" => Ok(Self::AppraiseeSelfAssessment),
            "appraiser_evaluation" => Ok(Self::AppraiserEvaluation),
            "reviewer_evaluation" => Ok(Self::ReviewerEvaluation),
            "complete" => Ok(Self::Complete),
            other => Err(MeritError::Validation {
                field: "status",
                reason: format!("unknown status: {other:?}"),
            }),
        }
    }
}

// =============================================================================
// TRANSITION EDGE
// =============================================================================

/// One edge of the status chain: its target and its authorized role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEdge {
    /// The status this edge leads to.
    pub to: Status,
    /// The only role allowed to request this edge.
    pub actor: ActorRole,
}

/// Authorize a transition request against the edge table.
///
/// Covers steps two and three of the request: the target must match the
/// single outgoing edge of the current status (`InvalidTransition`
/// otherwise, which also rejects skip-ahead, reverse, and repeat requests),
/// and the actor's resolved role must match the edge's authorized role
/// (`Unauthorized` otherwise). The data precondition is checked separately
/// by the validation engine.
pub fn authorize_transition(
    current: Status,
    target: Status,
    actor: EmployeeId,
    role: ActorRole,
) -> Result<(), MeritError> {
    let Some(edge) = current.outgoing() else {
        return Err(MeritError::InvalidTransition {
            from: current,
            to: target,
        });
    };

    if edge.to != target {
        return Err(MeritError::InvalidTransition {
            from: current,
            to: target,
        });
    }

    if edge.actor != role {
        return Err(MeritError::Unauthorized {
            actor,
            role,
            required: edge.actor,
            status: current,
        });
    }

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
