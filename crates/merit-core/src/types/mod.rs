//! # Core Type Definitions
//!
//! This module contains the core types for the Merit appraisal engine:
//! - Identifiers (`AppraisalId`, `EmployeeId`, `GoalId`, `EntryId`)
//! - Measured values (`Weightage`, `Rating`, `Timestamp`, `Version`)
//! - Model values (`EmployeeRef`, `Goal`, `AppraisalKind`, `Assessment`)
//! - Error types (`MeritError`, `RuleViolation`, `PreconditionFailure`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Use saturating arithmetic for counters to prevent overflow

use crate::access::{FieldGroup, Grant};
use crate::roles::ActorRole;
use crate::status::Status;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for an appraisal aggregate.
/// Assigned by the entity store at create time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppraisalId(pub u64);

impl AppraisalId {
    /// Placeholder carried by an aggregate between `Appraisal::create` and
    /// the store insert that assigns the real id. Never stored.
    pub const UNASSIGNED: Self = Self(0);
}

/// Unique identifier for an employee in the external identity world.
/// The core never mints these; they arrive resolved from the role resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub u64);

/// Unique identifier for a goal in the external catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoalId(pub u64);

/// Identifier for one `AppraisalGoal` record inside a single appraisal.
/// Assigned from a per-appraisal counter; unique only within its aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

// =============================================================================
// MEASURED VALUES
// =============================================================================

/// Percentage share of a goal within one appraisal.
///
/// The validation engine enforces the [1,100] range and the 100% total;
/// the newtype itself is a plain carrier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Weightage(pub u8);

impl Weightage {
    /// Create a new weightage with the given percentage.
    #[must_use]
    pub const fn new(percent: u8) -> Self {
        Self(percent)
    }

    /// Get the raw percentage value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// A rating on the fixed 1–5 scale.
///
/// Constructed through `validation::validate_rating`; a stored rating is
/// always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rating(pub u8);

impl Rating {
    /// Create a new rating with the given value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Get the raw rating value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// A point in time as whole seconds since the Unix epoch.
///
/// The core never reads a wall clock; timestamps enter through the `Clock`
/// collaborator and stay integer-only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Create a new timestamp from epoch seconds.
    #[must_use]
    pub const fn new(secs: i64) -> Self {
        Self(secs)
    }

    /// Get the raw epoch-seconds value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Shift the timestamp forward using saturating arithmetic.
    #[must_use]
    pub const fn plus(self, secs: i64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

/// Optimistic-lock token on an appraisal.
///
/// Every committed save advances the version by one; the entity store
/// compares the submitted token against the stored one and rejects stale
/// writers with `MeritError::Conflict`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Version(pub u64);

impl Version {
    /// Create a new version token.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The token after one committed save. Saturating.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Get the raw token value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// EMPLOYEE REFERENCE
// =============================================================================

/// An employee reference with its capability snapshot.
///
/// `manager_eligible` is resolved once by the role resolver when the
/// appraisal is created and travels with the reference from then on; the
/// core never re-derives it from a role name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRef {
    /// The external employee identifier.
    pub id: EmployeeId,
    /// Whether this employee may act as an appraiser.
    pub manager_eligible: bool,
}

impl EmployeeRef {
    /// Create a new employee reference.
    #[must_use]
    pub const fn new(id: EmployeeId, manager_eligible: bool) -> Self {
        Self {
            id,
            manager_eligible,
        }
    }
}

// =============================================================================
// GOAL (external catalog value)
// =============================================================================

/// A goal as defined in the external catalog.
///
/// The core references catalog goals by id and copies the weightage at
/// attach time; it never interprets `performance_factor` or `importance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// The catalog identifier.
    pub id: GoalId,
    /// Short goal title.
    pub title: String,
    /// Longer goal description.
    pub description: String,
    /// Catalog dimension this goal measures (opaque to the core).
    pub performance_factor: String,
    /// Catalog importance label (opaque to the core).
    pub importance: String,
    /// Percentage share proposed by the catalog entry.
    pub weightage: Weightage,
}

impl Goal {
    /// Create a new catalog goal value.
    #[must_use]
    pub fn new(
        id: GoalId,
        title: impl Into<String>,
        description: impl Into<String>,
        performance_factor: impl Into<String>,
        importance: impl Into<String>,
        weightage: Weightage,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            performance_factor: performance_factor.into(),
            importance: importance.into(),
            weightage,
        }
    }
}

// =============================================================================
// APPRAISAL KIND
// =============================================================================

/// The review cycle an appraisal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppraisalKind {
    /// Full-year review cycle.
    Annual,
    /// Half-year review cycle.
    HalfYearly,
    /// Quarterly review cycle.
    Quarterly,
    /// Probation-period review.
    Probation,
}

impl AppraisalKind {
    /// Stable lowercase name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::HalfYearly => "half_yearly",
            Self::Quarterly => "quarterly",
            Self::Probation => "probation",
        }
    }
}

impl std::fmt::Display for AppraisalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for AppraisalKind {
    type Err = MeritError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "annual" => Ok(Self::Annual),
            "half_yearly" => Ok(Self::HalfYearly),
            "quarterly" => Ok(Self::Quarterly),
            "probation" => Ok(Self::Probation),
            other => Err(MeritError::Validation {
                field: "kind",
                reason: format!("unknown appraisal kind: {other:?}"),
            }),
        }
    }
}

// =============================================================================
// ASSESSMENT
// =============================================================================

/// A recorded rating/comment pair.
///
/// Presence is meaningful: an evaluation slot is `Option<Assessment>` and a
/// present assessment has already passed the validation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// The 1–5 rating.
    pub rating: Rating,
    /// The non-empty comment accompanying the rating.
    pub comment: String,
}

impl Assessment {
    /// Create a new assessment.
    #[must_use]
    pub fn new(rating: Rating, comment: impl Into<String>) -> Self {
        Self {
            rating,
            comment: comment.into(),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Merit system.
///
/// - No silent failures
/// - Use `Result<T, MeritError>` for fallible operations
/// - The CORE should never panic; all errors must be recoverable
///
/// Every variant carries the concrete values a caller needs to act on the
/// failure; `kind()` yields the stable machine-readable discriminator used
/// in API payloads and logs.
#[derive(Debug, Error)]
pub enum MeritError {
    /// The input is malformed (shape, length, unknown name).
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Which input field was malformed.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A business rule was violated (weightage totals, role assignment,
    /// goal-set lock).
    #[error("{0}")]
    BusinessRule(RuleViolation),

    /// The actor is not the designated role for the current phase.
    #[error("Status {status} designates the {required} role, actor {actor:?} resolves to {role}")]
    Unauthorized {
        /// Who attempted the operation.
        actor: EmployeeId,
        /// The role the actor resolves to relative to the appraisal.
        role: ActorRole,
        /// The role the current phase designates.
        required: ActorRole,
        /// The appraisal status at the time of the attempt.
        status: Status,
    },

    /// The write targets a field-group the actor's grant does not admit.
    #[error("The {group} field group is {grant} for the {role} role while status is {status}")]
    ForbiddenField {
        /// The appraisal status at the time of the attempt.
        status: Status,
        /// The role the actor resolves to.
        role: ActorRole,
        /// The field group the write targeted.
        group: FieldGroup,
        /// The grant the gate computed for that group.
        grant: Grant,
    },

    /// No outgoing edge matches the requested transition.
    #[error("No transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: Status,
        /// The requested target status.
        to: Status,
    },

    /// The edge exists but its data precondition is unmet.
    #[error("Transition {from} -> {to} blocked: {failure}")]
    UnmetPrecondition {
        /// The current status.
        from: Status,
        /// The requested target status.
        to: Status,
        /// The concrete unmet data.
        failure: PreconditionFailure,
    },

    /// The requested appraisal was not found in the store.
    #[error("Appraisal not found: {0:?}")]
    AppraisalNotFound(AppraisalId),

    /// The referenced employee is unknown to the role resolver.
    #[error("Employee not found: {0:?}")]
    EmployeeNotFound(EmployeeId),

    /// The referenced appraisal-goal entry does not exist in the appraisal.
    #[error("Entry {entry:?} not found in appraisal {appraisal:?}")]
    EntryNotFound {
        /// The appraisal that was addressed.
        appraisal: AppraisalId,
        /// The entry that does not exist in it.
        entry: EntryId,
    },

    /// A concurrent writer committed first; the submitted version is stale.
    #[error("Stale version for appraisal {appraisal:?}: submitted {submitted}, stored {stored}")]
    Conflict {
        /// The appraisal both writers targeted.
        appraisal: AppraisalId,
        /// The version token the losing writer submitted.
        submitted: Version,
        /// The version actually in the store.
        stored: Version,
    },

    /// A serialization error occurred in a storage backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred in a storage backend.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred in a storage backend.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl MeritError {
    /// Stable machine-readable kind for API payloads and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::BusinessRule(_) => "business_rule_violation",
            Self::Unauthorized { .. } => "unauthorized",
            Self::ForbiddenField { .. } => "forbidden_field",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::UnmetPrecondition { .. } => "unmet_precondition",
            Self::AppraisalNotFound(_) | Self::EmployeeNotFound(_) | Self::EntryNotFound { .. } => {
                "entity_not_found"
            }
            Self::Conflict { .. } => "conflict",
            Self::SerializationError(_) | Self::DeserializationError(_) | Self::IoError(_) => {
                "storage"
            }
        }
    }
}

/// A violated business rule, with the values that violated it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// A single goal's weightage is outside [1,100].
    #[error("Weightage must be between 1% and 100%, got: {value}%")]
    WeightageOutOfRange {
        /// The offending weightage value.
        value: u8,
    },

    /// Attaching the goal would push the running total past 100%.
    #[error(
        "Attaching a goal weighted {added}% would raise the total from {current}% to {resulting}%, exceeding 100%"
    )]
    WeightageOverflow {
        /// Total before the attach.
        current: u32,
        /// Weightage of the goal being attached.
        added: u8,
        /// Total the attach would produce.
        resulting: u32,
    },

    /// The appraiser and the appraisee are the same employee.
    #[error("Appraiser must differ from appraisee, both are {employee:?}")]
    SelfAppraiser {
        /// The doubly-assigned employee.
        employee: EmployeeId,
    },

    /// The reviewer and the appraisee are the same employee.
    #[error("Reviewer must differ from appraisee, both are {employee:?}")]
    SelfReviewer {
        /// The doubly-assigned employee.
        employee: EmployeeId,
    },

    /// The reviewer and the appraiser are the same employee.
    #[error("Reviewer must differ from appraiser, both are {employee:?}")]
    ReviewerIsAppraiser {
        /// The doubly-assigned employee.
        employee: EmployeeId,
    },

    /// The assigned appraiser lacks the manager capability.
    #[error("Appraiser {employee:?} is not manager-eligible")]
    AppraiserNotEligible {
        /// The ineligible employee.
        employee: EmployeeId,
    },

    /// The same catalog goal is already attached to this appraisal.
    #[error("Goal {goal:?} is already attached to this appraisal")]
    DuplicateGoal {
        /// The catalog goal id.
        goal: GoalId,
    },

    /// A goal-set mutation was attempted after the draft window closed.
    #[error("The goal set can only be changed while status is draft, current status: {status}")]
    GoalsLocked {
        /// The status at the time of the attempt.
        status: Status,
    },

    /// The appraisal already holds the maximum number of goals.
    #[error("An appraisal holds at most {limit} goals, already attached: {count}")]
    TooManyGoals {
        /// Goals currently attached.
        count: usize,
        /// The fixed cap.
        limit: usize,
    },
}

/// The concrete unmet data behind an `UnmetPrecondition` error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionFailure {
    /// The weightage total is not exactly 100%.
    #[error("Total weightage must be 100%, current: {total}%")]
    WeightageTotal {
        /// The actual sum over all attached goals.
        total: u32,
    },

    /// One or more goals have no self-assessment recorded.
    #[error("Goals missing a self-assessment: {entries:?}")]
    SelfAssessmentMissing {
        /// Entry ids without a self-assessment, in ascending order.
        entries: Vec<EntryId>,
    },

    /// One or more goals have no appraiser assessment recorded.
    #[error("Goals missing an appraiser assessment: {entries:?}")]
    AppraiserAssessmentMissing {
        /// Entry ids without an appraiser assessment, in ascending order.
        entries: Vec<EntryId>,
    },

    /// The appraiser overall rating/comment has not been recorded.
    #[error("Appraiser overall rating/comment not recorded")]
    AppraiserOverallMissing,

    /// The reviewer overall rating/comment has not been recorded.
    #[error("Reviewer overall rating/comment not recorded")]
    ReviewerOverallMissing,
}

// =============================================================================
// TESTS
// =============================================================================
