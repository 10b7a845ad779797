//! # Field Access Gate
//!
//! A total function from (status, role) to a per-group grant. The gate is
//! consulted on every write before any data validation runs, and on every
//! read to decide which groups a view may render. There is no fallback row:
//! all twenty-four combinations are spelled out, so a new status or role
//! fails to compile until its row exists.
//!
//! Denials carry intent. Writing into a group the gate shows read-only (or
//! a group the actor never owns) is a `ForbiddenField`; writing into the
//! actor's own group while the phase designates somebody else is an
//! `Unauthorized`, naming the role the phase actually designates.

use crate::roles::ActorRole;
use crate::status::Status;
use crate::types::{EmployeeId, MeritError};
use serde::{Deserialize, Serialize};

// =============================================================================
// FIELD GROUPS
// =============================================================================

/// The four access-controlled groups of appraisal data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    /// Goal definitions: title, description, factor, importance, weightage.
    Goals,
    /// Per-goal self ratings and comments.
    SelfFields,
    /// Per-goal appraiser ratings and the appraiser overall verdict.
    AppraiserFields,
    /// The reviewer overall verdict.
    ReviewerFields,
}

impl FieldGroup {
    /// All groups, for exhaustive gate checks.
    pub const ALL: [Self; 4] = [
        Self::Goals,
        Self::SelfFields,
        Self::AppraiserFields,
        Self::ReviewerFields,
    ];

    /// Stable lowercase name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Goals => "goals",
            Self::SelfFields => "self_fields",
            Self::AppraiserFields => "appraiser_fields",
            Self::ReviewerFields => "reviewer_fields",
        }
    }

    /// The role whose work product lives in this group.
    ///
    /// Goals belong to the appraiser: the appraiser defines them in Draft
    /// and rates them later. Self fields belong to the appraisee, and each
    /// overall verdict to the role that records it.
    #[must_use]
    pub const fn owning_role(self) -> ActorRole {
        match self {
            Self::Goals | Self::AppraiserFields => ActorRole::Appraiser,
            Self::SelfFields => ActorRole::Appraisee,
            Self::ReviewerFields => ActorRole::Reviewer,
        }
    }
}

impl std::fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// GRANTS
// =============================================================================

/// What a role may do with a field group at some status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    /// The group is not rendered at all.
    Hidden,
    /// The group is rendered but rejects writes.
    ReadOnly,
    /// The group accepts writes.
    Editable,
}

impl Grant {
    /// Stable lowercase name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::ReadOnly => "read_only",
            Self::Editable => "editable",
        }
    }

    /// Check if the group is rendered in views.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    /// Check if the group accepts writes.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Editable)
    }
}

impl std::fmt::Display for Grant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// FIELD ACCESS
// =============================================================================

/// One row of the gate: a grant per field group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAccess {
    pub goals: Grant,
    pub self_fields: Grant,
    pub appraiser_fields: Grant,
    pub reviewer_fields: Grant,
}

impl FieldAccess {
    /// Build a row grant by grant, in group order.
    #[must_use]
    pub const fn new(
        goals: Grant,
        self_fields: Grant,
        appraiser_fields: Grant,
        reviewer_fields: Grant,
    ) -> Self {
        Self {
            goals,
            self_fields,
            appraiser_fields,
            reviewer_fields,
        }
    }

    /// A row that hides every group.
    #[must_use]
    pub const fn hidden_all() -> Self {
        Self::new(Grant::Hidden, Grant::Hidden, Grant::Hidden, Grant::Hidden)
    }

    /// A row that shows every group read-only.
    #[must_use]
    pub const fn read_only_all() -> Self {
        Self::new(
            Grant::ReadOnly,
            Grant::ReadOnly,
            Grant::ReadOnly,
            Grant::ReadOnly,
        )
    }

    /// Look up the grant for one group.
    #[must_use]
    pub const fn grant(self, group: FieldGroup) -> Grant {
        match group {
            FieldGroup::Goals => self.goals,
            FieldGroup::SelfFields => self.self_fields,
            FieldGroup::AppraiserFields => self.appraiser_fields,
            FieldGroup::ReviewerFields => self.reviewer_fields,
        }
    }
}

// =============================================================================
// THE GATE
// =============================================================================

/// Compute the field access row for a role at a status.
///
/// Total over all combinations. Unrelated actors are hidden from
/// everything in every phase; Complete is read-only for every related
/// role; every other phase grants edit rights to exactly one group of
/// exactly one role.
#[must_use]
pub const fn compute_field_access(status: Status, role: ActorRole) -> FieldAccess {
    use ActorRole as R;
    use Grant::{Editable, Hidden, ReadOnly};
    use Status as S;

    match (status, role) {
        (_, R::Other) => FieldAccess::hidden_all(),

        // Goal setting and the acknowledgement gate: appraiser only.
        (S::Draft | S::Submitted, R::Appraiser) => {
            FieldAccess::new(Editable, Hidden, Hidden, Hidden)
        }
        (S::Draft | S::Submitted, R::Appraisee | R::Reviewer) => FieldAccess::hidden_all(),

        (S::AppraiseeSelfAssessment, R::Appraisee) => {
            FieldAccess::new(ReadOnly, Editable, Hidden, Hidden)
        }
        (S::AppraiseeSelfAssessment, R::Appraiser | R::Reviewer) => FieldAccess::hidden_all(),

        (S::AppraiserEvaluation, R::Appraiser) => {
            FieldAccess::new(ReadOnly, ReadOnly, Editable, Hidden)
        }
        (S::AppraiserEvaluation, R::Appraisee | R::Reviewer) => FieldAccess::hidden_all(),

        (S::ReviewerEvaluation, R::Reviewer) => {
            FieldAccess::new(ReadOnly, ReadOnly, ReadOnly, Editable)
        }
        (S::ReviewerEvaluation, R::Appraisee | R::Appraiser) => FieldAccess::hidden_all(),

        (S::Complete, R::Appraisee | R::Appraiser | R::Reviewer) => FieldAccess::read_only_all(),
    }
}

/// Authorize a write into one field group.
///
/// Editable passes. Read-only is a `ForbiddenField`, and so is a hidden
/// group the actor's role does not own. A hidden group the actor's role
/// does own means the actor knocked in the wrong phase, which is an
/// `Unauthorized` naming the role the phase designates instead.
pub fn authorize_write(
    status: Status,
    actor: EmployeeId,
    role: ActorRole,
    group: FieldGroup,
) -> Result<(), MeritError> {
    let grant = compute_field_access(status, role).grant(group);

    match grant {
        Grant::Editable => Ok(()),
        Grant::ReadOnly => Err(MeritError::ForbiddenField {
            status,
            role,
            group,
            grant,
        }),
        Grant::Hidden => {
            if group.owning_role() == role {
                match status.designated_role() {
                    Some(required) => Err(MeritError::Unauthorized {
                        actor,
                        role,
                        required,
                        status,
                    }),
                    None => Err(MeritError::ForbiddenField {
                        status,
                        role,
                        group,
                        grant,
                    }),
                }
            } else {
                Err(MeritError::ForbiddenField {
                    status,
                    role,
                    group,
                    grant,
                })
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
