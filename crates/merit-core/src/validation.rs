//! # Validation Engine
//!
//! Pure rule checks over values the caller already holds. Nothing in this
//! module reads a clock, touches a store, or mutates state; every function
//! maps inputs to `Ok` or to the one error that names what was wrong and
//! with which values.
//!
//! Three layers of severity, matching the error taxonomy:
//! - shape checks yield `MeritError::Validation` (lengths, ranges of raw input)
//! - rule checks yield `MeritError::BusinessRule` (weightage arithmetic, role assignment)
//! - phase checks yield `PreconditionFailure`, wrapped into `UnmetPrecondition`
//!   by the transition path that invoked them

use crate::appraisal::Appraisal;
use crate::primitives::{
    MAX_COMMENT_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_GOALS_PER_APPRAISAL, MAX_RANGE_LABEL_LENGTH,
    MAX_RATING, MAX_TITLE_LENGTH, MAX_WEIGHTAGE, MIN_RATING, MIN_WEIGHTAGE, WEIGHTAGE_TOTAL,
};
use crate::status::Status;
use crate::types::{
    EmployeeRef, Goal, MeritError, PreconditionFailure, Rating, RuleViolation, Weightage,
};

// =============================================================================
// WEIGHTAGE ARITHMETIC
// =============================================================================

/// Sum a set of weightages. Saturating, so a pathological set cannot wrap.
#[must_use]
pub fn weightage_total<I>(weights: I) -> u32
where
    I: IntoIterator<Item = Weightage>,
{
    weights
        .into_iter()
        .fold(0_u32, |total, w| total.saturating_add(u32::from(w.value())))
}

/// Check a single goal's weightage against the [1,100] range.
pub fn validate_weightage(weightage: Weightage) -> Result<(), MeritError> {
    let value = weightage.value();
    if value < MIN_WEIGHTAGE || value > MAX_WEIGHTAGE {
        return Err(MeritError::BusinessRule(RuleViolation::WeightageOutOfRange {
            value,
        }));
    }
    Ok(())
}

/// Check that attaching a goal keeps the running total within 100%.
///
/// The range check runs first, so a zero or oversized weightage is reported
/// as such rather than as an overflow.
pub fn validate_attach_weightage(current: u32, added: Weightage) -> Result<(), MeritError> {
    validate_weightage(added)?;

    let resulting = current.saturating_add(u32::from(added.value()));
    if resulting > WEIGHTAGE_TOTAL {
        return Err(MeritError::BusinessRule(RuleViolation::WeightageOverflow {
            current,
            added: added.value(),
            resulting,
        }));
    }
    Ok(())
}

/// Check the exact-100% total required to leave Draft.
pub fn validate_weightage_sum(total: u32) -> Result<(), PreconditionFailure> {
    if total != WEIGHTAGE_TOTAL {
        return Err(PreconditionFailure::WeightageTotal { total });
    }
    Ok(())
}

// =============================================================================
// SHAPE CHECKS
// =============================================================================

/// Validate a raw rating value and wrap it.
pub fn validate_rating(value: u8) -> Result<Rating, MeritError> {
    if value < MIN_RATING || value > MAX_RATING {
        return Err(MeritError::Validation {
            field: "rating",
            reason: format!("must be between {MIN_RATING} and {MAX_RATING}, got {value}"),
        });
    }
    Ok(Rating::new(value))
}

/// Validate an assessment comment: present and within bounds.
pub fn validate_comment(comment: &str) -> Result<(), MeritError> {
    if comment.trim().is_empty() {
        return Err(MeritError::Validation {
            field: "comment",
            reason: "must not be empty".to_string(),
        });
    }
    if comment.len() > MAX_COMMENT_LENGTH {
        return Err(MeritError::Validation {
            field: "comment",
            reason: format!("exceeds {MAX_COMMENT_LENGTH} bytes"),
        });
    }
    Ok(())
}

/// Validate a goal value from the catalog before it is attached.
pub fn validate_goal(goal: &Goal) -> Result<(), MeritError> {
    if goal.title.trim().is_empty() {
        return Err(MeritError::Validation {
            field: "title",
            reason: "must not be empty".to_string(),
        });
    }
    if goal.title.len() > MAX_TITLE_LENGTH {
        return Err(MeritError::Validation {
            field: "title",
            reason: format!("exceeds {MAX_TITLE_LENGTH} bytes"),
        });
    }
    if goal.description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(MeritError::Validation {
            field: "description",
            reason: format!("exceeds {MAX_DESCRIPTION_LENGTH} bytes"),
        });
    }
    if goal.performance_factor.len() > MAX_RANGE_LABEL_LENGTH {
        return Err(MeritError::Validation {
            field: "performance_factor",
            reason: format!("exceeds {MAX_RANGE_LABEL_LENGTH} bytes"),
        });
    }
    if goal.importance.len() > MAX_RANGE_LABEL_LENGTH {
        return Err(MeritError::Validation {
            field: "importance",
            reason: format!("exceeds {MAX_RANGE_LABEL_LENGTH} bytes"),
        });
    }
    validate_weightage(goal.weightage)
}

// =============================================================================
// ROLE ASSIGNMENT
// =============================================================================

/// Validate the three-role assignment of a new appraisal.
///
/// All three parties must be distinct employees and the appraiser must
/// carry the manager capability. Checked in a fixed order so the reported
/// violation is deterministic when an assignment breaks several rules.
pub fn validate_role_assignment(
    appraisee: EmployeeRef,
    appraiser: EmployeeRef,
    reviewer: EmployeeRef,
) -> Result<(), MeritError> {
    if appraiser.id == appraisee.id {
        return Err(MeritError::BusinessRule(RuleViolation::SelfAppraiser {
            employee: appraisee.id,
        }));
    }
    if reviewer.id == appraisee.id {
        return Err(MeritError::BusinessRule(RuleViolation::SelfReviewer {
            employee: appraisee.id,
        }));
    }
    if reviewer.id == appraiser.id {
        return Err(MeritError::BusinessRule(RuleViolation::ReviewerIsAppraiser {
            employee: appraiser.id,
        }));
    }
    if !appraiser.manager_eligible {
        return Err(MeritError::BusinessRule(RuleViolation::AppraiserNotEligible {
            employee: appraiser.id,
        }));
    }
    Ok(())
}

// =============================================================================
// GOAL-SET RULES
// =============================================================================

/// Check that the goal set is still open for structural changes.
pub fn validate_goal_set_open(status: Status) -> Result<(), MeritError> {
    if status != Status::Draft {
        return Err(MeritError::BusinessRule(RuleViolation::GoalsLocked {
            status,
        }));
    }
    Ok(())
}

/// Check the goal-count cap before an attach.
pub fn validate_goal_capacity(count: usize) -> Result<(), MeritError> {
    if count >= MAX_GOALS_PER_APPRAISAL {
        return Err(MeritError::BusinessRule(RuleViolation::TooManyGoals {
            count,
            limit: MAX_GOALS_PER_APPRAISAL,
        }));
    }
    Ok(())
}

// =============================================================================
// PHASE PRECONDITIONS
// =============================================================================

/// Check the data precondition guarding the edge into `target`.
///
/// Keyed by the target status, since each status has exactly one incoming
/// edge. Returns the bare failure; the transition path wraps it with the
/// from/to pair it already knows.
pub fn phase_precondition(
    appraisal: &Appraisal,
    target: Status,
) -> Result<(), PreconditionFailure> {
    match target {
        Status::Draft => Ok(()),
        Status::Submitted => validate_weightage_sum(appraisal.weightage_total()),
        Status::AppraiseeSelfAssessment => Ok(()),
        Status::AppraiserEvaluation => {
            let entries = appraisal.entries_missing_self_assessment();
            if entries.is_empty() {
                Ok(())
            } else {
                Err(PreconditionFailure::SelfAssessmentMissing { entries })
            }
        }
        Status::ReviewerEvaluation => {
            let entries = appraisal.entries_missing_appraiser_assessment();
            if !entries.is_empty() {
                return Err(PreconditionFailure::AppraiserAssessmentMissing { entries });
            }
            if appraisal.appraiser_overall().is_none() {
                return Err(PreconditionFailure::AppraiserOverallMissing);
            }
            Ok(())
        }
        Status::Complete => {
            if appraisal.reviewer_overall().is_none() {
                return Err(PreconditionFailure::ReviewerOverallMissing);
            }
            Ok(())
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
