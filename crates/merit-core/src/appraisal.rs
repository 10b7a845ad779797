//! # Appraisal Aggregate
//!
//! The sole entry point for mutation. Every write composes the same steps
//! in the same order: resolve the actor's role from the aggregate's own
//! references, authorize the targeted field group through the access gate,
//! run the validation engine, then mutate. A failed step returns before any
//! state changes, so a rejected call leaves the aggregate byte-identical.
//!
//! The aggregate never touches a clock or a store. Timestamps arrive as
//! arguments; persistence and the version token are the entity store's
//! side of the protocol.
//!
//! Weightage is checked at two checkpoints. Attaching rejects any goal
//! that would push the running total past 100%, while reweighting inside
//! Draft only enforces the [1,100] range per goal; the exact-100% total is
//! re-validated when the Draft -> Submitted transition fires. A draft can
//! therefore hold a 99% or 101% total mid-edit, and the submit error names
//! the actual sum.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::access::{authorize_write, FieldGroup};
use crate::primitives::MAX_RANGE_LABEL_LENGTH;
use crate::roles::ActorRole;
use crate::status::{authorize_transition, Status};
use crate::types::{
    AppraisalId, AppraisalKind, Assessment, EmployeeId, EmployeeRef, EntryId, Goal, MeritError,
    RuleViolation, Timestamp, Version, Weightage,
};
use crate::validation;

// =============================================================================
// APPRAISAL GOAL
// =============================================================================

/// One goal attached to an appraisal, with its evaluation slots.
///
/// The goal value is copied from the catalog at attach time, weightage
/// included; later catalog edits never reach back into an appraisal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppraisalGoal {
    /// Entry id, unique within this appraisal.
    pub entry: EntryId,
    /// The goal as copied from the catalog at attach time.
    pub goal: Goal,
    /// The appraisee's rating and comment, if recorded.
    pub self_assessment: Option<Assessment>,
    /// The appraiser's rating and comment, if recorded.
    pub appraiser_assessment: Option<Assessment>,
}

/// One per-goal rating/comment submission inside a batch record call.
///
/// Carries the raw rating; the validation engine converts it on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentInput {
    /// The entry the assessment targets.
    pub entry: EntryId,
    /// Raw 1-5 rating value.
    pub rating: u8,
    /// Free-text comment accompanying the rating.
    pub comment: String,
}

// =============================================================================
// APPRAISAL
// =============================================================================

/// The appraisal aggregate root.
///
/// Fields are private; reads go through accessors and writes through the
/// gate-composed operations below. The version token is advanced by the
/// entity store on each committed save, never here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appraisal {
    id: AppraisalId,
    kind: AppraisalKind,
    appraisee: EmployeeRef,
    appraiser: EmployeeRef,
    reviewer: EmployeeRef,
    /// Optional cycle label, e.g. "H1" or "Q3".
    range: Option<String>,
    period_start: Timestamp,
    period_end: Timestamp,
    status: Status,
    goals: BTreeMap<EntryId, AppraisalGoal>,
    appraiser_overall: Option<Assessment>,
    reviewer_overall: Option<Assessment>,
    created_at: Timestamp,
    updated_at: Timestamp,
    version: Version,
    next_entry: u64,
}

impl Appraisal {
    /// Create a new appraisal in Draft.
    ///
    /// Validates the three-role assignment, the period ordering, and the
    /// optional range label. The id comes from the entity store's counter;
    /// there is no actor parameter because creation is authorized upstream,
    /// before role resolution exists for the new aggregate.
    pub fn create(
        id: AppraisalId,
        kind: AppraisalKind,
        appraisee: EmployeeRef,
        appraiser: EmployeeRef,
        reviewer: EmployeeRef,
        range: Option<String>,
        period_start: Timestamp,
        period_end: Timestamp,
        now: Timestamp,
    ) -> Result<Self, MeritError> {
        validation::validate_role_assignment(appraisee, appraiser, reviewer)?;

        if period_end <= period_start {
            return Err(MeritError::Validation {
                field: "period_end",
                reason: format!(
                    "must be after period_start ({} <= {})",
                    period_end.value(),
                    period_start.value()
                ),
            });
        }

        if let Some(label) = &range {
            if label.trim().is_empty() {
                return Err(MeritError::Validation {
                    field: "range",
                    reason: "must not be empty when present".to_string(),
                });
            }
            if label.len() > MAX_RANGE_LABEL_LENGTH {
                return Err(MeritError::Validation {
                    field: "range",
                    reason: format!("exceeds {MAX_RANGE_LABEL_LENGTH} bytes"),
                });
            }
        }

        Ok(Self {
            id,
            kind,
            appraisee,
            appraiser,
            reviewer,
            range,
            period_start,
            period_end,
            status: Status::Draft,
            goals: BTreeMap::new(),
            appraiser_overall: None,
            reviewer_overall: None,
            created_at: now,
            updated_at: now,
            version: Version::new(0),
            next_entry: 1,
        })
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub const fn id(&self) -> AppraisalId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> AppraisalKind {
        self.kind
    }

    #[must_use]
    pub const fn appraisee(&self) -> EmployeeRef {
        self.appraisee
    }

    #[must_use]
    pub const fn appraiser(&self) -> EmployeeRef {
        self.appraiser
    }

    #[must_use]
    pub const fn reviewer(&self) -> EmployeeRef {
        self.reviewer
    }

    #[must_use]
    pub fn range(&self) -> Option<&str> {
        self.range.as_deref()
    }

    #[must_use]
    pub const fn period_start(&self) -> Timestamp {
        self.period_start
    }

    #[must_use]
    pub const fn period_end(&self) -> Timestamp {
        self.period_end
    }

    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Iterate the attached goals in ascending entry order.
    pub fn goals(&self) -> impl Iterator<Item = &AppraisalGoal> {
        self.goals.values()
    }

    /// Look up one attached goal by entry id.
    #[must_use]
    pub fn goal(&self, entry: EntryId) -> Option<&AppraisalGoal> {
        self.goals.get(&entry)
    }

    /// Number of attached goals.
    #[must_use]
    pub fn goal_count(&self) -> usize {
        self.goals.len()
    }

    /// Sum of all attached weightages.
    #[must_use]
    pub fn weightage_total(&self) -> u32 {
        validation::weightage_total(self.goals.values().map(|g| g.goal.weightage))
    }

    #[must_use]
    pub const fn appraiser_overall(&self) -> Option<&Assessment> {
        self.appraiser_overall.as_ref()
    }

    #[must_use]
    pub const fn reviewer_overall(&self) -> Option<&Assessment> {
        self.reviewer_overall.as_ref()
    }

    /// Entry ids still missing a self-assessment, ascending.
    #[must_use]
    pub fn entries_missing_self_assessment(&self) -> Vec<EntryId> {
        self.goals
            .values()
            .filter(|g| g.self_assessment.is_none())
            .map(|g| g.entry)
            .collect()
    }

    /// Entry ids still missing an appraiser assessment, ascending.
    #[must_use]
    pub fn entries_missing_appraiser_assessment(&self) -> Vec<EntryId> {
        self.goals
            .values()
            .filter(|g| g.appraiser_assessment.is_none())
            .map(|g| g.entry)
            .collect()
    }

    /// Resolve an employee's role relative to this appraisal.
    ///
    /// The three parties are distinct by construction, so at most one arm
    /// matches; everyone else is `Other`.
    #[must_use]
    pub fn role_of(&self, employee: EmployeeId) -> ActorRole {
        if employee == self.appraisee.id {
            ActorRole::Appraisee
        } else if employee == self.appraiser.id {
            ActorRole::Appraiser
        } else if employee == self.reviewer.id {
            ActorRole::Reviewer
        } else {
            ActorRole::Other
        }
    }

    // =========================================================================
    // GOAL-SET OPERATIONS (Draft window)
    // =========================================================================

    /// Attach a catalog goal to this appraisal.
    ///
    /// The goal value (weightage included) is copied in; the returned entry
    /// id addresses it from then on. Rejects duplicates of the same catalog
    /// goal and any weightage that would push the running total past 100%.
    pub fn attach_goal(
        &mut self,
        actor: EmployeeId,
        goal: Goal,
        now: Timestamp,
    ) -> Result<EntryId, MeritError> {
        let role = self.role_of(actor);
        authorize_write(self.status, actor, role, FieldGroup::Goals)?;

        validation::validate_goal(&goal)?;

        if self.goals.values().any(|g| g.goal.id == goal.id) {
            return Err(MeritError::BusinessRule(RuleViolation::DuplicateGoal {
                goal: goal.id,
            }));
        }

        validation::validate_goal_capacity(self.goals.len())?;
        validation::validate_attach_weightage(self.weightage_total(), goal.weightage)?;

        let entry = EntryId(self.next_entry);
        self.next_entry = self.next_entry.saturating_add(1);
        self.goals.insert(
            entry,
            AppraisalGoal {
                entry,
                goal,
                self_assessment: None,
                appraiser_assessment: None,
            },
        );
        self.updated_at = now;
        Ok(entry)
    }

    /// Remove an attached goal. Draft only.
    pub fn remove_goal(
        &mut self,
        actor: EmployeeId,
        entry: EntryId,
        now: Timestamp,
    ) -> Result<(), MeritError> {
        let role = self.role_of(actor);
        authorize_write(self.status, actor, role, FieldGroup::Goals)?;
        validation::validate_goal_set_open(self.status)?;

        if self.goals.remove(&entry).is_none() {
            return Err(MeritError::EntryNotFound {
                appraisal: self.id,
                entry,
            });
        }
        self.updated_at = now;
        Ok(())
    }

    /// Change the weightage of an attached goal. Draft only.
    ///
    /// Only the per-goal [1,100] range is enforced here; the total may
    /// drift off 100% mid-edit and is re-validated at submit.
    pub fn update_goal_weightage(
        &mut self,
        actor: EmployeeId,
        entry: EntryId,
        weightage: Weightage,
        now: Timestamp,
    ) -> Result<(), MeritError> {
        let role = self.role_of(actor);
        authorize_write(self.status, actor, role, FieldGroup::Goals)?;
        validation::validate_goal_set_open(self.status)?;
        validation::validate_weightage(weightage)?;

        let Some(slot) = self.goals.get_mut(&entry) else {
            return Err(MeritError::EntryNotFound {
                appraisal: self.id,
                entry,
            });
        };
        slot.goal.weightage = weightage;
        self.updated_at = now;
        Ok(())
    }

    // =========================================================================
    // EVALUATION OPERATIONS
    // =========================================================================

    /// Record the appraisee's per-goal self ratings and comments.
    ///
    /// All-or-nothing: the whole batch is validated before any slot is
    /// written. Re-recording an entry inside the phase overwrites the
    /// previous value; the slots lock when the phase's transition fires.
    pub fn record_self_assessment(
        &mut self,
        actor: EmployeeId,
        items: &[AssessmentInput],
        now: Timestamp,
    ) -> Result<(), MeritError> {
        let role = self.role_of(actor);
        authorize_write(self.status, actor, role, FieldGroup::SelfFields)?;

        if items.is_empty() {
            return Err(MeritError::Validation {
                field: "assessments",
                reason: "must not be empty".to_string(),
            });
        }

        let parsed = self.parse_batch(items)?;
        for (entry, assessment) in parsed {
            if let Some(slot) = self.goals.get_mut(&entry) {
                slot.self_assessment = Some(assessment);
            }
        }
        self.updated_at = now;
        Ok(())
    }

    /// Record the appraiser's per-goal ratings plus the overall verdict.
    ///
    /// The per-goal batch may be empty (re-recording just the overall);
    /// the overall rating and comment are always required.
    pub fn record_appraiser_evaluation(
        &mut self,
        actor: EmployeeId,
        items: &[AssessmentInput],
        overall_rating: u8,
        overall_comment: &str,
        now: Timestamp,
    ) -> Result<(), MeritError> {
        let role = self.role_of(actor);
        authorize_write(self.status, actor, role, FieldGroup::AppraiserFields)?;

        let overall = self.parse_overall(overall_rating, overall_comment)?;
        let parsed = self.parse_batch(items)?;

        for (entry, assessment) in parsed {
            if let Some(slot) = self.goals.get_mut(&entry) {
                slot.appraiser_assessment = Some(assessment);
            }
        }
        self.appraiser_overall = Some(overall);
        self.updated_at = now;
        Ok(())
    }

    /// Record the reviewer's overall verdict.
    pub fn record_reviewer_evaluation(
        &mut self,
        actor: EmployeeId,
        overall_rating: u8,
        overall_comment: &str,
        now: Timestamp,
    ) -> Result<(), MeritError> {
        let role = self.role_of(actor);
        authorize_write(self.status, actor, role, FieldGroup::ReviewerFields)?;

        let overall = self.parse_overall(overall_rating, overall_comment)?;
        self.reviewer_overall = Some(overall);
        self.updated_at = now;
        Ok(())
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Request the transition to `target`.
    ///
    /// Checks run in contract order: edge match, actor role, data
    /// precondition. Only then does the status move and `updated_at`
    /// stamp; the caller persists, which is where the version advances.
    pub fn advance(
        &mut self,
        actor: EmployeeId,
        target: Status,
        now: Timestamp,
    ) -> Result<(), MeritError> {
        let role = self.role_of(actor);
        authorize_transition(self.status, target, actor, role)?;

        validation::phase_precondition(self, target).map_err(|failure| {
            MeritError::UnmetPrecondition {
                from: self.status,
                to: target,
                failure,
            }
        })?;

        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    /// Validate a batch of per-goal inputs without touching any slot.
    fn parse_batch(
        &self,
        items: &[AssessmentInput],
    ) -> Result<Vec<(EntryId, Assessment)>, MeritError> {
        let mut parsed = Vec::with_capacity(items.len());
        for item in items {
            if !self.goals.contains_key(&item.entry) {
                return Err(MeritError::EntryNotFound {
                    appraisal: self.id,
                    entry: item.entry,
                });
            }
            let rating = validation::validate_rating(item.rating)?;
            validation::validate_comment(&item.comment)?;
            parsed.push((item.entry, Assessment::new(rating, item.comment.clone())));
        }
        Ok(parsed)
    }

    fn parse_overall(&self, rating: u8, comment: &str) -> Result<Assessment, MeritError> {
        let rating = validation::validate_rating(rating)?;
        validation::validate_comment(comment)?;
        Ok(Assessment::new(rating, comment))
    }

    /// Store-side id assignment at insert time.
    pub(crate) fn assign_id(&mut self, id: AppraisalId) {
        self.id = id;
    }

    /// Store-side version advance on a committed save.
    pub(crate) fn bump_version(&mut self) {
        self.version = self.version.next();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::{GoalId, Rating, RuleViolation, Weightage};

    const APPRAISEE: EmployeeId = EmployeeId(1);
    const APPRAISER: EmployeeId = EmployeeId(2);
    const REVIEWER: EmployeeId = EmployeeId(3);
    const OUTSIDER: EmployeeId = EmployeeId(9);

    fn now() -> Timestamp {
        Timestamp::new(1_700_000_000)
    }

    fn draft() -> Appraisal {
        Appraisal::create(
            AppraisalId(1),
            AppraisalKind::Annual,
            EmployeeRef::new(APPRAISEE, false),
            EmployeeRef::new(APPRAISER, true),
            EmployeeRef::new(REVIEWER, true),
            Some("FY26".to_string()),
            now(),
            now().plus(365 * 24 * 60 * 60),
            now(),
        )
        .expect("create draft")
    }

    fn goal(id: u64, weightage: u8) -> Goal {
        Goal::new(
            GoalId(id),
            format!("Goal {id}"),
            "",
            "delivery",
            "high",
            Weightage::new(weightage),
        )
    }

    /// Attach [30, 40, 30] and return the entry ids.
    fn with_full_goals(appraisal: &mut Appraisal) -> Vec<EntryId> {
        [30_u8, 40, 30]
            .iter()
            .enumerate()
            .map(|(i, w)| {
                appraisal
                    .attach_goal(APPRAISER, goal(i as u64 + 1, *w), now())
                    .expect("attach goal")
            })
            .collect()
    }

    fn assess_all(appraisal: &Appraisal, rating: u8) -> Vec<AssessmentInput> {
        appraisal
            .goals()
            .map(|g| AssessmentInput {
                entry: g.entry,
                rating,
                comment: "Done.".to_string(),
            })
            .collect()
    }

    /// Drive a fresh draft all the way to `target`.
    fn appraisal_at(target: Status) -> Appraisal {
        let mut appraisal = draft();
        with_full_goals(&mut appraisal);

        let steps: [(Status, Box<dyn Fn(&mut Appraisal)>); 5] = [
            (Status::Submitted, Box::new(|_| {})),
            (Status::AppraiseeSelfAssessment, Box::new(|_| {})),
            (
                Status::AppraiserEvaluation,
                Box::new(|a| {
                    let items = assess_all(a, 4);
                    a.record_self_assessment(APPRAISEE, &items, now()).unwrap();
                }),
            ),
            (
                Status::ReviewerEvaluation,
                Box::new(|a| {
                    let items = assess_all(a, 3);
                    a.record_appraiser_evaluation(APPRAISER, &items, 4, "Solid year.", now())
                        .unwrap();
                }),
            ),
            (
                Status::Complete,
                Box::new(|a| {
                    a.record_reviewer_evaluation(REVIEWER, 4, "Agreed.", now())
                        .unwrap();
                }),
            ),
        ];

        for (next, prepare) in steps {
            if appraisal.status() == target {
                return appraisal;
            }
            prepare(&mut appraisal);
            let actor = match appraisal.status().designated_role().unwrap() {
                ActorRole::Appraisee => APPRAISEE,
                ActorRole::Appraiser => APPRAISER,
                ActorRole::Reviewer => REVIEWER,
                ActorRole::Other => unreachable!(),
            };
            appraisal.advance(actor, next, now()).unwrap();
        }
        appraisal
    }

    #[test]
    fn create_validates_distinct_parties() {
        let result = Appraisal::create(
            AppraisalId(1),
            AppraisalKind::Annual,
            EmployeeRef::new(APPRAISEE, false),
            EmployeeRef::new(APPRAISEE, true),
            EmployeeRef::new(REVIEWER, true),
            None,
            now(),
            now().plus(1000),
            now(),
        );
        assert!(matches!(
            result,
            Err(MeritError::BusinessRule(RuleViolation::SelfAppraiser { .. }))
        ));
    }

    #[test]
    fn create_validates_period_order() {
        let result = Appraisal::create(
            AppraisalId(1),
            AppraisalKind::Quarterly,
            EmployeeRef::new(APPRAISEE, false),
            EmployeeRef::new(APPRAISER, true),
            EmployeeRef::new(REVIEWER, true),
            None,
            now(),
            now(),
            now(),
        );
        assert!(matches!(
            result,
            Err(MeritError::Validation { field: "period_end", .. })
        ));
    }

    #[test]
    fn role_resolution() {
        let appraisal = draft();
        assert_eq!(appraisal.role_of(APPRAISEE), ActorRole::Appraisee);
        assert_eq!(appraisal.role_of(APPRAISER), ActorRole::Appraiser);
        assert_eq!(appraisal.role_of(REVIEWER), ActorRole::Reviewer);
        assert_eq!(appraisal.role_of(OUTSIDER), ActorRole::Other);
    }

    #[test]
    fn attach_copies_weightage_and_mints_entries() {
        let mut appraisal = draft();
        let entries = with_full_goals(&mut appraisal);

        assert_eq!(entries, vec![EntryId(1), EntryId(2), EntryId(3)]);
        assert_eq!(appraisal.goal_count(), 3);
        assert_eq!(appraisal.weightage_total(), 100);
        assert_eq!(
            appraisal.goal(EntryId(2)).unwrap().goal.weightage,
            Weightage::new(40)
        );
    }

    #[test]
    fn attach_rejects_overflow_without_mutating() {
        let mut appraisal = draft();
        with_full_goals(&mut appraisal);
        let before = appraisal.clone();

        let result = appraisal.attach_goal(APPRAISER, goal(4, 10), now());
        assert!(matches!(
            result,
            Err(MeritError::BusinessRule(RuleViolation::WeightageOverflow {
                current: 100,
                added: 10,
                resulting: 110,
            }))
        ));
        assert_eq!(appraisal, before);
    }

    #[test]
    fn attach_rejects_duplicate_catalog_goal() {
        let mut appraisal = draft();
        appraisal
            .attach_goal(APPRAISER, goal(1, 30), now())
            .expect("first attach");

        let result = appraisal.attach_goal(APPRAISER, goal(1, 30), now());
        assert!(matches!(
            result,
            Err(MeritError::BusinessRule(RuleViolation::DuplicateGoal {
                goal: GoalId(1),
            }))
        ));
    }

    #[test]
    fn appraisee_cannot_touch_goals_in_draft() {
        let mut appraisal = draft();
        let result = appraisal.attach_goal(APPRAISEE, goal(1, 30), now());
        assert!(matches!(result, Err(MeritError::ForbiddenField { .. })));
    }

    #[test]
    fn outsider_cannot_touch_anything() {
        let mut appraisal = draft();
        let result = appraisal.attach_goal(OUTSIDER, goal(1, 30), now());
        assert!(matches!(result, Err(MeritError::ForbiddenField { .. })));
    }

    #[test]
    fn remove_goal_is_draft_only() {
        let mut appraisal = appraisal_at(Status::Submitted);
        let result = appraisal.remove_goal(APPRAISER, EntryId(1), now());
        assert!(matches!(
            result,
            Err(MeritError::BusinessRule(RuleViolation::GoalsLocked {
                status: Status::Submitted,
            }))
        ));
    }

    #[test]
    fn remove_missing_entry_is_not_found() {
        let mut appraisal = draft();
        let result = appraisal.remove_goal(APPRAISER, EntryId(7), now());
        assert!(matches!(
            result,
            Err(MeritError::EntryNotFound { entry: EntryId(7), .. })
        ));
    }

    #[test]
    fn submit_requires_exact_hundred() {
        let mut appraisal = draft();
        with_full_goals(&mut appraisal);
        appraisal
            .update_goal_weightage(APPRAISER, EntryId(3), Weightage::new(31), now())
            .expect("reweight to 31");
        assert_eq!(appraisal.weightage_total(), 101);

        let result = appraisal.advance(APPRAISER, Status::Submitted, now());
        match result {
            Err(err @ MeritError::UnmetPrecondition { .. }) => {
                assert!(err.to_string().contains("current: 101%"));
            }
            other => panic!("expected unmet precondition, got {other:?}"),
        }
        assert_eq!(appraisal.status(), Status::Draft);
    }

    #[test]
    fn submit_succeeds_at_exact_hundred() {
        let mut appraisal = draft();
        with_full_goals(&mut appraisal);
        appraisal
            .advance(APPRAISER, Status::Submitted, now())
            .expect("submit at 100%");
        assert_eq!(appraisal.status(), Status::Submitted);
    }

    #[test]
    fn attach_after_submit_fails_arithmetically() {
        // The gate still shows the appraiser Editable(goals) at Submitted,
        // but the 100% invariant leaves no room for another goal.
        let mut appraisal = appraisal_at(Status::Submitted);
        let result = appraisal.attach_goal(APPRAISER, goal(9, 1), now());
        assert!(matches!(
            result,
            Err(MeritError::BusinessRule(RuleViolation::WeightageOverflow { .. }))
        ));
    }

    #[test]
    fn self_assessment_window() {
        let mut appraisal = appraisal_at(Status::AppraiseeSelfAssessment);
        let items = assess_all(&appraisal, 4);

        appraisal
            .record_self_assessment(APPRAISEE, &items, now())
            .expect("record self");
        assert!(appraisal.entries_missing_self_assessment().is_empty());

        // In-phase re-record overwrites.
        let revised = vec![AssessmentInput {
            entry: EntryId(1),
            rating: 5,
            comment: "Better than I thought.".to_string(),
        }];
        appraisal
            .record_self_assessment(APPRAISEE, &revised, now())
            .expect("re-record");
        assert_eq!(
            appraisal.goal(EntryId(1)).unwrap().self_assessment,
            Some(Assessment::new(Rating::new(5), "Better than I thought."))
        );
    }

    #[test]
    fn self_assessment_before_phase_is_unauthorized() {
        let mut appraisal = draft();
        with_full_goals(&mut appraisal);
        let items = assess_all(&appraisal, 4);

        let result = appraisal.record_self_assessment(APPRAISEE, &items, now());
        assert!(matches!(
            result,
            Err(MeritError::Unauthorized {
                required: ActorRole::Appraiser,
                ..
            })
        ));
    }

    #[test]
    fn batch_rejects_unknown_entry_without_mutating() {
        let mut appraisal = appraisal_at(Status::AppraiseeSelfAssessment);
        let mut items = assess_all(&appraisal, 4);
        items.push(AssessmentInput {
            entry: EntryId(99),
            rating: 4,
            comment: "ghost".to_string(),
        });

        let before = appraisal.clone();
        let result = appraisal.record_self_assessment(APPRAISEE, &items, now());
        assert!(matches!(
            result,
            Err(MeritError::EntryNotFound { entry: EntryId(99), .. })
        ));
        assert_eq!(appraisal, before);
    }

    #[test]
    fn advance_requires_all_self_assessments() {
        let mut appraisal = appraisal_at(Status::AppraiseeSelfAssessment);
        let partial = vec![AssessmentInput {
            entry: EntryId(1),
            rating: 4,
            comment: "Done.".to_string(),
        }];
        appraisal
            .record_self_assessment(APPRAISEE, &partial, now())
            .expect("partial record");

        let result = appraisal.advance(APPRAISEE, Status::AppraiserEvaluation, now());
        match result {
            Err(MeritError::UnmetPrecondition {
                failure: crate::types::PreconditionFailure::SelfAssessmentMissing { entries },
                ..
            }) => assert_eq!(entries, vec![EntryId(2), EntryId(3)]),
            other => panic!("expected missing self-assessments, got {other:?}"),
        }
    }

    #[test]
    fn reviewer_verdict_outside_phase_is_unauthorized() {
        let mut appraisal = appraisal_at(Status::AppraiserEvaluation);
        let result = appraisal.record_reviewer_evaluation(REVIEWER, 4, "Too early.", now());
        assert!(matches!(
            result,
            Err(MeritError::Unauthorized {
                required: ActorRole::Appraiser,
                ..
            })
        ));
    }

    #[test]
    fn appraiser_evaluation_enables_advance() {
        let mut appraisal = appraisal_at(Status::AppraiserEvaluation);
        let items = assess_all(&appraisal, 3);
        appraisal
            .record_appraiser_evaluation(APPRAISER, &items, 4, "Solid.", now())
            .expect("record evaluation");

        appraisal
            .advance(APPRAISER, Status::ReviewerEvaluation, now())
            .expect("advance to reviewer");
        assert_eq!(appraisal.status(), Status::ReviewerEvaluation);
    }

    #[test]
    fn advance_without_appraiser_ratings_lists_entries() {
        let mut appraisal = appraisal_at(Status::AppraiserEvaluation);
        let result = appraisal.advance(APPRAISER, Status::ReviewerEvaluation, now());
        match result {
            Err(MeritError::UnmetPrecondition {
                failure:
                    crate::types::PreconditionFailure::AppraiserAssessmentMissing { entries },
                ..
            }) => assert_eq!(entries.len(), 3),
            other => panic!("expected missing appraiser assessments, got {other:?}"),
        }
    }

    #[test]
    fn complete_requires_reviewer_overall() {
        let mut appraisal = appraisal_at(Status::ReviewerEvaluation);
        let result = appraisal.advance(REVIEWER, Status::Complete, now());
        assert!(matches!(
            result,
            Err(MeritError::UnmetPrecondition {
                failure: crate::types::PreconditionFailure::ReviewerOverallMissing,
                ..
            })
        ));

        appraisal
            .record_reviewer_evaluation(REVIEWER, 5, "Outstanding.", now())
            .expect("record verdict");
        appraisal
            .advance(REVIEWER, Status::Complete, now())
            .expect("complete");
        assert!(appraisal.status().is_terminal());
    }

    #[test]
    fn complete_locks_every_write() {
        let mut appraisal = appraisal_at(Status::Complete);

        let attach = appraisal.attach_goal(APPRAISER, goal(9, 10), now());
        assert!(matches!(attach, Err(MeritError::ForbiddenField { .. })));

        let verdict = appraisal.record_reviewer_evaluation(REVIEWER, 1, "Again.", now());
        assert!(matches!(verdict, Err(MeritError::ForbiddenField { .. })));

        let exit = appraisal.advance(REVIEWER, Status::Draft, now());
        assert!(matches!(exit, Err(MeritError::InvalidTransition { .. })));
    }

    #[test]
    fn repeat_transition_is_invalid() {
        let mut appraisal = appraisal_at(Status::Submitted);
        let result = appraisal.advance(APPRAISER, Status::Submitted, now());
        assert!(matches!(result, Err(MeritError::InvalidTransition { .. })));
    }

    #[test]
    fn full_chain_reaches_complete() {
        let appraisal = appraisal_at(Status::Complete);
        assert_eq!(appraisal.status(), Status::Complete);
        assert!(appraisal.entries_missing_self_assessment().is_empty());
        assert!(appraisal.entries_missing_appraiser_assessment().is_empty());
        assert!(appraisal.appraiser_overall().is_some());
        assert!(appraisal.reviewer_overall().is_some());
    }
}
