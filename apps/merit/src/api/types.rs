//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Every mutation request names its actor explicitly; the server carries
//! no ambient user context. Responses wrap the gate-filtered
//! [`AppraisalView`], so a caller only ever receives the field groups
//! their role is granted at the appraisal's current status.

use axum::http::StatusCode;
use merit_core::{
    compute_field_access, Appraisal, AppraisalGoal, AppraisalId, Assessment, AssessmentInput,
    CreateRequest, EmployeeId, EntryId, FieldAccess, Goal, GoalId, MeritError, Status, Timestamp,
    Weightage,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// CREATE REQUEST
// =============================================================================

/// Appraisal creation request.
///
/// The period bounds are optional epoch seconds; the core fills in the
/// defaults (now, and start plus one review term).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppraisalRequest {
    pub appraisee: u64,
    pub appraiser: u64,
    pub reviewer: u64,
    /// Kind label: annual, half_yearly, quarterly, probation.
    pub kind: String,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub period_start: Option<i64>,
    #[serde(default)]
    pub period_end: Option<i64>,
}

impl CreateAppraisalRequest {
    /// Convert to a core create request, validating the kind label.
    pub fn to_request(&self) -> Result<CreateRequest, MeritError> {
        Ok(CreateRequest {
            appraisee: EmployeeId(self.appraisee),
            appraiser: EmployeeId(self.appraiser),
            reviewer: EmployeeId(self.reviewer),
            kind: self.kind.parse()?,
            range: self.range.clone(),
            period_start: self.period_start.map(Timestamp::new),
            period_end: self.period_end.map(Timestamp::new),
        })
    }
}

// =============================================================================
// GOAL REQUESTS
// =============================================================================

/// Goal attachment request.
///
/// Carries the catalog entry by value; what gets attached is this copy,
/// later catalog edits never reach back into the appraisal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachGoalRequest {
    pub actor: u64,
    pub goal_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub performance_factor: String,
    #[serde(default)]
    pub importance: String,
    /// Percentage share, 1 to 100.
    pub weightage: u8,
}

impl AttachGoalRequest {
    /// Convert to a catalog goal value. Field validation happens in the core.
    #[must_use]
    pub fn to_goal(&self) -> Goal {
        Goal::new(
            GoalId(self.goal_id),
            self.title.clone(),
            self.description.clone(),
            self.performance_factor.clone(),
            self.importance.clone(),
            Weightage(self.weightage),
        )
    }
}

/// Goal removal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveGoalRequest {
    pub actor: u64,
    pub entry: u64,
}

/// Goal reweight request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReweightGoalRequest {
    pub actor: u64,
    pub entry: u64,
    pub weightage: u8,
}

// =============================================================================
// ASSESSMENT REQUESTS
// =============================================================================

/// One per-goal rating and comment inside a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentItem {
    pub entry: u64,
    pub rating: u8,
    pub comment: String,
}

impl AssessmentItem {
    /// Convert to the core batch input.
    #[must_use]
    pub fn to_input(&self) -> AssessmentInput {
        AssessmentInput {
            entry: EntryId(self.entry),
            rating: self.rating,
            comment: self.comment.clone(),
        }
    }
}

/// Self-assessment batch from the appraisee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessRequest {
    pub actor: u64,
    pub items: Vec<AssessmentItem>,
}

impl AssessRequest {
    /// Convert the batch to core inputs.
    #[must_use]
    pub fn to_inputs(&self) -> Vec<AssessmentInput> {
        self.items.iter().map(AssessmentItem::to_input).collect()
    }
}

/// Appraiser evaluation batch: per-goal ratings plus the overall verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub actor: u64,
    pub items: Vec<AssessmentItem>,
    pub overall_rating: u8,
    pub overall_comment: String,
}

impl EvaluateRequest {
    /// Convert the batch to core inputs.
    #[must_use]
    pub fn to_inputs(&self) -> Vec<AssessmentInput> {
        self.items.iter().map(AssessmentItem::to_input).collect()
    }
}

/// Reviewer verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub actor: u64,
    pub overall_rating: u8,
    pub overall_comment: String,
}

// =============================================================================
// ADVANCE REQUEST
// =============================================================================

/// Status transition request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub actor: u64,
    /// Target status name, e.g. "submitted" or "complete".
    pub target: String,
}

impl AdvanceRequest {
    /// Parse the target status label.
    pub fn to_target(&self) -> Result<Status, MeritError> {
        self.target.parse()
    }
}

// =============================================================================
// APPRAISAL VIEW
// =============================================================================

/// Grant names for one viewer, group by group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessView {
    pub goals: String,
    pub self_fields: String,
    pub appraiser_fields: String,
    pub reviewer_fields: String,
}

impl AccessView {
    fn from_access(access: FieldAccess) -> Self {
        Self {
            goals: access.goals.name().to_string(),
            self_fields: access.self_fields.name().to_string(),
            appraiser_fields: access.appraiser_fields.name().to_string(),
            reviewer_fields: access.reviewer_fields.name().to_string(),
        }
    }
}

/// A recorded rating and comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentView {
    pub rating: u8,
    pub comment: String,
}

impl AssessmentView {
    fn from_assessment(assessment: &Assessment) -> Self {
        Self {
            rating: assessment.rating.0,
            comment: assessment.comment.clone(),
        }
    }
}

/// One attached goal as rendered for a viewer.
///
/// Assessment slots the viewer's grants hide are omitted even when the
/// underlying data exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalView {
    pub entry: u64,
    pub goal_id: u64,
    pub title: String,
    pub description: String,
    pub performance_factor: String,
    pub importance: String,
    pub weightage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub self_assessment: Option<AssessmentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub appraiser_assessment: Option<AssessmentView>,
}

impl GoalView {
    fn render(goal: &AppraisalGoal, access: FieldAccess) -> Self {
        Self {
            entry: goal.entry.0,
            goal_id: goal.goal.id.0,
            title: goal.goal.title.clone(),
            description: goal.goal.description.clone(),
            performance_factor: goal.goal.performance_factor.clone(),
            importance: goal.goal.importance.clone(),
            weightage: goal.goal.weightage.0,
            self_assessment: if access.self_fields.is_visible() {
                goal.self_assessment.as_ref().map(AssessmentView::from_assessment)
            } else {
                None
            },
            appraiser_assessment: if access.appraiser_fields.is_visible() {
                goal.appraiser_assessment.as_ref().map(AssessmentView::from_assessment)
            } else {
                None
            },
        }
    }
}

/// The gate-filtered rendering of one appraisal.
///
/// The envelope (id, kind, status, parties, period, version) is always
/// present. Field groups appear only when the viewer's grant at the
/// current status makes them visible; hidden groups are absent from the
/// JSON entirely, not rendered as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppraisalView {
    pub id: u64,
    pub kind: String,
    pub status: String,
    pub viewer_role: String,
    pub appraisee: u64,
    pub appraiser: u64,
    pub reviewer: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub range: Option<String>,
    pub period_start: i64,
    pub period_end: i64,
    pub version: u64,
    pub access: AccessView,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub goals: Vec<GoalView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub weightage_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub appraiser_overall: Option<AssessmentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub reviewer_overall: Option<AssessmentView>,
}

impl AppraisalView {
    /// Render an appraisal for one viewer through the access gate.
    #[must_use]
    pub fn render(appraisal: &Appraisal, viewer: EmployeeId) -> Self {
        let role = appraisal.role_of(viewer);
        let access = compute_field_access(appraisal.status(), role);

        let goals: Vec<GoalView> = if access.goals.is_visible() {
            appraisal
                .goals()
                .map(|goal| GoalView::render(goal, access))
                .collect()
        } else {
            Vec::new()
        };
        let weightage_total = if access.goals.is_visible() {
            Some(appraisal.weightage_total())
        } else {
            None
        };
        let appraiser_overall = if access.appraiser_fields.is_visible() {
            appraisal
                .appraiser_overall()
                .map(AssessmentView::from_assessment)
        } else {
            None
        };
        let reviewer_overall = if access.reviewer_fields.is_visible() {
            appraisal
                .reviewer_overall()
                .map(AssessmentView::from_assessment)
        } else {
            None
        };

        Self {
            id: appraisal.id().0,
            kind: appraisal.kind().name().to_string(),
            status: appraisal.status().name().to_string(),
            viewer_role: role.name().to_string(),
            appraisee: appraisal.appraisee().id.0,
            appraiser: appraisal.appraiser().id.0,
            reviewer: appraisal.reviewer().id.0,
            range: appraisal.range().map(str::to_string),
            period_start: appraisal.period_start().value(),
            period_end: appraisal.period_end().value(),
            version: appraisal.version().0,
            access: AccessView::from_access(access),
            goals,
            weightage_total,
            appraiser_overall,
            reviewer_overall,
        }
    }
}

// =============================================================================
// RESPONSE ENVELOPES
// =============================================================================

/// Envelope for every appraisal-returning endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppraisalResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub appraisal: Option<AppraisalView>,
    /// Denial kind when the request failed, e.g. "unauthorized".
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub error: Option<String>,
}

impl AppraisalResponse {
    pub fn success(view: AppraisalView) -> Self {
        Self {
            success: true,
            appraisal: Some(view),
            error_kind: None,
            error: None,
        }
    }

    pub fn failure(err: &MeritError) -> Self {
        Self {
            success: false,
            appraisal: None,
            error_kind: Some(err.kind().to_string()),
            error: Some(err.to_string()),
        }
    }
}

/// Appraisal id listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    pub appraisals: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub error: Option<String>,
}

impl ListResponse {
    pub fn success(ids: Vec<AppraisalId>) -> Self {
        Self {
            success: true,
            appraisals: ids.iter().map(|id| id.0).collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            appraisals: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// ERROR STATUS MAPPING
// =============================================================================

/// Map a core error to its HTTP status.
///
/// Role and field denials are 403: the request passed deployment
/// authentication, the actor just lacks the right. 401 stays reserved
/// for the API key middleware. An unmet precondition is 400 like any
/// other incomplete input; the client can finish the data and resend.
/// An invalid transition or a stale version is 409: the appraisal's
/// current state refused the request and resending cannot fix it.
#[must_use]
pub fn error_status(err: &MeritError) -> StatusCode {
    match err {
        MeritError::Validation { .. }
        | MeritError::BusinessRule(_)
        | MeritError::UnmetPrecondition { .. } => StatusCode::BAD_REQUEST,
        MeritError::Unauthorized { .. } | MeritError::ForbiddenField { .. } => {
            StatusCode::FORBIDDEN
        }
        MeritError::AppraisalNotFound(_)
        | MeritError::EmployeeNotFound(_)
        | MeritError::EntryNotFound { .. } => StatusCode::NOT_FOUND,
        MeritError::InvalidTransition { .. } | MeritError::Conflict { .. } => {
            StatusCode::CONFLICT
        }
        MeritError::SerializationError(_)
        | MeritError::DeserializationError(_)
        | MeritError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
