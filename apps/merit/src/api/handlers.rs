//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every mutation takes the write lock, runs one core operation, and
//! answers with the gate-filtered view rendered for the requesting
//! actor. Denials map straight off the core error: the handlers never
//! re-derive authorization on their own.

use super::{
    AppState,
    types::{
        AdvanceRequest, AppraisalResponse, AppraisalView, AssessRequest, AttachGoalRequest,
        CreateAppraisalRequest, EvaluateRequest, HealthResponse, ListResponse, RemoveGoalRequest,
        ReviewRequest, ReweightGoalRequest, error_status,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use merit_core::{ActorRole, AppraisalId, EmployeeId, EntryId, MeritError, Weightage};
use serde::Deserialize;

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

/// Viewer identity for read endpoints.
#[derive(Debug, Deserialize)]
pub struct ViewerParams {
    pub actor: u64,
}

/// Optional participant filter for the listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub employee: Option<u64>,
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CREATE HANDLER
// =============================================================================

/// Create an appraisal.
pub async fn create_appraisal_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateAppraisalRequest>,
) -> impl IntoResponse {
    // Validate and convert the request before taking the lock
    let core_request = match request.to_request() {
        Ok(r) => r,
        Err(e) => return (error_status(&e), Json(AppraisalResponse::failure(&e))),
    };
    // The creator is the appraiser; render the fresh draft for them
    let viewer = core_request.appraiser;

    let mut service = state.service.write().await;
    match service.create_appraisal(core_request) {
        Ok(appraisal) => (
            StatusCode::OK,
            Json(AppraisalResponse::success(AppraisalView::render(
                &appraisal, viewer,
            ))),
        ),
        Err(e) => (error_status(&e), Json(AppraisalResponse::failure(&e))),
    }
}

// =============================================================================
// GET HANDLER
// =============================================================================

/// Fetch one appraisal, rendered for the requesting actor.
///
/// Non-participants get the same 404 as a missing id. Their gate row is
/// all hidden, and an envelope-only answer would still leak that the
/// appraisal exists.
pub async fn get_appraisal_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<ViewerParams>,
) -> impl IntoResponse {
    let service = state.service.read().await;
    match service.get_appraisal(AppraisalId(id)) {
        Ok(appraisal) => {
            let viewer = EmployeeId(params.actor);
            if appraisal.role_of(viewer) == ActorRole::Other {
                let e = MeritError::AppraisalNotFound(AppraisalId(id));
                return (error_status(&e), Json(AppraisalResponse::failure(&e)));
            }
            (
                StatusCode::OK,
                Json(AppraisalResponse::success(AppraisalView::render(
                    &appraisal, viewer,
                ))),
            )
        }
        Err(e) => (error_status(&e), Json(AppraisalResponse::failure(&e))),
    }
}

// =============================================================================
// LIST HANDLER
// =============================================================================

/// List appraisal ids, optionally scoped to one participant.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let service = state.service.read().await;
    let result = match params.employee {
        Some(employee) => service.list_for(EmployeeId(employee)),
        None => service.list(),
    };
    match result {
        Ok(ids) => (StatusCode::OK, Json(ListResponse::success(ids))),
        Err(e) => (
            error_status(&e),
            Json(ListResponse::error(format!("List failed: {}", e))),
        ),
    }
}

// =============================================================================
// GOAL HANDLERS
// =============================================================================

/// Attach a goal to a draft appraisal.
pub async fn attach_goal_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<AttachGoalRequest>,
) -> impl IntoResponse {
    let actor = EmployeeId(request.actor);
    let goal = request.to_goal();

    let mut service = state.service.write().await;
    match service.attach_goal(AppraisalId(id), actor, goal) {
        Ok(appraisal) => (
            StatusCode::OK,
            Json(AppraisalResponse::success(AppraisalView::render(
                &appraisal, actor,
            ))),
        ),
        Err(e) => (error_status(&e), Json(AppraisalResponse::failure(&e))),
    }
}

/// Remove a goal from a draft appraisal.
pub async fn remove_goal_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<RemoveGoalRequest>,
) -> impl IntoResponse {
    let actor = EmployeeId(request.actor);

    let mut service = state.service.write().await;
    match service.remove_goal(AppraisalId(id), actor, EntryId(request.entry)) {
        Ok(appraisal) => (
            StatusCode::OK,
            Json(AppraisalResponse::success(AppraisalView::render(
                &appraisal, actor,
            ))),
        ),
        Err(e) => (error_status(&e), Json(AppraisalResponse::failure(&e))),
    }
}

/// Change the weightage of one attached goal.
pub async fn reweight_goal_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<ReweightGoalRequest>,
) -> impl IntoResponse {
    let actor = EmployeeId(request.actor);

    let mut service = state.service.write().await;
    match service.update_goal_weightage(
        AppraisalId(id),
        actor,
        EntryId(request.entry),
        Weightage(request.weightage),
    ) {
        Ok(appraisal) => (
            StatusCode::OK,
            Json(AppraisalResponse::success(AppraisalView::render(
                &appraisal, actor,
            ))),
        ),
        Err(e) => (error_status(&e), Json(AppraisalResponse::failure(&e))),
    }
}

// =============================================================================
// ASSESSMENT HANDLERS
// =============================================================================

/// Record the appraisee's self-assessment batch.
pub async fn assess_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<AssessRequest>,
) -> impl IntoResponse {
    let actor = EmployeeId(request.actor);
    let items = request.to_inputs();

    let mut service = state.service.write().await;
    match service.record_self_assessment(AppraisalId(id), actor, items) {
        Ok(appraisal) => (
            StatusCode::OK,
            Json(AppraisalResponse::success(AppraisalView::render(
                &appraisal, actor,
            ))),
        ),
        Err(e) => (error_status(&e), Json(AppraisalResponse::failure(&e))),
    }
}

/// Record the appraiser's evaluation batch and overall verdict.
pub async fn evaluate_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<EvaluateRequest>,
) -> impl IntoResponse {
    let actor = EmployeeId(request.actor);
    let items = request.to_inputs();

    let mut service = state.service.write().await;
    match service.record_appraiser_evaluation(
        AppraisalId(id),
        actor,
        items,
        request.overall_rating,
        &request.overall_comment,
    ) {
        Ok(appraisal) => (
            StatusCode::OK,
            Json(AppraisalResponse::success(AppraisalView::render(
                &appraisal, actor,
            ))),
        ),
        Err(e) => (error_status(&e), Json(AppraisalResponse::failure(&e))),
    }
}

/// Record the reviewer's overall verdict.
pub async fn review_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<ReviewRequest>,
) -> impl IntoResponse {
    let actor = EmployeeId(request.actor);

    let mut service = state.service.write().await;
    match service.record_reviewer_evaluation(
        AppraisalId(id),
        actor,
        request.overall_rating,
        &request.overall_comment,
    ) {
        Ok(appraisal) => (
            StatusCode::OK,
            Json(AppraisalResponse::success(AppraisalView::render(
                &appraisal, actor,
            ))),
        ),
        Err(e) => (error_status(&e), Json(AppraisalResponse::failure(&e))),
    }
}

// =============================================================================
// ADVANCE HANDLER
// =============================================================================

/// Advance the appraisal along its status chain.
pub async fn advance_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<AdvanceRequest>,
) -> impl IntoResponse {
    let actor = EmployeeId(request.actor);
    // Parse the target status before taking the lock
    let target = match request.to_target() {
        Ok(t) => t,
        Err(e) => return (error_status(&e), Json(AppraisalResponse::failure(&e))),
    };

    let mut service = state.service.write().await;
    match service.request_transition(AppraisalId(id), target, actor) {
        Ok(appraisal) => (
            StatusCode::OK,
            Json(AppraisalResponse::success(AppraisalView::render(
                &appraisal, actor,
            ))),
        ),
        Err(e) => (error_status(&e), Json(AppraisalResponse::failure(&e))),
    }
}
