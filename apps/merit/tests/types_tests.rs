//! Unit tests for API types, converters, and gate-filtered rendering.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use merit::api::{
    AdvanceRequest, AppraisalResponse, AppraisalView, AssessmentItem, AttachGoalRequest,
    CreateAppraisalRequest, HealthResponse, ListResponse, error_status,
};
use merit_core::{
    ActorRole, Appraisal, AppraisalId, AppraisalKind, AssessmentInput, EmployeeId, EmployeeRef,
    EntryId, FieldGroup, Goal, GoalId, Grant, MeritError, PreconditionFailure, RuleViolation,
    Status, Timestamp, Version, Weightage,
};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

const NOW: Timestamp = Timestamp(1_700_000_000);

/// Draft appraisal #1 with one 30% goal, parties 1/2/3.
fn draft_appraisal() -> Appraisal {
    let mut appraisal = Appraisal::create(
        AppraisalId(1),
        AppraisalKind::Annual,
        EmployeeRef::new(EmployeeId(1), false),
        EmployeeRef::new(EmployeeId(2), true),
        EmployeeRef::new(EmployeeId(3), true),
        Some("FY26".to_string()),
        NOW,
        NOW.plus(1000),
        NOW,
    )
    .unwrap();
    appraisal
        .attach_goal(
            EmployeeId(2),
            Goal::new(
                GoalId(10),
                "Ship the migration",
                "Move the billing pipeline",
                "Delivery",
                "High",
                Weightage(30),
            ),
            NOW,
        )
        .unwrap();
    appraisal
}

/// Appraisal in the self-assessment phase with one recorded self rating.
fn self_phase_appraisal() -> Appraisal {
    let mut appraisal = Appraisal::create(
        AppraisalId(1),
        AppraisalKind::Annual,
        EmployeeRef::new(EmployeeId(1), false),
        EmployeeRef::new(EmployeeId(2), true),
        EmployeeRef::new(EmployeeId(3), true),
        None,
        NOW,
        NOW.plus(1000),
        NOW,
    )
    .unwrap();
    appraisal
        .attach_goal(
            EmployeeId(2),
            Goal::new(GoalId(10), "Ship the migration", "", "", "", Weightage(60)),
            NOW,
        )
        .unwrap();
    appraisal
        .attach_goal(
            EmployeeId(2),
            Goal::new(GoalId(11), "Cut p99 latency", "", "", "", Weightage(40)),
            NOW,
        )
        .unwrap();
    appraisal
        .advance(EmployeeId(2), Status::Submitted, NOW)
        .unwrap();
    appraisal
        .advance(EmployeeId(1), Status::AppraiseeSelfAssessment, NOW)
        .unwrap();
    appraisal
        .record_self_assessment(
            EmployeeId(1),
            &[AssessmentInput {
                entry: EntryId(1),
                rating: 4,
                comment: "Delivered ahead of plan".to_string(),
            }],
            NOW,
        )
        .unwrap();
    appraisal
}

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_serialization() {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: "0.4.2".to_string(),
    };

    let json = serde_json::to_string(&health).unwrap();
    assert!(json.contains("\"status\":\"ok\""));
    assert!(json.contains("\"version\":\"0.4.2\""));
}

#[test]
fn test_health_response_deserialization() {
    let json = r#"{"status":"healthy","version":"1.0.0"}"#;
    let health: HealthResponse = serde_json::from_str(json).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

// =============================================================================
// CREATE REQUEST TESTS
// =============================================================================

#[test]
fn test_create_request_deserialization() {
    let json = r#"{
        "appraisee": 1,
        "appraiser": 2,
        "reviewer": 3,
        "kind": "half_yearly",
        "range": "H1 FY26",
        "period_start": 1000,
        "period_end": 2000
    }"#;
    let request: CreateAppraisalRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.appraisee, 1);
    assert_eq!(request.kind, "half_yearly");
    assert_eq!(request.range.as_deref(), Some("H1 FY26"));
    assert_eq!(request.period_start, Some(1000));
}

#[test]
fn test_create_request_optional_fields_default() {
    let json = r#"{"appraisee":1,"appraiser":2,"reviewer":3,"kind":"annual"}"#;
    let request: CreateAppraisalRequest = serde_json::from_str(json).unwrap();

    assert!(request.range.is_none());
    assert!(request.period_start.is_none());
    assert!(request.period_end.is_none());
}

#[test]
fn test_create_request_to_request_valid() {
    let request = CreateAppraisalRequest {
        appraisee: 1,
        appraiser: 2,
        reviewer: 3,
        kind: "quarterly".to_string(),
        range: Some("Q3".to_string()),
        period_start: Some(5000),
        period_end: None,
    };

    let core = request.to_request().unwrap();
    assert_eq!(core.appraisee, EmployeeId(1));
    assert_eq!(core.kind, AppraisalKind::Quarterly);
    assert_eq!(core.period_start, Some(Timestamp(5000)));
    assert!(core.period_end.is_none());
}

#[test]
fn test_create_request_to_request_unknown_kind() {
    let request = CreateAppraisalRequest {
        appraisee: 1,
        appraiser: 2,
        reviewer: 3,
        kind: "weekly".to_string(),
        range: None,
        period_start: None,
        period_end: None,
    };

    let err = request.to_request().unwrap_err();
    assert!(matches!(err, MeritError::Validation { field: "kind", .. }));
}

// =============================================================================
// CONVERTER TESTS
// =============================================================================

#[test]
fn test_attach_request_to_goal() {
    let request = AttachGoalRequest {
        actor: 2,
        goal_id: 10,
        title: "Ship the migration".to_string(),
        description: "Move the billing pipeline".to_string(),
        performance_factor: "Delivery".to_string(),
        importance: "High".to_string(),
        weightage: 40,
    };

    let goal = request.to_goal();
    assert_eq!(goal.id, GoalId(10));
    assert_eq!(goal.title, "Ship the migration");
    assert_eq!(goal.weightage, Weightage(40));
}

#[test]
fn test_assessment_item_to_input() {
    let item = AssessmentItem {
        entry: 7,
        rating: 4,
        comment: "Landed cleanly".to_string(),
    };

    let input = item.to_input();
    assert_eq!(input.entry, EntryId(7));
    assert_eq!(input.rating, 4);
    assert_eq!(input.comment, "Landed cleanly");
}

#[test]
fn test_advance_request_to_target_valid() {
    let request = AdvanceRequest {
        actor: 3,
        target: "reviewer_evaluation".to_string(),
    };

    assert_eq!(request.to_target().unwrap(), Status::ReviewerEvaluation);
}

#[test]
fn test_advance_request_to_target_invalid() {
    let request = AdvanceRequest {
        actor: 3,
        target: "sideways".to_string(),
    };

    let err = request.to_target().unwrap_err();
    assert!(matches!(
        err,
        MeritError::Validation { field: "status", .. }
    ));
}

// =============================================================================
// RESPONSE ENVELOPE TESTS
// =============================================================================

#[test]
fn test_appraisal_response_success_serialization() {
    let view = AppraisalView::render(&draft_appraisal(), EmployeeId(2));
    let response = AppraisalResponse::success(view);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert!(json.get("error").is_none());
    assert!(json.get("error_kind").is_none());
    assert_eq!(json["appraisal"]["id"], 1);
}

#[test]
fn test_appraisal_response_failure_carries_kind() {
    let err = MeritError::AppraisalNotFound(AppraisalId(7));
    let response = AppraisalResponse::failure(&err);

    assert!(!response.success);
    assert_eq!(response.error_kind.as_deref(), Some("entity_not_found"));
    assert!(response.error.unwrap().contains("Appraisal not found"));
}

#[test]
fn test_appraisal_response_failure_omits_view() {
    let err = MeritError::AppraisalNotFound(AppraisalId(7));
    let response = AppraisalResponse::failure(&err);

    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("appraisal").is_none());
    assert_eq!(json["error_kind"], "entity_not_found");
}

#[test]
fn test_list_response_success() {
    let response = ListResponse::success(vec![AppraisalId(1), AppraisalId(2)]);

    assert!(response.success);
    assert_eq!(response.appraisals, vec![1, 2]);
    assert!(response.error.is_none());
}

#[test]
fn test_list_response_error() {
    let response = ListResponse::error("backend unavailable");

    assert!(!response.success);
    assert!(response.appraisals.is_empty());
    assert_eq!(response.error.as_deref(), Some("backend unavailable"));
}

// =============================================================================
// ERROR STATUS MAPPING TESTS
// =============================================================================

#[test]
fn test_error_status_input_errors_are_400() {
    let validation = MeritError::Validation {
        field: "kind",
        reason: "unknown".to_string(),
    };
    assert_eq!(error_status(&validation), StatusCode::BAD_REQUEST);

    let rule = MeritError::BusinessRule(RuleViolation::WeightageOverflow {
        current: 70,
        added: 40,
        resulting: 110,
    });
    assert_eq!(error_status(&rule), StatusCode::BAD_REQUEST);

    // Incomplete phase data is client-fixable input, not a state conflict
    let precondition = MeritError::UnmetPrecondition {
        from: Status::Draft,
        to: Status::Submitted,
        failure: PreconditionFailure::WeightageTotal { total: 60 },
    };
    assert_eq!(error_status(&precondition), StatusCode::BAD_REQUEST);
}

#[test]
fn test_error_status_denials_are_403() {
    let unauthorized = MeritError::Unauthorized {
        actor: EmployeeId(1),
        role: ActorRole::Appraisee,
        required: ActorRole::Appraiser,
        status: Status::Draft,
    };
    assert_eq!(error_status(&unauthorized), StatusCode::FORBIDDEN);

    let forbidden = MeritError::ForbiddenField {
        status: Status::Draft,
        role: ActorRole::Appraisee,
        group: FieldGroup::Goals,
        grant: Grant::Hidden,
    };
    assert_eq!(error_status(&forbidden), StatusCode::FORBIDDEN);
}

#[test]
fn test_error_status_missing_entities_are_404() {
    assert_eq!(
        error_status(&MeritError::AppraisalNotFound(AppraisalId(1))),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        error_status(&MeritError::EmployeeNotFound(EmployeeId(9))),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        error_status(&MeritError::EntryNotFound {
            appraisal: AppraisalId(1),
            entry: EntryId(9),
        }),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_error_status_state_refusals_are_409() {
    let transition = MeritError::InvalidTransition {
        from: Status::Draft,
        to: Status::Complete,
    };
    assert_eq!(error_status(&transition), StatusCode::CONFLICT);

    let conflict = MeritError::Conflict {
        appraisal: AppraisalId(1),
        submitted: Version::new(3),
        stored: Version::new(4),
    };
    assert_eq!(error_status(&conflict), StatusCode::CONFLICT);
}

#[test]
fn test_error_status_storage_failures_are_500() {
    assert_eq!(
        error_status(&MeritError::IoError("disk gone".to_string())),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        error_status(&MeritError::DeserializationError("bad bytes".to_string())),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

// =============================================================================
// VIEW RENDERING TESTS
// =============================================================================

#[test]
fn test_render_draft_for_appraiser() {
    let view = AppraisalView::render(&draft_appraisal(), EmployeeId(2));

    assert_eq!(view.viewer_role, "appraiser");
    assert_eq!(view.status, "draft");
    assert_eq!(view.access.goals, "editable");
    assert_eq!(view.goals.len(), 1);
    assert_eq!(view.goals[0].goal_id, 10);
    assert_eq!(view.goals[0].weightage, 30);
    assert_eq!(view.weightage_total, Some(30));
    assert_eq!(view.range.as_deref(), Some("FY26"));
}

#[test]
fn test_render_draft_for_appraisee_hides_everything() {
    let view = AppraisalView::render(&draft_appraisal(), EmployeeId(1));

    assert_eq!(view.viewer_role, "appraisee");
    assert_eq!(view.access.goals, "hidden");
    assert!(view.goals.is_empty());
    assert_eq!(view.weightage_total, None);
    assert!(view.appraiser_overall.is_none());

    // Hidden groups are dropped from the JSON, not rendered as null
    let json = serde_json::to_value(&view).unwrap();
    assert!(json.get("goals").is_none());
    assert!(json.get("weightage_total").is_none());
    assert!(json.get("appraiser_overall").is_none());
    // The envelope survives regardless of grants
    assert_eq!(json["id"], 1);
    assert_eq!(json["status"], "draft");
}

#[test]
fn test_render_self_phase_masks_appraiser_slots() {
    let appraisal = self_phase_appraisal();

    let view = AppraisalView::render(&appraisal, EmployeeId(1));
    assert_eq!(view.access.goals, "read_only");
    assert_eq!(view.access.self_fields, "editable");
    assert_eq!(view.access.appraiser_fields, "hidden");
    assert_eq!(view.goals.len(), 2);
    let first = &view.goals[0];
    assert_eq!(first.self_assessment.as_ref().unwrap().rating, 4);
    assert!(first.appraiser_assessment.is_none());

    // The appraiser is not the designated role in this phase
    let view = AppraisalView::render(&appraisal, EmployeeId(2));
    assert_eq!(view.access.goals, "hidden");
    assert!(view.goals.is_empty());
}

#[test]
fn test_render_for_outsider_keeps_envelope_only() {
    // The renderer itself is total; the HTTP layer turns this into a 404
    let view = AppraisalView::render(&draft_appraisal(), EmployeeId(42));

    assert_eq!(view.viewer_role, "other");
    assert_eq!(view.id, 1);
    assert_eq!(view.access.goals, "hidden");
    assert_eq!(view.access.reviewer_fields, "hidden");
    assert!(view.goals.is_empty());
}
