//! # Merit HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /appraisals` - List appraisal ids (optionally `?employee=N`)
//! - `POST /appraisal` - Create an appraisal
//! - `GET /appraisal/{id}` - Fetch one appraisal rendered for `?actor=N`
//! - `POST /appraisal/{id}/goal` - Attach a goal
//! - `POST /appraisal/{id}/goal/remove` - Remove a goal
//! - `POST /appraisal/{id}/goal/reweight` - Change a goal's weightage
//! - `POST /appraisal/{id}/assess` - Record the self-assessment batch
//! - `POST /appraisal/{id}/evaluate` - Record the appraiser evaluation
//! - `POST /appraisal/{id}/review` - Record the reviewer verdict
//! - `POST /appraisal/{id}/advance` - Advance the status chain
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `MERIT_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `MERIT_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `MERIT_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
// Re-export handlers and types for integration tests (via `merit::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    advance_handler, assess_handler, attach_goal_handler, create_appraisal_handler,
    evaluate_handler, get_appraisal_handler, health_handler, list_handler, remove_goal_handler,
    review_handler, reweight_goal_handler,
};
#[allow(unused_imports)]
pub use types::{
    AccessView, AdvanceRequest, AppraisalResponse, AppraisalView, AssessRequest, AssessmentItem,
    AssessmentView, AttachGoalRequest, CreateAppraisalRequest, EvaluateRequest, GoalView,
    HealthResponse, ListResponse, RemoveGoalRequest, ReviewRequest, ReweightGoalRequest,
    error_status,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use merit_core::{AppraisalService, MeritError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the appraisal service.
#[derive(Clone)]
pub struct AppState {
    /// The service owning the store, role directory, clock, and sink.
    pub service: Arc<RwLock<AppraisalService>>,
}

impl AppState {
    /// Create new app state with a service.
    #[must_use]
    pub fn new(service: AppraisalService) -> Self {
        Self {
            service: Arc::new(RwLock::new(service)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `MERIT_CORS_ORIGINS` environment variable:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
///
/// # Security Note
///
/// The default is restrictive (localhost only). Set `MERIT_CORS_ORIGINS=*`
/// explicitly only for development or if you understand the security implications.
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("MERIT_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            // Explicit wildcard - warn about security implications
            tracing::warn!(
                "CORS: Allowing ALL origins (MERIT_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            // Parse comma-separated origins
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in MERIT_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            // No configuration - default to localhost only (restrictive)
            tracing::info!("CORS: No MERIT_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. CORS - handles preflight requests
/// 2. Tracing - logs all requests
/// 3. Rate Limiting - protects against DoS (if enabled)
/// 4. Authentication - validates API key (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    // Check if rate limiting is enabled
    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    // Check if authentication is enabled
    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "⚠️  API key authentication DISABLED - all endpoints are publicly accessible! \
             Set MERIT_API_KEY environment variable to enable authentication."
        );
    }

    // Build base router with routes
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/appraisals", get(handlers::list_handler))
        .route("/appraisal", post(handlers::create_appraisal_handler))
        .route("/appraisal/{id}", get(handlers::get_appraisal_handler))
        .route("/appraisal/{id}/goal", post(handlers::attach_goal_handler))
        .route(
            "/appraisal/{id}/goal/remove",
            post(handlers::remove_goal_handler),
        )
        .route(
            "/appraisal/{id}/goal/reweight",
            post(handlers::reweight_goal_handler),
        )
        .route("/appraisal/{id}/assess", post(handlers::assess_handler))
        .route("/appraisal/{id}/evaluate", post(handlers::evaluate_handler))
        .route("/appraisal/{id}/review", post(handlers::review_handler))
        .route("/appraisal/{id}/advance", post(handlers::advance_handler));

    // Apply authentication middleware (innermost - runs last on request)
    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    // Apply rate limiting middleware
    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Apply CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, service: AppraisalService) -> Result<(), MeritError> {
    let state = AppState::new(service);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| MeritError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Merit HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| MeritError::IoError(format!("Server error: {}", e)))
}
