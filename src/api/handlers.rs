//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for the run lifecycle
//! endpoints.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Paycheck, PayrollRun};

use super::request::{ActorRequest, ApproveRequest, CreateRunRequest, VoidRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/runs", post(create_run_handler))
        .route("/runs/:id", get(get_run_handler))
        .route("/runs/:id/paychecks", get(get_paychecks_handler))
        .route("/runs/:id/calculate", post(calculate_handler))
        .route("/runs/:id/submit", post(submit_handler))
        .route("/runs/:id/approve", post(approve_handler))
        .route("/runs/:id/process", post(process_handler))
        .route("/runs/:id/void", post(void_handler))
        .route("/runs/:id/cancel", post(cancel_handler))
        .with_state(state)
}

/// Handler for `POST /runs`.
async fn create_run_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateRunRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => ApiError::new(
                    "MISSING_CONTENT_TYPE",
                    "Content-Type must be application/json",
                ),
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    info!(
        correlation_id = %correlation_id,
        company_id = %request.company_id,
        "Creating payroll run"
    );
    match state.engine().create_run(
        &request.company_id,
        request.period.into(),
        request.payroll_type,
        &request.created_by,
    ) {
        Ok(run) => (StatusCode::CREATED, Json(run)).into_response(),
        Err(err) => ApiErrorResponse::from(err).into_response(),
    }
}

/// Handler for `GET /runs/{id}`.
async fn get_run_handler(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<PayrollRun>, ApiErrorResponse> {
    Ok(Json(state.engine().get_run(run_id)?))
}

/// Handler for `GET /runs/{id}/paychecks`.
async fn get_paychecks_handler(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<Vec<Paycheck>>, ApiErrorResponse> {
    Ok(Json(state.engine().paychecks(run_id)?))
}

/// Handler for `POST /runs/{id}/calculate`.
async fn calculate_handler(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<PayrollRun>, ApiErrorResponse> {
    let run = state.engine().calculate(run_id).await?;
    Ok(Json(run))
}

/// Handler for `POST /runs/{id}/submit`.
async fn submit_handler(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<PayrollRun>, ApiErrorResponse> {
    Ok(Json(state.engine().submit_for_approval(run_id)?))
}

/// Handler for `POST /runs/{id}/approve`.
async fn approve_handler(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<PayrollRun>, ApiErrorResponse> {
    Ok(Json(state.engine().approve(run_id, &request.approver_id)?))
}

/// Handler for `POST /runs/{id}/process`.
async fn process_handler(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<PayrollRun>, ApiErrorResponse> {
    let run = state.engine().process(run_id).await?;
    Ok(Json(run))
}

/// Handler for `POST /runs/{id}/void`.
async fn void_handler(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
    Json(request): Json<VoidRequest>,
) -> Result<Json<PayrollRun>, ApiErrorResponse> {
    Ok(Json(state.engine().void(
        run_id,
        &request.reason,
        &request.actor,
    )?))
}

/// Handler for `POST /runs/{id}/cancel`.
async fn cancel_handler(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
    Json(request): Json<ActorRequest>,
) -> Result<Json<PayrollRun>, ApiErrorResponse> {
    Ok(Json(state.engine().cancel(run_id, &request.actor)?))
}
