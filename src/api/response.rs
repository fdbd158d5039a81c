//! Response types for the payroll API.
//!
//! This module defines the error response structures and the mapping
//! from engine errors to HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error paired with its HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::Validation { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("VALIDATION_ERROR", message),
            ),
            EngineError::InvalidPayInput { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_PAY_INPUT", message),
            ),
            EngineError::FilingStatusNotCovered { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("FILING_STATUS_NOT_COVERED", message),
            ),
            EngineError::RunNotFound { .. } => Self::new(
                StatusCode::NOT_FOUND,
                ApiError::new("RUN_NOT_FOUND", message),
            ),
            EngineError::InvalidTransition { .. } => Self::new(
                StatusCode::CONFLICT,
                ApiError::new("INVALID_TRANSITION", message),
            ),
            EngineError::SelfApproval { .. } => Self::new(
                StatusCode::CONFLICT,
                ApiError::new("SELF_APPROVAL", message),
            ),
            EngineError::ConcurrentModification { .. } => Self::new(
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "CONCURRENT_MODIFICATION",
                    message,
                    "Another transition committed first; reload the run and retry",
                ),
            ),
            EngineError::RulesetUnavailable { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "RULESET_UNAVAILABLE",
                    message,
                    "The run cannot proceed until a ruleset is published for this jurisdiction and date",
                ),
            ),
            EngineError::InsufficientEarnings { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INSUFFICIENT_EARNINGS", message),
            ),
            EngineError::RulesetFileNotFound { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("RULESET_LOAD_ERROR", message),
            ),
            EngineError::RulesetParseError { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("RULESET_LOAD_ERROR", message),
            ),
            EngineError::DirectoryUnavailable { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("DIRECTORY_UNAVAILABLE", message),
            ),
            EngineError::GatewayRejected { .. } => Self::new(
                StatusCode::BAD_GATEWAY,
                ApiError::with_details(
                    "GATEWAY_REJECTED",
                    message,
                    "No funds moved; the run is marked failed and its ledger writes were reverted",
                ),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // skipped when None
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_run_not_found_maps_to_404() {
        let response: ApiErrorResponse = EngineError::RunNotFound {
            run_id: Uuid::nil(),
        }
        .into();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error.code, "RUN_NOT_FOUND");
    }

    #[test]
    fn test_invalid_transition_maps_to_409() {
        let response: ApiErrorResponse = EngineError::InvalidTransition {
            run_id: Uuid::nil(),
            status: "draft".to_string(),
            action: "approve".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_ruleset_unavailable_maps_to_422() {
        let response: ApiErrorResponse = EngineError::RulesetUnavailable {
            key: "income_tax".to_string(),
            jurisdiction: "NV".to_string(),
            as_of: chrono::NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
        }
        .into();
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.error.details.is_some());
    }

    #[test]
    fn test_gateway_rejected_maps_to_502() {
        let response: ApiErrorResponse = EngineError::GatewayRejected {
            run_id: Uuid::nil(),
            reason: "account closed".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert!(response.error.message.contains("account closed"));
    }
}
