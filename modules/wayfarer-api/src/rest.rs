use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, warn};
use wayfarer_common::{EditRequest, ErrorBody, GenerateRequest, ItineraryError, Trip};

use crate::AppState;

const GENERATE_FAILED: &str = "Failed to generate itinerary";
const EDIT_FAILED: &str = "Failed to edit itinerary";
const CREDENTIAL_MISSING: &str = "API Key missing";

/// Error response: status plus the `{error, kind}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>, kind: &str) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                kind: kind.to_string(),
            },
        }
    }

    /// Client mistakes keep their message; everything else is reported with
    /// the generic `fallback` and logged in full.
    fn from_itinerary(err: ItineraryError, fallback: &str) -> Self {
        if err.is_client_error() {
            warn!(kind = err.kind(), error = %err, "Rejected request");
            return Self::new(StatusCode::BAD_REQUEST, err.to_string(), err.kind());
        }
        error!(kind = err.kind(), error = %err, "{fallback}");
        let message = match err {
            ItineraryError::MissingCredential(_) => CREDENTIAL_MISSING,
            _ => fallback,
        };
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, err.kind())
    }

    fn from_rejection(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Undecodable request body");
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, rejection.body_text(), "invalid_request")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub async fn api_generate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Trip>, ApiError> {
    let Json(request) = body.map_err(ApiError::from_rejection)?;
    state
        .planner
        .generate(&request)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_itinerary(e, GENERATE_FAILED))
}

pub async fn api_edit_trip(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EditRequest>, JsonRejection>,
) -> Result<Json<Trip>, ApiError> {
    let Json(request) = body.map_err(ApiError::from_rejection)?;
    state
        .planner
        .edit(&request)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_itinerary(e, EDIT_FAILED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_common::SchemaViolation;

    #[test]
    fn model_failures_get_generic_message() {
        let err = ApiError::from_itinerary(
            ItineraryError::Upstream("429 quota".to_string()),
            GENERATE_FAILED,
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "Failed to generate itinerary");
        assert_eq!(err.body.kind, "upstream_failure");
    }

    #[test]
    fn invalid_output_keeps_its_kind() {
        let err = ApiError::from_itinerary(
            ItineraryError::InvalidOutput(vec![SchemaViolation {
                path: "days".to_string(),
                message: "expected an array".to_string(),
            }]),
            EDIT_FAILED,
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "Failed to edit itinerary");
        assert_eq!(err.body.kind, "invalid_output");
    }

    #[test]
    fn missing_credential_is_named() {
        let err = ApiError::from_itinerary(
            ItineraryError::MissingCredential("GEMINI_API_KEY"),
            EDIT_FAILED,
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "API Key missing");
    }

    #[test]
    fn client_errors_are_bad_requests() {
        let err = ApiError::from_itinerary(
            ItineraryError::InvalidAttachment("not a data URI".to_string()),
            GENERATE_FAILED,
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.body.error.contains("not a data URI"));
    }
}
