use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use portfolio_tracker_core::errors::{CoreError, ErrorKind};

/// A core error on its way out as an HTTP response.
///
/// The body is always `{"error": message}`. Internal errors are logged in
/// full and answered with a generic message.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError(e)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let message = match (kind, &self.0) {
            (ErrorKind::Internal, e) => {
                tracing::error!(error = %e, "Request failed");
                "An internal error occurred".to_string()
            }
            (_, CoreError::InvalidInput(m))
            | (_, CoreError::Unauthenticated(m))
            | (_, CoreError::NotFound(m))
            | (_, CoreError::UpstreamUnavailable(m)) => m.clone(),
            (_, e) => e.to_string(),
        };
        (status_for(kind), Json(json!({ "error": message }))).into_response()
    }
}
