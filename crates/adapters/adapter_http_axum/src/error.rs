//! HTTP error response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use wirehome_domain::error::WirehomeError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`WirehomeError`] to an HTTP response with appropriate status code.
pub struct ApiError(WirehomeError);

impl From<WirehomeError> for ApiError {
    fn from(err: WirehomeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            WirehomeError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            WirehomeError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            WirehomeError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            WirehomeError::Shutdown => {
                (StatusCode::SERVICE_UNAVAILABLE, "shutting down".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
