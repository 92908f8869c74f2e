// --- File: crates/slotbook_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use crate::error::{BookingError, HttpStatusCode};

/// Success envelope: `{"success": true, ...body}`.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Success<T> {
    pub fn new(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

/// Extension trait for BookingError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for BookingError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_client_error() {
            info!(code = self.code(), "Rejected request: {}", self);
        } else {
            error!(code = self.code(), "Request failed: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
            "error": self.code(),
        }));

        (status_code, body).into_response()
    }
}

/// Implement IntoResponse for BookingError to make it easier to use in Axum handlers.
impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Wraps a successful body in the success envelope, or renders the failure envelope.
pub fn handle_json_result<T>(result: Result<T, BookingError>) -> Result<Json<Success<T>>, Response>
where
    T: Serialize,
{
    result
        .map(|body| Json(Success::new(body)))
        .map_err(|err| err.into_response())
}
