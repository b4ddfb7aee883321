pub mod events;
pub mod holidays;
pub mod personas;
pub mod stock;
pub mod sync;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use persona_core::PersonaError;
use serde::{Deserialize, Serialize};

/// Standard API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of a successful delete or sync.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Convert errors to HTTP responses. The status comes from the
/// `PersonaError` inside, if there is one; anything else is a 500.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<PersonaError>() {
            Some(PersonaError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(PersonaError::PersonaNotFound(_) | PersonaError::EventNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Some(PersonaError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
