// HTTP routes
pub mod auth;
pub mod diagnostics;
pub mod health;
pub mod users;

pub use auth::*;
pub use diagnostics::*;
pub use health::*;
pub use users::*;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;

use crate::domains::auth::AuthError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Translates domain errors into HTTP responses. Validation and business
/// rejections carry their short message; infrastructure failures are
/// reduced to a status code with detail left in the server logs.
pub struct ApiError(AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(AuthError::Internal(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.0.to_string()),
            AuthError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string()),
            AuthError::Database(err) => {
                tracing::error!(error = %err, "Database error reached API boundary");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::Internal(err) => {
                tracing::error!(error = %err, "Internal error reached API boundary");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
