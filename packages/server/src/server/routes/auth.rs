use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::domains::auth::models::User;
use crate::server::app::AppState;
use crate::server::routes::ApiError;

#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub mobile_number: String,
}

#[derive(Serialize)]
pub struct SendOtpResponse {
    pub message: String,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub mobile_number: String,
    pub otp: String,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

/// POST /api/auth/send-otp
///
/// Issues a fresh code for the number, overwriting any outstanding one.
/// The response is the same whether the number was new or already known.
pub async fn send_otp_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, ApiError> {
    state.auth.request_code(&req.mobile_number).await?;

    Ok(Json(SendOtpResponse {
        message: "OTP sent successfully".to_string(),
    }))
}

/// POST /api/auth/verify-otp
///
/// On success returns a bearer token and the verified account. All
/// rejections share one message and status.
pub async fn verify_otp_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    let session = state.auth.verify_code(&req.mobile_number, &req.otp).await?;

    Ok(Json(VerifyOtpResponse {
        message: "OTP verified successfully".to_string(),
        token: session.token,
        user: session.user,
    }))
}
