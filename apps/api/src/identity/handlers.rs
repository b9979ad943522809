use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::identity::client::SignedIn;
use crate::identity::AuthUser;
use crate::purchases::phone::{normalize_phone, validate_phone};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    pub phone: String,
    pub recaptcha_token: String,
}

#[derive(Debug, Serialize)]
pub struct OtpRequestResponse {
    pub session_info: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpConfirm {
    pub session_info: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordSignIn {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/otp/request
pub async fn handle_request_code(
    State(state): State<AppState>,
    Json(req): Json<OtpRequest>,
) -> Result<Json<OtpRequestResponse>, AppError> {
    validate_phone(&req.phone)?;
    let session_info = state
        .identity
        .request_code(&normalize_phone(&req.phone), &req.recaptcha_token)
        .await?;
    Ok(Json(OtpRequestResponse { session_info }))
}

/// POST /api/v1/auth/otp/confirm
pub async fn handle_confirm_code(
    State(state): State<AppState>,
    Json(req): Json<OtpConfirm>,
) -> Result<Json<SignedIn>, AppError> {
    if req.code.trim().is_empty() {
        return Err(AppError::Validation("code cannot be empty".to_string()));
    }
    let signed_in = state
        .identity
        .confirm_code(&req.session_info, req.code.trim())
        .await?;
    state.identity_watch.publish(Some(signed_in.identity.clone()));
    Ok(Json(signed_in))
}

/// POST /api/v1/auth/password
pub async fn handle_password_sign_in(
    State(state): State<AppState>,
    Json(req): Json<PasswordSignIn>,
) -> Result<Json<SignedIn>, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }
    let signed_in = state
        .identity
        .sign_in_with_password(req.email.trim(), &req.password)
        .await?;
    state.identity_watch.publish(Some(signed_in.identity.clone()));
    Ok(Json(signed_in))
}

/// POST /api/v1/auth/sign-out
///
/// Tokens are held by the client; this only records the transition.
pub async fn handle_sign_out(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> StatusCode {
    info!("Identity {} signed out", identity.uid);
    state.identity_watch.publish(None);
    StatusCode::NO_CONTENT
}
