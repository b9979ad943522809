// Identity: sign-in through the external provider, bearer-token request
// authentication, admin gating and the observable current identity.

pub mod client;
pub mod handlers;
pub mod watch;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

/// An authenticated account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn is_admin(&self, admin_email: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(admin_email))
    }
}

/// Any signed-in identity.
pub struct AuthUser(pub Identity);

/// A signed-in business owner (not the admin).
pub struct MemberUser(pub Identity);

/// The signed-in admin.
pub struct AdminUser(pub Identity);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let identity = state.identity.lookup(token).await?;
        Ok(AuthUser(identity))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MemberUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if identity.is_admin(&state.config.admin_email) {
            return Err(AppError::Forbidden);
        }
        Ok(MemberUser(identity))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if !identity.is_admin(&state.config.admin_email) {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(identity))
    }
}
