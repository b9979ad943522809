//! Axum route handlers for the user dashboard and admin user management.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::identity::{AdminUser, Identity, MemberUser};
use crate::models::user::{ModuleProgress, Sector, UserRow};
use crate::purchases::phone::normalize_phone;
use crate::state::AppState;
use crate::users::photos::{
    delete_photo, delete_user_photos, discard_on_error, public_url, upload_profile_photo,
};
use crate::users::progress::{summarize_progress, ProgressSummary};
use crate::users::store::{
    claim_user_by_phone, delete_user, get_user, list_users, set_module_progress, set_photo_url,
    upsert_profile, ProfileUpdate,
};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserRow,
    pub progress: ProgressSummary,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub establishment_name: Option<String>,
    pub sector: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub photo_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub score: u32,
    pub completed: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// The stored record of `identity`, claiming an approval-created record with
/// the same phone when the uid has none yet.
async fn load_or_claim(pool: &PgPool, identity: &Identity) -> Result<Option<UserRow>, AppError> {
    if let Some(user) = get_user(pool, &identity.uid).await? {
        return Ok(Some(user));
    }
    match claim_phone(identity) {
        Some(phone) => claim_user_by_phone(pool, &identity.uid, &phone).await,
        None => Ok(None),
    }
}

/// Phone under which checkout and approval stored this identity's purchases.
fn claim_phone(identity: &Identity) -> Option<String> {
    identity.phone.as_deref().map(normalize_phone)
}

fn member_phone(identity: &Identity) -> Result<&str, AppError> {
    identity.phone.as_deref().ok_or_else(|| {
        AppError::Validation("a phone-verified account is required".to_string())
    })
}

/// Trims fields, turns blanks into "unchanged" and checks enumerated values.
fn validate_profile(req: &ProfileRequest) -> Result<ProfileUpdate<'_>, AppError> {
    fn clean(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    let sector = clean(&req.sector)
        .map(|s| {
            Sector::parse(s)
                .map(|sector| sector.as_str())
                .ok_or_else(|| AppError::Validation(format!("unknown sector '{s}'")))
        })
        .transpose()?;

    let email = clean(&req.email);
    if email.is_some_and(|e| !e.contains('@')) {
        return Err(AppError::Validation("email is not valid".to_string()));
    }

    Ok(ProfileUpdate {
        first_name: clean(&req.first_name),
        last_name: clean(&req.last_name),
        email,
        establishment_name: clean(&req.establishment_name),
        sector,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Member handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    MemberUser(identity): MemberUser,
) -> Result<Json<MeResponse>, AppError> {
    let user = match load_or_claim(&state.db, &identity).await? {
        Some(user) => user,
        None => UserRow::bare(&identity.uid, identity.phone.as_deref().unwrap_or_default()),
    };
    let progress = summarize_progress(&user);
    Ok(Json(MeResponse { user, progress }))
}

/// PATCH /api/v1/me
pub async fn handle_update_me(
    State(state): State<AppState>,
    MemberUser(identity): MemberUser,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<MeResponse>, AppError> {
    let update = validate_profile(&req)?;
    let phone = member_phone(&identity)?;
    load_or_claim(&state.db, &identity).await?;
    let user = upsert_profile(&state.db, &identity.uid, phone, update).await?;
    let progress = summarize_progress(&user);
    Ok(Json(MeResponse { user, progress }))
}

/// POST /api/v1/me/photo
///
/// Multipart form with a single `photo` file field.
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    MemberUser(identity): MemberUser,
    mut multipart: Multipart,
) -> Result<Json<PhotoResponse>, AppError> {
    let phone = member_phone(&identity)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("photo") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read photo: {e}")))?;

        // The record must exist before anything is written to the bucket.
        load_or_claim(&state.db, &identity).await?;
        upsert_profile(&state.db, &identity.uid, phone, ProfileUpdate::default()).await?;

        let bucket = &state.config.s3_bucket;
        let key =
            upload_profile_photo(&state.s3, bucket, &identity.uid, &content_type, body).await?;
        let photo_url = public_url(&state.config.s3_public_url, bucket, &key);

        let stored = set_photo_url(&state.db, &identity.uid, &photo_url).await;
        discard_on_error(stored, delete_photo(&state.s3, bucket, &key)).await?;

        return Ok(Json(PhotoResponse { photo_url }));
    }

    Err(AppError::Validation("missing 'photo' field".to_string()))
}

/// GET /api/v1/me/progress
pub async fn handle_get_progress(
    State(state): State<AppState>,
    MemberUser(identity): MemberUser,
) -> Result<Json<ProgressSummary>, AppError> {
    let summary = load_or_claim(&state.db, &identity)
        .await?
        .map(|user| summarize_progress(&user))
        .unwrap_or_default();
    Ok(Json(summary))
}

/// PUT /api/v1/me/progress/:module_id
pub async fn handle_set_progress(
    State(state): State<AppState>,
    MemberUser(identity): MemberUser,
    Path(module_id): Path<String>,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<ProgressSummary>, AppError> {
    let user = load_or_claim(&state.db, &identity)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {module_id} not purchased")))?;
    if !user.purchased_modules.iter().any(|m| m.id == module_id) {
        return Err(AppError::NotFound(format!(
            "Module {module_id} not purchased"
        )));
    }

    let user = set_module_progress(
        &state.db,
        &identity.uid,
        &module_id,
        ModuleProgress {
            score: req.score,
            completed: req.completed,
        },
    )
    .await?;
    Ok(Json(summarize_progress(&user)))
}

// ────────────────────────────────────────────────────────────────────────────
// Admin handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserRow>>, AppError> {
    Ok(Json(list_users(&state.db).await?))
}

/// DELETE /api/v1/admin/users/:uid
///
/// Removes the user record, then their stored photos. The identity-provider
/// account itself is left in place.
pub async fn handle_delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(uid): Path<String>,
) -> Result<StatusCode, AppError> {
    delete_user(&state.db, &uid).await?;
    delete_user_photos(&state.s3, &state.config.s3_bucket, &uid).await?;
    tracing::info!("Admin {} deleted user {uid}", admin.uid);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_left_unchanged() {
        let req = ProfileRequest {
            first_name: Some("  Awa ".to_string()),
            last_name: Some("   ".to_string()),
            ..Default::default()
        };
        let update = validate_profile(&req).unwrap();
        assert_eq!(update.first_name, Some("Awa"));
        assert_eq!(update.last_name, None);
    }

    #[test]
    fn test_unknown_sector_is_rejected() {
        let req = ProfileRequest {
            sector: Some("garage".to_string()),
            ..Default::default()
        };
        assert!(matches!(validate_profile(&req), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_known_sector_is_accepted() {
        let req = ProfileRequest {
            sector: Some("restaurant".to_string()),
            ..Default::default()
        };
        assert_eq!(validate_profile(&req).unwrap().sector, Some("restaurant"));
    }

    #[test]
    fn test_email_without_at_is_rejected() {
        let req = ProfileRequest {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(validate_profile(&req).is_err());
    }

    #[test]
    fn test_sign_in_claims_the_phone_checkout_stored() {
        use crate::assessment::selection::SelectionSet;
        use crate::models::training::fixtures::catalog;
        use crate::purchases::checkout::build_pending_purchase;

        let selection: SelectionSet = ["module-0"].into_iter().collect();
        let purchase = build_pending_purchase("0708070690", &selection, &catalog(1), 500).unwrap();

        let identity = Identity {
            uid: "uid-1".to_string(),
            phone: Some("+2250708070690".to_string()),
            email: None,
        };
        assert_eq!(claim_phone(&identity), Some(purchase.phone));
    }

    #[test]
    fn test_member_phone_required() {
        let identity = Identity {
            uid: "u".to_string(),
            phone: None,
            email: Some("owner@salon.ci".to_string()),
        };
        assert!(member_phone(&identity).is_err());
    }
}
