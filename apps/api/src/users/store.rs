use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::user::{ModuleProgress, UserRow};

pub async fn get_user(pool: &PgPool, uid: &str) -> Result<Option<UserRow>, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE uid = $1")
        .bind(uid)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Re-keys a record created by purchase approval (matched by phone) to the
/// uid of the identity that just signed in with that phone.
pub async fn claim_user_by_phone(
    pool: &PgPool,
    uid: &str,
    phone: &str,
) -> Result<Option<UserRow>, AppError> {
    let user = sqlx::query_as::<_, UserRow>(
        "UPDATE users SET uid = $1 WHERE phone = $2 AND uid <> $1 RETURNING *",
    )
    .bind(uid)
    .bind(phone)
    .fetch_optional(pool)
    .await?;

    if user.is_some() {
        info!("User record for {phone} claimed by {uid}");
    }
    Ok(user)
}

/// Profile fields editable by the owner. `None` leaves a field unchanged.
#[derive(Debug, Default)]
pub struct ProfileUpdate<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub establishment_name: Option<&'a str>,
    pub sector: Option<&'a str>,
}

/// Creates the record if the identity has none yet.
pub async fn upsert_profile(
    pool: &PgPool,
    uid: &str,
    phone: &str,
    update: ProfileUpdate<'_>,
) -> Result<UserRow, AppError> {
    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (uid, phone, first_name, last_name, email, establishment_name, sector)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (uid) DO UPDATE SET
            first_name = COALESCE(EXCLUDED.first_name, users.first_name),
            last_name = COALESCE(EXCLUDED.last_name, users.last_name),
            email = COALESCE(EXCLUDED.email, users.email),
            establishment_name = COALESCE(EXCLUDED.establishment_name, users.establishment_name),
            sector = COALESCE(EXCLUDED.sector, users.sector)
        RETURNING *
        "#,
    )
    .bind(uid)
    .bind(phone)
    .bind(update.first_name)
    .bind(update.last_name)
    .bind(update.email)
    .bind(update.establishment_name)
    .bind(update.sector)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn set_photo_url(pool: &PgPool, uid: &str, url: &str) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE users SET photo_url = $1 WHERE uid = $2")
        .bind(url)
        .bind(uid)
        .execute(pool)
        .await?;
    ensure_affected(result.rows_affected(), uid)
}

pub async fn set_module_progress(
    pool: &PgPool,
    uid: &str,
    module_id: &str,
    progress: ModuleProgress,
) -> Result<UserRow, AppError> {
    let user = sqlx::query_as::<_, UserRow>(
        "UPDATE users SET progress = jsonb_set(progress, ARRAY[$1::text], $2::jsonb, true) \
         WHERE uid = $3 RETURNING *",
    )
    .bind(module_id)
    .bind(Json(progress))
    .bind(uid)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {uid} not found")))?;
    Ok(user)
}

pub async fn list_users(pool: &PgPool) -> Result<Vec<UserRow>, AppError> {
    let users = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(users)
}

/// `NotFound` when no record has that uid.
pub async fn delete_user(pool: &PgPool, uid: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE uid = $1")
        .bind(uid)
        .execute(pool)
        .await?;
    ensure_affected(result.rows_affected(), uid)
}

/// A write keyed by uid that touched no row means the user does not exist.
fn ensure_affected(rows_affected: u64, uid: &str) -> Result<(), AppError> {
    if rows_affected == 0 {
        return Err(AppError::NotFound(format!("User {uid} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_without_rows_is_not_found() {
        assert!(matches!(
            ensure_affected(0, "uid-1"),
            Err(AppError::NotFound(msg)) if msg.contains("uid-1")
        ));
    }

    #[test]
    fn test_write_with_rows_succeeds() {
        assert!(ensure_affected(1, "uid-1").is_ok());
    }
}
