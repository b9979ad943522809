use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::purchase::{NewPendingPurchase, PendingPurchaseRow};
use crate::models::training::TrainingModule;
use crate::models::user::UserRow;

pub async fn insert_pending_purchase(
    pool: &PgPool,
    purchase: &NewPendingPurchase,
) -> Result<Uuid, AppError> {
    let id = Uuid::new_v4();
    let total_price = i64::try_from(purchase.total_price)
        .map_err(|_| AppError::Validation("total price is out of range".to_string()))?;

    sqlx::query(
        "INSERT INTO pending_purchases (id, phone, modules, total_price) VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind(&purchase.phone)
    .bind(Json(&purchase.modules))
    .bind(total_price)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Newest first.
pub async fn list_pending_purchases(pool: &PgPool) -> Result<Vec<PendingPurchaseRow>, AppError> {
    let rows = sqlx::query_as::<_, PendingPurchaseRow>(
        "SELECT * FROM pending_purchases ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Names supplied by the admin when confirming payment.
pub struct Approval<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Grants the purchased modules to the user owning the purchase's phone,
/// creating the user if needed, and removes the pending record.
/// Runs in one transaction.
pub async fn approve_purchase(
    pool: &PgPool,
    purchase_id: Uuid,
    approval: Approval<'_>,
) -> Result<UserRow, AppError> {
    let mut tx = pool.begin().await?;

    let purchase = sqlx::query_as::<_, PendingPurchaseRow>(
        "SELECT * FROM pending_purchases WHERE id = $1 FOR UPDATE",
    )
    .bind(purchase_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Pending purchase {purchase_id} not found")))?;

    let existing = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE phone = $1 FOR UPDATE")
        .bind(&purchase.phone)
        .fetch_optional(&mut *tx)
        .await?;

    let user = match existing {
        Some(user) => {
            let modules = merge_modules(&user.purchased_modules.0, &purchase.modules.0);
            sqlx::query_as::<_, UserRow>(
                r#"
                UPDATE users
                SET first_name = $1, last_name = $2, purchased_modules = $3
                WHERE uid = $4
                RETURNING *
                "#,
            )
            .bind(approval.first_name)
            .bind(approval.last_name)
            .bind(Json(modules))
            .bind(&user.uid)
            .fetch_one(&mut *tx)
            .await?
        }
        None => {
            sqlx::query_as::<_, UserRow>(
                r#"
                INSERT INTO users (uid, phone, first_name, last_name, purchased_modules)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(provisional_uid(&purchase.phone))
            .bind(&purchase.phone)
            .bind(approval.first_name)
            .bind(approval.last_name)
            .bind(Json(&purchase.modules.0))
            .fetch_one(&mut *tx)
            .await?
        }
    };

    sqlx::query("DELETE FROM pending_purchases WHERE id = $1")
        .bind(purchase_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "Approved purchase {purchase_id} for user {} ({} module(s) owned)",
        user.uid,
        user.purchased_modules.len()
    );
    Ok(user)
}

/// Uid for a user created by approval, before their first sign-in claims it.
pub fn provisional_uid(phone: &str) -> String {
    format!("phone:{phone}")
}

/// Appends `added` to `owned`, skipping ids already owned.
pub fn merge_modules(owned: &[TrainingModule], added: &[TrainingModule]) -> Vec<TrainingModule> {
    let mut merged = owned.to_vec();
    for module in added {
        if !merged.iter().any(|m| m.id == module.id) {
            merged.push(module.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::training::fixtures::module;

    #[test]
    fn test_merge_skips_owned_ids() {
        let owned = vec![module("a", "A"), module("b", "B")];
        let added = vec![module("b", "B"), module("c", "C")];
        let merged = merge_modules(&owned, &added);
        let ids: Vec<&str> = merged.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_provisional_uid_embeds_phone() {
        assert_eq!(provisional_uid("+2250708070690"), "phone:+2250708070690");
    }
}
