use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::AdminUser;
use crate::models::purchase::PendingPurchaseRow;
use crate::models::user::UserRow;
use crate::purchases::store::{approve_purchase, list_pending_purchases, Approval};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub first_name: String,
    pub last_name: String,
}

/// GET /api/v1/admin/purchases
pub async fn handle_list_pending(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<PendingPurchaseRow>>, AppError> {
    Ok(Json(list_pending_purchases(&state.db).await?))
}

/// POST /api/v1/admin/purchases/:id/approve
///
/// Confirms payment: the buyer's account receives the modules.
pub async fn handle_approve(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<UserRow>, AppError> {
    let first_name = req.first_name.trim();
    let last_name = req.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(AppError::Validation(
            "Veuillez entrer le prénom et le nom de l'utilisateur.".to_string(),
        ));
    }

    let user = approve_purchase(
        &state.db,
        id,
        Approval {
            first_name,
            last_name,
        },
    )
    .await?;
    Ok(Json(user))
}
