use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::training::TrainingModule;

/// A checkout awaiting payment confirmation by an admin.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingPurchaseRow {
    pub id: Uuid,
    pub phone: String,
    pub modules: Json<Vec<TrainingModule>>,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

/// Validated checkout, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPendingPurchase {
    pub phone: String,
    /// Selected modules in catalog order.
    pub modules: Vec<TrainingModule>,
    pub total_price: u64,
}
