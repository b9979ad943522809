use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::assessment::selection::SelectionSet;
use crate::errors::AppError;
use crate::models::purchase::NewPendingPurchase;
use crate::models::training::TrainingModule;
use crate::purchases::handoff::{handoff_message, handoff_url};
use crate::purchases::phone::{normalize_phone, validate_phone};
use crate::purchases::store::insert_pending_purchase;

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub purchase_id: Uuid,
    pub module_count: usize,
    pub total_price: u64,
    pub handoff_message: String,
    pub handoff_url: String,
}

/// Validates the phone and collects the selected modules in catalog order.
pub fn build_pending_purchase(
    phone: &str,
    selection: &SelectionSet,
    modules: &[TrainingModule],
    total_price: u64,
) -> Result<NewPendingPurchase, AppError> {
    validate_phone(phone)?;

    let modules: Vec<TrainingModule> = modules
        .iter()
        .filter(|m| selection.contains(&m.id))
        .cloned()
        .collect();
    if modules.is_empty() {
        return Err(AppError::Validation(
            "Sélectionnez au moins un module avant de valider la commande.".to_string(),
        ));
    }

    Ok(NewPendingPurchase {
        phone: normalize_phone(phone),
        modules,
        total_price,
    })
}

/// Persists the purchase, then composes the messaging hand-off.
/// Nothing is written when validation fails.
pub async fn submit_purchase(
    pool: &PgPool,
    phone: &str,
    selection: &SelectionSet,
    modules: &[TrainingModule],
    total_price: u64,
) -> Result<CheckoutReceipt, AppError> {
    let purchase = build_pending_purchase(phone, selection, modules, total_price)?;
    let purchase_id = insert_pending_purchase(pool, &purchase).await?;

    info!(
        "Pending purchase {purchase_id}: {} module(s), {} total",
        purchase.modules.len(),
        purchase.total_price
    );

    let message = handoff_message(purchase.modules.len(), purchase.total_price);
    let url = handoff_url(&message)?;

    Ok(CheckoutReceipt {
        purchase_id,
        module_count: purchase.modules.len(),
        total_price: purchase.total_price,
        handoff_message: message,
        handoff_url: url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::training::fixtures::catalog;

    #[test]
    fn test_modules_follow_catalog_order_not_selection_order() {
        let modules = catalog(4);
        let selection: SelectionSet = ["module-3", "module-0", "module-2"].into_iter().collect();
        let purchase = build_pending_purchase("+2250708070690", &selection, &modules, 1500).unwrap();
        let ids: Vec<&str> = purchase.modules.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["module-0", "module-2", "module-3"]);
        assert_eq!(purchase.total_price, 1500);
    }

    #[test]
    fn test_invalid_phone_is_rejected() {
        let modules = catalog(1);
        let selection: SelectionSet = ["module-0"].into_iter().collect();
        let result = build_pending_purchase("abc", &selection, &modules, 500);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let modules = catalog(2);
        let result = build_pending_purchase("0708070690", &SelectionSet::new(), &modules, 0);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_phone_is_normalized() {
        let modules = catalog(1);
        let selection: SelectionSet = ["module-0"].into_iter().collect();
        let purchase = build_pending_purchase("+225 07 08 07 06 90", &selection, &modules, 500).unwrap();
        assert_eq!(purchase.phone, "+2250708070690");
    }
}
