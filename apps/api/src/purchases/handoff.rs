//! Pre-filled messaging hand-off sent after checkout so the buyer can
//! forward proof of payment.

use reqwest::Url;

use crate::assessment::pricing::CURRENCY_SYMBOL;
use crate::errors::AppError;

const WHATSAPP_BASE_URL: &str = "https://wa.me/2250708070690";

pub fn handoff_message(module_count: usize, total_price: u64) -> String {
    format!(
        "Bonjour, je viens de valider ma fiche pour {module_count} module(s) Go'Top Pro \
         pour un total de {total_price} {CURRENCY_SYMBOL}. Voici ma preuve de paiement."
    )
}

/// Link opening a chat with the payment desk, text pre-filled.
pub fn handoff_url(message: &str) -> Result<String, AppError> {
    Url::parse_with_params(WHATSAPP_BASE_URL, &[("text", message)])
        .map(String::from)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid hand-off URL: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_mentions_count_and_total() {
        let message = handoff_message(5, 2000);
        assert!(message.contains("5 module(s)"));
        assert!(message.contains("2000 Fcfa"));
    }

    #[test]
    fn test_url_encodes_message() {
        let url = handoff_url("Bonjour, 2000 Fcfa").unwrap();
        assert!(url.starts_with("https://wa.me/2250708070690?text="));
        assert!(!url.contains(' '));
        let parsed = Url::parse(&url).unwrap();
        let (_, text) = parsed.query_pairs().next().unwrap();
        assert_eq!(text, "Bonjour, 2000 Fcfa");
    }
}
