use std::sync::LazyLock;

use regex::Regex;

use crate::errors::AppError;

/// Optional leading `+`, then digits and whitespace only.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s]{8,}$").expect("phone pattern is a valid regex"));

const MIN_DIGITS: usize = 8;

/// Côte d'Ivoire, applied to numbers typed in national format.
const DEFAULT_COUNTRY_CODE: &str = "225";

/// Accepts numbers such as `+2250708070690`, `0708070690` or `+225 07 08 07 06 90`.
pub fn validate_phone(phone: &str) -> Result<(), AppError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if PHONE_PATTERN.is_match(phone) && digits >= MIN_DIGITS {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Veuillez entrer un numéro de téléphone valide.".to_string(),
        ))
    }
}

/// E.164 form (`+` and digits), the form the identity provider reports.
///
/// A leading `+` or `00` marks an international number. Without either, a
/// number already starting with the default country code is kept as is and
/// anything else is a national number that gets the code prepended.
pub fn normalize_phone(phone: &str) -> String {
    let trimmed = phone.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if trimmed.starts_with('+') {
        return format!("+{digits}");
    }
    if let Some(international) = digits.strip_prefix("00") {
        return format!("+{international}");
    }
    if digits.starts_with(DEFAULT_COUNTRY_CODE) && digits.len() > 10 {
        return format!("+{digits}");
    }
    format!("+{DEFAULT_COUNTRY_CODE}{digits}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_international_number_passes() {
        assert!(validate_phone("+2250708070690").is_ok());
    }

    #[test]
    fn test_local_number_without_plus_passes() {
        assert!(validate_phone("0708070690").is_ok());
    }

    #[test]
    fn test_internal_whitespace_passes() {
        assert!(validate_phone("+225 07 08 07 06 90").is_ok());
    }

    #[test]
    fn test_letters_fail() {
        assert!(matches!(validate_phone("abc"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_too_short_fails() {
        assert!(validate_phone("12345").is_err());
    }

    #[test]
    fn test_whitespace_does_not_count_as_digits() {
        // eight characters, only seven digits
        assert!(validate_phone("1234 567").is_err());
        assert!(validate_phone("        ").is_err());
    }

    #[test]
    fn test_plus_only_allowed_in_front() {
        assert!(validate_phone("0708+070690").is_err());
    }

    #[test]
    fn test_normalize_strips_formatting() {
        assert_eq!(normalize_phone("+225 07-08 07 06 90"), "+2250708070690");
    }

    #[test]
    fn test_national_number_gets_country_code() {
        assert_eq!(normalize_phone("0708070690"), "+2250708070690");
        assert_eq!(normalize_phone("07 08 07 06 90"), "+2250708070690");
    }

    #[test]
    fn test_international_forms_agree() {
        for input in ["+2250708070690", "002250708070690", "2250708070690"] {
            assert_eq!(normalize_phone(input), "+2250708070690", "{input}");
        }
    }

    #[test]
    fn test_foreign_number_keeps_its_code() {
        assert_eq!(normalize_phone("+33 6 12 34 56 78"), "+33612345678");
    }
}
