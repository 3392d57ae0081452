use bigdecimal::BigDecimal;
use std::fmt;

pub const DESCRIPTION_MAX_LEN: usize = 255;
pub const CHARGE_ID_MAX_LEN: usize = 64;
pub const AMOUNT_SCALE: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

/// Strip control characters and collapse runs of whitespace.
pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_positive_amount(field: &'static str, amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }

    Ok(())
}

/// Amounts are BRL with two minor-unit digits. JSON numbers arrive through
/// an f64 with binary noise (10.01 deserializes as 10.00999...), so every
/// boundary amount is rounded to cents before validation or arithmetic.
pub fn normalize_amount(amount: &BigDecimal) -> BigDecimal {
    amount.round(AMOUNT_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("description", "PIX charge").is_ok());
        assert!(validate_required("description", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("description", "abc", 3).is_ok());
        assert!(validate_max_len("description", "abcd", 3).is_err());
    }

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string("single"), "single");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("ab\u{0000}cd\u{0007}"), "abcd");
    }

    #[test]
    fn validates_positive_amount() {
        let positive = BigDecimal::from_str("1.23").expect("valid decimal");
        let zero = BigDecimal::from(0);
        let negative = BigDecimal::from(-1);

        assert!(validate_positive_amount("amount", &positive).is_ok());
        assert!(validate_positive_amount("amount", &zero).is_err());
        assert!(validate_positive_amount("amount", &negative).is_err());
    }

    #[test]
    fn normalizes_float_noise_to_cents() {
        let noisy = BigDecimal::from_str("10.009999999999999787").unwrap();
        let clean = BigDecimal::from_str("25.50").unwrap();

        assert_eq!(normalize_amount(&noisy), BigDecimal::from_str("10.01").unwrap());
        assert_eq!(normalize_amount(&clean), clean);
    }
}
