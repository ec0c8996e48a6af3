//! Input checks run before an intent is issued.
//!
//! Validation failures stay with the caller; they never become store
//! transitions.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MIN_AMOUNT: Decimal = Decimal::ZERO;
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 0);

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email pattern: {e}"))
});

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+84|0)[0-9]{9}$").unwrap_or_else(|e| panic!("phone pattern: {e}"))
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Password must be at most {max} characters")]
    PasswordTooLong { max: usize },

    #[error("Password must contain a lowercase letter")]
    PasswordMissingLowercase,

    #[error("Password must contain an uppercase letter")]
    PasswordMissingUppercase,

    #[error("Password must contain a digit")]
    PasswordMissingDigit,

    #[error("Amount must be a valid number")]
    InvalidAmount,

    #[error("Amount must be at least {min}")]
    AmountTooSmall { min: Decimal },

    #[error("Amount must not exceed {max}")]
    AmountTooLarge { max: Decimal },

    #[error("Date cannot be in the future")]
    FutureDate,

    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Vietnamese phone numbers: `0` or `+84` followed by nine digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// Check password strength, reporting every rule that fails.
pub fn validate_password(password: &str) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        errors.push(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if length > MAX_PASSWORD_LENGTH {
        errors.push(ValidationError::PasswordTooLong {
            max: MAX_PASSWORD_LENGTH,
        });
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(ValidationError::PasswordMissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(ValidationError::PasswordMissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(ValidationError::PasswordMissingDigit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_amount(amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount < MIN_AMOUNT {
        return Err(ValidationError::AmountTooSmall { min: MIN_AMOUNT });
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge { max: MAX_AMOUNT });
    }
    Ok(amount)
}

/// Parse and range-check an amount typed by the user.
pub fn parse_valid_amount(text: &str) -> Result<Decimal, ValidationError> {
    let amount = Decimal::from_str(text.trim()).map_err(|_| ValidationError::InvalidAmount)?;
    validate_amount(amount)
}

/// A transaction date may be today at the latest.
pub fn validate_date(date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date > today {
        Err(ValidationError::FutureDate)
    } else {
        Ok(())
    }
}

/// Reject empty or whitespace-only input.
pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required {
            field: field.to_string(),
        })
    } else {
        Ok(())
    }
}

pub fn validate_min_length(field: &str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        })
    } else {
        Ok(())
    }
}

pub fn validate_max_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails() {
        assert!(validate_email("an@example.com").is_ok());
        assert_eq!(validate_email("an@example"), Err(ValidationError::InvalidEmail));
        assert!(validate_email("a n@example.com").is_err());
    }

    #[test]
    fn phones() {
        assert!(validate_phone("0912345678").is_ok());
        assert!(validate_phone("+84912345678").is_ok());
        assert!(validate_phone("912345678").is_err());
        assert!(validate_phone("09123456789").is_err());
    }

    #[test]
    fn password_reports_every_rule() {
        assert!(validate_password("Secret123").is_ok());
        let errors = validate_password("abc").unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::PasswordTooShort { min: 8 },
                ValidationError::PasswordMissingUppercase,
                ValidationError::PasswordMissingDigit,
            ]
        );
        let long = format!("Aa1{}", "x".repeat(200));
        assert_eq!(
            validate_password(&long).unwrap_err(),
            vec![ValidationError::PasswordTooLong { max: 128 }]
        );
    }

    #[test]
    fn amounts() {
        assert_eq!(parse_valid_amount(" 50000 "), Ok(Decimal::from(50_000)));
        assert_eq!(parse_valid_amount("lots"), Err(ValidationError::InvalidAmount));
        assert!(matches!(
            validate_amount(Decimal::from(-1)),
            Err(ValidationError::AmountTooSmall { .. })
        ));
        assert!(validate_amount(MAX_AMOUNT).is_ok());
        assert!(matches!(
            validate_amount(MAX_AMOUNT + Decimal::ONE),
            Err(ValidationError::AmountTooLarge { .. })
        ));
    }

    #[test]
    fn dates() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(validate_date(today, today).is_ok());
        assert_eq!(
            validate_date(today.succ_opt().unwrap(), today),
            Err(ValidationError::FutureDate)
        );
    }

    #[test]
    fn text_fields() {
        assert!(validate_required("Name", "  ").is_err());
        assert!(validate_required("Name", "Food").is_ok());
        assert!(validate_min_length("Name", "ab", 3).is_err());
        assert!(validate_max_length("Name", "abcd", 3).is_err());
        assert_eq!(
            validate_max_length("Name", "abcd", 3).unwrap_err().to_string(),
            "Name must be at most 3 characters"
        );
    }
}
