//! # Validation Module
//!
//! Input validation rules for the marketplace.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (browser)                                         │
//! │  ├── Required attributes, input types                                  │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: digit-market services                                        │
//! │  ├── Deserialization into typed inputs                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: State machines (catalog, checkout, withdrawal)               │
//! │  └── Transition guards (InvalidState)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use digit_core::validation::{validate_email, validate_phone};
//!
//! validate_email("buyer@example.com").unwrap();
//! validate_phone("+994501234567").unwrap();
//! assert!(validate_phone("0501234567").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Role;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Country prefix every payout phone number must carry.
pub const PHONE_PREFIX: &str = "+994";

/// Digits required after the country prefix.
pub const PHONE_DIGITS: usize = 9;

// =============================================================================
// String Validators
// =============================================================================

/// Requires a non-blank value and returns it trimmed.
///
/// ## Example
/// ```rust
/// use digit_core::validation::require;
///
/// assert_eq!(require("name", "  Logo pack ").unwrap(), "Logo pack");
/// assert!(require("name", "   ").is_err());
/// ```
pub fn require<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value)
}

/// Like [`require`], for optional payloads (image, receipt).
pub fn require_present<'a>(field: &str, value: Option<&'a str>) -> ValidationResult<&'a str> {
    require(field, value.unwrap_or_default())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be blank
/// - Must contain one `@` with something on both sides
///
/// Only the shape is checked; the storefront's `type="email"` input does
/// the rest.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = require("email", email)?;

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email.to_string())
        }
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain".to_string(),
        }),
    }
}

/// Validates a password against the minimum length.
///
/// The password is NOT trimmed: spaces count.
pub fn validate_password(field: &str, password: &str, min_length: usize) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if password.chars().count() < min_length {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: min_length,
        });
    }

    Ok(())
}

/// Validates a payout phone number: `+994` followed by exactly 9 digits.
///
/// ## Example
/// ```rust
/// use digit_core::validation::validate_phone;
///
/// assert!(validate_phone("+994501234567").is_ok());
/// assert!(validate_phone("+99450123456").is_err());   // 8 digits
/// assert!(validate_phone("+9945012345678").is_err()); // 10 digits
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = require("phone", phone)?;

    let valid = phone
        .strip_prefix(PHONE_PREFIX)
        .map(|rest| rest.len() == PHONE_DIGITS && rest.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false);

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: format!("expected {} followed by {} digits", PHONE_PREFIX, PHONE_DIGITS),
        });
    }

    Ok(phone.to_string())
}

/// Validates the role picked on the registration form.
pub fn validate_registration_role(role: Role) -> ValidationResult<Role> {
    if role.is_self_registerable() {
        Ok(role)
    } else {
        Err(ValidationError::NotAllowed {
            field: "role".to_string(),
            allowed: vec![Role::User.to_string(), Role::Seller.to_string()],
        })
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that an amount is strictly positive.
pub fn validate_positive_amount(field: &str, amount: Money) -> ValidationResult<Money> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(amount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert_eq!(require("name", "x").unwrap(), "x");
        assert!(matches!(
            require("name", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(require_present("image", None).is_err());
        assert!(require_present("image", Some("data:image/png;base64,AA")).is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" a@b.az ").unwrap(), "a@b.az");
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@b.az").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password", "123456", 6).is_ok());
        assert!(matches!(
            validate_password("password", "12345", 6),
            Err(ValidationError::TooShort { min: 6, .. })
        ));
        assert!(matches!(
            validate_password("password", "", 6),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+994501234567").is_ok());
        assert!(validate_phone("+994 50 123 45 67").is_err());
        assert!(validate_phone("+99450123456a").is_err());
        assert!(validate_phone("994501234567").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_validate_registration_role() {
        assert!(validate_registration_role(Role::User).is_ok());
        assert!(validate_registration_role(Role::Seller).is_ok());
        assert!(validate_registration_role(Role::Admin).is_err());
        assert!(validate_registration_role(Role::Guest).is_err());
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount("amount", Money::from_cents(1)).is_ok());
        assert!(validate_positive_amount("amount", Money::zero()).is_err());
        assert!(validate_positive_amount("amount", Money::from_cents(-100)).is_err());
    }
}
