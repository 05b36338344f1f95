//! # Error Types
//!
//! Domain-specific error types for digit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  digit-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures (→ InvalidInput)     │
//! │                                                                         │
//! │  digit-db errors (separate crate)                                      │
//! │  └── DbError          - Storage failures                               │
//! │                                                                         │
//! │  digit-market errors                                                   │
//! │  └── ApiError         - What the storefront sees (code + message)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Storefront toast       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// One variant per failure kind the storefront distinguishes. None of them
/// is fatal: the caller shows the message and the UI stays usable.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or missing input (wraps ValidationError).
    #[error("{0}")]
    InvalidInput(#[from] ValidationError),

    /// No active session.
    #[error("Sign in to continue")]
    AuthRequired,

    /// Wrong role or not the owner.
    #[error("Not allowed: {reason}")]
    Forbidden { reason: String },

    /// Referenced entity is absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Transition not allowed from the current state.
    ///
    /// ## When This Occurs
    /// - Approving a product that is already approved or rejected
    /// - Confirming a payment that was already confirmed
    /// - Moderating a withdrawal twice
    #[error("{entity} {id} is {status}, cannot {action}")]
    InvalidState {
        entity: String,
        id: String,
        status: String,
        action: String,
    },

    /// Registration with an email that is already taken.
    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    /// Email/password or old password mismatch.
    #[error("Email or password is incorrect")]
    InvalidCredentials,

    /// Checkout started with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Receipt submission without a receipt payload.
    #[error("Upload the payment receipt")]
    MissingReceipt,

    /// The checkout window elapsed before the receipt was submitted.
    #[error("Checkout expired, start the payment again")]
    CheckoutExpired,

    /// Withdrawal amount exceeds what the seller can withdraw.
    ///
    /// ## User Workflow
    /// ```text
    /// Seller balance: 29.75
    ///      │
    ///      ▼
    /// Request withdrawal: 50.00
    ///      │
    ///      ▼
    /// InsufficientBalance { available: 29.75, requested: 50.00 }
    /// ```
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: Money, requested: Money },
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Forbidden error.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        CoreError::Forbidden {
            reason: reason.into(),
        }
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(
        entity: impl Into<String>,
        id: impl Into<String>,
        status: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        CoreError::InvalidState {
            entity: entity.into(),
            id: id.into(),
            status: status.into(),
            action: action.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These surface to the caller as `CoreError::InvalidInput`.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientBalance {
            available: Money::from_cents(2975),
            requested: Money::from_cents(5000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: available 29.75 AZN, requested 50.00 AZN"
        );

        let err = CoreError::invalid_state("Product", "p1", "approved", "approve");
        assert_eq!(err.to_string(), "Product p1 is approved, cannot approve");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_validation_converts_to_invalid_input() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::InvalidInput(_)));
        assert_eq!(core_err.to_string(), "name is required");
    }
}
