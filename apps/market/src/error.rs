//! # API Error Type
//!
//! Unified error type for the marketplace services.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Digit Store                            │
//! │                                                                         │
//! │  Storefront                  Rust Services                              │
//! │  ──────────                  ─────────────                              │
//! │                                                                         │
//! │  services::cart::add_to_cart(...)                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Storage Error? ─── DbError::QueryFailed("...") ───┐            │  │
//! │  │         │            (logged, generic message)      │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business Rule? ─── CoreError::EmptyCart ──────── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "EMPTY_CART", "message": "Cart is empty" }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No error is fatal: the storefront shows the message and stays usable.

use serde::Serialize;
use ts_rs::TS;

use digit_core::{CoreError, ValidationError};
use digit_db::DbError;

/// Error returned from every service function.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_BALANCE",
///   "message": "Insufficient balance: available 29.75 AZN, requested 50.00 AZN"
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed
    InvalidInput,

    /// No signed-in user
    AuthRequired,

    /// Wrong role or not the owner
    Forbidden,

    /// Resource not found
    NotFound,

    /// Transition not allowed from the current state
    InvalidState,

    DuplicateEmail,

    InvalidCredentials,

    EmptyCart,

    MissingReceipt,

    CheckoutExpired,

    InsufficientBalance,

    /// Storage operation failed
    DatabaseError,

    /// Unexpected failure
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Serialization { key, message } => {
                tracing::error!(key = %key, "Corrupt collection: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Stored data could not be read")
            }
            DbError::Credential(e) => {
                tracing::error!("Credential error: {}", e);
                ApiError::internal("Password could not be processed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InvalidInput(_) => ErrorCode::InvalidInput,
            CoreError::AuthRequired => ErrorCode::AuthRequired,
            CoreError::Forbidden { .. } => ErrorCode::Forbidden,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InvalidState { .. } => ErrorCode::InvalidState,
            CoreError::DuplicateEmail(_) => ErrorCode::DuplicateEmail,
            CoreError::InvalidCredentials => ErrorCode::InvalidCredentials,
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::MissingReceipt => ErrorCode::MissingReceipt,
            CoreError::CheckoutExpired => ErrorCode::CheckoutExpired,
            CoreError::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::from(CoreError::from(err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
