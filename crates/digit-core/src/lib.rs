//! # digit-core: Pure Business Logic for the Digit Store Marketplace
//!
//! This crate is the **heart** of the marketplace. It contains the approval
//! state machines, money splitting and balance accounting as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Digit Store Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront UI (browser, external)               │   │
//! │  │   Catalog ──► Cart ──► Checkout ──► Seller panel ──► Admin      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ direct calls                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 digit-market (services)                         │   │
//! │  │   identity, catalog, cart, checkout, withdrawals, ledger        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ digit-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────────┐ ┌──────┐ │   │
//! │  │   │  types  │ │  money  │ │ catalog  │ │  checkout  │ │ledger│ │   │
//! │  │   │ User    │ │ Money   │ │ filter   │ │ freeze     │ │split │ │   │
//! │  │   │ Product │ │ split   │ │ approve  │ │ expiry     │ │month │ │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────────┘ └──────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    digit-db (Storage Layer)                     │   │
//! │  │          SQLite key-value collections, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (User, Product, Payment, Order, Withdrawal)
//! - [`money`] - Money type with integer arithmetic and commission split
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`catalog`] - Product submission, moderation and catalog filtering
//! - [`cart`] - Cart set semantics and live-price totals
//! - [`checkout`] - Price freezing, checkout expiry, payment → order
//! - [`withdrawal`] - Seller payout requests and moderation
//! - [`ledger`] - Revenue aggregation, seller balance, monthly breakdown
//! - [`vip`] - VIP eligibility rule
//!
//! ## Example Usage
//!
//! ```rust
//! use digit_core::money::Money;
//! use digit_core::COMMISSION_BPS;
//!
//! let total = Money::from_cents(3500); // 35.00 AZN
//! let split = total.split_commission(COMMISSION_BPS);
//!
//! assert_eq!(split.company.cents(), 525);  // 5.25 AZN platform share
//! assert_eq!(split.seller.cents(), 2975);  // 29.75 AZN seller share
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;
pub mod vip;
pub mod withdrawal;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{CommissionSplit, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Platform commission on every completed order, in basis points (15%).
pub const COMMISSION_BPS: u32 = 1500;

/// Catalog-wide discount granted to VIP buyers, in basis points (10%).
pub const VIP_DISCOUNT_BPS: u32 = 1000;

/// Purchased items required for VIP status.
pub const VIP_MIN_ITEMS: usize = 20;

/// Total spend required for VIP status (200.00 AZN).
pub const VIP_MIN_SPEND_CENTS: i64 = 20_000;

/// How long a frozen checkout accepts a receipt.
pub const CHECKOUT_WINDOW_SECS: i64 = 180;

/// Minimum password length for registration and password changes.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Fixed identifier of the seeded demo seller.
pub const DEMO_SELLER_ID: &str = "demo-seller";

/// Number of months shown in revenue charts.
pub const CHART_MONTHS: usize = 6;
