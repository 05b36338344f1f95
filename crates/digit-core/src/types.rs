//! # Domain Types
//!
//! Core domain records used throughout the marketplace.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │    Product      │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, email      │   │  id, seller_id  │   │  id, user_id    │       │
//! │  │  role           │   │  price_cents    │   │  items (frozen) │       │
//! │  │  seller_approved│   │  status         │   │  total_cents    │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                        │ confirm        │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │   Withdrawal    │   │  RevenueStats   │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  seller_id      │   │  cached totals  │   │  immutable copy │       │
//! │  │  amount_cents   │   │  (derivable)    │   │  completed_at   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records serialize with camelCase field names: they are stored as JSON
//! collections and read directly by the storefront.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

/// Anything stored in a keyed collection.
pub trait Record {
    /// Unique identifier within its collection.
    fn record_id(&self) -> &str;
}

// =============================================================================
// Role
// =============================================================================

/// Closed set of roles. Capability checks live here instead of string
/// comparisons scattered through the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Anonymous visitor. Never stored on a user record.
    Guest,
    /// Buyer.
    User,
    /// Publishes products and receives payouts.
    Seller,
    /// Moderates products, payments, withdrawals and sellers.
    Admin,
}

impl Role {
    /// Can approve/reject products, payments and withdrawals.
    pub const fn can_moderate(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Can submit products and request withdrawals.
    pub const fn can_sell(&self) -> bool {
        matches!(self, Role::Seller)
    }

    /// Can hold a cart and check out.
    pub const fn can_buy(&self) -> bool {
        !matches!(self, Role::Guest)
    }

    /// Roles a visitor may pick when registering.
    pub const fn is_self_registerable(&self) -> bool {
        matches!(self, Role::User | Role::Seller)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::User => "user",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    /// Unique, compared case-sensitively as stored.
    pub email: String,

    /// Stored credential (PHC hash string, or legacy plaintext).
    #[ts(skip)]
    pub password: String,

    pub role: Role,

    /// Meaningful only for sellers.
    #[serde(default)]
    pub seller_approved: bool,

    /// Cached result of the VIP rule.
    #[serde(default, rename = "isVIP")]
    pub is_vip: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Record for User {
    fn record_id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Product
// =============================================================================

/// Moderation state of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Submitted, waiting for an admin.
    Pending,
    /// Visible in the catalog.
    Approved,
    /// Refused with a reason; kept for the seller to see.
    Rejected,
}

impl ProductStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Pending => "pending",
            ProductStatus::Approved => "approved",
            ProductStatus::Rejected => "rejected",
        }
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Pending
    }
}

/// A digital product listed by a seller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,

    /// Price in qəpik.
    pub price_cents: i64,

    #[serde(default)]
    pub category: String,

    /// The deliverable (opaque URI).
    pub file: String,

    /// Image payload reference (data URI in the browser build).
    pub image: Option<String>,

    pub seller_id: String,
    pub status: ProductStatus,

    /// Present iff status is Rejected.
    pub reject_reason: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Present iff status is Approved.
    #[ts(as = "Option<String>")]
    pub approved_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn is_approved(&self) -> bool {
        self.status == ProductStatus::Approved
    }
}

impl Record for Product {
    fn record_id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Frozen Order Item
// =============================================================================

/// A product captured at checkout time.
///
/// Snapshot pattern: later catalog edits or deletions never change what
/// was bought or what it cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    /// Catalog price at freeze time.
    pub list_price_cents: i64,
    /// Price actually charged (after any VIP discount).
    pub price_cents: i64,
    pub file: String,
    pub seller_id: String,
}

impl OrderItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Sum of charged item prices.
pub fn items_total(items: &[OrderItem]) -> Money {
    items.iter().map(OrderItem::price).sum()
}

// =============================================================================
// Payment
// =============================================================================

/// State of a submitted payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Receipt uploaded, waiting for an admin.
    PendingConfirmation,
    /// Admin accepted the receipt; an Order exists.
    Confirmed,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::PendingConfirmation => "pending_confirmation",
            PaymentStatus::Confirmed => "confirmed",
        }
    }
}

/// A buyer's manual payment awaiting or past admin review.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    /// Always equals the sum of frozen item prices.
    pub total_cents: i64,
    pub status: PaymentStatus,
    /// Receipt payload (data URI in the browser build).
    pub receipt_data: String,
    pub receipt_file_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub submitted_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Payment {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::PendingConfirmation
    }
}

impl Record for Payment {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Audit trail for a payment an admin refused.
///
/// The payments collection never holds rejected records; this is kept
/// alongside so the refusal is not lost.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRejection {
    pub payment: Payment,
    pub rejected_by: String,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub rejected_at: DateTime<Utc>,
}

impl Record for PaymentRejection {
    fn record_id(&self) -> &str {
        &self.payment.id
    }
}

// =============================================================================
// Order
// =============================================================================

/// Status of an order. Orders only ever exist completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Completed,
}

/// Permanent sale of record, copied from a confirmed payment.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Same id as the payment it came from.
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub receipt_data: String,
    pub receipt_file_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub submitted_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub confirmed_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub completed_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Sum of item prices attributed to one seller.
    pub fn seller_gross(&self, seller_id: &str) -> Money {
        self.items
            .iter()
            .filter(|item| item.seller_id == seller_id)
            .map(OrderItem::price)
            .sum()
    }
}

impl Record for Order {
    fn record_id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Withdrawal
// =============================================================================

/// Moderation state of a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    /// Paid out. Counts against the seller's balance.
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
        }
    }
}

/// A seller's payout request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: String,
    pub seller_id: String,
    /// Payee name.
    pub name: String,
    pub card: String,
    pub phone: String,
    pub amount_cents: i64,
    pub status: WithdrawalStatus,
    /// Present iff status is Rejected.
    pub reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub approved_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub rejected_at: Option<DateTime<Utc>>,
}

impl Withdrawal {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

impl Record for Withdrawal {
    fn record_id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Revenue Stats
// =============================================================================

/// Running totals cache (`dm_stats`).
///
/// Derivable in full from the orders collection; see
/// [`ledger::rebuild_stats`](crate::ledger::rebuild_stats).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStats {
    pub total_revenue_cents: i64,
    pub company_revenue_cents: i64,
    pub seller_revenue_cents: i64,
    pub total_orders: u64,
    pub total_products: u64,
    pub total_users: u64,
}

// =============================================================================
// Unit Tests
// =============================================================================
