//! # Checkout
//!
//! Freezing a cart into a payment, and turning a confirmed payment into an
//! order.
//!
//! ## Payment Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Cart ──freeze()──► PendingPaymentOrder (session only, expires_at)      │
//! │                              │                                          │
//! │                              │ to_payment(receipt) before expires_at    │
//! │                              ▼                                          │
//! │                     Payment: pending_confirmation                       │
//! │                         │                    │                          │
//! │          admin confirm()│                    │ admin reject             │
//! │                         ▼                    ▼                          │
//! │     Payment: confirmed + Order: completed    removed (+ audit record)   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Frozen items carry the price actually charged. Later catalog edits never
//! reach an existing payment or order.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    items_total, Order, OrderItem, OrderStatus, Payment, PaymentRejection, PaymentStatus, Product,
};
use crate::vip::VipRule;

/// Receipt file name used when the upload carried none.
pub const DEFAULT_RECEIPT_NAME: &str = "receipt";

// =============================================================================
// Pending Payment Order
// =============================================================================

/// A cart frozen at checkout, waiting for the receipt upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PendingPaymentOrder {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,
}

/// How a checkout is frozen.
#[derive(Debug, Clone, Copy)]
pub struct FreezeOptions {
    pub window: Duration,
    /// Charge the VIP price instead of the list price.
    pub vip_discount: bool,
    pub rule: VipRule,
}

/// Freezes the cart's current catalog entries.
///
/// ## Errors
/// `EmptyCart` if the cart is empty or none of its products still exist.
pub fn freeze(
    id: String,
    user_id: &str,
    cart: &Cart,
    products: &[Product],
    options: FreezeOptions,
    now: DateTime<Utc>,
) -> CoreResult<PendingPaymentOrder> {
    let items: Vec<OrderItem> = cart
        .resolve(products)
        .into_iter()
        .map(|p| OrderItem {
            product_id: p.id.clone(),
            name: p.name.clone(),
            list_price_cents: p.price_cents,
            price_cents: options.rule.display_price(p.price(), options.vip_discount).cents(),
            file: p.file.clone(),
            seller_id: p.seller_id.clone(),
        })
        .collect();

    if items.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    Ok(PendingPaymentOrder {
        id,
        user_id: user_id.to_string(),
        total: items_total(&items),
        items,
        created_at: now,
        expires_at: now + options.window,
    })
}

impl PendingPaymentOrder {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left to submit the receipt, never negative.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }

    /// Builds the payment record from an uploaded receipt.
    ///
    /// Borrows so that a missing receipt leaves the checkout usable.
    ///
    /// ## Errors
    /// - `CheckoutExpired` once `now >= expires_at`
    /// - `MissingReceipt` if the payload is absent or blank
    pub fn to_payment(
        &self,
        receipt_data: Option<&str>,
        receipt_file_name: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<Payment> {
        if self.is_expired(now) {
            return Err(CoreError::CheckoutExpired);
        }

        let receipt_data = receipt_data
            .map(str::trim)
            .filter(|data| !data.is_empty())
            .ok_or(CoreError::MissingReceipt)?;

        let file_name = match receipt_file_name.trim() {
            "" => DEFAULT_RECEIPT_NAME,
            name => name,
        };

        Ok(Payment {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            items: self.items.clone(),
            total_cents: self.total.cents(),
            status: PaymentStatus::PendingConfirmation,
            receipt_data: receipt_data.to_string(),
            receipt_file_name: file_name.to_string(),
            created_at: self.created_at,
            submitted_at: now,
            confirmed_at: None,
        })
    }
}

// =============================================================================
// Admin Review
// =============================================================================

/// Fails unless the payment still awaits review.
pub fn ensure_pending(payment: &Payment, action: &str) -> CoreResult<()> {
    if !payment.is_pending() {
        return Err(CoreError::invalid_state(
            "Payment",
            &payment.id,
            payment.status.as_str(),
            action,
        ));
    }
    Ok(())
}

/// Marks the payment confirmed and returns the completed order.
pub fn confirm(payment: &mut Payment, now: DateTime<Utc>) -> CoreResult<Order> {
    ensure_pending(payment, "confirm")?;

    payment.status = PaymentStatus::Confirmed;
    payment.confirmed_at = Some(now);

    Ok(Order {
        id: payment.id.clone(),
        user_id: payment.user_id.clone(),
        items: payment.items.clone(),
        total_cents: payment.total_cents,
        status: OrderStatus::Completed,
        receipt_data: payment.receipt_data.clone(),
        receipt_file_name: payment.receipt_file_name.clone(),
        created_at: payment.created_at,
        submitted_at: payment.submitted_at,
        confirmed_at: now,
        completed_at: now,
    })
}

/// Audit record for a refused payment.
pub fn reject(
    payment: Payment,
    admin_id: &str,
    note: Option<String>,
    now: DateTime<Utc>,
) -> CoreResult<PaymentRejection> {
    ensure_pending(&payment, "reject")?;

    Ok(PaymentRejection {
        payment,
        rejected_by: admin_id.to_string(),
        note: note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        rejected_at: now,
    })
}

// =============================================================================
// Purchase History
// =============================================================================

/// Where a purchase stands from the buyer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    AwaitingConfirmation,
    Completed,
}

/// A purchased (or awaiting) item. The file is only handed out once the
/// order is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub product_id: String,
    pub name: String,
    pub price: Money,
    pub file: Option<String>,
}

/// One entry of a buyer's "my orders" page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub status: PurchaseStatus,
    pub items: Vec<PurchaseItem>,
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

fn purchase_items(items: &[OrderItem], downloadable: bool) -> Vec<PurchaseItem> {
    items
        .iter()
        .map(|item| PurchaseItem {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            price: item.price(),
            file: downloadable.then(|| item.file.clone()),
        })
        .collect()
}

/// A buyer's completed orders and still-pending payments, newest first.
pub fn purchase_history(user_id: &str, orders: &[Order], payments: &[Payment]) -> Vec<PurchaseRecord> {
    let completed = orders
        .iter()
        .filter(|o| o.user_id == user_id)
        .map(|o| PurchaseRecord {
            id: o.id.clone(),
            status: PurchaseStatus::Completed,
            items: purchase_items(&o.items, true),
            total: o.total(),
            created_at: o.created_at,
        });

    let awaiting = payments
        .iter()
        .filter(|p| p.user_id == user_id && p.is_pending())
        .map(|p| PurchaseRecord {
            id: p.id.clone(),
            status: PurchaseStatus::AwaitingConfirmation,
            items: purchase_items(&p.items, false),
            total: p.total(),
            created_at: p.created_at,
        });

    let mut history: Vec<PurchaseRecord> = completed.chain(awaiting).collect();
    history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    history
}

// =============================================================================
// Unit Tests
// =============================================================================
