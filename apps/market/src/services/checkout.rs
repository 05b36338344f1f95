//! # Checkout & Payment Services
//!
//! Buyers pay by bank transfer and upload the receipt; an admin confirms
//! or rejects it.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Payment Pipeline                                     │
//! │                                                                         │
//! │  ┌──────────────┐ start_checkout ┌───────────────────────┐              │
//! │  │  Cart        │───────────────►│ PendingPaymentOrder   │ (session)    │
//! │  └──────────────┘                │ expires_at = now+180s │              │
//! │                                  └──────────┬────────────┘              │
//! │                                             │ submit_receipt            │
//! │                     expired? ◄──────────────┤ (clears the cart)         │
//! │                  start again                ▼                           │
//! │                                  ┌───────────────────────┐              │
//! │                                  │ Payment               │ dm_payments  │
//! │                                  │ pending_confirmation  │              │
//! │                                  └──────┬─────────┬──────┘              │
//! │                       confirm_payment   │         │  reject_payment     │
//! │                                         ▼         ▼                     │
//! │  ┌──────────────────────────────────────────┐  ┌────────────────────┐   │
//! │  │ ONE TRANSACTION                          │  │ ONE TRANSACTION    │   │
//! │  │ • payment → confirmed                    │  │ • payment deleted  │   │
//! │  │ • order (completed) → dm_orders          │  │ • audit record →   │   │
//! │  │ • stats += total / 15% / 85% / +1 order  │  │   dm_payment_      │   │
//! │  │ • buyer VIP flag recomputed              │  │   rejections       │   │
//! │  └──────────────────────────────────────────┘  └────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use digit_core::cart::Cart;
use digit_core::checkout::{self, PendingPaymentOrder, PurchaseRecord};
use digit_core::ledger::record_sale;
use digit_core::{
    CoreError, Money, Order, OrderItem, Payment, PaymentRejection, RevenueStats, User,
    COMMISSION_BPS,
};
use digit_db::repository::collection::{
    self, position, ORDERS, PAYMENTS, PAYMENT_REJECTIONS, STATS, USERS,
};

use crate::error::ApiError;
use crate::services::identity::{refresh_vip, stored_user};
use crate::state::{Market, Session};

// =============================================================================
// DTOs
// =============================================================================

/// The admin's answer to "reject this payment?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// A payment in the admin review queue. The receipt itself is fetched
/// separately with [`receipt`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub id: String,
    pub user_id: String,
    /// Empty if the buyer's account no longer exists.
    pub user_email: String,
    pub items: Vec<OrderItem>,
    pub total: Money,
    pub receipt_file_name: String,
    #[ts(as = "String")]
    pub submitted_at: DateTime<Utc>,
}

/// An uploaded bank receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub payment_id: String,
    pub file_name: String,
    /// Data URL as uploaded.
    pub data: String,
}

// =============================================================================
// Buyer
// =============================================================================

/// Freezes the cart into a pending payment order held by the session.
///
/// Items are priced from the live catalog at this moment (VIP price for VIP
/// buyers when enabled). A second call replaces the previous pending order.
///
/// ## Errors
/// - `AuthRequired`: not signed in
/// - `EmptyCart`: nothing in the cart still exists in the catalog
pub async fn start_checkout(
    market: &Market,
    session: &mut Session,
) -> Result<PendingPaymentOrder, ApiError> {
    let user = stored_user(market, session).await?;
    debug!(user_id = %user.id, is_vip = user.is_vip, "start_checkout");
    session.refresh_user(user.clone());

    let cart = market.db().carts().get(&user.id).await?;
    let products = market.db().products().all().await?;
    let options = market.config().freeze_options(user.is_vip);

    let order = match checkout::freeze(
        Uuid::new_v4().to_string(),
        &user.id,
        &cart,
        &products,
        options,
        Utc::now(),
    ) {
        Ok(order) => order,
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "Checkout refused");
            return Err(e.into());
        }
    };

    session.set_checkout(order.clone());

    info!(
        user_id = %user.id,
        order_id = %order.id,
        total = %order.total,
        items = order.items.len(),
        expires_at = %order.expires_at,
        "Checkout started"
    );
    Ok(order)
}

/// Time left on the session's pending order, `None` without one.
///
/// Advisory: [`submit_receipt`] re-checks the deadline itself.
pub fn remaining_time(session: &Session, now: DateTime<Utc>) -> Option<Duration> {
    session.checkout().map(|order| order.remaining(now))
}

/// Turns the pending order into a payment awaiting review.
///
/// On success the cart is emptied and the pending order discarded. An
/// expired order is discarded too, so checkout must be started again.
///
/// ## Errors
/// - `AuthRequired`: not signed in
/// - `CheckoutExpired`: no pending order, or its deadline has passed
/// - `MissingReceipt`: no receipt payload (the pending order is kept)
pub async fn submit_receipt(
    market: &Market,
    session: &mut Session,
    receipt_data: Option<&str>,
    receipt_file_name: &str,
) -> Result<Payment, ApiError> {
    let user_id = session.require_user()?.id.clone();
    debug!(user_id = %user_id, file_name = %receipt_file_name, "submit_receipt");

    let result = match session.checkout() {
        Some(order) => order.to_payment(receipt_data, receipt_file_name, Utc::now()),
        None => Err(CoreError::CheckoutExpired),
    };

    let payment = match result {
        Ok(payment) => payment,
        Err(CoreError::CheckoutExpired) => {
            session.take_checkout();
            warn!(user_id = %user_id, "Receipt submitted after checkout expired");
            return Err(CoreError::CheckoutExpired.into());
        }
        Err(e) => return Err(e.into()),
    };

    let mut tx = market.db().begin_write().await?;
    let mut payments: Vec<Payment> = tx.load(&PAYMENTS).await?;
    payments.push(payment.clone());
    tx.save(&PAYMENTS, &payments).await?;
    tx.save(&collection::cart(&user_id), &Cart::new()).await?;
    tx.commit().await?;

    session.take_checkout();

    info!(
        user_id = %user_id,
        payment_id = %payment.id,
        total = %payment.total(),
        "Payment submitted for review"
    );
    Ok(payment)
}

/// The signed-in user's completed orders and still-pending payments,
/// newest first.
pub async fn list_orders(market: &Market, session: &Session) -> Result<Vec<PurchaseRecord>, ApiError> {
    let user = session.require_user()?;
    debug!(user_id = %user.id, "list_orders");

    let orders = market.db().orders().list_by_user(&user.id).await?;
    let payments = market.db().payments().list_by_user(&user.id).await?;
    Ok(checkout::purchase_history(&user.id, &orders, &payments))
}

// =============================================================================
// Admin
// =============================================================================

/// Confirms a payment: creates the order and books the sale. Admin only.
///
/// Everything happens in one transaction; on any error nothing is written.
///
/// ## Errors
/// - `NotFound`: no such payment
/// - `InvalidState`: already confirmed
pub async fn confirm_payment(
    market: &Market,
    session: &Session,
    payment_id: &str,
) -> Result<Order, ApiError> {
    let admin = session.require_admin()?;
    debug!(admin_id = %admin.id, payment_id = %payment_id, "confirm_payment");

    let now = Utc::now();
    let mut tx = market.db().begin_write().await?;

    let mut payments: Vec<Payment> = tx.load(&PAYMENTS).await?;
    let idx = position(&payments, payment_id)
        .ok_or_else(|| CoreError::not_found("Payment", payment_id))?;
    let order = checkout::confirm(&mut payments[idx], now)?;

    let mut orders: Vec<Order> = tx.load(&ORDERS).await?;
    orders.push(order.clone());

    let mut stats: RevenueStats = tx.load(&STATS).await?;
    record_sale(&mut stats, order.total(), COMMISSION_BPS);

    let mut users: Vec<User> = tx.load(&USERS).await?;
    if let Some(buyer) = position(&users, &order.user_id) {
        let (progress, changed) = refresh_vip(&mut users[buyer], &orders, &market.config().vip_rule());
        if changed {
            tx.save(&USERS, &users).await?;
            info!(user_id = %order.user_id, is_vip = progress.is_vip, "VIP status changed");
        }
    }

    tx.save(&PAYMENTS, &payments).await?;
    tx.save(&ORDERS, &orders).await?;
    tx.save(&STATS, &stats).await?;
    tx.commit().await?;

    info!(
        payment_id = %payment_id,
        user_id = %order.user_id,
        total = %order.total(),
        "Payment confirmed, order completed"
    );
    Ok(order)
}

/// Rejects a payment: deletes it and keeps an audit record. Admin only.
///
/// Returns `None` without touching anything when the admin cancels.
///
/// ## Errors
/// - `NotFound`: no such payment
/// - `InvalidState`: already confirmed
pub async fn reject_payment(
    market: &Market,
    session: &Session,
    payment_id: &str,
    confirmation: Confirmation,
    note: Option<String>,
) -> Result<Option<PaymentRejection>, ApiError> {
    let admin = session.require_admin()?;
    debug!(admin_id = %admin.id, payment_id = %payment_id, ?confirmation, "reject_payment");

    if confirmation != Confirmation::Confirmed {
        debug!(payment_id = %payment_id, "Payment rejection cancelled");
        return Ok(None);
    }

    let mut tx = market.db().begin_write().await?;
    let mut payments: Vec<Payment> = tx.load(&PAYMENTS).await?;
    let idx = position(&payments, payment_id)
        .ok_or_else(|| CoreError::not_found("Payment", payment_id))?;

    let payment = payments.remove(idx);
    let rejection = checkout::reject(payment, &admin.id, note, Utc::now())?;

    let mut rejections: Vec<PaymentRejection> = tx.load(&PAYMENT_REJECTIONS).await?;
    rejections.push(rejection.clone());

    tx.save(&PAYMENTS, &payments).await?;
    tx.save(&PAYMENT_REJECTIONS, &rejections).await?;
    tx.commit().await?;

    info!(
        payment_id = %payment_id,
        user_id = %rejection.payment.user_id,
        total = %rejection.payment.total(),
        "Payment rejected"
    );
    Ok(Some(rejection))
}

/// Payments awaiting review, oldest first. Admin only.
pub async fn list_pending_payments(
    market: &Market,
    session: &Session,
) -> Result<Vec<PaymentSummary>, ApiError> {
    session.require_admin()?;
    debug!("list_pending_payments");

    let mut pending = market.db().payments().list_pending().await?;
    pending.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
    let users = market.db().users().all().await?;

    Ok(pending
        .into_iter()
        .map(|p| PaymentSummary {
            user_email: users
                .iter()
                .find(|u| u.id == p.user_id)
                .map(|u| u.email.clone())
                .unwrap_or_default(),
            total: p.total(),
            id: p.id,
            user_id: p.user_id,
            items: p.items,
            receipt_file_name: p.receipt_file_name,
            submitted_at: p.submitted_at,
        })
        .collect())
}

/// A payment's uploaded receipt. Admin only.
pub async fn receipt(market: &Market, session: &Session, payment_id: &str) -> Result<Receipt, ApiError> {
    session.require_admin()?;
    debug!(payment_id = %payment_id, "receipt");

    let payment = market
        .db()
        .payments()
        .get_by_id(payment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment", payment_id))?;

    Ok(Receipt {
        payment_id: payment.id,
        file_name: payment.receipt_file_name,
        data: payment.receipt_data,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::cart::{add_to_cart, cart_count};
    use crate::services::identity::{authenticate, register, Registration};
    use crate::state::MarketConfig;
    use digit_core::checkout::PurchaseStatus;
    use digit_core::{PaymentStatus, Role};
    use digit_db::seed::{seed_defaults, ADMIN_EMAIL, ADMIN_PASSWORD};
    use digit_db::{Database, DbConfig};

    const RECEIPT: &str = "data:image/png;base64,iVBORw0KGgo=";

    struct Fixture {
        market: Market,
        buyer: Session,
        admin: Session,
    }

    async fn fixture(config: MarketConfig) -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_defaults(&db).await.unwrap();
        let market = Market::new(db, config);

        register(
            &market,
            Registration {
                email: "buyer@example.com".into(),
                password: "secret1".into(),
                role: Role::User,
            },
        )
        .await
        .unwrap();

        let mut buyer = Session::guest();
        authenticate(&market, &mut buyer, "buyer@example.com", "secret1")
            .await
            .unwrap();
        let mut admin = Session::guest();
        authenticate(&market, &mut admin, ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();

        Fixture { market, buyer, admin }
    }

    async fn fill_cart(f: &Fixture) {
        for product in f.market.db().products().all().await.unwrap() {
            add_to_cart(&f.market, &f.buyer, &product.id).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_empty_cart_cannot_check_out() {
        let mut f = fixture(MarketConfig::default()).await;

        let err = start_checkout(&f.market, &mut f.buyer).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
        assert!(remaining_time(&f.buyer, Utc::now()).is_none());

        let err = start_checkout(&f.market, &mut Session::guest()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
    }

    #[tokio::test]
    async fn test_submit_receipt_clears_cart() {
        let mut f = fixture(MarketConfig::default()).await;
        fill_cart(&f).await;

        let order = start_checkout(&f.market, &mut f.buyer).await.unwrap();
        assert_eq!(order.total, Money::from_cents(5000));
        let left = remaining_time(&f.buyer, Utc::now()).unwrap();
        assert!(left > Duration::seconds(170) && left <= Duration::seconds(180));

        let err = submit_receipt(&f.market, &mut f.buyer, None, "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingReceipt);
        assert!(f.buyer.checkout().is_some());

        let payment = submit_receipt(&f.market, &mut f.buyer, Some(RECEIPT), "bank.png")
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::PendingConfirmation);
        assert_eq!(payment.total(), Money::from_cents(5000));
        assert_eq!(payment.receipt_file_name, "bank.png");

        assert!(f.buyer.checkout().is_none());
        assert_eq!(cart_count(&f.market, &f.buyer).await.unwrap(), 0);

        let history = list_orders(&f.market, &f.buyer).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, PurchaseStatus::AwaitingConfirmation);
        assert!(history[0].items.iter().all(|i| i.file.is_none()));
    }

    #[tokio::test]
    async fn test_expired_checkout_is_dropped() {
        let config = MarketConfig {
            checkout_window_secs: 0,
            ..MarketConfig::default()
        };
        let mut f = fixture(config).await;
        fill_cart(&f).await;

        start_checkout(&f.market, &mut f.buyer).await.unwrap();
        let err = submit_receipt(&f.market, &mut f.buyer, None, "r.png")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutExpired);
        assert!(f.buyer.checkout().is_none());

        start_checkout(&f.market, &mut f.buyer).await.unwrap();
        let err = submit_receipt(&f.market, &mut f.buyer, Some(RECEIPT), "r.png")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutExpired);
        assert!(f.buyer.checkout().is_none());

        assert!(f.market.db().payments().all().await.unwrap().is_empty());
        assert_eq!(cart_count(&f.market, &f.buyer).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_confirm_books_the_sale() {
        let mut f = fixture(MarketConfig::default()).await;
        fill_cart(&f).await;
        start_checkout(&f.market, &mut f.buyer).await.unwrap();
        let payment = submit_receipt(&f.market, &mut f.buyer, Some(RECEIPT), "r.png")
            .await
            .unwrap();

        let pending = list_pending_payments(&f.market, &f.admin).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_email, "buyer@example.com");

        let order = confirm_payment(&f.market, &f.admin, &payment.id).await.unwrap();
        assert_eq!(order.total(), payment.total());

        let err = confirm_payment(&f.market, &f.admin, &payment.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);

        assert!(list_pending_payments(&f.market, &f.admin).await.unwrap().is_empty());
        assert_eq!(f.market.db().orders().count().await.unwrap(), 1);

        let stats = f.market.db().stats().get().await.unwrap();
        assert_eq!(stats.total_revenue_cents, 5000);
        assert_eq!(stats.company_revenue_cents, 750);
        assert_eq!(stats.seller_revenue_cents, 4250);
        assert_eq!(stats.total_orders, 1);

        let history = list_orders(&f.market, &f.buyer).await.unwrap();
        assert_eq!(history[0].status, PurchaseStatus::Completed);
        assert!(history[0].items.iter().all(|i| i.file.is_some()));
    }

    #[tokio::test]
    async fn test_reject_deletes_and_audits() {
        let mut f = fixture(MarketConfig::default()).await;
        fill_cart(&f).await;
        start_checkout(&f.market, &mut f.buyer).await.unwrap();
        let payment = submit_receipt(&f.market, &mut f.buyer, Some(RECEIPT), "r.png")
            .await
            .unwrap();

        let cancelled = reject_payment(&f.market, &f.admin, &payment.id, Confirmation::Cancelled, None)
            .await
            .unwrap();
        assert!(cancelled.is_none());
        assert_eq!(f.market.db().payments().all().await.unwrap().len(), 1);

        let rejection = reject_payment(
            &f.market,
            &f.admin,
            &payment.id,
            Confirmation::Confirmed,
            Some("Amount does not match".into()),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(rejection.payment.id, payment.id);
        assert_eq!(rejection.note.as_deref(), Some("Amount does not match"));

        assert!(f.market.db().payments().all().await.unwrap().is_empty());
        assert_eq!(f.market.db().payments().rejections().await.unwrap().len(), 1);
        assert_eq!(f.market.db().orders().count().await.unwrap(), 0);

        let err = reject_payment(&f.market, &f.admin, &payment.id, Confirmation::Confirmed, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_review_is_admin_only() {
        let mut f = fixture(MarketConfig::default()).await;
        fill_cart(&f).await;
        start_checkout(&f.market, &mut f.buyer).await.unwrap();
        let payment = submit_receipt(&f.market, &mut f.buyer, Some(RECEIPT), "r.png")
            .await
            .unwrap();

        let err = confirm_payment(&f.market, &f.buyer, &payment.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        let err = receipt(&f.market, &f.buyer, &payment.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let receipt = receipt(&f.market, &f.admin, &payment.id).await.unwrap();
        assert_eq!(receipt.data, RECEIPT);
        assert_eq!(receipt.file_name, "r.png");
    }
}
