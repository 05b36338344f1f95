//! # Ledger Services
//!
//! Revenue figures for the admin dashboard, the seller panel and the
//! about page.
//!
//! Every figure is derived from `dm_orders` and `dm_withdraws`. The
//! `dm_stats` document is a running cache updated on each confirmed
//! payment; [`reconcile`] checks it against the orders and rewrites it.

use tracing::{debug, info, warn};

use digit_core::ledger::{self, AboutStats, MonthlyAmount, Reconciliation, SellerStats};
use digit_core::{Money, Order, Product, RevenueStats, User, CHART_MONTHS, COMMISSION_BPS};
use digit_db::repository::collection::{ORDERS, PRODUCTS, STATS, USERS};

use crate::error::ApiError;
use crate::state::{Market, Session};

/// Platform revenue split and counters, computed from the orders. Admin only.
///
/// `total_users` counts non-admin accounts.
pub async fn platform_totals(market: &Market, session: &Session) -> Result<RevenueStats, ApiError> {
    session.require_admin()?;
    debug!("platform_totals");

    let db = market.db();
    let orders = db.orders().all().await?;
    let products = db.products().count().await?;
    let users = db.users().all().await?;

    Ok(ledger::rebuild_stats(
        &orders,
        products,
        ledger::counted_users(&users),
        COMMISSION_BPS,
    ))
}

/// Number of payments waiting for review. Admin only.
pub async fn pending_payment_count(market: &Market, session: &Session) -> Result<usize, ApiError> {
    session.require_admin()?;
    Ok(market.db().payments().list_pending().await?.len())
}

/// Order totals per completion month, latest months only. Admin only.
pub async fn platform_chart(market: &Market, session: &Session) -> Result<Vec<MonthlyAmount>, ApiError> {
    session.require_admin()?;
    debug!("platform_chart");

    let orders = market.db().orders().all().await?;
    Ok(ledger::platform_chart(&orders, CHART_MONTHS))
}

/// The signed-in seller's share of sales minus approved withdrawals.
pub async fn seller_balance(market: &Market, session: &Session) -> Result<Money, ApiError> {
    let seller = session.require_seller()?;
    debug!(seller_id = %seller.id, "seller_balance");

    let orders = market.db().orders().all().await?;
    let withdrawals = market.db().withdrawals().all().await?;
    Ok(ledger::seller_balance(&orders, &withdrawals, &seller.id, COMMISSION_BPS))
}

/// The seller panel's figures.
///
/// Uses the stored account so a fresh approval shows without signing in
/// again.
pub async fn seller_stats(market: &Market, session: &Session) -> Result<SellerStats, ApiError> {
    let seller_id = session.require_seller()?.id.clone();
    debug!(seller_id = %seller_id, "seller_stats");

    let db = market.db();
    let seller = db
        .users()
        .get_by_id(&seller_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &seller_id))?;
    let orders = db.orders().all().await?;
    let products = db.products().all().await?;
    let withdrawals = db.withdrawals().all().await?;

    Ok(ledger::seller_stats(&seller, &orders, &products, &withdrawals, COMMISSION_BPS))
}

/// The signed-in seller's earnings per completion month.
pub async fn seller_chart(market: &Market, session: &Session) -> Result<Vec<MonthlyAmount>, ApiError> {
    let seller = session.require_seller()?;
    debug!(seller_id = %seller.id, "seller_chart");

    let orders = market.db().orders().all().await?;
    Ok(ledger::seller_chart(&orders, &seller.id, CHART_MONTHS, COMMISSION_BPS))
}

/// Public counters for the about page.
pub async fn about_stats(market: &Market) -> Result<AboutStats, ApiError> {
    let db = market.db();
    let products = db.products().all().await?;
    let users = db.users().all().await?;
    let orders = db.orders().all().await?;

    Ok(ledger::about_stats(&products, &users, &orders))
}

/// Rebuilds the stats cache from the orders and reports whether it had
/// drifted. Admin only.
pub async fn reconcile(market: &Market, session: &Session) -> Result<Reconciliation, ApiError> {
    let admin = session.require_admin()?;
    debug!(admin_id = %admin.id, "reconcile");

    let mut tx = market.db().begin_write().await?;
    let orders: Vec<Order> = tx.load(&ORDERS).await?;
    let products: Vec<Product> = tx.load(&PRODUCTS).await?;
    let users: Vec<User> = tx.load(&USERS).await?;
    let cached: RevenueStats = tx.load(&STATS).await?;

    let rebuilt = ledger::rebuild_stats(
        &orders,
        products.len(),
        ledger::counted_users(&users),
        COMMISSION_BPS,
    );
    let report = ledger::reconcile(cached, rebuilt);

    tx.save(&STATS, &report.rebuilt).await?;
    tx.commit().await?;

    if report.drifted {
        warn!(
            cached_revenue = report.cached.total_revenue_cents,
            rebuilt_revenue = report.rebuilt.total_revenue_cents,
            cached_orders = report.cached.total_orders,
            rebuilt_orders = report.rebuilt.total_orders,
            "Stats cache had drifted, rewritten from orders"
        );
    } else {
        info!("Stats cache matches orders");
    }

    Ok(report)
}

// =============================================================================
// Unit Tests
// =============================================================================
