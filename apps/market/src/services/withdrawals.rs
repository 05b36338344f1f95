//! # Withdrawal Services
//!
//! Sellers request payouts of their balance; an admin approves or
//! rejects each request.
//!
//! ```text
//! request_withdrawal ──► Pending ──┬── approve_withdrawal ──► Approved (balance -= amount)
//!                                  └── reject_withdrawal  ──► Rejected (reason kept)
//! ```
//!
//! A pending request already reserves its amount: the next request can
//! only draw on what is left.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use digit_core::ledger;
use digit_core::withdrawal::{self, WithdrawalRequest};
use digit_core::{CoreError, Order, Withdrawal, COMMISSION_BPS};
use digit_db::repository::collection::{position, ORDERS, WITHDRAWALS};

use crate::error::ApiError;
use crate::state::{Market, Session};

fn withdrawal_index(withdrawals: &[Withdrawal], id: &str) -> Result<usize, ApiError> {
    position(withdrawals, id).ok_or_else(|| CoreError::not_found("Withdrawal", id).into())
}

/// Files a payout request for the signed-in seller.
///
/// ## Errors
/// - `AuthRequired` / `Forbidden`: not a signed-in seller
/// - `InvalidInput`: blank field, phone not `+994` plus 9 digits, amount ≤ 0
/// - `InsufficientBalance`: amount above balance minus pending requests
pub async fn request_withdrawal(
    market: &Market,
    session: &Session,
    input: WithdrawalRequest,
) -> Result<Withdrawal, ApiError> {
    let seller = session.require_user()?;
    debug!(seller_id = %seller.id, amount_cents = input.amount_cents, "request_withdrawal");

    let mut tx = market.db().begin_write().await?;
    let orders: Vec<Order> = tx.load(&ORDERS).await?;
    let mut withdrawals: Vec<Withdrawal> = tx.load(&WITHDRAWALS).await?;

    let available = ledger::withdrawable(&orders, &withdrawals, &seller.id, COMMISSION_BPS);

    let request = withdrawal::request(seller, input, available, Uuid::new_v4().to_string(), Utc::now());
    let created = match request {
        Ok(w) => w,
        Err(e @ CoreError::InsufficientBalance { .. }) => {
            warn!(seller_id = %seller.id, available = %available, "Withdrawal above balance");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    withdrawals.push(created.clone());
    tx.save(&WITHDRAWALS, &withdrawals).await?;
    tx.commit().await?;

    info!(
        withdrawal_id = %created.id,
        seller_id = %created.seller_id,
        amount = %created.amount(),
        "Withdrawal requested"
    );
    Ok(created)
}

/// Pending → Approved. Admin only.
///
/// ## Errors
/// - `NotFound`: no such request
/// - `InvalidState`: already approved or rejected
pub async fn approve_withdrawal(
    market: &Market,
    session: &Session,
    withdrawal_id: &str,
) -> Result<Withdrawal, ApiError> {
    let admin = session.require_admin()?;
    debug!(admin_id = %admin.id, withdrawal_id = %withdrawal_id, "approve_withdrawal");

    let mut tx = market.db().begin_write().await?;
    let mut withdrawals: Vec<Withdrawal> = tx.load(&WITHDRAWALS).await?;
    let idx = withdrawal_index(&withdrawals, withdrawal_id)?;

    withdrawal::approve(&mut withdrawals[idx], Utc::now())?;
    let approved = withdrawals[idx].clone();
    tx.save(&WITHDRAWALS, &withdrawals).await?;
    tx.commit().await?;

    info!(
        withdrawal_id = %withdrawal_id,
        seller_id = %approved.seller_id,
        amount = %approved.amount(),
        "Withdrawal approved"
    );
    Ok(approved)
}

/// Pending → Rejected with a reason. Admin only.
///
/// ## Errors
/// - `InvalidInput`: blank reason
/// - `NotFound` / `InvalidState` as for approval
pub async fn reject_withdrawal(
    market: &Market,
    session: &Session,
    withdrawal_id: &str,
    reason: &str,
) -> Result<Withdrawal, ApiError> {
    let admin = session.require_admin()?;
    debug!(admin_id = %admin.id, withdrawal_id = %withdrawal_id, "reject_withdrawal");

    let mut tx = market.db().begin_write().await?;
    let mut withdrawals: Vec<Withdrawal> = tx.load(&WITHDRAWALS).await?;
    let idx = withdrawal_index(&withdrawals, withdrawal_id)?;

    withdrawal::reject(&mut withdrawals[idx], reason, Utc::now())?;
    let rejected = withdrawals[idx].clone();
    tx.save(&WITHDRAWALS, &withdrawals).await?;
    tx.commit().await?;

    info!(withdrawal_id = %withdrawal_id, "Withdrawal rejected");
    Ok(rejected)
}

/// The signed-in seller's requests, newest first.
pub async fn withdrawal_history(market: &Market, session: &Session) -> Result<Vec<Withdrawal>, ApiError> {
    let seller = session.require_seller()?;
    debug!(seller_id = %seller.id, "withdrawal_history");

    let withdrawals = market.db().withdrawals().all().await?;
    Ok(withdrawal::history(&withdrawals, &seller.id))
}

/// Every request, newest first. Admin only.
pub async fn list_withdrawals(market: &Market, session: &Session) -> Result<Vec<Withdrawal>, ApiError> {
    session.require_admin()?;
    debug!("list_withdrawals");

    let mut withdrawals = market.db().withdrawals().all().await?;
    withdrawals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(withdrawals)
}

// =============================================================================
// Unit Tests
// =============================================================================
