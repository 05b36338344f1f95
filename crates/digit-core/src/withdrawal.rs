//! # Withdrawals
//!
//! Seller payout requests and their moderation.
//!
//! ```text
//!  seller requests ──► Pending ──admin approves──► Approved (paid out)
//!                         │
//!                         └──admin rejects (reason)──► Rejected
//! ```
//!
//! Only Approved withdrawals reduce the seller balance. Pending requests are
//! still reserved when a new request is checked, so two requests cannot
//! together exceed the balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{User, Withdrawal, WithdrawalStatus};
use crate::validation::{require, validate_phone, validate_positive_amount};

/// Fields of the seller's payout form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    /// Payee full name.
    pub name: String,
    pub card: String,
    pub phone: String,
    pub amount_cents: i64,
}

/// Creates a pending withdrawal.
///
/// `withdrawable` is the seller's available balance minus the amounts of
/// their still-pending requests (see
/// [`ledger::withdrawable`](crate::ledger::withdrawable)).
///
/// ## Errors
/// - `Forbidden` if the requester is not a seller
/// - `InvalidInput` on a blank field, bad phone or non-positive amount
/// - `InsufficientBalance` if the amount exceeds `withdrawable`
pub fn request(
    seller: &User,
    input: WithdrawalRequest,
    withdrawable: Money,
    id: String,
    now: DateTime<Utc>,
) -> CoreResult<Withdrawal> {
    if !seller.role.can_sell() {
        return Err(CoreError::forbidden("only sellers can request withdrawals"));
    }

    let name = require("name", &input.name)?.to_string();
    let card = require("card", &input.card)?.to_string();
    let phone = validate_phone(&input.phone)?;
    let amount = validate_positive_amount("amount", Money::from_cents(input.amount_cents))?;

    if amount > withdrawable {
        return Err(CoreError::InsufficientBalance {
            available: withdrawable,
            requested: amount,
        });
    }

    Ok(Withdrawal {
        id,
        seller_id: seller.id.clone(),
        name,
        card,
        phone,
        amount_cents: amount.cents(),
        status: WithdrawalStatus::Pending,
        reason: None,
        created_at: now,
        approved_at: None,
        rejected_at: None,
    })
}

fn ensure_pending(withdrawal: &Withdrawal, action: &str) -> CoreResult<()> {
    if withdrawal.status != WithdrawalStatus::Pending {
        return Err(CoreError::invalid_state(
            "Withdrawal",
            &withdrawal.id,
            withdrawal.status.as_str(),
            action,
        ));
    }
    Ok(())
}

/// Pending → Approved.
pub fn approve(withdrawal: &mut Withdrawal, now: DateTime<Utc>) -> CoreResult<()> {
    ensure_pending(withdrawal, "approve")?;
    withdrawal.status = WithdrawalStatus::Approved;
    withdrawal.approved_at = Some(now);
    Ok(())
}

/// Pending → Rejected.
pub fn reject(withdrawal: &mut Withdrawal, reason: &str, now: DateTime<Utc>) -> CoreResult<()> {
    let reason = require("reason", reason)?.to_string();
    ensure_pending(withdrawal, "reject")?;
    withdrawal.status = WithdrawalStatus::Rejected;
    withdrawal.reason = Some(reason);
    withdrawal.rejected_at = Some(now);
    Ok(())
}

/// Sum of a seller's withdrawals in the given state.
pub fn total_with_status(withdrawals: &[Withdrawal], seller_id: &str, status: WithdrawalStatus) -> Money {
    withdrawals
        .iter()
        .filter(|w| w.seller_id == seller_id && w.status == status)
        .map(Withdrawal::amount)
        .sum()
}

/// A seller's requests, newest first.
pub fn history(withdrawals: &[Withdrawal], seller_id: &str) -> Vec<Withdrawal> {
    let mut mine: Vec<Withdrawal> = withdrawals
        .iter()
        .filter(|w| w.seller_id == seller_id)
        .cloned()
        .collect();
    mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    mine
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::Role;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap()
    }

    fn seller() -> User {
        User {
            id: "s1".to_string(),
            email: "s@example.com".to_string(),
            password: "x".to_string(),
            role: Role::Seller,
            seller_approved: true,
            is_vip: false,
            created_at: now(),
        }
    }

    fn form(amount_cents: i64) -> WithdrawalRequest {
        WithdrawalRequest {
            name: "Aysel Məmmədova".to_string(),
            card: "4169 7388 0000 0000".to_string(),
            phone: "+994501234567".to_string(),
            amount_cents,
        }
    }

    #[test]
    fn test_request_within_balance() {
        let w = request(&seller(), form(2000), Money::from_cents(2975), "w1".into(), now()).unwrap();
        assert_eq!(w.status, WithdrawalStatus::Pending);
        assert_eq!(w.amount().cents(), 2000);
        assert_eq!(w.seller_id, "s1");
    }

    #[test]
    fn test_request_over_balance() {
        let err = request(&seller(), form(5000), Money::from_cents(2975), "w1".into(), now()).unwrap_err();
        match err {
            CoreError::InsufficientBalance { available, requested } => {
                assert_eq!(available.cents(), 2975);
                assert_eq!(requested.cents(), 5000);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_request_validation() {
        let balance = Money::from_cents(100_000);

        let mut bad_phone = form(100);
        bad_phone.phone = "0501234567".to_string();
        assert!(matches!(
            request(&seller(), bad_phone, balance, "w".into(), now()),
            Err(CoreError::InvalidInput(ValidationError::InvalidFormat { .. }))
        ));

        let mut no_card = form(100);
        no_card.card = String::new();
        assert!(request(&seller(), no_card, balance, "w".into(), now()).is_err());

        assert!(matches!(
            request(&seller(), form(0), balance, "w".into(), now()),
            Err(CoreError::InvalidInput(ValidationError::MustBePositive { .. }))
        ));

        let mut buyer = seller();
        buyer.role = Role::User;
        assert!(matches!(
            request(&buyer, form(100), balance, "w".into(), now()),
            Err(CoreError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_moderation_is_terminal() {
        let balance = Money::from_cents(10_000);
        let mut w = request(&seller(), form(1000), balance, "w1".into(), now()).unwrap();
        approve(&mut w, now()).unwrap();
        assert_eq!(w.approved_at, Some(now()));
        assert!(approve(&mut w, now()).is_err());
        assert!(reject(&mut w, "late", now()).is_err());

        let mut w = request(&seller(), form(1000), balance, "w2".into(), now()).unwrap();
        assert!(matches!(reject(&mut w, "", now()), Err(CoreError::InvalidInput(_))));
        reject(&mut w, "Card number mismatch", now()).unwrap();
        assert_eq!(w.status, WithdrawalStatus::Rejected);
        assert_eq!(w.reason.as_deref(), Some("Card number mismatch"));
        assert_eq!(w.rejected_at, Some(now()));
    }

    #[test]
    fn test_totals_and_history() {
        let balance = Money::from_cents(10_000);
        let mut a = request(&seller(), form(1000), balance, "a".into(), now()).unwrap();
        approve(&mut a, now()).unwrap();
        let b = request(&seller(), form(700), balance, "b".into(), now() + Duration::hours(1)).unwrap();

        let all = vec![a, b];
        assert_eq!(total_with_status(&all, "s1", WithdrawalStatus::Approved).cents(), 1000);
        assert_eq!(total_with_status(&all, "s1", WithdrawalStatus::Pending).cents(), 700);
        assert_eq!(total_with_status(&all, "s2", WithdrawalStatus::Pending).cents(), 0);

        let ids: Vec<String> = history(&all, "s1").into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
