//! # Identity Services
//!
//! Registration, sign-in, seller approval, passwords and VIP status.
//!
//! ```text
//! register ──► dm_users (+ argon2 hash) ──► authenticate ──► Session
//!                                               │
//!                                               ├── legacy plaintext? re-hash
//!                                               └── recompute VIP flag
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use digit_core::validation::{validate_email, validate_password, validate_registration_role};
use digit_core::vip::{VipProgress, VipRule};
use digit_core::{CoreError, Order, Role, User, MIN_PASSWORD_LENGTH};
use digit_db::credentials::{hash_password, verify_password, CredentialCheck};
use digit_db::repository::collection::{position, ORDERS, USERS};

use crate::error::ApiError;
use crate::state::{Market, Session};

// =============================================================================
// DTOs
// =============================================================================

/// Registration form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// A user as the storefront sees it: no credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub seller_approved: bool,
    #[serde(rename = "isVIP")]
    pub is_vip: bool,
    #[ts(as = "String")]
    pub created_at: chrono::DateTime<Utc>,
}

impl From<&User> for Account {
    fn from(user: &User) -> Self {
        Account {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            seller_approved: user.seller_approved,
            is_vip: user.is_vip,
            created_at: user.created_at,
        }
    }
}

/// The profile page.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub account: Account,
    pub vip: VipProgress,
    /// Items progress towards VIP, 0-100.
    pub items_percent: u8,
    /// Spend progress towards VIP, 0-100.
    pub spend_percent: u8,
}

// =============================================================================
// Helpers
// =============================================================================

/// Re-evaluates a user's VIP flag in place. Returns the progress and
/// whether the flag changed.
pub(crate) fn refresh_vip(user: &mut User, orders: &[Order], rule: &VipRule) -> (VipProgress, bool) {
    let progress = rule.evaluate(&user.id, orders);
    let changed = user.is_vip != progress.is_vip;
    user.is_vip = progress.is_vip;
    (progress, changed)
}

fn user_index(users: &[User], user_id: &str) -> Result<usize, ApiError> {
    position(users, user_id).ok_or_else(|| CoreError::not_found("User", user_id).into())
}

/// The signed-in user as currently stored.
///
/// The session keeps the copy taken at sign-in, so a VIP flag granted by a
/// later confirmation only shows up here.
pub(crate) async fn stored_user(market: &Market, session: &Session) -> Result<User, ApiError> {
    let user_id = &session.require_user()?.id;
    market
        .db()
        .users()
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", user_id))
}

/// Whether the visitor shops at VIP prices right now. Guests never do.
pub(crate) async fn shops_as_vip(market: &Market, session: &Session) -> Result<bool, ApiError> {
    if !session.is_signed_in() {
        return Ok(false);
    }
    Ok(stored_user(market, session).await?.is_vip)
}

// =============================================================================
// Services
// =============================================================================

/// Creates an account.
///
/// ## Errors
/// - `InvalidInput`: bad email, short password, or a role other than
///   user/seller
/// - `DuplicateEmail`: the email is taken
pub async fn register(market: &Market, input: Registration) -> Result<Account, ApiError> {
    debug!(email = %input.email, role = %input.role, "register");

    let email = validate_email(&input.email)?;
    validate_password("password", &input.password, MIN_PASSWORD_LENGTH)?;
    let role = validate_registration_role(input.role)?;
    let password = hash_password(&input.password)?;

    let mut tx = market.db().begin_write().await?;
    let mut users: Vec<User> = tx.load(&USERS).await?;

    if users.iter().any(|u| u.email == email) {
        warn!(email = %email, "Registration with taken email");
        return Err(CoreError::DuplicateEmail(email).into());
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        password,
        role,
        seller_approved: false,
        is_vip: false,
        created_at: Utc::now(),
    };
    users.push(user.clone());
    tx.save(&USERS, &users).await?;
    tx.commit().await?;

    info!(user_id = %user.id, role = %user.role, "User registered");
    Ok(Account::from(&user))
}

/// Signs a user in.
///
/// The password is checked outside the write lock. A write happens only
/// when a legacy plaintext credential needs re-hashing or the VIP flag
/// changed since the last sign-in.
///
/// ## Errors
/// `InvalidCredentials` for an unknown email or wrong password.
pub async fn authenticate(
    market: &Market,
    session: &mut Session,
    email: &str,
    password: &str,
) -> Result<Account, ApiError> {
    let email = email.trim();
    debug!(email = %email, "authenticate");

    let mut user = match market.db().users().find_by_email(email).await? {
        Some(user) => user,
        None => {
            warn!(email = %email, "Sign-in with unknown email");
            return Err(CoreError::InvalidCredentials.into());
        }
    };

    let check = verify_password(password, &user.password);
    if !check.is_valid() {
        warn!(email = %email, "Sign-in with wrong password");
        return Err(CoreError::InvalidCredentials.into());
    }

    let rehashed = match check {
        CredentialCheck::ValidLegacy => Some(hash_password(password)?),
        _ => None,
    };

    let rule = market.config().vip_rule();
    let orders = market.db().orders().list_by_user(&user.id).await?;
    let vip_now = rule.evaluate(&user.id, &orders).is_vip;

    if rehashed.is_some() || vip_now != user.is_vip {
        let mut tx = market.db().begin_write().await?;
        let mut users: Vec<User> = tx.load(&USERS).await?;
        let idx = user_index(&users, &user.id)?;
        let orders: Vec<Order> = tx.load(&ORDERS).await?;

        if let Some(hash) = rehashed {
            users[idx].password = hash;
            info!(user_id = %user.id, "Upgraded legacy credential");
        }
        let (progress, vip_changed) = refresh_vip(&mut users[idx], &orders, &rule);
        if vip_changed {
            info!(user_id = %user.id, is_vip = progress.is_vip, "VIP status changed");
        }

        tx.save(&USERS, &users).await?;
        tx.commit().await?;
        user = users.swap_remove(idx);
    }

    let account = Account::from(&user);
    *session = Session::signed_in(user);

    info!(user_id = %account.id, role = %account.role, "User signed in");
    Ok(account)
}

/// Signs out, dropping any pending checkout.
pub fn logout(session: &mut Session) {
    if let Some(user) = session.user() {
        info!(user_id = %user.id, "User signed out");
    }
    session.sign_out();
}

/// Grants or revokes a seller's approval. Admin only; idempotent.
///
/// ## Errors
/// - `NotFound`: no such user
/// - `InvalidState`: the target is not a seller
pub async fn set_seller_approval(
    market: &Market,
    session: &Session,
    user_id: &str,
    approved: bool,
) -> Result<Account, ApiError> {
    let admin = session.require_admin()?;
    debug!(admin_id = %admin.id, user_id = %user_id, approved, "set_seller_approval");

    let mut tx = market.db().begin_write().await?;
    let mut users: Vec<User> = tx.load(&USERS).await?;
    let idx = user_index(&users, user_id)?;

    let target = &mut users[idx];
    if target.role != Role::Seller {
        return Err(CoreError::invalid_state(
            "User",
            user_id,
            target.role.as_str(),
            "change seller approval",
        )
        .into());
    }

    target.seller_approved = approved;
    let account = Account::from(&*target);
    tx.save(&USERS, &users).await?;
    tx.commit().await?;

    info!(user_id = %user_id, approved, "Seller approval updated");
    Ok(account)
}

/// Changes the signed-in user's password.
///
/// ## Errors
/// - `AuthRequired`: not signed in
/// - `InvalidInput`: new password too short
/// - `InvalidCredentials`: old password doesn't match
pub async fn change_password(
    market: &Market,
    session: &mut Session,
    old_password: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    let user_id = session.require_user()?.id.clone();
    debug!(user_id = %user_id, "change_password");

    validate_password("new password", new_password, MIN_PASSWORD_LENGTH)?;

    let current = stored_user(market, session).await?;
    if !verify_password(old_password, &current.password).is_valid() {
        warn!(user_id = %user_id, "Password change with wrong old password");
        return Err(CoreError::InvalidCredentials.into());
    }
    let hash = hash_password(new_password)?;

    let mut tx = market.db().begin_write().await?;
    let mut users: Vec<User> = tx.load(&USERS).await?;
    let idx = user_index(&users, &user_id)?;

    // Changed by another session since the check above.
    if users[idx].password != current.password {
        warn!(user_id = %user_id, "Password changed concurrently");
        return Err(CoreError::InvalidCredentials.into());
    }

    users[idx].password = hash;
    tx.save(&USERS, &users).await?;
    tx.commit().await?;

    session.refresh_user(users.swap_remove(idx));
    info!(user_id = %user_id, "Password changed");
    Ok(())
}

/// Re-evaluates and persists a user's VIP flag from their completed orders.
pub async fn recompute_vip(market: &Market, user_id: &str) -> Result<VipProgress, ApiError> {
    debug!(user_id = %user_id, "recompute_vip");

    let mut tx = market.db().begin_write().await?;
    let mut users: Vec<User> = tx.load(&USERS).await?;
    let idx = user_index(&users, user_id)?;
    let orders: Vec<Order> = tx.load(&ORDERS).await?;

    let (progress, changed) = refresh_vip(&mut users[idx], &orders, &market.config().vip_rule());
    if changed {
        tx.save(&USERS, &users).await?;
        tx.commit().await?;
        info!(user_id = %user_id, is_vip = progress.is_vip, "VIP status changed");
    }

    Ok(progress)
}

/// Every non-admin account. Admin only.
pub async fn list_users(market: &Market, session: &Session) -> Result<Vec<Account>, ApiError> {
    session.require_admin()?;
    debug!("list_users");

    let users = market.db().users().all().await?;
    Ok(users
        .iter()
        .filter(|u| u.role != Role::Admin)
        .map(Account::from)
        .collect())
}

/// The signed-in user's profile, with a fresh VIP evaluation.
pub async fn profile(market: &Market, session: &mut Session) -> Result<Profile, ApiError> {
    let user_id = session.require_user()?.id.clone();
    debug!(user_id = %user_id, "profile");

    let vip = recompute_vip(market, &user_id).await?;
    let user = market
        .db()
        .users()
        .get_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &user_id))?;

    let account = Account::from(&user);
    session.refresh_user(user);

    Ok(Profile {
        account,
        items_percent: vip.items_percent(),
        spend_percent: vip.spend_percent(),
        vip,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
