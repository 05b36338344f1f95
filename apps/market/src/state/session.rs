//! # Session State
//!
//! Who is signed in, plus the checkout they have frozen.
//!
//! A `Session` belongs to one visitor and is passed explicitly to every
//! service call. It is never persisted: an abandoned checkout vanishes
//! with it.
//!
//! ```text
//! ┌──────────────┐  authenticate  ┌──────────────┐  start_checkout  ┌──────────────────┐
//! │    Guest     │───────────────►│  Signed in   │─────────────────►│ Signed in +      │
//! │  user: None  │◄───────────────│  user: Some  │◄─────────────────│ pending checkout │
//! └──────────────┘     logout     └──────────────┘  submit_receipt  └──────────────────┘
//!                                                   (or expiry)
//! ```

use digit_core::checkout::PendingPaymentOrder;
use digit_core::{CoreError, CoreResult, Role, User};

/// One visitor's session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
    checkout: Option<PendingPaymentOrder>,
}

impl Session {
    /// A visitor that hasn't signed in.
    pub fn guest() -> Self {
        Session::default()
    }

    /// A session for an authenticated user.
    pub fn signed_in(user: User) -> Self {
        Session {
            user: Some(user),
            checkout: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// The signed-in role, `Guest` without a user.
    pub fn role(&self) -> Role {
        self.user.as_ref().map_or(Role::Guest, |u| u.role)
    }

    /// ## Errors
    /// `AuthRequired` without a signed-in user.
    pub fn require_user(&self) -> CoreResult<&User> {
        self.user.as_ref().ok_or(CoreError::AuthRequired)
    }

    /// ## Errors
    /// `AuthRequired` without a user, `Forbidden` unless admin.
    pub fn require_admin(&self) -> CoreResult<&User> {
        let user = self.require_user()?;
        if !user.role.can_moderate() {
            return Err(CoreError::forbidden("admin only"));
        }
        Ok(user)
    }

    /// ## Errors
    /// `AuthRequired` without a user, `Forbidden` unless seller.
    pub fn require_seller(&self) -> CoreResult<&User> {
        let user = self.require_user()?;
        if !user.role.can_sell() {
            return Err(CoreError::forbidden("sellers only"));
        }
        Ok(user)
    }

    /// The frozen checkout waiting for a receipt, if any.
    pub fn checkout(&self) -> Option<&PendingPaymentOrder> {
        self.checkout.as_ref()
    }

    /// Replaces the signed-in user with a fresh copy from storage.
    pub(crate) fn refresh_user(&mut self, user: User) {
        if self.user.as_ref().map_or(false, |u| u.id == user.id) {
            self.user = Some(user);
        }
    }

    pub(crate) fn set_checkout(&mut self, order: PendingPaymentOrder) {
        self.checkout = Some(order);
    }

    pub(crate) fn take_checkout(&mut self) -> Option<PendingPaymentOrder> {
        self.checkout.take()
    }

    /// Signs out and drops any pending checkout.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.checkout = None;
    }
}
