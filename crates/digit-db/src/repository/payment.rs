//! # Payment Repository
//!
//! Read access to `dm_payments` and the `dm_payment_rejections` audit
//! trail.

use sqlx::SqlitePool;

use digit_core::{Payment, PaymentRejection};

use super::collection::{CollectionRepository, PAYMENTS, PAYMENT_REJECTIONS};
use crate::error::DbResult;

/// Repository for submitted payments.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    inner: CollectionRepository<Payment>,
    rejections: CollectionRepository<PaymentRejection>,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository {
            inner: CollectionRepository::new(pool.clone(), PAYMENTS),
            rejections: CollectionRepository::new(pool, PAYMENT_REJECTIONS),
        }
    }

    pub async fn all(&self) -> DbResult<Vec<Payment>> {
        self.inner.all().await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        self.inner.get_by_id(id).await
    }

    /// Payments awaiting admin review, in submission order.
    pub async fn list_pending(&self) -> DbResult<Vec<Payment>> {
        self.inner.filter(Payment::is_pending).await
    }

    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Payment>> {
        self.inner.filter(|p| p.user_id == user_id).await
    }

    pub async fn rejections(&self) -> DbResult<Vec<PaymentRejection>> {
        self.rejections.all().await
    }
}
