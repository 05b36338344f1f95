//! # Withdrawal Repository
//!
//! Read access to `dm_withdraws`.

use sqlx::SqlitePool;

use digit_core::Withdrawal;

use super::collection::{CollectionRepository, WITHDRAWALS};
use crate::error::DbResult;

/// Repository for seller payout requests.
#[derive(Debug, Clone)]
pub struct WithdrawalRepository {
    inner: CollectionRepository<Withdrawal>,
}

impl WithdrawalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WithdrawalRepository {
            inner: CollectionRepository::new(pool, WITHDRAWALS),
        }
    }

    pub async fn all(&self) -> DbResult<Vec<Withdrawal>> {
        self.inner.all().await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Withdrawal>> {
        self.inner.get_by_id(id).await
    }

    pub async fn list_by_seller(&self, seller_id: &str) -> DbResult<Vec<Withdrawal>> {
        self.inner.filter(|w| w.seller_id == seller_id).await
    }
}
