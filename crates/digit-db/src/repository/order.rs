//! # Order Repository
//!
//! Read access to `dm_orders`. Orders are written only by payment
//! confirmation, inside its transaction.

use sqlx::SqlitePool;

use digit_core::Order;

use super::collection::{CollectionRepository, ORDERS};
use crate::error::DbResult;

/// Repository for completed orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    inner: CollectionRepository<Order>,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository {
            inner: CollectionRepository::new(pool, ORDERS),
        }
    }

    pub async fn all(&self) -> DbResult<Vec<Order>> {
        self.inner.all().await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        self.inner.get_by_id(id).await
    }

    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        self.inner.filter(|o| o.user_id == user_id).await
    }

    pub async fn count(&self) -> DbResult<usize> {
        self.inner.count().await
    }
}
