//! # Cart Repository
//!
//! Per-user carts stored under `dm_cart_<userId>`.

use sqlx::SqlitePool;

use digit_core::cart::Cart;

use super::collection::{self, load};
use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// The user's cart, empty if never saved.
    pub async fn get(&self, user_id: &str) -> DbResult<Cart> {
        Ok(load(&self.pool, &collection::cart(user_id)).await?.unwrap_or_default())
    }
}
