//! # Stats Repository
//!
//! The `dm_stats` revenue cache: a single document, not a list.

use sqlx::SqlitePool;

use digit_core::RevenueStats;

use super::collection::{load, STATS};
use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StatsRepository { pool }
    }

    /// Current cache, zeroed if never written.
    pub async fn get(&self) -> DbResult<RevenueStats> {
        Ok(load(&self.pool, &STATS).await?.unwrap_or_default())
    }
}
