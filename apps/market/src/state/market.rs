//! # Market State
//!
//! Shared handle every service receives: the database plus configuration.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool` and the write lock, both thread-safe.
//! Cloning a `Market` shares them.

use digit_db::Database;

use super::config::MarketConfig;

/// Shared marketplace state.
#[derive(Debug, Clone)]
pub struct Market {
    db: Database,
    config: MarketConfig,
}

impl Market {
    pub fn new(db: Database, config: MarketConfig) -> Self {
        Market { db, config }
    }

    /// Returns a reference to the inner Database.
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }
}
