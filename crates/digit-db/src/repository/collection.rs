//! # Collection Store
//!
//! The key-value storage interface every repository is built on.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  collections                                                            │
//! │  ┌──────────────────┬──────────────────────────────┬─────────────────┐  │
//! │  │ key              │ value (JSON)                 │ updated_at      │  │
//! │  ├──────────────────┼──────────────────────────────┼─────────────────┤  │
//! │  │ dm_users         │ [{"id":..,"email":..}, ...]  │ 2025-06-01T...  │  │
//! │  │ dm_products      │ [{...}, ...]                 │                 │  │
//! │  │ dm_stats         │ {"totalRevenueCents":..}     │                 │  │
//! │  │ dm_cart_<userId> │ ["productId", ...]           │                 │  │
//! │  └──────────────────┴──────────────────────────────┴─────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`load`] returns `None` for a key never written; callers default it
//! (an empty list, zeroed stats). [`save`] replaces the whole document.
//!
//! Both accept any SQLite executor: the pool for reads, or the connection
//! of a [`WriteTx`](crate::WriteTx) for read-modify-write.

use std::borrow::Cow;
use std::marker::PhantomData;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use digit_core::cart::Cart;
use digit_core::{Order, Payment, PaymentRejection, Product, Record, RevenueStats, User, Withdrawal};

use crate::error::{DbError, DbResult};

// =============================================================================
// Keys
// =============================================================================

/// A collection key together with the type stored under it.
#[derive(Debug, Clone)]
pub struct Key<T> {
    name: Cow<'static, str>,
    _value: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// A fixed, well-known key.
    pub const fn fixed(name: &'static str) -> Self {
        Key {
            name: Cow::Borrowed(name),
            _value: PhantomData,
        }
    }

    /// A key built at runtime (per-user carts).
    pub fn dynamic(name: String) -> Self {
        Key {
            name: Cow::Owned(name),
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub const USERS: Key<Vec<User>> = Key::fixed("dm_users");
pub const PRODUCTS: Key<Vec<Product>> = Key::fixed("dm_products");
pub const ORDERS: Key<Vec<Order>> = Key::fixed("dm_orders");
pub const PAYMENTS: Key<Vec<Payment>> = Key::fixed("dm_payments");
pub const STATS: Key<RevenueStats> = Key::fixed("dm_stats");
pub const WITHDRAWALS: Key<Vec<Withdrawal>> = Key::fixed("dm_withdraws");
pub const PAYMENT_REJECTIONS: Key<Vec<PaymentRejection>> = Key::fixed("dm_payment_rejections");

/// Prefix of the per-user cart keys.
pub const CART_PREFIX: &str = "dm_cart_";

/// `dm_cart_<userId>`
pub fn cart(user_id: &str) -> Key<Cart> {
    Key::dynamic(format!("{}{}", CART_PREFIX, user_id))
}

// =============================================================================
// Load / Save
// =============================================================================

/// Reads and decodes the document stored under `key`.
pub async fn load<'e, E, T>(executor: E, key: &Key<T>) -> DbResult<Option<T>>
where
    E: Executor<'e, Database = Sqlite>,
    T: DeserializeOwned,
{
    let raw: Option<String> = sqlx::query_scalar("SELECT value FROM collections WHERE key = ?1")
        .bind(key.name().to_string())
        .fetch_optional(executor)
        .await?;

    raw.map(|json| serde_json::from_str(&json).map_err(|e| DbError::serialization(key.name(), e)))
        .transpose()
}

/// Encodes `value` and replaces the document stored under `key`.
pub async fn save<'e, E, T>(executor: E, key: &Key<T>, value: &T) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
    T: Serialize,
{
    let json = serde_json::to_string(value).map_err(|e| DbError::serialization(key.name(), e))?;

    debug!(key = key.name(), bytes = json.len(), "Saving collection");

    sqlx::query(
        r#"
        INSERT INTO collections (key, value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key.name().to_string())
    .bind(json)
    .bind(Utc::now().to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

// =============================================================================
// Read-side Repository
// =============================================================================

/// Read access to one list collection, shared by the typed repositories.
#[derive(Debug, Clone)]
pub struct CollectionRepository<T> {
    pool: SqlitePool,
    key: Key<Vec<T>>,
}

impl<T> CollectionRepository<T>
where
    T: DeserializeOwned + Record,
{
    pub fn new(pool: SqlitePool, key: Key<Vec<T>>) -> Self {
        CollectionRepository { pool, key }
    }

    /// All records in stored order.
    pub async fn all(&self) -> DbResult<Vec<T>> {
        Ok(load(&self.pool, &self.key).await?.unwrap_or_default())
    }

    /// Records matching a predicate, in stored order.
    pub async fn filter<F>(&self, predicate: F) -> DbResult<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.all().await?.into_iter().filter(|r| predicate(r)).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<T>> {
        Ok(self.all().await?.into_iter().find(|r| r.record_id() == id))
    }

    pub async fn count(&self) -> DbResult<usize> {
        Ok(self.all().await?.len())
    }
}

/// Finds a record's position for an in-place update.
pub fn position<T: Record>(records: &[T], id: &str) -> Option<usize> {
    records.iter().position(|r| r.record_id() == id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_missing_key_loads_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = load(db.pool(), &USERS).await.unwrap();
        assert!(users.is_none());
    }

    #[tokio::test]
    async fn test_cart_keys_are_per_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(cart("u1").name(), "dm_cart_u1");

        let mine = Cart::from_ids(vec!["p1".into(), "p2".into()]);
        save(db.pool(), &cart("u1"), &mine).await.unwrap();

        assert_eq!(db.carts().get("u1").await.unwrap(), mine);
        assert!(db.carts().get("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_document() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = RevenueStats {
            total_orders: 1,
            ..RevenueStats::default()
        };
        let second = RevenueStats {
            total_orders: 2,
            ..RevenueStats::default()
        };

        save(db.pool(), &STATS, &first).await.unwrap();
        save(db.pool(), &STATS, &second).await.unwrap();

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collections")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(db.stats().get().await.unwrap().total_orders, 2);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_reported() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO collections (key, value, updated_at) VALUES ('dm_users', 'not json', '')")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.users().all().await.unwrap_err();
        assert!(matches!(err, DbError::Serialization { ref key, .. } if key == "dm_users"));
    }
}
