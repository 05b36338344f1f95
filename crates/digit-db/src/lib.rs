//! # digit-db: Storage Layer for the Digit Store Marketplace
//!
//! Persists the marketplace collections in SQLite, one JSON document per
//! collection key, with sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Digit Store Data Flow                            │
//! │                                                                         │
//! │  Service call (confirm_payment)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     digit-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (read side)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ UserRepo      │    │ 001_         │  │   │
//! │  │   │ WriteTx       │◄───│ ProductRepo   │    │ collections  │  │   │
//! │  │   │ write lock    │    │ PaymentRepo   │    │  .sql        │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │      SQLite: collections(key, value JSON, updated_at)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, configuration, write transactions
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Collection keys, load/save, typed repositories
//! - [`credentials`] - Password hash format
//! - [`seed`] - First-run accounts and sample catalog
//!
//! ## Usage
//!
//! ```rust,ignore
//! use digit_db::{Database, DbConfig};
//! use digit_db::repository::collection::PRODUCTS;
//!
//! let db = Database::new(DbConfig::new("digit.db")).await?;
//!
//! // Reads
//! let approved = db.products().list_by_status(ProductStatus::Approved).await?;
//!
//! // Atomic read-modify-write
//! let mut tx = db.begin_write().await?;
//! let mut products = tx.load(&PRODUCTS).await?;
//! products.retain(|p| p.id != "p1");
//! tx.save(&PRODUCTS, &products).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod credentials;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, WriteTx};

// Repository re-exports for convenience
pub use repository::cart::CartRepository;
pub use repository::order::OrderRepository;
pub use repository::payment::PaymentRepository;
pub use repository::product::ProductRepository;
pub use repository::stats::StatsRepository;
pub use repository::user::UserRepository;
pub use repository::withdrawal::WithdrawalRepository;
