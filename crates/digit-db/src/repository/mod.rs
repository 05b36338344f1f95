//! # Repository Module
//!
//! Typed access to the marketplace collections.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Service (digit-market)                                                │
//! │       │                                                                 │
//! │       │  reads:  db.users().find_by_email("a@b.az")                    │
//! │       │  writes: let mut tx = db.begin_write().await?;                 │
//! │       │          let users = tx.load(&USERS).await?; ... tx.save(..)   │
//! │       ▼                                                                 │
//! │  Repositories / WriteTx                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  collection::load / collection::save  (one JSON document per key)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite `collections` table                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - accounts and lookup by email
//! - [`ProductRepository`](product::ProductRepository) - catalog entries
//! - [`PaymentRepository`](payment::PaymentRepository) - submitted payments and rejections
//! - [`OrderRepository`](order::OrderRepository) - completed orders
//! - [`WithdrawalRepository`](withdrawal::WithdrawalRepository) - payout requests
//! - [`StatsRepository`](stats::StatsRepository) - revenue cache
//! - [`CartRepository`](cart::CartRepository) - per-user carts

pub mod cart;
pub mod collection;
pub mod order;
pub mod payment;
pub mod product;
pub mod stats;
pub mod user;
pub mod withdrawal;
