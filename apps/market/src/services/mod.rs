//! # Marketplace Services
//!
//! Every operation a storefront page can trigger.
//!
//! ## Organization
//! ```text
//! services/
//! ├── mod.rs          ◄─── You are here (exports)
//! ├── identity.rs     ◄─── Register, sign in, seller approval, VIP
//! ├── catalog.rs      ◄─── Product submission, moderation, listings
//! ├── cart.rs         ◄─── Per-user cart with live prices
//! ├── checkout.rs     ◄─── Frozen checkout, receipts, payment review
//! ├── withdrawals.rs  ◄─── Seller payouts
//! └── ledger.rs       ◄─── Revenue totals, balances, charts
//! ```
//!
//! ## How a Service Call Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  storefront ──► service(&Market, &Session, args)                        │
//! │                    │                                                    │
//! │                    ├── session.require_*()      role gate               │
//! │                    ├── market.db().begin_write() one writer at a time   │
//! │                    ├── digit_core::*            pure business rules     │
//! │                    └── tx.commit()                                      │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  Result<Dto, ApiError> ──► { code: "EMPTY_CART", message: "..." }       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Read-only services go through the repositories. Services that write
//! read through the same [`WriteTx`](digit_db::WriteTx) they commit, so a
//! read-check-write sequence can't interleave with another writer.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod identity;
pub mod ledger;
pub mod withdrawals;
