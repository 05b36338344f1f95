//! # State Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │          ┌──────────────────┬──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │   Market     │  │   Session    │  │   MarketConfig   │              │
//! │  │              │  │              │  │                  │              │
//! │  │  Database    │  │  user        │  │  VIP rule        │              │
//! │  │  (SQLite     │  │  pending     │  │  currency        │              │
//! │  │   pool)      │  │  checkout    │  │  checkout window │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  • Market: shared by all visitors, cheap to clone                      │
//! │  • Session: one per visitor, owned by the caller                       │
//! │  • MarketConfig: read-only after initialization                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod market;
mod session;

pub use config::MarketConfig;
pub use market::Market;
pub use session::Session;
