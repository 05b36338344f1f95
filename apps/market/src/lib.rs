//! # Digit Store Market Library
//!
//! The marketplace application: state, services and startup.
//!
//! ## Module Organization
//! ```text
//! digit_market/
//! ├── lib.rs              ◄─── You are here (startup helpers)
//! ├── state/
//! │   ├── mod.rs          ◄─── State type exports
//! │   ├── market.rs       ◄─── Shared handle (Database + config)
//! │   ├── session.rs      ◄─── Per-visitor sign-in and checkout
//! │   └── config.rs       ◄─── VIP rule, checkout window, currency
//! ├── services/
//! │   ├── identity.rs     ◄─── Accounts and roles
//! │   ├── catalog.rs      ◄─── Products and moderation
//! │   ├── cart.rs         ◄─── Carts
//! │   ├── checkout.rs     ◄─── Checkout and payment review
//! │   ├── withdrawals.rs  ◄─── Seller payouts
//! │   └── ledger.rs       ◄─── Revenue figures
//! └── error.rs            ◄─── API error type for services
//! ```
//!
//! ## State Management
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────────────┐        ┌──────────────────┐                      │
//! │  │     Market       │        │     Session      │                      │
//! │  │                  │        │                  │                      │
//! │  │  • Database      │        │  • Signed-in user│                      │
//! │  │  • MarketConfig  │        │  • Checkout      │                      │
//! │  └──────────────────┘        └──────────────────┘                      │
//! │   one per process             one per visitor                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod services;
pub mod state;

use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use digit_db::seed::seed_defaults;
use digit_db::{Database, DbConfig, DbError};

use state::{Market, MarketConfig};

/// Failures while opening the store.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Could not determine app data directory")]
    NoDataDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Opens the store.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  1. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  2. Seed Defaults ────────────────────────────────────────────────────► │
/// │     • Admin account, demo seller, sample products                       │
/// │     • Skipped for anything that already exists                          │
/// │                                                                         │
/// │  3. Build Market ─────────────────────────────────────────────────────► │
/// │     • Database + MarketConfig, cloned into every request                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn open_market(config: MarketConfig, db_config: DbConfig) -> Result<Market, StartupError> {
    let db = Database::new(db_config).await?;
    info!("Database connected and migrations applied");

    seed_defaults(&db).await?;

    Ok(Market::new(db, config))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=digit=trace` - Show trace for digit crates only
/// - Default: INFO level
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,digit=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.digit.store/digit.db`
/// - **Windows**: `%APPDATA%\digit\store\data\digit.db`
/// - **Linux**: `~/.local/share/store/digit.db`
///
/// ## Development Override
/// Set `DIGIT_DB_PATH` environment variable to use a custom path.
pub fn get_database_path() -> Result<PathBuf, StartupError> {
    if let Ok(path) = std::env::var("DIGIT_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "digit", "store").ok_or(StartupError::NoDataDir)?;
    let data_dir = proj_dirs.data_dir();

    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("digit.db"))
}
