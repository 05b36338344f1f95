//! # Digit Store Entry Point
//!
//! Opens the store and reports its state.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration from `DIGIT_*` environment variables
//! 3. Determine database path (app data directory or `DIGIT_DB_PATH`)
//! 4. Connect, run migrations, seed defaults
//! 5. Log catalog and revenue figures

use tracing::info;

use digit_core::Money;
use digit_db::DbConfig;
use digit_market::services::ledger;
use digit_market::state::MarketConfig;
use digit_market::{get_database_path, init_tracing, open_market};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = MarketConfig::from_env();
    info!(store = %config.store_name, "Starting Digit Store");

    let db_path = get_database_path()?;
    info!(?db_path, "Database path determined");

    let market = open_market(config, DbConfig::new(db_path)).await?;

    let about = ledger::about_stats(&market).await?;
    let stats = market.db().stats().get().await?;
    info!(
        products = about.approved_products,
        sellers = about.approved_sellers,
        orders = about.completed_orders,
        revenue = %market.config().format_money(Money::from_cents(stats.total_revenue_cents)),
        "Store ready"
    );

    market.db().close().await;
    Ok(())
}
