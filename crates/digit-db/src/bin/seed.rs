//! # Seed Data Generator
//!
//! Creates (or tops up) a database file with the default admin, the demo
//! seller and the sample catalog.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p digit-db --bin seed
//!
//! # Specify database path
//! cargo run -p digit-db --bin seed -- --db ./data/digit.db
//! ```

use std::env;

use digit_db::seed::{seed_defaults, ADMIN_EMAIL, DEMO_SELLER_EMAIL};
use digit_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./digit_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Digit Store Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./digit_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Digit Store Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let report = seed_defaults(&db).await?;

    if report.is_noop() {
        println!("⚠ Seed data already present, nothing to do.");
    } else {
        if report.admin_created {
            println!("✓ Created admin account {}", ADMIN_EMAIL);
        }
        if report.demo_seller_created {
            println!("✓ Created demo seller {}", DEMO_SELLER_EMAIL);
        }
        if report.products_created > 0 {
            println!("✓ Created {} sample products", report.products_created);
        }
        if report.stats_initialized {
            println!("✓ Initialized revenue stats");
        }
    }

    println!();
    println!(
        "Users: {}, products: {}",
        db.users().count().await?,
        db.products().count().await?
    );

    db.close().await;
    println!("✓ Seed complete!");

    Ok(())
}
