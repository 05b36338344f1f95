//! # First-run Seed Data
//!
//! Guarantees the accounts and sample products a fresh store needs.
//!
//! ```text
//! seed_defaults()
//!   ├── no admin?                 → admin@digit.store
//!   ├── no seller@demo.com?       → demo seller (id "demo-seller", approved)
//!   ├── empty catalog?            → two approved sample products
//!   └── no dm_stats document?     → zeroed stats with current counts
//! ```
//!
//! Every step checks before writing, so running it on each startup is safe.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use digit_core::ledger::counted_users;
use digit_core::{Product, ProductStatus, RevenueStats, Role, User, DEMO_SELLER_ID};

use crate::credentials::hash_password;
use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::collection::{PRODUCTS, STATS, USERS};

pub const ADMIN_EMAIL: &str = "admin@digit.store";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const DEMO_SELLER_EMAIL: &str = "seller@demo.com";
pub const DEMO_SELLER_PASSWORD: &str = "demo123";

/// What a seed run actually created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub demo_seller_created: bool,
    pub products_created: usize,
    pub stats_initialized: bool,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        *self == SeedReport::default()
    }
}

/// (name, description, price in qəpik, category, file)
const SAMPLE_PRODUCTS: &[(&str, &str, i64, &str, &str)] = &[
    (
        "E-kitab: Web Dizayn Əsasları",
        "150 səhifəlik ətraflı bələdçi. HTML, CSS və responsive dizayn mövzuları.",
        1500,
        "e-kitab",
        "data:text/plain,Web%20Dizayn%20E-kitab%20Demo",
    ),
    (
        "Premium Logo Şablonları",
        "50 ədəd yüksək keyfiyyətli logo şablonu. AI və PSD formatlarında.",
        3500,
        "dizayn",
        "data:text/plain,Logo%20Şablonları%20Demo",
    ),
];

/// Idempotently creates the admin, the demo seller, the sample catalog and
/// the stats document.
pub async fn seed_defaults(db: &Database) -> DbResult<SeedReport> {
    let now = Utc::now();
    let mut report = SeedReport::default();
    let mut tx = db.begin_write().await?;

    let mut users: Vec<User> = tx.load(&USERS).await?;

    if !users.iter().any(|u| u.role == Role::Admin) {
        users.push(User {
            id: Uuid::new_v4().to_string(),
            email: ADMIN_EMAIL.to_string(),
            password: hash_password(ADMIN_PASSWORD)?,
            role: Role::Admin,
            seller_approved: true,
            is_vip: false,
            created_at: now,
        });
        report.admin_created = true;
    }

    if !users.iter().any(|u| u.email == DEMO_SELLER_EMAIL) {
        users.push(User {
            id: DEMO_SELLER_ID.to_string(),
            email: DEMO_SELLER_EMAIL.to_string(),
            password: hash_password(DEMO_SELLER_PASSWORD)?,
            role: Role::Seller,
            seller_approved: true,
            is_vip: false,
            created_at: now,
        });
        report.demo_seller_created = true;
    }

    if report.admin_created || report.demo_seller_created {
        tx.save(&USERS, &users).await?;
    }

    let mut products: Vec<Product> = tx.load(&PRODUCTS).await?;
    if products.is_empty() {
        products = SAMPLE_PRODUCTS
            .iter()
            .map(|(name, description, price_cents, category, file)| Product {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                description: description.to_string(),
                price_cents: *price_cents,
                category: category.to_string(),
                file: file.to_string(),
                image: None,
                seller_id: DEMO_SELLER_ID.to_string(),
                status: ProductStatus::Approved,
                reject_reason: None,
                created_at: now,
                approved_at: Some(now),
            })
            .collect();
        tx.save(&PRODUCTS, &products).await?;
        report.products_created = products.len();
    }

    if tx.load_optional(&STATS).await?.is_none() {
        let stats = RevenueStats {
            total_products: products.len() as u64,
            total_users: counted_users(&users) as u64,
            ..RevenueStats::default()
        };
        tx.save(&STATS, &stats).await?;
        report.stats_initialized = true;
    }

    tx.commit().await?;

    if report.is_noop() {
        info!("Seed data already present");
    } else {
        info!(
            admin = report.admin_created,
            demo_seller = report.demo_seller_created,
            products = report.products_created,
            stats = report.stats_initialized,
            "Seed data created"
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{verify_password, CredentialCheck};
    use crate::pool::DbConfig;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = seed_defaults(&db).await.unwrap();
        assert!(first.admin_created);
        assert!(first.demo_seller_created);
        assert_eq!(first.products_created, 2);
        assert!(first.stats_initialized);

        let second = seed_defaults(&db).await.unwrap();
        assert!(second.is_noop());

        assert_eq!(db.users().count().await.unwrap(), 2);
        assert_eq!(db.products().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_seeded_accounts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_defaults(&db).await.unwrap();

        let seller = db.users().get_by_id(DEMO_SELLER_ID).await.unwrap().unwrap();
        assert_eq!(seller.email, DEMO_SELLER_EMAIL);
        assert!(seller.seller_approved);
        assert_eq!(
            verify_password(DEMO_SELLER_PASSWORD, &seller.password),
            CredentialCheck::Valid
        );

        let admin = db.users().find_by_email(ADMIN_EMAIL).await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);

        let products = db.products().list_by_status(ProductStatus::Approved).await.unwrap();
        assert_eq!(products.len(), 2);
        assert!(products.iter().all(|p| p.seller_id == DEMO_SELLER_ID));
        assert_eq!(products[1].price_cents, 3500);

        let stats = db.stats().get().await.unwrap();
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_orders, 0);
    }
}
