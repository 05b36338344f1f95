//! # Product Repository
//!
//! Read access to `dm_products`.

use sqlx::SqlitePool;

use digit_core::{Product, ProductStatus};

use super::collection::{CollectionRepository, PRODUCTS};
use crate::error::DbResult;

/// Repository for catalog entries.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    inner: CollectionRepository<Product>,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository {
            inner: CollectionRepository::new(pool, PRODUCTS),
        }
    }

    pub async fn all(&self) -> DbResult<Vec<Product>> {
        self.inner.all().await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        self.inner.get_by_id(id).await
    }

    pub async fn list_by_status(&self, status: ProductStatus) -> DbResult<Vec<Product>> {
        self.inner.filter(|p| p.status == status).await
    }

    pub async fn count(&self) -> DbResult<usize> {
        self.inner.count().await
    }
}
