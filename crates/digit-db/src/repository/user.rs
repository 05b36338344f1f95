//! # User Repository
//!
//! Read access to `dm_users`.

use sqlx::SqlitePool;

use digit_core::{Role, User};

use super::collection::{CollectionRepository, USERS};
use crate::error::DbResult;

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    inner: CollectionRepository<User>,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository {
            inner: CollectionRepository::new(pool, USERS),
        }
    }

    pub async fn all(&self) -> DbResult<Vec<User>> {
        self.inner.all().await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        self.inner.get_by_id(id).await
    }

    /// Exact match: emails are compared as stored.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        Ok(self.inner.all().await?.into_iter().find(|u| u.email == email))
    }

    pub async fn list_by_role(&self, role: Role) -> DbResult<Vec<User>> {
        self.inner.filter(|u| u.role == role).await
    }

    pub async fn count(&self) -> DbResult<usize> {
        self.inner.count().await
    }
}
