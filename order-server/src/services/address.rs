//! Address book lookup

use async_trait::async_trait;
use shared::error::AppResult;
use shared::models::Address;
use sqlx::SqlitePool;

use crate::db::repository::catalog;

#[async_trait]
pub trait AddressBook: Send + Sync {
    /// `None` when the address does not exist or belongs to another user
    async fn resolve_address(&self, user_id: i64, address_id: i64) -> AppResult<Option<Address>>;
}

#[derive(Debug, Clone)]
pub struct SqliteAddressBook {
    pool: SqlitePool,
}

impl SqliteAddressBook {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressBook for SqliteAddressBook {
    async fn resolve_address(&self, user_id: i64, address_id: i64) -> AppResult<Option<Address>> {
        Ok(catalog::find_address(&self.pool, user_id, address_id).await?)
    }
}
