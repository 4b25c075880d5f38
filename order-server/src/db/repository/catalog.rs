//! Catalog and address-book lookups
//!
//! These tables belong to neighbouring services; the ordering core only reads them.

use super::RepoResult;
use shared::models::{Address, CatalogItem};
use sqlx::SqliteExecutor;

pub async fn find_dish<'e>(
    db: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<CatalogItem>> {
    let row = sqlx::query_as::<_, CatalogItem>(
        "SELECT name, image, price FROM dish WHERE id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn find_combo<'e>(
    db: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<CatalogItem>> {
    let row = sqlx::query_as::<_, CatalogItem>(
        "SELECT name, image, price FROM combo WHERE id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Address owned by `user_id`; another user's address id resolves to `None`
pub async fn find_address<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    id: i64,
) -> RepoResult<Option<Address>> {
    let row = sqlx::query_as::<_, Address>(
        "SELECT id, user_id, consignee, phone, COALESCE(province_name, '') || COALESCE(city_name, '') || COALESCE(district_name, '') || detail AS full_address FROM address_book WHERE id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
