//! Catalog lookup for dishes and combos

use async_trait::async_trait;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{CatalogItem, ItemRef};
use sqlx::SqlitePool;

use crate::db::repository::catalog;

/// Resolves an item reference to its current name, image and price
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Unknown or inactive items fail with `ItemNotFound`
    async fn resolve_item(&self, item: ItemRef) -> AppResult<CatalogItem>;
}

#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn resolve_item(&self, item: ItemRef) -> AppResult<CatalogItem> {
        let found = match item {
            ItemRef::Dish(id) => catalog::find_dish(&self.pool, id).await?,
            ItemRef::Combo(id) => catalog::find_combo(&self.pool, id).await?,
        };
        found.ok_or_else(|| {
            AppError::with_message(ErrorCode::ItemNotFound, format!("{item} is not on the menu"))
                .with_detail("item", item.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fixtures, DbService};

    #[tokio::test]
    async fn test_resolve_dish_and_combo() {
        let db = DbService::memory().await.unwrap();
        fixtures::seed_dish(&db.pool, 1, "Kung Pao Chicken", 28.0).await;
        fixtures::seed_combo(&db.pool, 2, "Lunch Set", 35.5).await;
        let catalog = SqliteCatalog::new(db.pool.clone());

        let dish = catalog.resolve_item(ItemRef::Dish(1)).await.unwrap();
        assert_eq!(dish.name, "Kung Pao Chicken");
        assert_eq!(dish.price, 28.0);
        assert!(dish.image.is_some());

        let combo = catalog.resolve_item(ItemRef::Combo(2)).await.unwrap();
        assert_eq!(combo.name, "Lunch Set");
        assert_eq!(combo.image, None);
    }

    #[tokio::test]
    async fn test_unknown_item() {
        let db = DbService::memory().await.unwrap();
        fixtures::seed_dish(&db.pool, 1, "Kung Pao Chicken", 28.0).await;
        let catalog = SqliteCatalog::new(db.pool.clone());

        // Same id, wrong kind
        let err = catalog.resolve_item(ItemRef::Combo(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ItemNotFound);
    }
}
