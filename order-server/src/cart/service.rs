//! Cart Service
//!
//! Per-user cart lines keyed by (item, flavor). Writes for one user run
//! under that user's lock so merges never lose an increment.

use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{CartItemInput, CartLine};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use crate::core::UserLocks;
use crate::db::repository::{cart, RepoError};
use crate::orders::money::MAX_QUANTITY;
use crate::services::Catalog;
use crate::utils::{stamp, Operation};

#[derive(Clone)]
pub struct CartService {
    pool: SqlitePool,
    catalog: Arc<dyn Catalog>,
    locks: Arc<UserLocks>,
}

impl CartService {
    pub fn new(pool: SqlitePool, catalog: Arc<dyn Catalog>, locks: Arc<UserLocks>) -> Self {
        Self { pool, catalog, locks }
    }

    /// Add one unit. An existing line for the same item and flavor is
    /// incremented; otherwise a new line is created from the catalog snapshot.
    pub async fn add_item(&self, user_id: i64, input: &CartItemInput) -> AppResult<CartLine> {
        let (item, flavor) = input.resolve()?;
        let key = item.line_key(flavor.as_deref());
        let _guard = self.locks.lock(user_id).await;

        if let Some(line) = cart::find_line(&self.pool, user_id, &key).await? {
            return self.increment(line).await;
        }

        let snapshot = self.catalog.resolve_item(item).await?;
        let mut line = CartLine {
            id: snowflake_id(),
            user_id,
            dish_id: item.dish_id(),
            combo_id: item.combo_id(),
            flavor,
            item_key: key.clone(),
            name: snapshot.name,
            image: snapshot.image,
            price: snapshot.price,
            quantity: 1,
            created_at: 0,
            updated_at: 0,
        };
        stamp(&mut line, Operation::Insert, Some(user_id), now_millis());

        match cart::insert_line(&self.pool, &line).await {
            Ok(()) => {
                tracing::debug!(user_id, item = %key, "Cart line created");
                Ok(line)
            }
            // Written by another process between lookup and insert
            Err(RepoError::Duplicate(_)) => {
                let existing = cart::find_line(&self.pool, user_id, &key)
                    .await?
                    .ok_or_else(|| AppError::conflict(format!("cart line {key} vanished")))?;
                self.increment(existing).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove one unit; the line disappears when it reaches zero.
    ///
    /// Returns the remaining line, or `None` once deleted.
    pub async fn decrement_item(
        &self,
        user_id: i64,
        input: &CartItemInput,
    ) -> AppResult<Option<CartLine>> {
        let (item, flavor) = input.resolve()?;
        let key = item.line_key(flavor.as_deref());
        let _guard = self.locks.lock(user_id).await;

        let mut line = cart::find_line(&self.pool, user_id, &key)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::CartItemNotFound,
                    format!("{key} is not in the cart"),
                )
            })?;

        if line.quantity <= 1 {
            cart::delete_line(&self.pool, line.id).await?;
            tracing::debug!(user_id, item = %key, "Cart line removed");
            return Ok(None);
        }

        line.quantity -= 1;
        stamp(&mut line, Operation::Update, Some(user_id), now_millis());
        cart::update_quantity(&self.pool, line.id, line.quantity, line.updated_at).await?;
        Ok(Some(line))
    }

    pub async fn list_items(&self, user_id: i64) -> AppResult<Vec<CartLine>> {
        Ok(cart::list_by_user(&self.pool, user_id).await?)
    }

    /// Empty the cart; clearing an empty cart is not an error
    pub async fn clear(&self, user_id: i64) -> AppResult<u64> {
        let _guard = self.locks.lock(user_id).await;
        let removed = cart::delete_by_user(&self.pool, user_id).await?;
        tracing::debug!(user_id, removed, "Cart cleared");
        Ok(removed)
    }

    async fn increment(&self, mut line: CartLine) -> AppResult<CartLine> {
        if line.quantity >= MAX_QUANTITY {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("quantity exceeds maximum allowed ({MAX_QUANTITY})"),
            ));
        }
        line.quantity += 1;
        let user_id = line.user_id;
        stamp(&mut line, Operation::Update, Some(user_id), now_millis());
        if !cart::update_quantity(&self.pool, line.id, line.quantity, line.updated_at).await? {
            return Err(AppError::with_message(
                ErrorCode::CartItemNotFound,
                format!("{} is not in the cart", line.item_key),
            ));
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fixtures, DbService};
    use crate::services::SqliteCatalog;

    async fn setup() -> CartService {
        let db = DbService::memory().await.unwrap();
        fixtures::seed_dish(&db.pool, 12, "Mapo Tofu", 18.0).await;
        fixtures::seed_dish(&db.pool, 13, "Rice", 2.0).await;
        fixtures::seed_combo(&db.pool, 7, "Family Set", 88.0).await;
        let catalog = Arc::new(SqliteCatalog::new(db.pool.clone()));
        CartService::new(db.pool, catalog, Arc::new(UserLocks::new()))
    }

    fn dish(id: i64, flavor: Option<&str>) -> CartItemInput {
        CartItemInput {
            dish_id: Some(id),
            combo_id: None,
            flavor: flavor.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_add_same_item_merges() {
        let svc = setup().await;
        svc.add_item(1, &dish(12, Some("spicy"))).await.unwrap();
        svc.add_item(1, &dish(12, Some("spicy"))).await.unwrap();

        let lines = svc.list_items(1).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].name, "Mapo Tofu");
        assert_eq!(lines[0].price, 18.0);
    }

    #[tokio::test]
    async fn test_flavor_splits_lines() {
        let svc = setup().await;
        svc.add_item(1, &dish(12, Some("spicy"))).await.unwrap();
        svc.add_item(1, &dish(12, Some("mild"))).await.unwrap();
        svc.add_item(1, &dish(12, None)).await.unwrap();
        // Blank flavor is the same variant as no flavor
        svc.add_item(1, &dish(12, Some("  "))).await.unwrap();

        let lines = svc.list_items(1).await.unwrap();
        assert_eq!(lines.len(), 3);
        let plain = lines.iter().find(|l| l.flavor.is_none()).unwrap();
        assert_eq!(plain.quantity, 2);
    }

    #[tokio::test]
    async fn test_add_combo() {
        let svc = setup().await;
        let input = CartItemInput {
            dish_id: None,
            combo_id: Some(7),
            flavor: None,
        };
        let line = svc.add_item(1, &input).await.unwrap();
        assert_eq!(line.combo_id, Some(7));
        assert_eq!(line.dish_id, None);
        assert_eq!(line.price, 88.0);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_reference() {
        let svc = setup().await;
        let both = CartItemInput {
            dish_id: Some(12),
            combo_id: Some(7),
            flavor: None,
        };
        let err = svc.add_item(1, &both).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidItemRef);

        let err = svc.add_item(1, &dish(999, None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ItemNotFound);
        assert!(svc.list_items(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decrement_to_zero_removes_line() {
        let svc = setup().await;
        svc.add_item(1, &dish(12, None)).await.unwrap();
        svc.add_item(1, &dish(12, None)).await.unwrap();

        let left = svc.decrement_item(1, &dish(12, None)).await.unwrap();
        assert_eq!(left.unwrap().quantity, 1);

        let left = svc.decrement_item(1, &dish(12, None)).await.unwrap();
        assert!(left.is_none());
        assert!(svc.list_items(1).await.unwrap().is_empty());

        let err = svc.decrement_item(1, &dish(12, None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartItemNotFound);
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let svc = setup().await;
        svc.add_item(1, &dish(12, None)).await.unwrap();
        svc.add_item(2, &dish(13, None)).await.unwrap();

        assert_eq!(svc.clear(1).await.unwrap(), 1);
        assert!(svc.list_items(1).await.unwrap().is_empty());
        assert_eq!(svc.list_items(2).await.unwrap().len(), 1);
        assert_eq!(svc.clear(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_adds_do_not_lose_updates() {
        let svc = setup().await;
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.add_item(1, &dish(12, None)).await })
            })
            .collect();
        for t in tasks {
            t.await.unwrap().unwrap();
        }
        let lines = svc.list_items(1).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 8);
    }
}
