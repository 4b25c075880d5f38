//! Shopping Cart Repository

use super::RepoResult;
use shared::models::CartLine;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

const CART_COLUMNS: &str = "id, user_id, dish_id, combo_id, flavor, item_key, name, image, price, quantity, created_at, updated_at";

pub async fn find_line<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    item_key: &str,
) -> RepoResult<Option<CartLine>> {
    let sql =
        format!("SELECT {CART_COLUMNS} FROM shopping_cart WHERE user_id = ? AND item_key = ?");
    let row = sqlx::query_as::<_, CartLine>(&sql)
        .bind(user_id)
        .bind(item_key)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn list_by_user<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
) -> RepoResult<Vec<CartLine>> {
    let sql = format!(
        "SELECT {CART_COLUMNS} FROM shopping_cart WHERE user_id = ? ORDER BY created_at, id"
    );
    let rows = sqlx::query_as::<_, CartLine>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn insert_line<'e>(db: impl SqliteExecutor<'e>, line: &CartLine) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO shopping_cart (id, user_id, dish_id, combo_id, flavor, item_key, name, image, price, quantity, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(line.id)
    .bind(line.user_id)
    .bind(line.dish_id)
    .bind(line.combo_id)
    .bind(&line.flavor)
    .bind(&line.item_key)
    .bind(&line.name)
    .bind(&line.image)
    .bind(line.price)
    .bind(line.quantity)
    .bind(line.created_at)
    .bind(line.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Write a new quantity; returns false when the line is gone
pub async fn update_quantity<'e>(
    db: impl SqliteExecutor<'e>,
    id: i64,
    quantity: i64,
    updated_at: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE shopping_cart SET quantity = ?, updated_at = ? WHERE id = ?")
        .bind(quantity)
        .bind(updated_at)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

pub async fn delete_line<'e>(db: impl SqliteExecutor<'e>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM shopping_cart WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

pub async fn delete_by_user<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM shopping_cart WHERE user_id = ?")
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(rows)
}

/// Delete exactly the given lines of one user; returns how many were removed
pub async fn delete_lines<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    ids: &[i64],
) -> RepoResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM shopping_cart WHERE user_id = ");
    qb.push_bind(user_id).push(" AND id IN (");
    let mut sep = qb.separated(", ");
    for id in ids {
        sep.push_bind(*id);
    }
    sep.push_unseparated(")");
    let rows = qb.build().execute(db).await?.rows_affected();
    Ok(rows)
}
