//! Read-side aggregates for reports
//!
//! Every window is half-open: `start <= t < end`, Unix millis.

use super::RepoResult;
use shared::models::OrderStatus;
use sqlx::SqliteExecutor;

/// Sum of `amount` for orders in `status`; 0.0 when nothing matches
pub async fn sum_amount<'e>(
    db: impl SqliteExecutor<'e>,
    status: OrderStatus,
    start: i64,
    end: i64,
) -> RepoResult<f64> {
    let total: Option<f64> = sqlx::query_scalar(
        "SELECT SUM(amount) FROM orders WHERE status = ? AND order_time >= ? AND order_time < ?",
    )
    .bind(status)
    .bind(start)
    .bind(end)
    .fetch_one(db)
    .await?;
    Ok(total.unwrap_or(0.0))
}

/// Order count in the window, optionally restricted to one status
pub async fn count_orders<'e>(
    db: impl SqliteExecutor<'e>,
    start: i64,
    end: i64,
    status: Option<OrderStatus>,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE order_time >= ?1 AND order_time < ?2 AND (?3 IS NULL OR status = ?3)",
    )
    .bind(start)
    .bind(end)
    .bind(status)
    .fetch_one(db)
    .await?;
    Ok(count)
}

/// Users created before `end`, and at or after `start` when given
pub async fn count_users<'e>(
    db: impl SqliteExecutor<'e>,
    start: Option<i64>,
    end: i64,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE (?1 IS NULL OR created_at >= ?1) AND created_at < ?2",
    )
    .bind(start)
    .bind(end)
    .fetch_one(db)
    .await?;
    Ok(count)
}

/// Quantity sold per item name, highest first, ties by name
pub async fn top_sales<'e>(
    db: impl SqliteExecutor<'e>,
    start: i64,
    end: i64,
    limit: i64,
) -> RepoResult<Vec<(String, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT d.name, SUM(d.quantity) AS number FROM order_detail d JOIN orders o ON o.id = d.order_id WHERE o.order_time >= ? AND o.order_time < ? GROUP BY d.name ORDER BY number DESC, d.name ASC LIMIT ?",
    )
    .bind(start)
    .bind(end)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
