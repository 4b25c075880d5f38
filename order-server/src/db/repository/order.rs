//! Order Repository

use super::RepoResult;
use serde::{Deserialize, Serialize};
use shared::models::{Order, OrderDetail, OrderStatus, PayStatus};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

const ORDER_COLUMNS: &str = "id, number, status, user_id, address_book_id, order_time, checkout_time, pay_method, pay_status, amount, remark, phone, consignee, address, estimated_delivery_time, delivery_status, pack_amount, tableware_number, tableware_status, cancel_reason, cancel_time, dispatched_at, delivery_time, created_at, updated_at, updated_by";

const DETAIL_COLUMNS: &str = "id, order_id, dish_id, combo_id, flavor, name, image, price, quantity";

/// Which timestamp an order's age is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderClock {
    #[default]
    OrderTime,
    /// Dispatch time, falling back to order time when none was recorded
    DispatchTime,
}

impl OrderClock {
    fn column(&self) -> &'static str {
        match self {
            Self::OrderTime => "order_time",
            Self::DispatchTime => "COALESCE(dispatched_at, order_time)",
        }
    }
}

/// Fields written alongside a status change. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct TransitionPatch {
    pub pay_status: Option<PayStatus>,
    pub checkout_time: Option<i64>,
    pub cancel_reason: Option<String>,
    pub cancel_time: Option<i64>,
    pub dispatched_at: Option<i64>,
    pub delivery_time: Option<i64>,
    pub updated_at: i64,
    pub updated_by: Option<i64>,
}

pub async fn insert_order<'e>(db: impl SqliteExecutor<'e>, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, number, status, user_id, address_book_id, order_time, checkout_time, pay_method, pay_status, amount, remark, phone, consignee, address, estimated_delivery_time, delivery_status, pack_amount, tableware_number, tableware_status, cancel_reason, cancel_time, dispatched_at, delivery_time, created_at, updated_at, updated_by) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(&order.number)
    .bind(order.status)
    .bind(order.user_id)
    .bind(order.address_book_id)
    .bind(order.order_time)
    .bind(order.checkout_time)
    .bind(order.pay_method)
    .bind(order.pay_status)
    .bind(order.amount)
    .bind(&order.remark)
    .bind(&order.phone)
    .bind(&order.consignee)
    .bind(&order.address)
    .bind(order.estimated_delivery_time)
    .bind(order.delivery_status)
    .bind(order.pack_amount)
    .bind(order.tableware_number)
    .bind(order.tableware_status)
    .bind(&order.cancel_reason)
    .bind(order.cancel_time)
    .bind(order.dispatched_at)
    .bind(order.delivery_time)
    .bind(order.created_at)
    .bind(order.updated_at)
    .bind(order.updated_by)
    .execute(db)
    .await?;
    Ok(())
}

/// Insert all lines of one order in a single statement
pub async fn insert_details<'e>(
    db: impl SqliteExecutor<'e>,
    details: &[OrderDetail],
) -> RepoResult<()> {
    if details.is_empty() {
        return Ok(());
    }
    let mut qb =
        QueryBuilder::<Sqlite>::new(format!("INSERT INTO order_detail ({DETAIL_COLUMNS}) "));
    qb.push_values(details, |mut b, d| {
        b.push_bind(d.id)
            .push_bind(d.order_id)
            .push_bind(d.dish_id)
            .push_bind(d.combo_id)
            .push_bind(d.flavor.clone())
            .push_bind(d.name.clone())
            .push_bind(d.image.clone())
            .push_bind(d.price)
            .push_bind(d.quantity);
    });
    qb.build().execute(db).await?;
    Ok(())
}

pub async fn find_by_id<'e>(db: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql).bind(id).fetch_optional(db).await?;
    Ok(row)
}

/// Owner-scoped lookup
pub async fn find_for_user<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    id: i64,
) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ? AND user_id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn find_details<'e>(
    db: impl SqliteExecutor<'e>,
    order_id: i64,
) -> RepoResult<Vec<OrderDetail>> {
    let sql = format!("SELECT {DETAIL_COLUMNS} FROM order_detail WHERE order_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, OrderDetail>(&sql)
        .bind(order_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Newest first
pub async fn list_by_user<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    status: Option<OrderStatus>,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2) ORDER BY order_time DESC, id DESC LIMIT ?3 OFFSET ?4"
    );
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(user_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Orders in `status` whose age (per `clock`) started before `cutoff`
pub async fn find_stale<'e>(
    db: impl SqliteExecutor<'e>,
    status: OrderStatus,
    cutoff: i64,
    clock: OrderClock,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ? AND {} < ? ORDER BY order_time",
        clock.column()
    );
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(status)
        .bind(cutoff)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Compare-and-set status change.
///
/// Returns false when the order is no longer in `from` (or does not exist),
/// so a concurrent writer that got there first is never overwritten.
pub async fn transition<'e>(
    db: impl SqliteExecutor<'e>,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
    patch: &TransitionPatch,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET status = ?, pay_status = COALESCE(?, pay_status), checkout_time = COALESCE(?, checkout_time), cancel_reason = COALESCE(?, cancel_reason), cancel_time = COALESCE(?, cancel_time), dispatched_at = COALESCE(?, dispatched_at), delivery_time = COALESCE(?, delivery_time), updated_at = ?, updated_by = ? WHERE id = ? AND status = ?",
    )
    .bind(to)
    .bind(patch.pay_status)
    .bind(patch.checkout_time)
    .bind(&patch.cancel_reason)
    .bind(patch.cancel_time)
    .bind(patch.dispatched_at)
    .bind(patch.delivery_time)
    .bind(patch.updated_at)
    .bind(patch.updated_by)
    .bind(id)
    .bind(from)
    .execute(db)
    .await?
    .rows_affected();
    Ok(rows > 0)
}
