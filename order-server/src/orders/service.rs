//! Order submission and status transitions
//!
//! 下单在单个事务内完成：读购物车 → 写订单 → 写明细 → 删除已读取的购物车行。
//! 任一步失败整体回滚，购物车保持原样。

use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    CartLine, Order, OrderDetail, OrderPageQuery, OrderStatus, OrderSubmitted, OrderWithDetails,
    PayStatus, SubmitOrder,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use super::money;
use super::number::OrderNumberSource;
use crate::core::UserLocks;
use crate::db::repository::order::{self as order_repo, TransitionPatch};
use crate::db::repository::{cart, RepoError};
use crate::services::AddressBook;
use crate::utils::{stamp, Operation};

const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
    addresses: Arc<dyn AddressBook>,
    numbers: Arc<dyn OrderNumberSource>,
    locks: Arc<UserLocks>,
}

impl OrderService {
    pub fn new(
        pool: SqlitePool,
        addresses: Arc<dyn AddressBook>,
        numbers: Arc<dyn OrderNumberSource>,
        locks: Arc<UserLocks>,
    ) -> Self {
        Self {
            pool,
            addresses,
            numbers,
            locks,
        }
    }

    /// Turn the user's cart into a PENDING_PAYMENT order.
    ///
    /// Fails with `AddressMissing` or `CartEmpty` before anything is written.
    /// `OrderNumberConflict` is retryable: nothing was committed.
    pub async fn submit(&self, user_id: i64, req: &SubmitOrder) -> AppResult<OrderSubmitted> {
        let _guard = self.locks.lock(user_id).await;

        let address = self
            .addresses
            .resolve_address(user_id, req.address_book_id)
            .await?
            .ok_or_else(|| AppError::address_missing(req.address_book_id))?;

        let now = now_millis();
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        let lines = cart::list_by_user(&mut *tx, user_id).await?;
        if lines.is_empty() {
            return Err(AppError::cart_empty());
        }

        let amount = money::cart_total(&lines);
        money::verify_expected(amount, req.expected_amount)?;

        let mut order = Order {
            id: snowflake_id(),
            number: self.numbers.next_number(now),
            status: OrderStatus::PendingPayment,
            user_id,
            address_book_id: address.id,
            order_time: now,
            checkout_time: None,
            pay_method: req.pay_method,
            pay_status: PayStatus::Unpaid,
            amount,
            remark: req.remark.clone(),
            phone: address.phone,
            consignee: address.consignee,
            address: address.full_address,
            estimated_delivery_time: req.estimated_delivery_time,
            delivery_status: req.delivery_status,
            pack_amount: req.pack_amount,
            tableware_number: req.tableware_number,
            tableware_status: req.tableware_status,
            cancel_reason: None,
            cancel_time: None,
            dispatched_at: None,
            delivery_time: None,
            created_at: 0,
            updated_at: 0,
            updated_by: None,
        };
        stamp(&mut order, Operation::Insert, Some(user_id), now);

        order_repo::insert_order(&mut *tx, &order)
            .await
            .map_err(|e| id_conflict(e, user_id, &order.number))?;

        let details: Vec<OrderDetail> =
            lines.iter().map(|l| detail_from_line(order.id, l)).collect();
        order_repo::insert_details(&mut *tx, &details)
            .await
            .map_err(|e| id_conflict(e, user_id, &order.number))?;

        // Only the lines read above; anything else means the cart moved underneath us
        let ids: Vec<i64> = lines.iter().map(|l| l.id).collect();
        let removed = cart::delete_lines(&mut *tx, user_id, &ids).await?;
        if removed != ids.len() as u64 {
            tracing::warn!(
                user_id,
                expected = ids.len(),
                removed,
                "Cart changed during submission"
            );
            return Err(AppError::order_conflict("cart changed during submission"));
        }

        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            user_id,
            order_id = order.id,
            number = %order.number,
            amount = order.amount,
            lines = details.len(),
            "Order submitted"
        );

        Ok(OrderSubmitted {
            id: order.id,
            number: order.number,
            amount: order.amount,
            order_time: order.order_time,
        })
    }

    /// A user's own order with its lines
    pub async fn get_order(&self, user_id: i64, order_id: i64) -> AppResult<OrderWithDetails> {
        let order = order_repo::find_for_user(&self.pool, user_id, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;
        let details = order_repo::find_details(&self.pool, order_id).await?;
        Ok(OrderWithDetails { order, details })
    }

    /// Newest first, optionally filtered by status
    pub async fn list_orders(&self, user_id: i64, query: &OrderPageQuery) -> AppResult<Vec<Order>> {
        let page = query.page.max(1);
        let size = query.page_size.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1)
            .checked_mul(size)
            .ok_or_else(|| AppError::invalid_request(format!("page {page} is out of range")))?;
        let orders =
            order_repo::list_by_user(&self.pool, user_id, query.status, size, offset).await?;
        Ok(orders)
    }

    /// PENDING_PAYMENT → TO_BE_CONFIRMED
    pub async fn mark_paid(&self, order_id: i64, actor: Option<i64>) -> AppResult<Order> {
        let now = now_millis();
        let patch = TransitionPatch {
            pay_status: Some(PayStatus::Paid),
            checkout_time: Some(now),
            ..Default::default()
        };
        self.advance(order_id, OrderStatus::ToBeConfirmed, patch, actor, now)
            .await
    }

    pub async fn confirm(&self, order_id: i64, actor: Option<i64>) -> AppResult<Order> {
        self.advance(
            order_id,
            OrderStatus::Confirmed,
            TransitionPatch::default(),
            actor,
            now_millis(),
        )
        .await
    }

    pub async fn dispatch(&self, order_id: i64, actor: Option<i64>) -> AppResult<Order> {
        let now = now_millis();
        let patch = TransitionPatch {
            dispatched_at: Some(now),
            ..Default::default()
        };
        self.advance(order_id, OrderStatus::DeliveryInProgress, patch, actor, now)
            .await
    }

    pub async fn complete(&self, order_id: i64, actor: Option<i64>) -> AppResult<Order> {
        let now = now_millis();
        let patch = TransitionPatch {
            delivery_time: Some(now),
            ..Default::default()
        };
        self.advance(order_id, OrderStatus::Completed, patch, actor, now)
            .await
    }

    /// Cancel any non-terminal order. Paid orders are flagged for refund.
    pub async fn cancel(
        &self,
        order_id: i64,
        reason: &str,
        actor: Option<i64>,
    ) -> AppResult<Order> {
        let order = self.load(order_id).await?;
        self.cancel_loaded(order, reason, actor).await
    }

    /// Users may only cancel their own orders before the merchant confirms
    pub async fn cancel_by_user(
        &self,
        user_id: i64,
        order_id: i64,
        reason: &str,
    ) -> AppResult<Order> {
        let order = order_repo::find_for_user(&self.pool, user_id, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;
        if !matches!(
            order.status,
            OrderStatus::PendingPayment | OrderStatus::ToBeConfirmed
        ) {
            return Err(AppError::illegal_transition(
                order.status.as_str(),
                OrderStatus::Cancelled.as_str(),
            )
            .with_detail("hint", "contact the merchant to cancel a confirmed order"));
        }
        self.cancel_loaded(order, reason, Some(user_id)).await
    }

    async fn cancel_loaded(
        &self,
        order: Order,
        reason: &str,
        actor: Option<i64>,
    ) -> AppResult<Order> {
        let now = now_millis();
        let reason = reason.trim();
        let patch = TransitionPatch {
            pay_status: (order.pay_status == PayStatus::Paid).then_some(PayStatus::Refund),
            cancel_reason: Some(if reason.is_empty() {
                "Cancelled".to_string()
            } else {
                reason.to_string()
            }),
            cancel_time: Some(now),
            ..Default::default()
        };
        self.apply(order, OrderStatus::Cancelled, patch, actor, now).await
    }

    async fn advance(
        &self,
        order_id: i64,
        to: OrderStatus,
        patch: TransitionPatch,
        actor: Option<i64>,
        now: i64,
    ) -> AppResult<Order> {
        let order = self.load(order_id).await?;
        self.apply(order, to, patch, actor, now).await
    }

    /// Guarded compare-and-set from the order's current status to `to`
    async fn apply(
        &self,
        order: Order,
        to: OrderStatus,
        mut patch: TransitionPatch,
        actor: Option<i64>,
        now: i64,
    ) -> AppResult<Order> {
        let from = order.status;
        if !from.can_transition_to(to) {
            return Err(AppError::illegal_transition(from.as_str(), to.as_str()));
        }

        stamp(&mut patch, Operation::Update, actor, now);
        if !order_repo::transition(&self.pool, order.id, from, to, &patch).await? {
            // Someone else moved it first
            let current = self.load(order.id).await?;
            return Err(
                AppError::illegal_transition(current.status.as_str(), to.as_str())
                    .with_detail("expected_status", from.as_str()),
            );
        }

        tracing::info!(order_id = order.id, %from, %to, actor, "Order status changed");
        self.load(order.id).await
    }

    async fn load(&self, order_id: i64) -> AppResult<Order> {
        order_repo::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))
    }
}

fn order_not_found(order_id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("order {order_id} not found"))
}

/// Unique violations while writing a fresh order are retryable; the transaction rolls back
fn id_conflict(err: RepoError, user_id: i64, number: &str) -> AppError {
    match err {
        RepoError::Duplicate(constraint) => {
            tracing::warn!(user_id, number, %constraint, "Order write hit a unique constraint");
            AppError::order_conflict(format!("order could not be written: {constraint}"))
        }
        other => other.into(),
    }
}

fn detail_from_line(order_id: i64, line: &CartLine) -> OrderDetail {
    OrderDetail {
        id: snowflake_id(),
        order_id,
        dish_id: line.dish_id,
        combo_id: line.combo_id,
        flavor: line.flavor.clone(),
        name: line.name.clone(),
        image: line.image.clone(),
        price: line.price,
        quantity: line.quantity,
    }
}
