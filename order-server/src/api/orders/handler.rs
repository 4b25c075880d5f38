//! Orders API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{
    CancelOrder, Order, OrderPageQuery, OrderSubmitted, OrderWithDetails, SubmitOrder,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

pub async fn submit(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<SubmitOrder>,
) -> AppResult<Json<OrderSubmitted>> {
    let submitted = state.orders.submit(user.id, &req).await?;
    Ok(Json(submitted))
}

pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<OrderPageQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.list_orders(user.id, &query).await?;
    Ok(Json(orders))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderWithDetails>> {
    let order = state.orders.get_order(user.id, id).await?;
    Ok(Json(order))
}

/// 管理员可取消任意未结束订单；普通用户仅限自己的、未接单的订单
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<CancelOrder>,
) -> AppResult<Json<Order>> {
    let reason = req.reason.unwrap_or_default();
    let order = if user.is_admin() {
        state.orders.cancel(id, &reason, Some(user.id)).await?
    } else {
        state.orders.cancel_by_user(user.id, id, &reason).await?
    };
    Ok(Json(order))
}

pub async fn mark_paid(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.mark_paid(id, Some(user.id)).await?))
}

pub async fn confirm(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.confirm(id, Some(user.id)).await?))
}

pub async fn dispatch(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.dispatch(id, Some(user.id)).await?))
}

pub async fn complete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.complete(id, Some(user.id)).await?))
}
