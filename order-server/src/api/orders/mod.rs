//! Orders API 模块 (订单)
//!
//! | 路径 | 方法 | 说明 | 权限 |
//! |------|------|------|------|
//! | /api/orders/submit | POST | 购物车下单 | 用户 |
//! | /api/orders | GET | 历史订单 | 用户 |
//! | /api/orders/{id} | GET | 订单详情 | 用户 |
//! | /api/orders/{id}/cancel | POST | 取消订单 | 用户 / 管理员 |
//! | /api/orders/{id}/pay | POST | 标记已支付 | 管理员 |
//! | /api/orders/{id}/confirm | POST | 接单 | 管理员 |
//! | /api/orders/{id}/dispatch | POST | 派送 | 管理员 |
//! | /api/orders/{id}/complete | POST | 完成 | 管理员 |

mod handler;

use axum::{
    Router,
    middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/submit", post(handler::submit))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::cancel))
        .merge(admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}/pay", post(handler::mark_paid))
        .route("/{id}/confirm", post(handler::confirm))
        .route("/{id}/dispatch", post(handler::dispatch))
        .route("/{id}/complete", post(handler::complete))
        .route_layer(middleware::from_fn(require_admin))
}
