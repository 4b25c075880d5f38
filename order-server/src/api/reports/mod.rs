//! Reports API 模块 (数据统计)，仅管理员
//!
//! 区间查询参数：`?begin=YYYY-MM-DD&end=YYYY-MM-DD`（闭区间）

mod handler;

use axum::{
    Router,
    middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reports", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/turnover", get(handler::turnover))
        .route("/users", get(handler::users))
        .route("/orders", get(handler::orders))
        .route("/top10", get(handler::top10))
        .route("/business-today", get(handler::business_today))
        .route("/export", get(handler::export))
        .route("/sweeps/{kind}", post(handler::run_sweep))
        .layer(middleware::from_fn(require_admin))
}
