//! Cart API 模块 (购物车)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/cart | GET | 当前用户购物车 |
//! | /api/cart/add | POST | 加一份 |
//! | /api/cart/sub | POST | 减一份，减到 0 删除该行 |
//! | /api/cart | DELETE | 清空 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).delete(handler::clear))
        .route("/add", post(handler::add))
        .route("/sub", post(handler::sub))
}
