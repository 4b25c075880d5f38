//! Cart API Handlers

use axum::{Json, extract::State};
use serde::Serialize;
use shared::models::{CartItemInput, CartLine};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Serialize)]
pub struct Cleared {
    pub removed: u64,
}

pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<CartLine>>> {
    let lines = state.carts.list_items(user.id).await?;
    Ok(Json(lines))
}

pub async fn add(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(input): Json<CartItemInput>,
) -> AppResult<Json<CartLine>> {
    let line = state.carts.add_item(user.id, &input).await?;
    Ok(Json(line))
}

/// `null` once the line is gone
pub async fn sub(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(input): Json<CartItemInput>,
) -> AppResult<Json<Option<CartLine>>> {
    let line = state.carts.decrement_item(user.id, &input).await?;
    Ok(Json(line))
}

pub async fn clear(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Cleared>> {
    let removed = state.carts.clear(user.id).await?;
    Ok(Json(Cleared { removed }))
}
