use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use quote_order::CartEntry;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::AppError, middleware::SessionId, state::AppState};

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub item_no: String,
}

#[derive(Debug, Serialize)]
pub struct ClearCartResponse {
    pub removed: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/cart", get(list_cart).post(add_to_cart).delete(clear_cart))
}

async fn list_cart(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<Json<Vec<CartEntry>>, AppError> {
    let entries = state
        .with_session(id, |session| session.cart.entries().to_vec())
        .await?;
    Ok(Json(entries))
}

/// POST /v1/cart
/// Price the first record with the given item number and append it
async fn add_to_cart(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
    Json(req): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartEntry>), AppError> {
    let item_no = req.item_no.trim();
    let records = state.price_list.records().await.map_err(AppError::price_list)?;
    let record = records
        .iter()
        .find(|record| record.item_no == item_no)
        .ok_or_else(|| AppError::NotFoundError(format!("Unknown item: {}", item_no)))?;

    let tiers = state.tiers.clone();
    let (entry, cart_size) = state
        .with_session(id, |session| {
            let entry = session.cart.add(record, &tiers, &session.settings).clone();
            (entry, session.cart.len())
        })
        .await?;

    info!("Session {} added {} ({} in cart)", id, entry.record.item_no, cart_size);
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn clear_cart(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<Json<ClearCartResponse>, AppError> {
    let removed = state.with_session(id, |session| session.cart.clear()).await?;
    Ok(Json(ClearCartResponse { removed }))
}
