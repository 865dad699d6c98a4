use axum::{
    extract::{Extension, Query, State},
    routing::{get, post},
    Json, Router,
};
use quote_catalog::{price_tiers, Facets, ProductFilter, ProductRecord, TierPrice};
use quote_store::CacheStatus;
use serde::Serialize;
use tracing::info;

use crate::{error::AppError, middleware::SessionId, state::AppState};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub record: ProductRecord,
    pub prices: Vec<TierPrice>,
    pub front_image: Option<String>,
    pub back_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductListing {
    pub total: usize,
    pub exchange_rate: f64,
    pub products: Vec<ProductView>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", get(list_products))
        .route("/v1/products/facets", get(facets))
        .route("/v1/price-list", get(price_list_status))
        .route("/v1/price-list/refresh", post(refresh_price_list))
}

/// GET /v1/products
/// Filtered listing priced with the caller's current settings
async fn list_products(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<ProductListing>, AppError> {
    let records = state.price_list.records().await.map_err(AppError::price_list)?;
    let settings = state.with_session(id, |session| session.settings.clone()).await?;

    let products: Vec<ProductView> = filter
        .apply(&records)
        .into_iter()
        .map(|record| {
            let images = state.images.images_for(record);
            ProductView {
                prices: price_tiers(record, &state.tiers, &settings),
                front_image: images.front.as_deref().and_then(|p| state.images.url_for(p)),
                back_image: images.back.as_deref().and_then(|p| state.images.url_for(p)),
                record: record.clone(),
            }
        })
        .collect();

    Ok(Json(ProductListing {
        total: records.len(),
        exchange_rate: settings.exchange_rate,
        products,
    }))
}

/// GET /v1/products/facets
async fn facets(State(state): State<AppState>) -> Result<Json<Facets>, AppError> {
    let records = state.price_list.records().await.map_err(AppError::price_list)?;
    Ok(Json(Facets::collect(&records)))
}

async fn price_list_status(State(state): State<AppState>) -> Json<CacheStatus> {
    Json(state.price_list.status().await)
}

/// POST /v1/price-list/refresh
/// Drop the cached copy and load the source again right away
async fn refresh_price_list(State(state): State<AppState>) -> Result<Json<CacheStatus>, AppError> {
    state.price_list.invalidate().await;
    let records = state.price_list.records().await.map_err(AppError::price_list)?;
    info!("Manual price list refresh: {} rows", records.len());
    Ok(Json(state.price_list.status().await))
}
