use axum::{
    extract::{Extension, State},
    routing::get,
    Json, Router,
};
use quote_catalog::{PricingError, PricingSettings, PricingTier};
use serde::Deserialize;

use crate::{error::AppError, middleware::SessionId, state::AppState};

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub exchange_rate: Option<f64>,
    /// One margin per tier, in tier order
    pub margins: Option<Vec<f64>>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/settings", get(get_settings).put(update_settings))
        .route("/v1/tiers", get(list_tiers))
}

async fn get_settings(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<Json<PricingSettings>, AppError> {
    let settings = state.with_session(id, |session| session.settings.clone()).await?;
    Ok(Json(settings))
}

/// PUT /v1/settings
/// Either field may be omitted; nothing changes unless the whole request is valid
async fn update_settings(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<PricingSettings>, AppError> {
    let tiers = state.tiers.clone();
    let updated = state
        .with_session(id, |session| {
            let mut settings = session.settings.clone();
            if let Some(rate) = req.exchange_rate {
                settings.set_exchange_rate(rate)?;
            }
            if let Some(margins) = &req.margins {
                settings.set_margins(&tiers, margins)?;
            }
            session.settings = settings.clone();
            Ok::<_, PricingError>(settings)
        })
        .await?
        .map_err(AppError::invalid_settings)?;

    tracing::debug!(
        "Session {} settings: rate {} margins {:?}",
        id,
        updated.exchange_rate,
        updated.margins
    );
    Ok(Json(updated))
}

async fn list_tiers(State(state): State<AppState>) -> Json<Vec<PricingTier>> {
    Json(state.tiers.as_ref().clone())
}
