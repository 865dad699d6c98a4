use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use quote_catalog::PricingSettings;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    error::AppError,
    middleware::{session_id_from, SESSION_COOKIE},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub passphrase: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/session", post(login).delete(logout))
}

async fn health() -> &'static str {
    "ok"
}

/// POST /v1/session
/// Trade the shared passphrase for a session cookie
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<PricingSettings>), AppError> {
    if req.passphrase != state.auth.passphrase {
        warn!("Rejected passphrase attempt");
        return Err(AppError::AuthenticationError("Incorrect passphrase".to_string()));
    }

    let settings = state.default_settings();
    let id = {
        let mut sessions = state.sessions.write().await;
        let pruned = sessions.cleanup_expired();
        if pruned > 0 {
            info!("Pruned {} expired sessions", pruned);
        }
        sessions.create(settings.clone())
    };
    info!("Session {} opened", id);

    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), Json(settings)))
}

/// DELETE /v1/session
/// Works without a live session so a stale cookie can always be cleared
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(id) = session_id_from(&jar) {
        if state.sessions.write().await.remove(&id) {
            info!("Session {} closed", id);
        }
    }
    (jar.remove(Cookie::build(SESSION_COOKIE).path("/")), StatusCode::NO_CONTENT)
}
