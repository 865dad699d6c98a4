use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Cookie carrying the session id handed out after a correct passphrase
pub const SESSION_COOKIE: &str = "quote_session";

/// Id of the session that passed the gate, available to handlers as an extension
#[derive(Debug, Clone, Copy)]
pub struct SessionId(pub Uuid);

pub fn session_id_from(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Passphrase gate: only requests with a live session cookie get through.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let id = session_id_from(&jar)
        .ok_or_else(|| AppError::AuthenticationError("Passphrase required".to_string()))?;

    if state.sessions.read().await.get(&id).is_none() {
        return Err(AppError::AuthenticationError("Session expired".to_string()));
    }

    req.extensions_mut().insert(SessionId(id));
    Ok(next.run(req).await)
}
