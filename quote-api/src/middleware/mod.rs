pub mod auth;

pub use auth::{require_session, session_id_from, SessionId, SESSION_COOKIE};
