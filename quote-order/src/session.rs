use crate::models::QuoteCart;
use chrono::{DateTime, Utc};
use quote_catalog::PricingSettings;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Everything one signed-in user has chosen so far
#[derive(Debug, Clone)]
pub struct QuoteSession {
    pub id: Uuid,
    pub cart: QuoteCart,
    pub settings: PricingSettings,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl QuoteSession {
    pub fn new(settings: PricingSettings, ttl: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            cart: QuoteCart::new(),
            settings,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Owns all live sessions; expired ones are invisible and pruned on demand
pub struct SessionStore {
    sessions: HashMap<Uuid, QuoteSession>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl: chrono::Duration::seconds(ttl.as_secs() as i64),
        }
    }

    /// Open a session with the given starting settings
    pub fn create(&mut self, settings: PricingSettings) -> Uuid {
        let session = QuoteSession::new(settings, self.ttl);
        let id = session.id;
        self.sessions.insert(id, session);
        id
    }

    /// Get a session if it's still active
    pub fn get(&self, id: &Uuid) -> Option<&QuoteSession> {
        self.sessions.get(id).filter(|s| !s.is_expired())
    }

    /// Mutable access to an active session; each access extends its lifetime
    pub fn get_mut(&mut self, id: &Uuid) -> Result<&mut QuoteSession, SessionError> {
        let ttl = self.ttl;
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        if session.is_expired() {
            return Err(SessionError::Expired(id.to_string()));
        }
        session.expires_at = Utc::now() + ttl;
        Ok(session)
    }

    pub fn remove(&mut self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Clean up expired sessions
    pub fn cleanup_expired(&mut self) -> usize {
        let initial_count = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired());
        initial_count - self.sessions.len()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.values().filter(|s| !s.is_expired()).count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session expired: {0}")]
    Expired(String),
}
