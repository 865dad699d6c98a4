use quote_catalog::{ImageResolver, PricingSettings, PricingTier};
use quote_core::PriceListSource;
use quote_order::{QuoteSession, SessionStore};
use quote_store::app_config::{Config, QuoteConfig};
use quote_store::PriceListCache;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Clone)]
pub struct AuthConfig {
    pub passphrase: String,
}

#[derive(Clone)]
pub struct AppState {
    pub price_list: Arc<PriceListCache>,
    pub sessions: Arc<RwLock<SessionStore>>,
    pub tiers: Arc<Vec<PricingTier>>,
    pub default_exchange_rate: f64,
    pub images: ImageResolver,
    pub quote: Arc<QuoteConfig>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(config: &Config, source: Arc<dyn PriceListSource>) -> Self {
        Self {
            price_list: Arc::new(PriceListCache::new(source, config.price_list.cache_ttl())),
            sessions: Arc::new(RwLock::new(SessionStore::new(config.auth.session_ttl()))),
            tiers: Arc::new(config.pricing.tiers.clone()),
            default_exchange_rate: config.pricing.default_exchange_rate,
            images: ImageResolver::new(&config.images.dir),
            quote: Arc::new(config.quote.clone()),
            auth: AuthConfig {
                passphrase: config.auth.passphrase.clone(),
            },
        }
    }

    /// Settings a fresh session starts with
    pub fn default_settings(&self) -> PricingSettings {
        PricingSettings::defaults(&self.tiers, self.default_exchange_rate)
    }

    /// Run `f` against a live session, extending its lifetime
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut QuoteSession) -> T,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).map_err(AppError::session)?;
        Ok(f(session))
    }
}
