use chrono::{DateTime, Utc};
use quote_catalog::ProductRecord;
use quote_core::{CoreError, CoreResult, PriceListSource};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

struct Snapshot {
    records: Arc<Vec<ProductRecord>>,
    fetched_at: Instant,
    loaded_at: DateTime<Utc>,
}

/// Load state reported to the UI
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub source: String,
    pub records: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub age_seconds: Option<u64>,
}

/// Keeps the last successfully loaded price list for a fixed validity window.
///
/// Failed loads are never cached; the next access tries the source again.
pub struct PriceListCache {
    source: Arc<dyn PriceListSource>,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    /// Held for the whole fetch so concurrent misses share one load.
    /// `snapshot` is only write-locked to swap in the result.
    loading: Mutex<()>,
}

impl PriceListCache {
    pub fn new(source: Arc<dyn PriceListSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            snapshot: RwLock::new(None),
            loading: Mutex::new(()),
        }
    }

    fn fresh(&self, snapshot: &Option<Snapshot>) -> Option<Arc<Vec<ProductRecord>>> {
        snapshot
            .as_ref()
            .filter(|s| s.fetched_at.elapsed() < self.ttl)
            .map(|s| s.records.clone())
    }

    /// Current price list, re-fetched once the validity window has passed
    pub async fn records(&self) -> CoreResult<Arc<Vec<ProductRecord>>> {
        if let Some(records) = self.fresh(&*self.snapshot.read().await) {
            return Ok(records);
        }

        let _loading = self.loading.lock().await;
        // Another request may have reloaded while we waited for the lock
        if let Some(records) = self.fresh(&*self.snapshot.read().await) {
            return Ok(records);
        }

        match self.source.load().await {
            Ok(records) => {
                info!("Price list refreshed from {}: {} rows", self.source.describe(), records.len());
                let records = Arc::new(records);
                *self.snapshot.write().await = Some(Snapshot {
                    records: records.clone(),
                    fetched_at: Instant::now(),
                    loaded_at: Utc::now(),
                });
                Ok(records)
            }
            Err(err) => {
                warn!("Price list load from {} failed: {}", self.source.describe(), err);
                Err(CoreError::SourceUnavailable(err.to_string()))
            }
        }
    }

    /// Drop the cached copy so the next access re-fetches
    pub async fn invalidate(&self) {
        *self.snapshot.write().await = None;
    }

    pub async fn status(&self) -> CacheStatus {
        let snapshot = self.snapshot.read().await;
        CacheStatus {
            source: self.source.describe(),
            records: snapshot.as_ref().map(|s| s.records.len()).unwrap_or(0),
            loaded_at: snapshot.as_ref().map(|s| s.loaded_at),
            age_seconds: snapshot.as_ref().map(|s| s.fetched_at.elapsed().as_secs()),
        }
    }
}
