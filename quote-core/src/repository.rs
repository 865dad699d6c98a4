use async_trait::async_trait;
use quote_catalog::ProductRecord;

pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Where the supplier price list comes from
#[async_trait]
pub trait PriceListSource: Send + Sync {
    /// Fetch and parse the full price list
    async fn load(&self) -> Result<Vec<ProductRecord>, SourceError>;

    /// Human-readable location, used in logs
    fn describe(&self) -> String;
}

/// Fixed in-memory price list
#[derive(Debug, Clone, Default)]
pub struct StaticPriceList {
    records: Vec<ProductRecord>,
}

impl StaticPriceList {
    pub fn new(records: Vec<ProductRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl PriceListSource for StaticPriceList {
    async fn load(&self) -> Result<Vec<ProductRecord>, SourceError> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("static price list ({} records)", self.records.len())
    }
}
