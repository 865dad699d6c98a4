pub mod repository;

pub use repository::{PriceListSource, SourceError, StaticPriceList};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Price list unavailable: {0}")]
    SourceUnavailable(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
