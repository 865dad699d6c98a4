pub mod app_config;
pub mod feed;
pub mod cache;

pub use feed::{FeedError, FeedFormat, PriceListFeed};
pub use cache::{CacheStatus, PriceListCache};
