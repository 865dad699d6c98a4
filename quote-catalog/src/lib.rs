pub mod product;
pub mod pricing;
pub mod images;
pub mod filter;

pub use product::{clean_cell, FreightZone, ProductRecord};
pub use pricing::{
    compute_price, price_tiers, Margin, PriceQuote, PricingError, PricingSettings, PricingTier,
    TierPrice,
};
pub use images::{resolve_image, ImageResolver, ProductImages};
pub use filter::{Facets, ProductFilter};
