use quote_catalog::PricingTier;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub price_list: PriceListConfig,
    pub images: ImagesConfig,
    pub pricing: PricingConfig,
    pub quote: QuoteConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Shared passphrase gating the whole tool
    pub passphrase: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }
}

fn default_session_ttl() -> u64 { 12 * 60 * 60 }

#[derive(Debug, Deserialize, Clone)]
pub struct PriceListConfig {
    /// Published spreadsheet URL or a local CSV/XLSX path
    pub source: String,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

impl PriceListConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

fn default_cache_ttl() -> u64 { 600 }

#[derive(Debug, Deserialize, Clone)]
pub struct ImagesConfig {
    pub dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    pub default_exchange_rate: f64,
    pub tiers: Vec<PricingTier>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuoteConfig {
    pub title: String,
    /// Terms and remittance details printed under every exported quote
    #[serde(default)]
    pub footer_lines: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `QUOTE__AUTH__PASSPHRASE=secret` sets `auth.passphrase`
            .add_source(config::Environment::with_prefix("QUOTE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(contents: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        port = 8080

        [auth]
        passphrase = "letmein"

        [price_list]
        source = "prices.csv"

        [images]
        dir = "images"

        [pricing]
        default_exchange_rate = 32.0

        [[pricing.tiers]]
        label = "10-15 pcs"
        source_field = "10-59"
        design_fee = 300.0
        service_fee = 100.0
        default_margin = 0.40

        [[pricing.tiers]]
        label = "16-30 pcs"
        source_field = "10-59"
        design_fee = 150.0
        service_fee = 80.0
        default_margin = 0.95

        [quote]
        title = "Team Uniform Quote"
        footer_lines = ["Prices exclude tax."]
    "#;

    #[test]
    fn test_parse_sample_config() {
        let config = Config::from_toml(SAMPLE).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.session_ttl(), Duration::from_secs(12 * 60 * 60));
        assert_eq!(config.price_list.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.pricing.tiers.len(), 2);
        assert_eq!(config.pricing.tiers[0].default_margin.value(), 0.40);
        // Out-of-range defaults are clamped like slider input
        assert_eq!(config.pricing.tiers[1].default_margin.value(), 0.60);
        assert_eq!(config.quote.footer_lines, vec!["Prices exclude tax."]);
    }

    #[test]
    fn test_missing_section_is_an_error() {
        assert!(Config::from_toml("[server]\nport = 1").is_err());
    }
}
