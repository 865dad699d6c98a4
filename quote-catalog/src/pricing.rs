use serde::{Deserialize, Serialize};

use crate::product::ProductRecord;

/// Handling surcharge applied to every landed cost
pub const HANDLING_RATE: f64 = 0.05;

/// Lowest margin the quote form accepts
pub const MIN_MARGIN: f64 = 0.10;

/// Highest margin the quote form accepts
pub const MAX_MARGIN: f64 = 0.60;

/// Result of pricing one record for one tier.
///
/// Serializes as a plain number, or `null` when the record cannot be quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "Option<i64>")]
pub enum PriceQuote {
    Quoted(i64),
    NotQuotable,
}

impl PriceQuote {
    pub fn amount(self) -> Option<i64> {
        match self {
            PriceQuote::Quoted(amount) => Some(amount),
            PriceQuote::NotQuotable => None,
        }
    }

    pub fn is_quoted(self) -> bool {
        matches!(self, PriceQuote::Quoted(_))
    }
}

impl From<Option<i64>> for PriceQuote {
    fn from(value: Option<i64>) -> Self {
        value.map(PriceQuote::Quoted).unwrap_or(PriceQuote::NotQuotable)
    }
}

impl From<PriceQuote> for Option<i64> {
    fn from(quote: PriceQuote) -> Self {
        quote.amount()
    }
}

/// Margin fraction, clamped to the range the quote form allows
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Margin(f64);

impl Margin {
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Margin(MIN_MARGIN);
        }
        Margin(value.clamp(MIN_MARGIN, MAX_MARGIN))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Margin {
    fn from(value: f64) -> Self {
        Margin::clamped(value)
    }
}

impl From<Margin> for f64 {
    fn from(margin: Margin) -> Self {
        margin.0
    }
}

/// A quantity bracket with its own fixed fees
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingTier {
    /// Quantity range shown to the user, e.g. "10-15 pcs"
    pub label: String,
    /// Price-list column holding the base unit price for this tier
    pub source_field: String,
    pub design_fee: f64,
    pub service_fee: f64,
    pub default_margin: Margin,
}

/// Exchange rate and per-tier margins currently chosen by a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingSettings {
    pub exchange_rate: f64,
    pub margins: Vec<Margin>,
}

impl PricingSettings {
    pub fn defaults(tiers: &[PricingTier], exchange_rate: f64) -> Self {
        Self {
            exchange_rate,
            margins: tiers.iter().map(|tier| tier.default_margin).collect(),
        }
    }

    /// Replace the exchange rate; it has to be a positive finite number.
    pub fn set_exchange_rate(&mut self, exchange_rate: f64) -> Result<(), PricingError> {
        if !exchange_rate.is_finite() || exchange_rate <= 0.0 {
            return Err(PricingError::InvalidExchangeRate(exchange_rate));
        }
        self.exchange_rate = exchange_rate;
        Ok(())
    }

    /// Replace all margins at once. Values outside the form range are clamped.
    pub fn set_margins(&mut self, tiers: &[PricingTier], margins: &[f64]) -> Result<(), PricingError> {
        if margins.len() != tiers.len() {
            return Err(PricingError::TierCountMismatch {
                expected: tiers.len(),
                got: margins.len(),
            });
        }
        self.margins = margins.iter().copied().map(Margin::clamped).collect();
        Ok(())
    }

    pub fn margin_for(&self, index: usize, tier: &PricingTier) -> Margin {
        self.margins.get(index).copied().unwrap_or(tier.default_margin)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PricingError {
    #[error("Exchange rate must be a positive number, got {0}")]
    InvalidExchangeRate(f64),

    #[error("Expected {expected} margins, got {got}")]
    TierCountMismatch { expected: usize, got: usize },
}

/// A priced tier as shown in listings and stored in cart entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierPrice {
    pub label: String,
    pub price: PriceQuote,
}

/// Base price converted to local currency plus duty, handling and shipping
pub fn landed_cost(base_price: f64, exchange_rate: f64, duty_rate: f64, surcharge: f64) -> f64 {
    base_price * exchange_rate * (1.0 + HANDLING_RATE + duty_rate) + surcharge
}

/// Quoted unit price for one record and tier.
///
/// Returns `NotQuotable` when the base price is missing or unusable, and for
/// degenerate inputs: a margin outside (0, 1) or a non-positive exchange rate.
pub fn compute_price(
    record: &ProductRecord,
    source_field: &str,
    design_fee: f64,
    service_fee: f64,
    margin: f64,
    exchange_rate: f64,
) -> PriceQuote {
    if !(margin > 0.0 && margin < 1.0) {
        return PriceQuote::NotQuotable;
    }
    if !exchange_rate.is_finite() || exchange_rate <= 0.0 {
        return PriceQuote::NotQuotable;
    }
    let Some(base_price) = record.base_price(source_field) else {
        return PriceQuote::NotQuotable;
    };

    let landed = landed_cost(
        base_price,
        exchange_rate,
        record.duty_rate(),
        record.freight_zone().surcharge(),
    );
    let quoted = ((landed + design_fee + service_fee) / (1.0 - margin)).round_ties_even();

    // `as i64` would saturate instead of failing
    if !quoted.is_finite() || quoted < 0.0 || quoted >= i64::MAX as f64 {
        return PriceQuote::NotQuotable;
    }
    PriceQuote::Quoted(quoted as i64)
}

/// Price a record for every tier using the given settings
pub fn price_tiers(
    record: &ProductRecord,
    tiers: &[PricingTier],
    settings: &PricingSettings,
) -> Vec<TierPrice> {
    tiers
        .iter()
        .enumerate()
        .map(|(index, tier)| TierPrice {
            label: tier.label.clone(),
            price: compute_price(
                record,
                &tier.source_field,
                tier.design_fee,
                tier.service_fee,
                settings.margin_for(index, tier).value(),
                settings.exchange_rate,
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELD: &str = "10-59";

    fn polo(base: &str) -> ProductRecord {
        ProductRecord::new("A100", "Polo shirt").with_base_price(FIELD, base)
    }

    fn quote(record: &ProductRecord, design: f64, service: f64, margin: f64, rate: f64) -> i64 {
        compute_price(record, FIELD, design, service, margin, rate)
            .amount()
            .expect("record should be quotable")
    }

    #[test]
    fn test_reference_quote() {
        // 10 * 35 * 1.155 + 45 = 449.25; (449.25 + 400) / 0.6 = 1415.42
        let record = polo("10").with_freight("A");
        assert_eq!(
            compute_price(&record, FIELD, 300.0, 100.0, 0.40, 35.0),
            PriceQuote::Quoted(1415)
        );
    }

    #[test]
    fn test_dyed_and_zone_change_quote() {
        // 10 * 35 * 1.175 + 103 = 514.25; (514.25 + 400) / 0.6 = 1523.75
        let record = polo("10").with_freight("c").with_dyed("Y");
        assert_eq!(quote(&record, 300.0, 100.0, 0.40, 35.0), 1524);
    }

    #[test]
    fn test_not_quotable_inputs() {
        let missing = ProductRecord::new("A100", "Polo shirt");
        assert_eq!(compute_price(&missing, FIELD, 300.0, 100.0, 0.4, 35.0), PriceQuote::NotQuotable);

        for raw in ["", "n/a", "0", "-5", "NaN", "inf", "1e300"] {
            let record = polo(raw);
            assert_eq!(
                compute_price(&record, FIELD, 300.0, 100.0, 0.4, 35.0),
                PriceQuote::NotQuotable,
                "base price {raw:?} should not be quotable"
            );
        }
    }

    #[test]
    fn test_degenerate_margin_and_rate() {
        let record = polo("10");
        for margin in [0.0, 1.0, 1.5, -0.2, f64::NAN] {
            assert_eq!(
                compute_price(&record, FIELD, 300.0, 100.0, margin, 35.0),
                PriceQuote::NotQuotable
            );
        }
        for rate in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            assert_eq!(
                compute_price(&record, FIELD, 300.0, 100.0, 0.4, rate),
                PriceQuote::NotQuotable
            );
        }
    }

    #[test]
    fn test_monotonic_inputs() {
        let record = polo("8.4");
        let base = quote(&record, 300.0, 100.0, 0.30, 32.0);

        assert!(quote(&record, 300.0, 100.0, 0.30, 33.0) >= base);
        assert!(quote(&record, 350.0, 100.0, 0.30, 32.0) >= base);
        assert!(quote(&record, 300.0, 150.0, 0.30, 32.0) >= base);
        assert!(quote(&record, 300.0, 100.0, 0.45, 32.0) >= base);

        let pricier_zone = record.clone().with_freight("C");
        assert!(quote(&pricier_zone, 300.0, 100.0, 0.30, 32.0) >= base);
        let cheaper_zone = record.with_freight("D");
        assert!(quote(&cheaper_zone, 300.0, 100.0, 0.30, 32.0) <= base);
    }

    #[test]
    fn test_idempotent() {
        let record = polo("11.2").with_freight("B");
        let first = compute_price(&record, FIELD, 150.0, 80.0, 0.35, 32.5);
        let second = compute_price(&record, FIELD, 150.0, 80.0, 0.35, 32.5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_margin_clamped_at_boundary() {
        assert_eq!(Margin::clamped(0.05).value(), MIN_MARGIN);
        assert_eq!(Margin::clamped(0.95).value(), MAX_MARGIN);
        assert_eq!(Margin::clamped(0.33).value(), 0.33);
        assert_eq!(Margin::clamped(f64::NAN).value(), MIN_MARGIN);

        let parsed: Margin = serde_json::from_str("2.0").unwrap();
        assert_eq!(parsed.value(), MAX_MARGIN);
    }

    #[test]
    fn test_settings_validation() {
        let tiers = sample_tiers();
        let mut settings = PricingSettings::defaults(&tiers, 32.0);

        assert_eq!(
            settings.set_exchange_rate(0.0),
            Err(PricingError::InvalidExchangeRate(0.0))
        );
        assert!(settings.set_exchange_rate(33.5).is_ok());
        assert_eq!(settings.exchange_rate, 33.5);

        assert_eq!(
            settings.set_margins(&tiers, &[0.2]),
            Err(PricingError::TierCountMismatch { expected: 2, got: 1 })
        );
        settings.set_margins(&tiers, &[0.9, 0.25]).unwrap();
        assert_eq!(settings.margins, vec![Margin::clamped(0.6), Margin::clamped(0.25)]);
    }

    #[test]
    fn test_price_tiers_uses_each_tier() {
        let tiers = sample_tiers();
        let settings = PricingSettings::defaults(&tiers, 35.0);
        let record = polo("10");

        let prices = price_tiers(&record, &tiers, &settings);
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].label, "10-15 pcs");
        assert_eq!(prices[0].price, PriceQuote::Quoted(1415));
        // (449.25 + 150 + 80) / 0.65 = 1045
        assert_eq!(prices[1].price, PriceQuote::Quoted(1045));
    }

    #[test]
    fn test_quote_serializes_as_nullable_number() {
        assert_eq!(serde_json::to_string(&PriceQuote::Quoted(1415)).unwrap(), "1415");
        assert_eq!(serde_json::to_string(&PriceQuote::NotQuotable).unwrap(), "null");
    }

    fn sample_tiers() -> Vec<PricingTier> {
        vec![
            PricingTier {
                label: "10-15 pcs".to_string(),
                source_field: FIELD.to_string(),
                design_fee: 300.0,
                service_fee: 100.0,
                default_margin: Margin::clamped(0.40),
            },
            PricingTier {
                label: "16-30 pcs".to_string(),
                source_field: FIELD.to_string(),
                design_fee: 150.0,
                service_fee: 80.0,
                default_margin: Margin::clamped(0.35),
            },
        ]
    }
}
