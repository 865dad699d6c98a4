use chrono::{DateTime, Utc};
use quote_catalog::{price_tiers, Margin, PricingSettings, PricingTier, ProductRecord, TierPrice};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product frozen into the quote together with the prices it had when added
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: Uuid,
    pub record: ProductRecord,
    pub prices: Vec<TierPrice>,
    /// Exchange rate used for `prices`
    pub exchange_rate: f64,
    /// Margins used for `prices`, one per tier
    pub margins: Vec<Margin>,
    pub added_at: DateTime<Utc>,
}

impl CartEntry {
    pub fn new(record: &ProductRecord, tiers: &[PricingTier], settings: &PricingSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            record: record.clone(),
            prices: price_tiers(record, tiers, settings),
            exchange_rate: settings.exchange_rate,
            margins: tiers
                .iter()
                .enumerate()
                .map(|(index, tier)| settings.margin_for(index, tier))
                .collect(),
            added_at: Utc::now(),
        }
    }
}

/// Ordered, append-only list of quote lines.
///
/// The same product may appear several times.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteCart {
    entries: Vec<CartEntry>,
}

impl QuoteCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price the record with the current settings and append it
    pub fn add(
        &mut self,
        record: &ProductRecord,
        tiers: &[PricingTier],
        settings: &PricingSettings,
    ) -> &CartEntry {
        self.entries.push(CartEntry::new(record, tiers, settings));
        &self.entries[self.entries.len() - 1]
    }

    /// Remove every entry, returning how many there were
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_catalog::PriceQuote;

    fn tiers() -> Vec<PricingTier> {
        vec![PricingTier {
            label: "10-15 pcs".to_string(),
            source_field: "10-59".to_string(),
            design_fee: 300.0,
            service_fee: 100.0,
            default_margin: Margin::clamped(0.40),
        }]
    }

    #[test]
    fn test_entries_are_frozen_snapshots() {
        let tiers = tiers();
        let mut settings = PricingSettings::defaults(&tiers, 35.0);
        let record = ProductRecord::new("A100", "Polo").with_base_price("10-59", "10");
        let mut cart = QuoteCart::new();

        cart.add(&record, &tiers, &settings);
        assert_eq!(cart.entries()[0].prices[0].price, PriceQuote::Quoted(1415));

        settings.set_exchange_rate(40.0).unwrap();
        settings.set_margins(&tiers, &[0.6]).unwrap();
        cart.add(&record, &tiers, &settings);

        let first = &cart.entries()[0];
        assert_eq!(first.prices[0].price, PriceQuote::Quoted(1415));
        assert_eq!(first.exchange_rate, 35.0);
        assert_eq!(first.margins, vec![Margin::clamped(0.40)]);

        let second = &cart.entries()[1];
        assert_ne!(second.prices[0].price, first.prices[0].price);
        assert_eq!(second.exchange_rate, 40.0);
    }

    #[test]
    fn test_duplicates_allowed_and_clear() {
        let tiers = tiers();
        let settings = PricingSettings::defaults(&tiers, 35.0);
        let record = ProductRecord::new("A100", "Polo");
        let mut cart = QuoteCart::new();

        let first_id = cart.add(&record, &tiers, &settings).id;
        let second_id = cart.add(&record, &tiers, &settings).id;
        assert_ne!(first_id, second_id);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.entries()[0].prices[0].price, PriceQuote::NotQuotable);

        assert_eq!(cart.clear(), 2);
        assert!(cart.is_empty());
    }
}
