use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Duty applied to undyed goods.
pub const STANDARD_DUTY_RATE: f64 = 0.105;

/// Duty applied when the `DYED` column carries any value.
pub const DYED_DUTY_RATE: f64 = 0.125;

/// Shipping zones from the `freight` column of the price list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum FreightZone {
    #[default]
    A,
    B,
    C,
    D,
    E,
}

impl FreightZone {
    /// Parse a freight code. Blank, missing and unknown codes land in zone A.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_uppercase()).as_deref() {
            Some("B") => FreightZone::B,
            Some("C") => FreightZone::C,
            Some("D") => FreightZone::D,
            Some("E") => FreightZone::E,
            _ => FreightZone::A,
        }
    }

    /// Fixed per-unit shipping surcharge in local currency
    pub fn surcharge(self) -> f64 {
        match self {
            FreightZone::A => 45.0,
            FreightZone::B => 63.0,
            FreightZone::C => 103.0,
            FreightZone::D => 13.0,
            FreightZone::E => 22.0,
        }
    }
}

/// One row of the supplier price list, typed at the loading boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub item_no: String,
    pub description: String,
    pub note: Option<String>,
    /// Series code, shown as "series" in the filters
    pub line_code: Option<String>,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub freight: Option<String>,
    pub dyed: Option<String>,
    pub image_front: Option<String>,
    pub image_back: Option<String>,
    /// Raw cell text of every price column, keyed by column header
    pub base_prices: BTreeMap<String, String>,
}

impl ProductRecord {
    pub fn new(item_no: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            item_no: item_no.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_base_price(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_prices.insert(field.into(), value.into());
        self
    }

    pub fn with_freight(mut self, code: impl Into<String>) -> Self {
        self.freight = Some(code.into());
        self
    }

    pub fn with_dyed(mut self, flag: impl Into<String>) -> Self {
        self.dyed = Some(flag.into());
        self
    }

    /// Base unit price in supplier currency.
    ///
    /// `None` when the column is missing, unparsable, not finite or not positive.
    pub fn base_price(&self, field: &str) -> Option<f64> {
        self.base_prices
            .get(field)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|price| price.is_finite() && *price > 0.0)
    }

    pub fn freight_zone(&self) -> FreightZone {
        FreightZone::from_code(self.freight.as_deref())
    }

    pub fn is_dyed(&self) -> bool {
        self.dyed
            .as_deref()
            .map(|flag| !flag.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn duty_rate(&self) -> f64 {
        if self.is_dyed() {
            DYED_DUTY_RATE
        } else {
            STANDARD_DUTY_RATE
        }
    }
}

/// Normalize a spreadsheet cell: trimmed, with blanks and `nan` mapped to `None`.
pub fn clean_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed.to_string())
    }
}
