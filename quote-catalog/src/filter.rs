use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::product::ProductRecord;

/// Dropdown value meaning "do not filter"
pub const ALL: &str = "all";

/// Listing filters. Unset, blank and "all" leave a dimension unfiltered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub series: Option<String>,
    pub gender: Option<String>,
    pub item_no: Option<String>,
    /// Free-text keyword, matched against description and item number
    #[serde(alias = "q")]
    pub keyword: Option<String>,
}

fn active(selection: &Option<String>) -> Option<&str> {
    selection
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case(ALL))
}

fn exact(selection: &Option<String>, value: Option<&str>) -> bool {
    match active(selection) {
        Some(wanted) => value.map(str::trim) == Some(wanted),
        None => true,
    }
}

impl ProductFilter {
    pub fn matches(&self, record: &ProductRecord) -> bool {
        exact(&self.category, record.category.as_deref())
            && exact(&self.series, record.line_code.as_deref())
            && exact(&self.gender, record.gender.as_deref())
            && exact(&self.item_no, Some(record.item_no.as_str()))
            && self.matches_keyword(record)
    }

    fn matches_keyword(&self, record: &ProductRecord) -> bool {
        let Some(keyword) = self
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        else {
            return true;
        };
        let needle = keyword.to_lowercase();
        record.description.to_lowercase().contains(&needle)
            || record.item_no.to_lowercase().contains(&needle)
    }

    pub fn apply<'a>(&self, records: &'a [ProductRecord]) -> Vec<&'a ProductRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

/// Distinct values offered by each dropdown
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Facets {
    pub categories: Vec<String>,
    pub series: Vec<String>,
    pub genders: Vec<String>,
    pub item_nos: Vec<String>,
}

impl Facets {
    pub fn collect(records: &[ProductRecord]) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
            values
                .flatten()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        }

        Self {
            categories: distinct(records.iter().map(|r| r.category.as_deref())),
            series: distinct(records.iter().map(|r| r.line_code.as_deref())),
            genders: distinct(records.iter().map(|r| r.gender.as_deref())),
            item_nos: distinct(records.iter().map(|r| Some(r.item_no.as_str()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<ProductRecord> {
        let mut polo = ProductRecord::new("A100", "Dri-fit Polo");
        polo.category = Some("Tops".to_string());
        polo.line_code = Some("AX".to_string());
        polo.gender = Some("Men".to_string());

        let mut tee = ProductRecord::new("A101", "Cotton Tee");
        tee.category = Some("Tops".to_string());
        tee.line_code = Some("BX".to_string());
        tee.gender = Some("Women".to_string());

        let mut shorts = ProductRecord::new("S300", "Running shorts");
        shorts.category = Some("Bottoms".to_string());
        shorts.line_code = Some("AX".to_string());

        vec![polo, tee, shorts]
    }

    fn ids(records: Vec<&ProductRecord>) -> Vec<&str> {
        records.into_iter().map(|r| r.item_no.as_str()).collect()
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        let records = catalog();
        assert_eq!(ProductFilter::default().apply(&records).len(), 3);

        let all = ProductFilter {
            category: Some("All".to_string()),
            series: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(all.apply(&records).len(), 3);
    }

    #[test]
    fn test_dropdowns_combine() {
        let records = catalog();
        let filter = ProductFilter {
            category: Some("Tops".to_string()),
            series: Some("AX".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(filter.apply(&records)), vec!["A100"]);

        let by_item = ProductFilter {
            item_no: Some("S300".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(by_item.apply(&records)), vec!["S300"]);
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let records = catalog();
        let by_description = ProductFilter {
            keyword: Some("POLO".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(by_description.apply(&records)), vec!["A100"]);

        let by_item = ProductFilter {
            keyword: Some("a10".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(by_item.apply(&records)), vec!["A100", "A101"]);
    }

    #[test]
    fn test_facets_are_sorted_and_distinct() {
        let facets = Facets::collect(&catalog());
        assert_eq!(facets.categories, vec!["Bottoms", "Tops"]);
        assert_eq!(facets.series, vec!["AX", "BX"]);
        assert_eq!(facets.genders, vec!["Men", "Women"]);
        assert_eq!(facets.item_nos, vec!["A100", "A101", "S300"]);
    }
}
