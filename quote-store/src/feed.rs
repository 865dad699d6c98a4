//! Price-list feed: fetches the published spreadsheet (or reads a local copy)
//! and turns its rows into typed `ProductRecord`s.

use async_trait::async_trait;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use quote_catalog::{clean_cell, ProductRecord};
use quote_core::{PriceListSource, SourceError};
use std::collections::HashMap;
use std::io::Cursor;
use std::time::Duration;
use tracing::info;

pub const ITEM_NO: &str = "Item_No";
pub const DESCRIPTION: &str = "Description";
pub const NOTE: &str = "NOTE";
pub const LINE_CODE: &str = "Line_code";
pub const CATEGORY: &str = "Category";
pub const GENDER: &str = "Gender";
pub const FREIGHT: &str = "freight";
pub const DYED: &str = "DYED";
pub const PIC_FRONT: &str = "pic code_1";
pub const PIC_BACK: &str = "pic code_2";

const DESCRIPTIVE_COLUMNS: [&str; 10] = [
    ITEM_NO, DESCRIPTION, NOTE, LINE_CODE, CATEGORY, GENDER, FREIGHT, DYED, PIC_FRONT, PIC_BACK,
];

const USER_AGENT: &str = "quote-desk/0.1.0";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Price list returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to read price list: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Spreadsheet has no worksheets")]
    EmptyWorkbook,

    #[error("Price list has no header row")]
    MissingHeader,

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Csv,
    Spreadsheet,
}

impl FeedFormat {
    /// Guess the format from the location and, for HTTP, the content type.
    pub fn detect(location: &str, content_type: Option<&str>) -> Self {
        let location = location.to_ascii_lowercase();
        let path = location.split('?').next().unwrap_or_default();
        if path.ends_with(".xlsx")
            || path.ends_with(".xls")
            || location.contains("output=xlsx")
            || location.contains("format=xlsx")
        {
            return FeedFormat::Spreadsheet;
        }
        match content_type {
            Some(ct) if ct.contains("spreadsheetml") || ct.contains("ms-excel") => {
                FeedFormat::Spreadsheet
            }
            _ => FeedFormat::Csv,
        }
    }
}

/// Price list published as CSV/XLSX at a URL, or stored at a local path
#[derive(Clone)]
pub struct PriceListFeed {
    location: String,
    http: reqwest::Client,
}

impl PriceListFeed {
    pub fn new(location: impl Into<String>) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            location: location.into(),
            http,
        })
    }

    fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    async fn fetch(&self) -> Result<Vec<ProductRecord>, FeedError> {
        let (bytes, format) = if self.is_remote() {
            let response = self.http.get(&self.location).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FeedError::Status(status));
            }
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = response.bytes().await?.to_vec();
            (bytes, FeedFormat::detect(&self.location, content_type.as_deref()))
        } else {
            let bytes = tokio::fs::read(&self.location).await?;
            (bytes, FeedFormat::detect(&self.location, None))
        };

        let records = parse_price_list(&bytes, format)?;
        info!(
            "Loaded {} price-list rows from {} ({:?})",
            records.len(),
            self.location,
            format
        );
        Ok(records)
    }
}

#[async_trait]
impl PriceListSource for PriceListFeed {
    async fn load(&self) -> Result<Vec<ProductRecord>, SourceError> {
        Ok(self.fetch().await?)
    }

    fn describe(&self) -> String {
        self.location.clone()
    }
}

/// Parse raw feed bytes into records
pub fn parse_price_list(bytes: &[u8], format: FeedFormat) -> Result<Vec<ProductRecord>, FeedError> {
    let mut rows = match format {
        FeedFormat::Csv => csv_rows(bytes)?,
        FeedFormat::Spreadsheet => spreadsheet_rows(bytes)?,
    }
    .into_iter();

    let header = rows.next().ok_or(FeedError::MissingHeader)?;
    records_from_rows(&header, rows)
}

fn csv_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn spreadsheet_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, FeedError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(FeedError::EmptyWorkbook)??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(n) => {
            // Whole numbers come back as floats; keep "12" rather than "12.0"
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
    }
}

fn records_from_rows(
    header: &[String],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<Vec<ProductRecord>, FeedError> {
    let columns: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .map(|(index, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), index))
        .filter(|(name, _)| !name.is_empty())
        .collect();

    for required in [ITEM_NO, DESCRIPTION] {
        if !columns.contains_key(required) {
            return Err(FeedError::MissingColumn(required));
        }
    }

    let price_columns: Vec<(&String, usize)> = columns
        .iter()
        .filter(|(name, _)| !DESCRIPTIVE_COLUMNS.contains(&name.as_str()))
        .map(|(name, index)| (name, *index))
        .collect();
    let has_front_column = columns.contains_key(PIC_FRONT);

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(|cell| clean_cell(cell).is_none()) {
            continue;
        }
        let cell = |name: &str| {
            columns
                .get(name)
                .and_then(|index| row.get(*index))
                .and_then(|raw| clean_cell(raw))
        };

        let item_no = cell(ITEM_NO).unwrap_or_default();
        let image_front = if has_front_column {
            cell(PIC_FRONT)
        } else {
            Some(item_no.clone()).filter(|id| !id.is_empty())
        };

        let mut record = ProductRecord {
            description: cell(DESCRIPTION).unwrap_or_default(),
            note: cell(NOTE),
            line_code: cell(LINE_CODE),
            category: cell(CATEGORY),
            gender: cell(GENDER),
            freight: cell(FREIGHT),
            dyed: cell(DYED),
            image_front,
            image_back: cell(PIC_BACK),
            item_no,
            ..Default::default()
        };
        for (name, index) in &price_columns {
            if let Some(value) = row.get(*index).and_then(|raw| clean_cell(raw)) {
                record.base_prices.insert((*name).clone(), value);
            }
        }
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_catalog::{compute_price, PriceQuote};

    const CSV: &str = "\u{feff}Item_No,Description,10-59,freight,DYED,NOTE,Category,Gender,Line_code,pic code_1,pic code_2\n\
        A100,Dri-fit Polo,10,A,,Best seller,Tops,Men,AX,A100.png,A100-back\n\
        A101,Cotton Tee,nan,b,Y,,Tops,Women,BX,,\n\
        ,,,,,,,,,,\n\
        S300,Running shorts,7.5,,,,Bottoms,,AX\n";

    #[test]
    fn test_parse_csv_feed() {
        let records = parse_price_list(CSV.as_bytes(), FeedFormat::Csv).unwrap();
        assert_eq!(records.len(), 3);

        let polo = &records[0];
        assert_eq!(polo.item_no, "A100");
        assert_eq!(polo.note.as_deref(), Some("Best seller"));
        assert_eq!(polo.image_front.as_deref(), Some("A100.png"));
        assert_eq!(polo.image_back.as_deref(), Some("A100-back"));
        assert_eq!(polo.dyed, None);
        assert_eq!(
            compute_price(polo, "10-59", 300.0, 100.0, 0.4, 35.0),
            PriceQuote::Quoted(1415)
        );

        let tee = &records[1];
        assert!(tee.base_prices.get("10-59").is_none());
        assert!(tee.is_dyed());
        assert_eq!(tee.image_front, None);

        // Short rows are tolerated
        let shorts = &records[2];
        assert_eq!(shorts.base_price("10-59"), Some(7.5));
        assert_eq!(shorts.image_back, None);
    }

    #[test]
    fn test_front_image_falls_back_to_item_no() {
        let csv = "Item_No,Description,10-59\nA100,Polo,10\n";
        let records = parse_price_list(csv.as_bytes(), FeedFormat::Csv).unwrap();
        assert_eq!(records[0].image_front.as_deref(), Some("A100"));
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "Item_No,10-59\nA100,10\n";
        let err = parse_price_list(csv.as_bytes(), FeedFormat::Csv).unwrap_err();
        assert!(matches!(err, FeedError::MissingColumn(DESCRIPTION)));

        let err = parse_price_list(b"", FeedFormat::Csv).unwrap_err();
        assert!(matches!(err, FeedError::MissingHeader));
    }

    #[test]
    fn test_parse_spreadsheet_feed() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["Item_No", "Description", "10-59", "freight"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_string(1, 0, "A100").unwrap();
        sheet.write_string(1, 1, "Dri-fit Polo").unwrap();
        sheet.write_number(1, 2, 10.0).unwrap();
        sheet.write_string(1, 3, "a").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let records = parse_price_list(&bytes, FeedFormat::Spreadsheet).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].base_prices.get("10-59").map(String::as_str), Some("10"));
        assert_eq!(records[0].freight.as_deref(), Some("a"));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            FeedFormat::detect("https://docs.google.com/spreadsheets/d/x/pub?output=xlsx", None),
            FeedFormat::Spreadsheet
        );
        assert_eq!(FeedFormat::detect("data/prices.XLSX", None), FeedFormat::Spreadsheet);
        assert_eq!(
            FeedFormat::detect("https://example.com/feed", Some("application/vnd.ms-excel")),
            FeedFormat::Spreadsheet
        );
        assert_eq!(
            FeedFormat::detect("https://example.com/pub?output=csv", Some("text/csv")),
            FeedFormat::Csv
        );
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, CSV).unwrap();

        let feed = PriceListFeed::new(path.to_string_lossy()).unwrap();
        let records = feed.load().await.unwrap();
        assert_eq!(records.len(), 3);

        let missing = PriceListFeed::new(dir.path().join("gone.csv").to_string_lossy()).unwrap();
        assert!(missing.load().await.is_err());
    }
}
