//! XLSX rendering of a quote cart.
//!
//! One row per cart entry (picture, item, description, one price column per
//! tier, note) followed by the configured terms/remittance footer. A picture
//! that cannot be embedded is replaced by a text marker; it never aborts the
//! export.

use chrono::{DateTime, Utc};
use quote_catalog::{ImageResolver, PriceQuote, PricingTier};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, Image, Workbook, Worksheet, XlsxError,
};
use std::path::Path;
use tracing::{info, warn};

use crate::models::{CartEntry, QuoteCart};

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const NO_IMAGE: &str = "no image";
pub const IMAGE_UNAVAILABLE: &str = "image unavailable";
pub const NOT_AVAILABLE: &str = "N/A";

const HEADER_ROW: u32 = 2;
const ENTRY_ROW_HEIGHT: f64 = 90.0;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Workbook bytes plus a tally of what could not be embedded
#[derive(Debug, Clone)]
pub struct ExportedQuote {
    pub bytes: Vec<u8>,
    pub rows: usize,
    pub missing_images: usize,
    pub broken_images: usize,
}

/// `quote_YYYYMMDD.xlsx`
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("quote_{}.xlsx", at.format("%Y%m%d"))
}

struct Formats {
    title: Format,
    header: Format,
    text: Format,
    price: Format,
    footer: Format,
}

impl Formats {
    fn new() -> Self {
        let cell = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap();
        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(16)
                .set_align(FormatAlign::Center),
            header: cell
                .clone()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(Color::RGB(0xD9E1F2)),
            price: cell.clone().set_num_format("#,##0").set_align(FormatAlign::Right),
            text: cell,
            footer: Format::new().set_text_wrap().set_align(FormatAlign::Top),
        }
    }
}

/// Renders carts with a fixed title, tier set and footer
pub struct QuoteWorkbook<'a> {
    title: &'a str,
    tiers: &'a [PricingTier],
    footer_lines: &'a [String],
    images: &'a ImageResolver,
}

impl<'a> QuoteWorkbook<'a> {
    pub fn new(
        title: &'a str,
        tiers: &'a [PricingTier],
        footer_lines: &'a [String],
        images: &'a ImageResolver,
    ) -> Self {
        Self {
            title,
            tiers,
            footer_lines,
            images,
        }
    }

    fn last_column(&self) -> u16 {
        // image, item, description, tiers..., note
        (3 + self.tiers.len()) as u16
    }

    pub fn render(&self, cart: &QuoteCart, at: DateTime<Utc>) -> Result<ExportedQuote, ExportError> {
        let formats = Formats::new();
        let mut worksheet = Worksheet::new();
        worksheet.set_name("Quote")?;

        let last_col = self.last_column();
        worksheet.merge_range(0, 0, 0, last_col, self.title, &formats.title)?;
        worksheet.write_string(1, 0, format!("Date: {}", at.format("%Y-%m-%d")))?;

        let mut headers = vec!["Image".to_string(), "Item No".to_string(), "Description".to_string()];
        headers.extend(self.tiers.iter().map(|tier| tier.label.clone()));
        headers.push("Note".to_string());
        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string_with_format(HEADER_ROW, col as u16, header, &formats.header)?;
        }

        worksheet.set_column_width(0, 18)?;
        worksheet.set_column_width(1, 14)?;
        worksheet.set_column_width(2, 36)?;
        for col in 3..last_col {
            worksheet.set_column_width(col, 14)?;
        }
        worksheet.set_column_width(last_col, 30)?;

        let mut exported = ExportedQuote {
            bytes: Vec::new(),
            rows: 0,
            missing_images: 0,
            broken_images: 0,
        };

        for (offset, entry) in cart.entries().iter().enumerate() {
            let row = HEADER_ROW + 1 + offset as u32;
            worksheet.set_row_height(row, ENTRY_ROW_HEIGHT)?;
            self.write_picture(&mut worksheet, row, entry, &formats, &mut exported)?;
            self.write_entry(&mut worksheet, row, entry, &formats)?;
            exported.rows += 1;
        }

        let footer_start = HEADER_ROW + 2 + cart.len() as u32;
        for (offset, line) in self.footer_lines.iter().enumerate() {
            let row = footer_start + offset as u32;
            worksheet.merge_range(row, 0, row, last_col, line, &formats.footer)?;
        }

        let mut workbook = Workbook::new();
        workbook.push_worksheet(worksheet);
        exported.bytes = workbook.save_to_buffer()?;

        info!(
            "Exported quote with {} rows ({} without image, {} broken images)",
            exported.rows, exported.missing_images, exported.broken_images
        );
        Ok(exported)
    }

    fn write_entry(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        entry: &CartEntry,
        formats: &Formats,
    ) -> Result<(), XlsxError> {
        worksheet.write_string_with_format(row, 1, &entry.record.item_no, &formats.text)?;
        worksheet.write_string_with_format(row, 2, &entry.record.description, &formats.text)?;

        for (index, _) in self.tiers.iter().enumerate() {
            let col = 3 + index as u16;
            let quote = entry
                .prices
                .get(index)
                .map(|tier_price| tier_price.price)
                .unwrap_or(PriceQuote::NotQuotable);
            match quote {
                PriceQuote::Quoted(amount) => {
                    worksheet.write_number_with_format(row, col, amount as f64, &formats.price)?;
                }
                PriceQuote::NotQuotable => {
                    worksheet.write_string_with_format(row, col, NOT_AVAILABLE, &formats.text)?;
                }
            }
        }

        let note = entry.record.note.as_deref().unwrap_or_default();
        worksheet.write_string_with_format(row, self.last_column(), note, &formats.text)?;
        Ok(())
    }

    fn write_picture(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        entry: &CartEntry,
        formats: &Formats,
        exported: &mut ExportedQuote,
    ) -> Result<(), XlsxError> {
        let pictures = self.images.images_for(&entry.record);
        let Some(path) = pictures.primary() else {
            exported.missing_images += 1;
            worksheet.write_string_with_format(row, 0, NO_IMAGE, &formats.text)?;
            return Ok(());
        };

        if let Err(err) = embed_image(worksheet, row, path) {
            warn!("Could not embed image {} for {}: {}", path.display(), entry.record.item_no, err);
            exported.broken_images += 1;
            worksheet.write_string_with_format(row, 0, IMAGE_UNAVAILABLE, &formats.text)?;
        }
        Ok(())
    }
}

fn embed_image(worksheet: &mut Worksheet, row: u32, path: &Path) -> Result<(), XlsxError> {
    let image = Image::new(path)?;
    worksheet.insert_image_fit_to_cell(row, 0, &image, true)?;
    Ok(())
}
