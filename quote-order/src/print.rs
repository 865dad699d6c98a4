//! Printable HTML rendering of a quote cart.

use chrono::{DateTime, Utc};
use handlebars::{handlebars_helper, Handlebars, RenderError, TemplateError};
use quote_catalog::{ImageResolver, PriceQuote, PricingTier};
use serde::Serialize;

use crate::export::{NOT_AVAILABLE, NO_IMAGE};
use crate::models::QuoteCart;

const PRINT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>
  body { font-family: sans-serif; margin: 24px; }
  table { border-collapse: collapse; width: 100%; }
  th, td { border: 1px solid #999; padding: 6px; vertical-align: middle; }
  th { background: #d9e1f2; }
  td.price { text-align: right; }
  td.image img { max-width: 120px; max-height: 120px; }
  .footer p { margin: 4px 0; }
  @media print { .no-print { display: none; } }
</style>
</head>
<body>
<h1>{{title}}</h1>
<p>Date: {{date}}</p>
<button class="no-print" onclick="window.print()">Print</button>
<table>
  <thead>
    <tr>
      <th>Image</th><th>Item No</th><th>Description</th>
      {{#each tiers}}<th>{{this}}</th>{{/each}}
      <th>Note</th>
    </tr>
  </thead>
  <tbody>
    {{#each rows}}
    <tr>
      <td class="image">{{#if image_url}}<img src="{{image_url}}" alt="{{item_no}}">{{else}}{{@root.no_image}}{{/if}}</td>
      <td>{{item_no}}</td>
      <td>{{description}}</td>
      {{#each prices}}<td class="price">{{#if quoted}}{{money amount}}{{else}}{{@root.not_available}}{{/if}}</td>{{/each}}
      <td>{{note}}</td>
    </tr>
    {{/each}}
  </tbody>
</table>
<div class="footer">
  {{#each footer_lines}}<p>{{this}}</p>{{/each}}
</div>
</body>
</html>
"#;

#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("Invalid print template: {0}")]
    Template(#[from] Box<TemplateError>),

    #[error("Failed to render print page: {0}")]
    Render(#[from] RenderError),
}

#[derive(Serialize)]
struct PrintRow {
    item_no: String,
    description: String,
    note: String,
    image_url: Option<String>,
    prices: Vec<PrintPrice>,
}

#[derive(Serialize)]
struct PrintPrice {
    quoted: bool,
    amount: i64,
}

impl From<PriceQuote> for PrintPrice {
    fn from(price: PriceQuote) -> Self {
        match price {
            PriceQuote::Quoted(amount) => PrintPrice { quoted: true, amount },
            PriceQuote::NotQuotable => PrintPrice { quoted: false, amount: 0 },
        }
    }
}

#[derive(Serialize)]
struct PrintPage<'a> {
    title: &'a str,
    date: String,
    tiers: Vec<&'a str>,
    rows: Vec<PrintRow>,
    footer_lines: &'a [String],
    no_image: &'static str,
    not_available: &'static str,
}

/// Whole currency units with thousands separators, e.g. `12,345`
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        grouped.push('-');
    }
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

handlebars_helper!(money: |value: i64| format_amount(value));

/// Render the cart as a self-contained page meant for the browser's print dialog
pub fn render_print_page(
    title: &str,
    tiers: &[PricingTier],
    footer_lines: &[String],
    images: &ImageResolver,
    cart: &QuoteCart,
    at: DateTime<Utc>,
) -> Result<String, PrintError> {
    let mut registry = Handlebars::new();
    registry.register_helper("money", Box::new(money));
    registry
        .register_template_string("quote", PRINT_TEMPLATE)
        .map_err(Box::new)?;

    let rows = cart
        .entries()
        .iter()
        .map(|entry| PrintRow {
            item_no: entry.record.item_no.clone(),
            description: entry.record.description.clone(),
            note: entry.record.note.clone().unwrap_or_default(),
            image_url: images
                .images_for(&entry.record)
                .primary()
                .and_then(|path| images.url_for(path)),
            prices: (0..tiers.len())
                .map(|index| {
                    let price = entry
                        .prices
                        .get(index)
                        .map(|tier_price| tier_price.price)
                        .unwrap_or(PriceQuote::NotQuotable);
                    PrintPrice::from(price)
                })
                .collect(),
        })
        .collect();

    let page = PrintPage {
        title,
        date: at.format("%Y-%m-%d").to_string(),
        tiers: tiers.iter().map(|tier| tier.label.as_str()).collect(),
        rows,
        footer_lines,
        no_image: NO_IMAGE,
        not_available: NOT_AVAILABLE,
    };

    Ok(registry.render("quote", &page)?)
}
