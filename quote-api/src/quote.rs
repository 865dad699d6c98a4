use axum::{
    extract::{Extension, State},
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use chrono::Utc;
use quote_order::{export_file_name, render_print_page, QuoteWorkbook, XLSX_MIME};

use crate::{error::AppError, middleware::SessionId, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/cart/export.xlsx", get(export_xlsx))
        .route("/v1/cart/print", get(print_page))
}

/// GET /v1/cart/export.xlsx
async fn export_xlsx(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let cart = state.with_session(id, |session| session.cart.clone()).await?;
    let now = Utc::now();

    let exported = QuoteWorkbook::new(
        &state.quote.title,
        &state.tiers,
        &state.quote.footer_lines,
        &state.images,
    )
    .render(&cart, now)?;

    let disposition = format!("attachment; filename=\"{}\"", export_file_name(now));
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exported.bytes,
    ))
}

/// GET /v1/cart/print
async fn print_page(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<Html<String>, AppError> {
    let cart = state.with_session(id, |session| session.cart.clone()).await?;
    let html = render_print_page(
        &state.quote.title,
        &state.tiers,
        &state.quote.footer_lines,
        &state.images,
        &cart,
        Utc::now(),
    )?;
    Ok(Html(html))
}
