pub mod export;
pub mod models;
pub mod print;
pub mod session;

pub use export::{export_file_name, ExportError, ExportedQuote, QuoteWorkbook, XLSX_MIME};
pub use models::{CartEntry, QuoteCart};
pub use print::{format_amount, render_print_page, PrintError};
pub use session::{QuoteSession, SessionError, SessionStore};
