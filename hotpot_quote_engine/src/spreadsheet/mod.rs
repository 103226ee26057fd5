//! Spreadsheet rendering for accepted quotes.
//!
//! Rendering is split in two. [`render_quote_sheet`] lays the record out as a grid of typed [`Cell`]s; it is pure and
//! cannot fail. The grid is then handed to a [`SpreadsheetEncoder`], which produces the binary document. The default
//! encoder, [`XlsxEncoder`], writes Office Open XML workbooks.
//!
//! Money and quantities are always numeric cells so that the customer service team can sum and filter on them.
mod xlsx;

use hpq_common::Fen;
use log::*;
pub use xlsx::XlsxEncoder;

use crate::{errors::ExportError, quote_types::QuoteRecord};

pub const SHEET_NAME: &str = "报价确认单";
pub const EXPORT_EXTENSION: &str = "xlsx";
pub const ADDRESS_PLACEHOLDER: &str = "未填写";
pub const TABLE_HEADER: [&str; 6] = ["序号", "菜品", "规格", "单价", "数量", "小计"];
pub const CONFIRMATION_LABEL: &str = "确认总额";
/// The column holding subtotals in the item table.
pub const SUBTOTAL_COLUMN: usize = 5;
const COLUMN_WIDTHS: [f64; 6] = [12.0, 28.0, 16.0, 10.0, 8.0, 12.0];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text<S: Into<String>>(s: S) -> Self {
        Self::Text(s.into())
    }

    pub fn money(amount: Fen) -> Self {
        Self::Number(amount.as_yuan())
    }
}

/// A single worksheet: a name, a grid of cells and the preferred column widths (in characters).
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
    pub column_widths: Vec<f64>,
}

/// The document-format capability. Implementations turn a [`Sheet`] into the bytes of a downloadable document.
#[cfg_attr(test, mockall::automock)]
pub trait SpreadsheetEncoder {
    fn encode(&self, sheet: &Sheet) -> Result<Vec<u8>, ExportError>;
}

/// An encoded export, ready to be written to disk or sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedExport {
    /// `<quote id>.xlsx`
    pub filename: String,
    pub bytes: Vec<u8>,
    /// The standard base64 encoding of `bytes`
    pub base64: String,
}

pub fn export_filename(record: &QuoteRecord) -> String {
    format!("{}.{EXPORT_EXTENSION}", record.id)
}

/// Lay out the confirmation sheet for a record.
pub fn render_quote_sheet(record: &QuoteRecord) -> Sheet {
    let address = record.customer_address.as_deref().unwrap_or(ADDRESS_PLACEHOLDER);
    let mut rows = vec![
        vec![Cell::text("订单编号"), Cell::text(record.id.as_str())],
        vec![Cell::text("下单时间"), Cell::text(record.order_time.as_str())],
        vec![Cell::text("提交时间"), Cell::text(record.received_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())],
        vec![Cell::text("客户姓名"), Cell::text(record.customer_name.as_str())],
        vec![Cell::text("联系电话"), Cell::text(record.customer_contact.as_str())],
        vec![Cell::text("配送地址"), Cell::text(address)],
        vec![Cell::text("订单总额"), Cell::money(record.total)],
        vec![],
        TABLE_HEADER.iter().map(|h| Cell::text(*h)).collect(),
    ];
    rows.extend(record.items.iter().enumerate().map(|(i, item)| {
        vec![
            Cell::Number((i + 1) as f64),
            Cell::text(item.name.as_str()),
            Cell::text(item.spec.as_str()),
            Cell::money(item.price),
            Cell::Number(f64::from(item.qty)),
            Cell::money(item.subtotal),
        ]
    }));
    rows.push(vec![]);
    let mut confirmation = vec![Cell::Empty; SUBTOTAL_COLUMN + 1];
    confirmation[SUBTOTAL_COLUMN - 1] = Cell::text(CONFIRMATION_LABEL);
    confirmation[SUBTOTAL_COLUMN] = Cell::money(record.total);
    rows.push(confirmation);
    Sheet { name: SHEET_NAME.to_string(), rows, column_widths: COLUMN_WIDTHS.to_vec() }
}

/// Render and encode the export for a record.
pub fn render_export<E: SpreadsheetEncoder + ?Sized>(
    record: &QuoteRecord,
    encoder: &E,
) -> Result<RenderedExport, ExportError> {
    let sheet = render_quote_sheet(record);
    let bytes = encoder.encode(&sheet)?;
    trace!("📊️ Encoded {} bytes for quote {}", bytes.len(), record.id);
    let base64 = base64::encode(&bytes);
    Ok(RenderedExport { filename: export_filename(record), bytes, base64 })
}
