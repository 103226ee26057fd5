use rust_xlsxwriter::{ColNum, RowNum, Workbook, XlsxError};

use super::{Cell, Sheet, SpreadsheetEncoder};
use crate::errors::ExportError;

/// Encodes sheets as `.xlsx` workbooks with a single worksheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxEncoder;

impl From<XlsxError> for ExportError {
    fn from(e: XlsxError) -> Self {
        Self::Encoding(e.to_string())
    }
}

impl SpreadsheetEncoder for XlsxEncoder {
    fn encode(&self, sheet: &Sheet) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name.as_str())?;
        for (col, width) in sheet.column_widths.iter().enumerate() {
            worksheet.set_column_width(col_num(col)?, *width)?;
        }
        for (r, row) in sheet.rows.iter().enumerate() {
            let r = RowNum::try_from(r).map_err(|_| ExportError::Encoding(format!("Row {r} is out of range")))?;
            for (c, cell) in row.iter().enumerate() {
                let c = col_num(c)?;
                match cell {
                    Cell::Empty => {},
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, s.as_str())?;
                    },
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    },
                }
            }
        }
        let bytes = workbook.save_to_buffer()?;
        Ok(bytes)
    }
}

fn col_num(c: usize) -> Result<ColNum, ExportError> {
    ColNum::try_from(c).map_err(|_| ExportError::Encoding(format!("Column {c} is out of range")))
}
