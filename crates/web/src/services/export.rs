//! Spreadsheet export of supplier records.

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use supplierdb_core::{EXPORT_COLUMNS, Namespace, SupplierRecord};

/// Worksheet name in exported workbooks.
pub const SHEET_NAME: &str = "Suppliers";

/// MIME type of `.xlsx` files.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Encode records as an `.xlsx` workbook.
///
/// One worksheet with a bold header row laid out by [`EXPORT_COLUMNS`],
/// followed by one row per record. Absent optional fields are left blank.
///
/// # Errors
///
/// Returns `XlsxError` if the workbook cannot be assembled.
pub fn encode_workbook(records: &[SupplierRecord]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, column) in (0u16..).zip(EXPORT_COLUMNS.iter()) {
        sheet.set_column_width(col, f64::from(column.width))?;
        sheet.write_string_with_format(0, col, column.header, &header)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (row, record) in (1u32..).zip(records) {
        for (col, cell) in (0u16..).zip(record.to_export_row()) {
            if let Some(value) = cell {
                sheet.write_string(row, col, value)?;
            }
        }
    }

    workbook.save_to_buffer()
}

/// Download filename for a tenant's export.
#[must_use]
pub fn export_filename(namespace: &Namespace) -> String {
    format!("{namespace}-suppliers.xlsx")
}
