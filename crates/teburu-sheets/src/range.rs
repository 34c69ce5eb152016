//! A1 range builders
//!
//! Every range spans columns A through Z; wider sheets are truncated.

/// Last column fetched
pub const LAST_COLUMN: char = 'Z';

/// Every row of a sheet: `SHEET!A1:Z`
pub fn full_sheet(sheet: &str) -> String {
    format!("{}!A1:{}", sheet, LAST_COLUMN)
}

/// The header row of a sheet: `SHEET!A1:Z1`
pub fn header_row(sheet: &str) -> String {
    single_row(sheet, 1)
}

/// One 1-based row of a sheet: `SHEET!A{row}:Z{row}`
pub fn single_row(sheet: &str, row: u32) -> String {
    format!("{}!A{}:{}{}", sheet, row, LAST_COLUMN, row)
}

/// Ranges for list mode
pub fn list_ranges(sheet: &str) -> Vec<String> {
    vec![full_sheet(sheet)]
}

/// Ranges for single-row mode: header first, then the target row
pub fn row_ranges(sheet: &str, row: u32) -> Vec<String> {
    vec![header_row(sheet), single_row(sheet, row)]
}
