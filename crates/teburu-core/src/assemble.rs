//! List and single-row assembly
//!
//! Both modes take the fetched spreadsheet as-is and only read its first
//! sheet. List mode expects one range whose first row is the header. Single
//! mode expects two ranges: the header row, then the target row.

use crate::error::{CoreError, Result};
use crate::grid::{Sheet, Spreadsheet};
use crate::header::resolve_headers;
use crate::project::{ProjectionOptions, Projector, Record};

/// Project every data row of the first range, stopping at the first row
/// without cells. Rows after such a gap are not returned.
pub fn assemble_list(
    spreadsheet: &Spreadsheet,
    options: &ProjectionOptions,
) -> Result<Vec<Record>> {
    let sheet = first_sheet(spreadsheet)?;
    let rows = sheet.rows(0);

    let Some((header_row, data_rows)) = rows.split_first() else {
        return Ok(Vec::new());
    };

    let header = resolve_headers(&header_row.cells);
    Ok(Projector::new(&header, options).project_until_gap(data_rows))
}

/// Project the single target row fetched as the second range
pub fn assemble_single(spreadsheet: &Spreadsheet, options: &ProjectionOptions) -> Result<Record> {
    let sheet = first_sheet(spreadsheet)?;

    let header = sheet
        .rows(0)
        .first()
        .map(|row| resolve_headers(&row.cells))
        .unwrap_or_default();

    let row = sheet
        .rows(1)
        .first()
        .filter(|row| !row.is_empty())
        .ok_or(CoreError::NoDataAtRow)?;

    Ok(Projector::new(&header, options).project(row))
}

fn first_sheet(spreadsheet: &Spreadsheet) -> Result<&Sheet> {
    spreadsheet.first_sheet().ok_or(CoreError::NoSheetsReturned)
}
