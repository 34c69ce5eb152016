//! Fetched spreadsheet grid
//!
//! Mirrors the shape a fetch returns: sheets, then one block of grid data per
//! requested range, then rows.

use crate::cell::Row;

/// A fetched spreadsheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spreadsheet {
    pub sheets: Vec<Sheet>,
}

/// One sheet of a fetched spreadsheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// One entry per requested range, in request order
    pub data: Vec<GridData>,
}

/// The rows of one requested range
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridData {
    pub rows: Vec<Row>,
}

impl Spreadsheet {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Convenience for a single sheet built from ranges
    pub fn single(data: Vec<GridData>) -> Self {
        Self {
            sheets: vec![Sheet { data }],
        }
    }

    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }
}

impl Sheet {
    /// Rows of the range at `index`, empty when the range came back without data
    pub fn rows(&self, index: usize) -> &[Row] {
        self.data
            .get(index)
            .map(|grid| grid.rows.as_slice())
            .unwrap_or(&[])
    }
}

impl GridData {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}
