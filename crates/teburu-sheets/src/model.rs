//! Sheets API payload types
//!
//! Only the fields selected by [`SHEET_FIELDS`](crate::SHEET_FIELDS) are
//! modelled. Absent arrays deserialize as empty.

use serde::Deserialize;
use teburu_core::{Cell, CellValue, GridData, Row, Sheet, Spreadsheet};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpreadsheet {
    #[serde(default)]
    pub sheets: Vec<ApiSheet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSheet {
    #[serde(default)]
    pub data: Vec<ApiGridData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGridData {
    #[serde(default)]
    pub row_data: Vec<ApiRowData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRowData {
    #[serde(default)]
    pub values: Vec<ApiCellData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCellData {
    #[serde(default)]
    pub effective_value: Option<ExtendedValue>,
    #[serde(default)]
    pub hyperlink: Option<String>,
}

/// A cell's effective value; the API sets at most one field
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedValue {
    pub number_value: Option<f64>,
    pub string_value: Option<String>,
    pub bool_value: Option<bool>,
    pub formula_value: Option<String>,
    pub error_value: Option<ErrorValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorValue {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorValue {
    /// The message, or the error type when there is no message
    pub fn text(self) -> String {
        if self.message.is_empty() {
            self.kind
        } else {
            self.message
        }
    }
}

impl ExtendedValue {
    pub fn into_cell_value(self) -> Option<CellValue> {
        CellValue::from_variants(
            self.bool_value,
            self.number_value,
            self.string_value,
            self.formula_value,
            self.error_value.map(ErrorValue::text),
        )
    }
}

impl From<ApiCellData> for Cell {
    fn from(cell: ApiCellData) -> Self {
        let value = cell.effective_value.and_then(ExtendedValue::into_cell_value);
        Cell::new(value, cell.hyperlink)
    }
}

impl From<ApiRowData> for Row {
    fn from(row: ApiRowData) -> Self {
        row.values.into_iter().map(Cell::from).collect()
    }
}

impl From<ApiGridData> for GridData {
    fn from(grid: ApiGridData) -> Self {
        GridData::new(grid.row_data.into_iter().map(Row::from).collect())
    }
}

impl From<ApiSheet> for Sheet {
    fn from(sheet: ApiSheet) -> Self {
        Sheet {
            data: sheet.data.into_iter().map(GridData::from).collect(),
        }
    }
}

impl From<ApiSpreadsheet> for Spreadsheet {
    fn from(spreadsheet: ApiSpreadsheet) -> Self {
        Spreadsheet::new(spreadsheet.sheets.into_iter().map(Sheet::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Spreadsheet {
        serde_json::from_str::<ApiSpreadsheet>(json).unwrap().into()
    }

    #[test]
    fn test_typed_values() {
        let spreadsheet = parse(
            r#"{"sheets":[{"data":[{"rowData":[{"values":[
                {"effectiveValue":{"stringValue":"Ada"},"hyperlink":"http://x"},
                {"effectiveValue":{"numberValue":37}},
                {"effectiveValue":{"boolValue":false}},
                {"effectiveValue":{"errorValue":{"type":"DIVIDE_BY_ZERO","message":"Function DIVIDE parameter 2 cannot be zero."}}},
                {"effectiveValue":{"errorValue":{"type":"REF"}}},
                {}
            ]}]}]}]}"#,
        );

        let row = &spreadsheet.sheets[0].data[0].rows[0];
        assert_eq!(row.cells[0], Cell::from("Ada").with_link("http://x"));
        assert_eq!(row.cells[1].value, Some(CellValue::Number(37.0)));
        assert_eq!(row.cells[2].value, Some(CellValue::Bool(false)));
        assert_eq!(
            row.cells[3].value,
            Some(CellValue::Error("Function DIVIDE parameter 2 cannot be zero.".into()))
        );
        assert_eq!(row.cells[4].value, Some(CellValue::Error("REF".into())));
        assert!(row.cells[5].is_empty());
    }

    #[test]
    fn test_empty_rows_and_ranges() {
        let spreadsheet = parse(
            r#"{"sheets":[{"data":[
                {"rowData":[{"values":[{"effectiveValue":{"stringValue":"h"}}]},{}]},
                {}
            ]}]}"#,
        );

        let sheet = &spreadsheet.sheets[0];
        assert_eq!(sheet.data.len(), 2);
        assert!(sheet.data[0].rows[1].is_empty());
        assert!(sheet.data[1].rows.is_empty());
    }

    #[test]
    fn test_no_sheets() {
        assert!(parse("{}").sheets.is_empty());
    }
}
