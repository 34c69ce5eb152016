//! Cell and row types

/// The single value held by a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Boolean value (TRUE/FALSE)
    Bool(bool),

    /// Numeric value (dates and times arrive as serial numbers)
    Number(f64),

    /// String value
    String(String),

    /// Formula text, for sources that report it instead of a result
    Formula(String),

    /// Error text (#DIV/0!, #REF!, ...)
    Error(String),
}

impl CellValue {
    /// Build a value from the five optional fields a source may report.
    ///
    /// Sources populate at most one of them. If more than one is present the
    /// fields are read in the order bool, number, string, formula, error and
    /// the last populated one wins.
    pub fn from_variants(
        bool_value: Option<bool>,
        number_value: Option<f64>,
        string_value: Option<String>,
        formula_value: Option<String>,
        error_value: Option<String>,
    ) -> Option<Self> {
        let mut value = None;
        if let Some(b) = bool_value {
            value = Some(CellValue::Bool(b));
        }
        if let Some(n) = number_value {
            value = Some(CellValue::Number(n));
        }
        if let Some(s) = string_value {
            value = Some(CellValue::String(s));
        }
        if let Some(f) = formula_value {
            value = Some(CellValue::Formula(f));
        }
        if let Some(e) = error_value {
            value = Some(CellValue::Error(e));
        }
        value
    }

    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// The string payload, only for the string variant
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

/// A spreadsheet cell: an optional value plus an optional hyperlink.
///
/// A cell with neither is an untouched cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: Option<CellValue>,
    pub hyperlink: Option<String>,
}

impl Cell {
    /// Create a cell; an empty hyperlink is stored as no hyperlink
    pub fn new(value: Option<CellValue>, hyperlink: Option<String>) -> Self {
        Self {
            value,
            hyperlink: hyperlink.filter(|link| !link.is_empty()),
        }
    }

    /// An untouched cell
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach a hyperlink
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        let link = link.into();
        self.hyperlink = if link.is_empty() { None } else { Some(link) };
        self
    }

    pub fn value(&self) -> Option<&CellValue> {
        self.value.as_ref()
    }

    pub fn hyperlink(&self) -> Option<&str> {
        self.hyperlink.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

impl From<CellValue> for Cell {
    fn from(value: CellValue) -> Self {
        Cell::new(Some(value), None)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        CellValue::Bool(b).into()
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        CellValue::Number(n).into()
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        CellValue::string(s).into()
    }
}

/// An ordered run of cells, positionally aligned with the header.
///
/// Sources omit trailing empty cells, so a row may be shorter than the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// A row with no cells at all. Bulk projection stops here.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }
}

impl FromIterator<Cell> for Row {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Row {
            cells: iter.into_iter().collect(),
        }
    }
}
