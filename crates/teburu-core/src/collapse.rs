//! Cell collapsing
//!
//! Reduces a typed cell and its optional hyperlink to a JSON value.

use serde_json::{Map, Number, Value};

use crate::cell::CellValue;

/// Largest integer an f64 holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Output shape for cell values, selected by the `format` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// The value alone
    #[default]
    Simple,
    /// Always `{"value": ..., "link": ...}`
    Complex,
    /// The pair when the cell has a hyperlink, the value alone otherwise
    Dynamic,
}

impl Shape {
    /// Parse a query value. Unknown and empty values mean simple.
    pub fn from_query(name: &str) -> Self {
        match name {
            "complex" => Shape::Complex,
            "dynamic" => Shape::Dynamic,
            _ => Shape::Simple,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Simple => "simple",
            Shape::Complex => "complex",
            Shape::Dynamic => "dynamic",
        }
    }
}

/// Collapse a cell value and hyperlink into JSON for the given shape.
///
/// Total: a missing value becomes `""` and a missing link becomes `""` in
/// the structured pair.
pub fn collapse_cell(value: Option<&CellValue>, hyperlink: Option<&str>, shape: Shape) -> Value {
    let value = value.map(value_to_json).unwrap_or_else(|| Value::String(String::new()));
    let link = hyperlink.filter(|link| !link.is_empty());

    match (shape, link) {
        (Shape::Simple, _) => value,
        (Shape::Complex, link) => linked(value, link.unwrap_or_default()),
        (Shape::Dynamic, Some(link)) => linked(value, link),
        (Shape::Dynamic, None) => value,
    }
}

fn linked(value: Value, link: &str) -> Value {
    let mut pair = Map::with_capacity(2);
    pair.insert("value".to_string(), value);
    pair.insert("link".to_string(), Value::String(link.to_string()));
    Value::Object(pair)
}

fn value_to_json(value: &CellValue) -> Value {
    match value {
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Number(n) => number_to_json(*n),
        CellValue::String(s) | CellValue::Formula(s) | CellValue::Error(s) => {
            Value::String(s.clone())
        }
    }
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}
