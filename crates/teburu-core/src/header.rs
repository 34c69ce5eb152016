//! Header resolution

use crate::cell::Cell;

/// Ordered column names taken from the first row of a range.
///
/// Names are distinct by position only; two columns may share a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Header {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Header {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Derive the header from the cells of the first row.
///
/// Headers are string-only: collection stops at the first cell that is
/// empty or holds anything other than a string, so the result is never
/// longer than `cells`.
pub fn resolve_headers(cells: &[Cell]) -> Header {
    cells
        .iter()
        .map_while(|cell| cell.value().and_then(|v| v.as_str()))
        .collect()
}
