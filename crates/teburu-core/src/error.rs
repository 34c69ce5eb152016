//! Error types for the transformation engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors the engine can report. All of them are terminal for a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A sheet name or column token is not valid percent-encoding
    #[error("{0}")]
    InvalidEncoding(String),

    /// The fetch succeeded but returned no sheets
    #[error("no data found")]
    NoSheetsReturned,

    /// Single-row mode targeted a row without cells
    #[error("no data found")]
    NoDataAtRow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_messages() {
        assert_eq!(CoreError::NoSheetsReturned.to_string(), "no data found");
        assert_eq!(CoreError::NoDataAtRow.to_string(), "no data found");
    }
}
