//! teburu-sheets: spreadsheet fetch client
//!
//! Reads cell values and hyperlinks for A1 ranges from the Google Sheets v4
//! REST API and converts them into the engine's [`Spreadsheet`] grid.
//!
//! # Architecture
//!
//! - `SheetSource`: the fetch capability the HTTP layer depends on
//! - `SheetsClient`: connection-pooled reqwest implementation
//! - `Credentials`: API key, static bearer token or OAuth refresh token
//! - `range`: `SHEET!A1:Z` style range builders
//!
//! [`Spreadsheet`]: teburu_core::Spreadsheet

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod range;
pub mod source;

pub use auth::Credentials;
pub use client::SheetsClient;
pub use config::SheetsClientConfig;
pub use error::{SheetsError, SheetsErrorCategory, SheetsResult};
pub use source::SheetSource;

/// Field mask restricting the payload to cell values and hyperlinks
pub const SHEET_FIELDS: &str =
    "sheets/data/rowData/values/hyperlink,sheets/data/rowData/values/effectiveValue";
