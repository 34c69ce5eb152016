//! Transformation engine for teburu
//!
//! Turns a fetched grid of typed spreadsheet cells into JSON records keyed by
//! header. Everything in this crate is synchronous and allocation-only: the
//! HTTP layer fetches a [`Spreadsheet`], builds [`ProjectionOptions`] from the
//! query string and calls [`assemble_list`] or [`assemble_single`].
//!
//! # Pipeline
//!
//! - [`resolve_headers`]: first row of the range -> ordered column names
//! - [`KeyCase`]: raw header -> output key
//! - [`ColumnFilter`]: optional allow-list of raw or cased names
//! - [`collapse_cell`]: typed cell + hyperlink -> JSON value for a [`Shape`]
//! - [`Projector`]: one row -> one [`Record`]

pub mod assemble;
pub mod case;
pub mod cell;
pub mod collapse;
pub mod columns;
pub mod error;
pub mod grid;
pub mod header;
pub mod project;

pub use assemble::{assemble_list, assemble_single};
pub use case::{select_case_fn, KeyCase};
pub use cell::{Cell, CellValue, Row};
pub use collapse::{collapse_cell, Shape};
pub use columns::{unescape, ColumnFilter};
pub use error::{CoreError, Result};
pub use grid::{GridData, Sheet, Spreadsheet};
pub use header::{resolve_headers, Header};
pub use project::{project_row, ProjectionOptions, Projector, Record};
