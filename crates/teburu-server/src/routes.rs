//! Sheet endpoints
//!
//! Path segments are taken from the raw request path so the sheet name can be
//! unescaped (and rejected) with the same rules as the `columns` parameter.

use axum::extract::{RawQuery, State};
use axum::http::{header, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use teburu_core::{
    assemble_list, assemble_single, unescape, ColumnFilter, KeyCase, ProjectionOptions, Shape,
};
use teburu_sheets::range;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const SHEET_PREFIX: &str = "/api/sheet/";

/// Build the API routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/sheet/{id}/{sheet}", get(list_rows))
        .route("/api/sheet/{id}/{sheet}/{row}", get(get_row))
        .route("/health", get(health))
        .with_state(state)
}

/// Query options shared by both sheet endpoints. Only the first occurrence of
/// a parameter counts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SheetQuery {
    pub case: Option<String>,
    pub format: Option<String>,
    pub columns: Option<String>,
    pub pretty: Option<String>,
}

impl SheetQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = SheetQuery::default();
        let Some(raw) = raw else {
            return query;
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let slot = match key.as_ref() {
                "case" => &mut query.case,
                "format" => &mut query.format,
                "columns" => &mut query.columns,
                "pretty" => &mut query.pretty,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        query
    }

    pub fn options(&self) -> AppResult<ProjectionOptions> {
        let columns = match self.columns.as_deref() {
            Some(raw) => ColumnFilter::parse(raw)?,
            None => ColumnFilter::default(),
        };
        Ok(ProjectionOptions::new()
            .case(KeyCase::from_query(self.case.as_deref().unwrap_or_default()))
            .shape(Shape::from_query(self.format.as_deref().unwrap_or_default()))
            .columns(columns))
    }

    pub fn pretty(&self) -> bool {
        self.pretty.as_deref() == Some("true")
    }
}

/// Path parameters after percent-decoding
#[derive(Debug, Clone, PartialEq, Eq)]
struct SheetPath {
    spreadsheet_id: String,
    sheet: String,
    row: Option<String>,
}

impl SheetPath {
    fn from_uri(uri: &Uri) -> AppResult<Self> {
        let path = uri.path();
        let invalid = || AppError::InvalidPath(path.to_string());

        let mut segments = path.strip_prefix(SHEET_PREFIX).ok_or_else(invalid)?.split('/');
        let id = segments.next().ok_or_else(invalid)?;
        let sheet = segments.next().ok_or_else(invalid)?;
        let row = segments.next().map(str::to_string);
        if segments.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            spreadsheet_id: unescape(id)?,
            sheet: unescape(sheet)?,
            row,
        })
    }

    fn row_index(&self) -> AppResult<u32> {
        let raw = self.row.as_deref().unwrap_or_default();
        match raw.parse::<u32>() {
            Ok(row) if row > 0 => Ok(row),
            _ => Err(AppError::InvalidRow(raw.to_string())),
        }
    }
}

fn render_json<T: Serialize>(value: &T, pretty: bool) -> AppResult<Response> {
    let body = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// `GET /api/sheet/{id}/{sheet}`: every row until the first empty one
async fn list_rows(
    State(state): State<AppState>,
    uri: Uri,
    RawQuery(raw_query): RawQuery,
) -> AppResult<Response> {
    let path = SheetPath::from_uri(&uri)?;
    let query = SheetQuery::parse(raw_query.as_deref());
    let options = query.options()?;

    let spreadsheet = state
        .source
        .fetch(&path.spreadsheet_id, &range::list_ranges(&path.sheet))
        .await?;
    let records = assemble_list(&spreadsheet, &options)?;

    tracing::debug!(
        sheet = %path.sheet,
        case = options.case.as_str(),
        format = options.shape.as_str(),
        records = records.len(),
        "listed rows"
    );
    render_json(&records, query.pretty())
}

/// `GET /api/sheet/{id}/{sheet}/{row}`: one 1-based row
async fn get_row(
    State(state): State<AppState>,
    uri: Uri,
    RawQuery(raw_query): RawQuery,
) -> AppResult<Response> {
    let path = SheetPath::from_uri(&uri)?;
    let row = path.row_index()?;
    let query = SheetQuery::parse(raw_query.as_deref());
    let options = query.options()?;

    let spreadsheet = state
        .source
        .fetch(&path.spreadsheet_id, &range::row_ranges(&path.sheet, row))
        .await?;
    let record = assemble_single(&spreadsheet, &options)?;

    tracing::debug!(
        sheet = %path.sheet,
        row,
        case = options.case.as_str(),
        format = options.shape.as_str(),
        "fetched row"
    );
    render_json(&record, query.pretty())
}

async fn health() -> Json<&'static str> {
    Json("ok")
}
