//! Fetch capability consumed by the HTTP layer

use async_trait::async_trait;
use teburu_core::Spreadsheet;

use crate::client::SheetsClient;
use crate::error::SheetsResult;

/// Something that can return the cells of A1 ranges of a spreadsheet.
///
/// The returned [`Spreadsheet`] holds one grid block per range, in the order
/// the ranges were given.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch(&self, spreadsheet_id: &str, ranges: &[String]) -> SheetsResult<Spreadsheet>;
}

#[async_trait]
impl SheetSource for SheetsClient {
    async fn fetch(&self, spreadsheet_id: &str, ranges: &[String]) -> SheetsResult<Spreadsheet> {
        self.get_ranges(spreadsheet_id, ranges).await
    }
}
