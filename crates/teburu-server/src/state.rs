use std::sync::Arc;

use teburu_sheets::SheetSource;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn SheetSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn SheetSource>) -> Self {
        Self { source }
    }
}
