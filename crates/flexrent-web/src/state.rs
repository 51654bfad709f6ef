use std::sync::Arc;

use flexrent_core::{IncomeExtractor, TableBackend};

/// Shared application state accessible from all handlers. Read-only after
/// startup.
pub struct AppState {
    pub backend: Arc<dyn TableBackend>,
    pub extractor: IncomeExtractor,
    pub threshold: f64,
}
