use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::services::dataset_loader::DatasetSummary;

/// Immutable after startup; datasets are validated once before the listener binds.
#[derive(Clone)]
pub struct AppState {
    pub datasets: Arc<Vec<DatasetSummary>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(datasets: Vec<DatasetSummary>) -> Self {
        Self {
            datasets: Arc::new(datasets),
            started_at: Utc::now(),
        }
    }
}
