use std::sync::Arc;

use crate::model::Scorer;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<Scorer>,
}

impl AppState {
    pub fn new(scorer: Arc<Scorer>) -> Self {
        Self { scorer }
    }
}
