//! Application state shared across handlers

use mirror_core::SyncEngine;
use std::sync::Arc;

/// State injected into every route handler
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SyncEngine>,
}

impl AppState {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self { engine }
    }
}
