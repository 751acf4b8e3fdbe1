//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::{EventBus, ScheduleManager};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for direct storage reads
    pub repository: Arc<dyn FullRepository>,
    /// Scheduling workflow owner; all mutations go through it
    pub manager: Arc<ScheduleManager>,
    /// Change-event bus backing the SSE feed
    pub events: EventBus,
}

impl AppState {
    /// Create application state around the given repository.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        let events = EventBus::new();
        let manager = Arc::new(ScheduleManager::with_events(
            repository.clone(),
            events.clone(),
        ));
        Self {
            repository,
            manager,
            events,
        }
    }
}
