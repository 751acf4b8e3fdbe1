//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Work orders (external collaborator records)
        .route("/work-orders", post(handlers::create_work_order))
        .route("/work-orders/{work_order_id}", get(handlers::get_work_order))
        // Schedule lifecycle
        .route("/schedules", post(handlers::create_schedule))
        .route("/schedules", get(handlers::list_schedules))
        .route("/schedules/by-date-range", get(handlers::get_schedules_by_date_range))
        .route("/schedules/{schedule_id}", get(handlers::get_schedule))
        .route("/schedules/{schedule_id}/reschedule", post(handlers::reschedule_schedule))
        .route("/schedules/{schedule_id}/status", post(handlers::transition_schedule))
        .route("/schedules/{schedule_id}/days/{day_number}", post(handlers::update_day_status))
        // Per-resource listings
        .route("/crews/{crew_id}/schedules", get(handlers::get_crew_schedules))
        .route("/equipment/{equipment_id}/schedules", get(handlers::get_equipment_schedules))
        // Resource calendar
        .route("/availability", post(handlers::set_availability))
        .route("/availability", get(handlers::get_availability))
        .route("/availability/range", get(handlers::query_availability))
        // Conflicts
        .route("/conflicts", get(handlers::list_conflicts))
        .route("/conflicts/{conflict_id}/resolve", post(handlers::resolve_conflict))
        // Optimal-date search
        .route("/scheduling/optimal-date", post(handlers::find_optimal_date))
        // Change-event feed
        .route("/events", get(handlers::stream_events));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo =
            Arc::new(LocalRepository::new()) as Arc<dyn crate::db::repository::FullRepository>;
        let state = AppState::new(repo);
        let _router = create_router(state);
        // If we got here, router was created successfully
    }
}
