//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! schedule manager or the repository for the actual work.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;

use super::dto::{
    AvailabilityQuery, AvailabilityRangeQuery, ConflictListResponse, ConflictsQuery,
    CreateScheduleRequest, CreateWorkOrderRequest, DateRangeQuery, DayStatusRequest, EventsQuery,
    HealthResponse, ListSchedulesQuery, OptimalDateRequest, OptimalDateResponse,
    ResolveConflictRequest, RescheduleRequest, ResourceSchedulesQuery, ScheduleListResponse,
    SetAvailabilityRequest, SetAvailabilityResponse, TransitionRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    AvailabilitySnapshot, ConflictId, ConflictRecord, ConflictStatus, DateRange,
    ResourceAvailabilityEntry, ResourceId, ScheduleId, ScheduleRecord, WorkOrder, WorkOrderId,
    WorkOrderStatus,
};
use crate::db::repository::{FullRepository, WorkOrderRepository};
use crate::services::{CreateScheduleParams, DateSearchRequest};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the storage
/// backend is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Work Orders
// =============================================================================

/// POST /v1/work-orders
///
/// Register a work order with the scheduler (the platform's record of an
/// approved job carrying an hour estimate).
pub async fn create_work_order(
    State(state): State<AppState>,
    Json(request): Json<CreateWorkOrderRequest>,
) -> Result<(StatusCode, Json<WorkOrder>), AppError> {
    if !request.estimated_total_hours.is_finite() || request.estimated_total_hours <= 0.0 {
        return Err(AppError::BadRequest(format!(
            "estimated_total_hours must be a positive number, got {}",
            request.estimated_total_hours
        )));
    }

    let mut work_order = WorkOrder {
        id: None,
        organization_id: request.organization_id,
        project_id: request.project_id,
        customer_id: request.customer_id,
        estimated_total_hours: request.estimated_total_hours,
        status: WorkOrderStatus::Pending,
        scheduled_start_date: None,
        scheduled_end_date: None,
    };
    let id = state.repository.store_work_order(&work_order).await?;
    work_order.id = Some(id);

    Ok((StatusCode::CREATED, Json(work_order)))
}

/// GET /v1/work-orders/{work_order_id}
pub async fn get_work_order(
    State(state): State<AppState>,
    Path(work_order_id): Path<i64>,
) -> HandlerResult<WorkOrder> {
    let work_order = state
        .repository
        .get_work_order(WorkOrderId::new(work_order_id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            other => other.into(),
        })?;
    Ok(Json(work_order))
}

// =============================================================================
// Schedules
// =============================================================================

/// POST /v1/schedules
///
/// Create a schedule for a work order. Conflict detection runs as part of
/// the workflow but never fails the request; detected conflicts are
/// persisted and queryable via /v1/conflicts.
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleRecord>), AppError> {
    let schedule = state
        .manager
        .create_schedule(CreateScheduleParams {
            organization_id: request.organization_id,
            work_order_id: request.work_order_id,
            project_id: request.project_id,
            scheduled_start_date: request.scheduled_start_date,
            assigned_crew_ids: request.assigned_crew_ids,
            assigned_equipment_ids: request.assigned_equipment_ids,
            crew_leader_id: request.crew_leader_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(schedule)))
}

/// GET /v1/schedules
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(query): Query<ListSchedulesQuery>,
) -> HandlerResult<ScheduleListResponse> {
    let schedules = state
        .manager
        .list_schedules(query.organization_id, query.status)
        .await?;
    Ok(Json(schedules.into()))
}

/// GET /v1/schedules/by-date-range
///
/// Schedules overlapping the `[start, end]` day range.
pub async fn get_schedules_by_date_range(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> HandlerResult<ScheduleListResponse> {
    let range = DateRange::new(query.start, query.end).map_err(AppError::BadRequest)?;
    let schedules = state
        .manager
        .get_schedules_by_date_range(query.organization_id, range)
        .await?;
    Ok(Json(schedules.into()))
}

/// GET /v1/schedules/{schedule_id}
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<i64>,
) -> HandlerResult<ScheduleRecord> {
    let schedule = state
        .manager
        .get_schedule(ScheduleId::new(schedule_id))
        .await?;
    Ok(Json(schedule))
}

/// POST /v1/schedules/{schedule_id}/reschedule
pub async fn reschedule_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<i64>,
    Json(request): Json<RescheduleRequest>,
) -> HandlerResult<ScheduleRecord> {
    let schedule = state
        .manager
        .reschedule(
            ScheduleId::new(schedule_id),
            request.new_start_date,
            request.reason,
            request.actor,
        )
        .await?;
    Ok(Json(schedule))
}

/// POST /v1/schedules/{schedule_id}/status
pub async fn transition_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<i64>,
    Json(request): Json<TransitionRequest>,
) -> HandlerResult<ScheduleRecord> {
    let schedule = state
        .manager
        .transition(ScheduleId::new(schedule_id), request.status)
        .await?;
    Ok(Json(schedule))
}

/// POST /v1/schedules/{schedule_id}/days/{day_number}
pub async fn update_day_status(
    State(state): State<AppState>,
    Path((schedule_id, day_number)): Path<(i64, u32)>,
    Json(request): Json<DayStatusRequest>,
) -> HandlerResult<ScheduleRecord> {
    let schedule = state
        .manager
        .update_day_status(ScheduleId::new(schedule_id), day_number, request.status)
        .await?;
    Ok(Json(schedule))
}

/// GET /v1/crews/{crew_id}/schedules
pub async fn get_crew_schedules(
    State(state): State<AppState>,
    Path(crew_id): Path<i64>,
    Query(query): Query<ResourceSchedulesQuery>,
) -> HandlerResult<ScheduleListResponse> {
    let schedules = state
        .manager
        .get_crew_schedules(query.organization_id, ResourceId::new(crew_id))
        .await?;
    Ok(Json(schedules.into()))
}

/// GET /v1/equipment/{equipment_id}/schedules
pub async fn get_equipment_schedules(
    State(state): State<AppState>,
    Path(equipment_id): Path<i64>,
    Query(query): Query<ResourceSchedulesQuery>,
) -> HandlerResult<ScheduleListResponse> {
    let schedules = state
        .manager
        .get_equipment_schedules(query.organization_id, ResourceId::new(equipment_id))
        .await?;
    Ok(Json(schedules.into()))
}

// =============================================================================
// Availability
// =============================================================================

/// POST /v1/availability
///
/// Range write: set one status across `[start_date, end_date]` for a
/// resource (leave requests, maintenance flags, manual reservations).
pub async fn set_availability(
    State(state): State<AppState>,
    Json(request): Json<SetAvailabilityRequest>,
) -> HandlerResult<SetAvailabilityResponse> {
    let range =
        DateRange::new(request.start_date, request.end_date).map_err(AppError::BadRequest)?;
    let entry_ids = state
        .manager
        .set_resource_availability(
            request.organization_id,
            request.resource_id,
            request.resource_kind,
            range,
            request.status,
            request.metadata,
        )
        .await?;

    let days_affected = entry_ids.len();
    Ok(Json(SetAvailabilityResponse {
        entry_ids,
        days_affected,
    }))
}

/// GET /v1/availability
///
/// Point read of one resource-day; days with no stored entry come back
/// available (open-world default).
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> HandlerResult<AvailabilitySnapshot> {
    let snapshot = state
        .manager
        .get_availability(query.organization_id, query.resource_id, query.date)
        .await?;
    Ok(Json(snapshot))
}

/// GET /v1/availability/range
///
/// Bulk calendar read for rendering.
pub async fn query_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityRangeQuery>,
) -> HandlerResult<Vec<ResourceAvailabilityEntry>> {
    let range = DateRange::new(query.start, query.end).map_err(AppError::BadRequest)?;
    let resource_ids = query.parsed_resource_ids().map_err(AppError::BadRequest)?;
    let entries = state
        .manager
        .query_availability(query.organization_id, resource_ids.as_deref(), range)
        .await?;
    Ok(Json(entries))
}

// =============================================================================
// Conflicts
// =============================================================================

/// GET /v1/conflicts
pub async fn list_conflicts(
    State(state): State<AppState>,
    Query(query): Query<ConflictsQuery>,
) -> HandlerResult<ConflictListResponse> {
    let conflicts = state
        .manager
        .get_conflicts(query.organization_id, query.status)
        .await?;
    Ok(Json(conflicts.into()))
}

/// POST /v1/conflicts/{conflict_id}/resolve
pub async fn resolve_conflict(
    State(state): State<AppState>,
    Path(conflict_id): Path<i64>,
    Json(request): Json<ResolveConflictRequest>,
) -> HandlerResult<ConflictRecord> {
    let status = request.status.unwrap_or(ConflictStatus::Resolved);
    let conflict = state
        .manager
        .resolve_conflict(
            ConflictId::new(conflict_id),
            request.resolution,
            request.actor,
            status,
        )
        .await?;
    Ok(Json(conflict))
}

// =============================================================================
// Optimal-Date Search
// =============================================================================

/// POST /v1/scheduling/optimal-date
///
/// First-fit search for the earliest date where every required resource is
/// free for the full job duration. Exhausting the window is a 200 response
/// with `found: false`, not an error.
pub async fn find_optimal_date(
    State(state): State<AppState>,
    Json(request): Json<OptimalDateRequest>,
) -> HandlerResult<OptimalDateResponse> {
    let outcome = state
        .manager
        .find_optimal_start_date(
            request.organization_id,
            &DateSearchRequest {
                required_crew_ids: request.required_crew_ids,
                required_equipment_ids: request.required_equipment_ids,
                estimated_days: request.estimated_days,
                preferred_start_date: request.preferred_start_date,
                search_window_days: request.search_window_days,
            },
        )
        .await?;
    Ok(Json(outcome.into()))
}

// =============================================================================
// Change-Event Feed
// =============================================================================

/// GET /v1/events
///
/// Stream scheduling mutations via Server-Sent Events (SSE). Subscribers
/// receive identifiers only and re-read through the query endpoints; the
/// feed is a convenience over polling, not a correctness requirement.
pub async fn stream_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.events.subscribe();
    let organization_filter = query.organization_id;

    let stream = async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if organization_filter.is_none_or(|org| event.organization_id == org) {
                        let data = serde_json::to_string(&event).unwrap_or_default();
                        yield Ok(Event::default().event("change").data(data));
                    }
                }
                // Slow consumers skip missed events and keep listening.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
