//! Tests for the HTTP layer: state wiring, DTO serialization conventions,
//! and error mapping.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::response::IntoResponse;

use fieldops_rust::api::{OrganizationId, ResourceId, ScheduleStatus, WorkOrderId};
use fieldops_rust::db::repositories::LocalRepository;
use fieldops_rust::http::dto::{
    AvailabilityRangeQuery, CreateScheduleRequest, OptimalDateResponse, SetAvailabilityRequest,
};
use fieldops_rust::http::error::AppError;
use fieldops_rust::http::{create_router, AppState};
use fieldops_rust::services::{DateSearchOutcome, SchedulingError};

fn state() -> AppState {
    let repo = Arc::new(LocalRepository::new()) as Arc<dyn fieldops_rust::db::FullRepository>;
    AppState::new(repo)
}

#[test]
fn test_router_builds_with_local_state() {
    let _router = create_router(state());
}

#[test]
fn test_state_shares_event_bus_with_manager() {
    let state = state();
    let mut rx = state.events.subscribe();

    // Events published through the manager surface on the state's bus.
    state.manager.events().publish(
        OrganizationId::new(1),
        fieldops_rust::services::ChangeKind::AvailabilityChanged,
        None,
        None,
    );
    assert!(rx.try_recv().is_ok());
}

#[test]
fn test_create_schedule_request_parses_snake_case() {
    let body = r#"{
        "organization_id": 1,
        "work_order_id": 42,
        "project_id": 7,
        "scheduled_start_date": "2026-09-07",
        "assigned_crew_ids": [1, 2],
        "assigned_equipment_ids": [20],
        "crew_leader_id": 1
    }"#;

    let request: CreateScheduleRequest = serde_json::from_str(body).unwrap();
    assert_eq!(request.work_order_id, WorkOrderId::new(42));
    assert_eq!(request.assigned_crew_ids.len(), 2);
    assert_eq!(request.crew_leader_id, Some(ResourceId::new(1)));
}

#[test]
fn test_create_schedule_request_defaults_empty_assignments() {
    // Zero-length crew and equipment lists are allowed, not validated.
    let body = r#"{
        "organization_id": 1,
        "work_order_id": 42,
        "project_id": 7,
        "scheduled_start_date": "2026-09-07"
    }"#;

    let request: CreateScheduleRequest = serde_json::from_str(body).unwrap();
    assert!(request.assigned_crew_ids.is_empty());
    assert!(request.assigned_equipment_ids.is_empty());
    assert!(request.crew_leader_id.is_none());
}

#[test]
fn test_set_availability_request_flattens_metadata() {
    let body = r#"{
        "organization_id": 1,
        "resource_id": 30,
        "resource_kind": "equipment",
        "start_date": "2026-09-07",
        "end_date": "2026-09-09",
        "status": "maintenance",
        "maintenance": {"description": "500-hour service"}
    }"#;

    let request: SetAvailabilityRequest = serde_json::from_str(body).unwrap();
    assert_eq!(
        request.metadata.maintenance.as_ref().unwrap().description,
        "500-hour service"
    );
}

#[test]
fn test_availability_range_query_parses_id_list() {
    let query = AvailabilityRangeQuery {
        organization_id: OrganizationId::new(1),
        resource_ids: Some("1, 2,30".to_string()),
        start: "2026-09-07".parse().unwrap(),
        end: "2026-09-09".parse().unwrap(),
    };

    let ids = query.parsed_resource_ids().unwrap().unwrap();
    assert_eq!(
        ids,
        vec![ResourceId::new(1), ResourceId::new(2), ResourceId::new(30)]
    );

    let bad = AvailabilityRangeQuery {
        resource_ids: Some("1,x".to_string()),
        ..query
    };
    assert!(bad.parsed_resource_ids().is_err());
}

#[test]
fn test_optimal_date_response_flattening() {
    let found: OptimalDateResponse = DateSearchOutcome::Found {
        start_date: "2026-09-10".parse().unwrap(),
        end_date: "2026-09-14".parse().unwrap(),
        days_from_now: 3,
    }
    .into();
    assert!(found.found);
    assert_eq!(found.days_from_now, Some(3));
    assert!(found.message.is_none());

    let exhausted: OptimalDateResponse = DateSearchOutcome::Exhausted {
        message: "no window".to_string(),
    }
    .into();
    assert!(!exhausted.found);
    assert!(exhausted.start_date.is_none());
    assert_eq!(exhausted.message.as_deref(), Some("no window"));
}

#[test]
fn test_error_status_mapping() {
    let not_found = AppError::from(SchedulingError::NotFound("schedule 9".to_string()))
        .into_response();
    assert_eq!(not_found.status(), axum::http::StatusCode::NOT_FOUND);

    let bad_input = AppError::from(SchedulingError::InvalidDuration("0 hours".to_string()))
        .into_response();
    assert_eq!(bad_input.status(), axum::http::StatusCode::BAD_REQUEST);

    let transition = AppError::from(SchedulingError::InvalidTransition {
        from: ScheduleStatus::Completed,
        to: ScheduleStatus::InProgress,
    })
    .into_response();
    assert_eq!(transition.status(), axum::http::StatusCode::CONFLICT);

    let storage = AppError::from(fieldops_rust::db::RepositoryError::QueryError(
        "disk on fire".to_string(),
    ))
    .into_response();
    assert_eq!(
        storage.status(),
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    );
}
