//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! The domain records themselves already derive Serialize/Deserialize and
//! are returned as-is; this module covers request bodies, query parameters,
//! and the few composite responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{
    AvailabilityEntryId, AvailabilityMetadata, AvailabilityStatus, ConflictRecord,
    ConflictStatus, CustomerId, DayStatus, OrganizationId, ProjectId, ResourceId, ResourceKind,
    ScheduleRecord, ScheduleStatus, WorkOrderId,
};
use crate::services::DateSearchOutcome;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Storage backend status
    pub database: String,
}

// =============================================================================
// Work orders
// =============================================================================

/// Request body for registering a work order with the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkOrderRequest {
    pub organization_id: OrganizationId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    pub estimated_total_hours: f64,
}

// =============================================================================
// Schedules
// =============================================================================

/// Request body for creating a schedule from a work order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub organization_id: OrganizationId,
    pub work_order_id: WorkOrderId,
    pub project_id: ProjectId,
    pub scheduled_start_date: NaiveDate,
    #[serde(default)]
    pub assigned_crew_ids: Vec<ResourceId>,
    #[serde(default)]
    pub assigned_equipment_ids: Vec<ResourceId>,
    #[serde(default)]
    pub crew_leader_id: Option<ResourceId>,
}

/// Query parameters for listing schedules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSchedulesQuery {
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
}

/// Query parameters for the date-range overlap query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeQuery {
    pub organization_id: OrganizationId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Query parameters for per-resource schedule listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSchedulesQuery {
    pub organization_id: OrganizationId,
}

/// Schedule list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleListResponse {
    pub schedules: Vec<ScheduleRecord>,
    pub total: usize,
}

impl From<Vec<ScheduleRecord>> for ScheduleListResponse {
    fn from(schedules: Vec<ScheduleRecord>) -> Self {
        let total = schedules.len();
        Self { schedules, total }
    }
}

/// Request body for moving a schedule to a new start date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub new_start_date: NaiveDate,
    pub reason: String,
    pub actor: String,
}

/// Request body for a schedule status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: ScheduleStatus,
}

/// Request body for updating one work day's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayStatusRequest {
    pub status: DayStatus,
}

// =============================================================================
// Availability
// =============================================================================

/// Request body for a calendar range write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAvailabilityRequest {
    pub organization_id: OrganizationId,
    pub resource_id: ResourceId,
    pub resource_kind: ResourceKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: AvailabilityStatus,
    #[serde(flatten)]
    pub metadata: AvailabilityMetadata,
}

/// Response for a calendar range write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAvailabilityResponse {
    pub entry_ids: Vec<AvailabilityEntryId>,
    pub days_affected: usize,
}

/// Query parameters for a single-day availability read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub organization_id: OrganizationId,
    pub resource_id: ResourceId,
    pub date: NaiveDate,
}

/// Query parameters for a bulk calendar read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRangeQuery {
    pub organization_id: OrganizationId,
    /// Comma-separated resource IDs; omitted means all resources
    #[serde(default)]
    pub resource_ids: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AvailabilityRangeQuery {
    /// Parse the comma-separated resource filter.
    pub fn parsed_resource_ids(&self) -> Result<Option<Vec<ResourceId>>, String> {
        match &self.resource_ids {
            None => Ok(None),
            Some(raw) => raw
                .split(',')
                .filter(|part| !part.trim().is_empty())
                .map(|part| {
                    part.trim()
                        .parse::<i64>()
                        .map(ResourceId::new)
                        .map_err(|e| format!("Invalid resource id '{}': {}", part, e))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
        }
    }
}

// =============================================================================
// Conflicts
// =============================================================================

/// Query parameters for listing conflicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictsQuery {
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub status: Option<ConflictStatus>,
}

/// Conflict list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictListResponse {
    pub conflicts: Vec<ConflictRecord>,
    pub total: usize,
}

impl From<Vec<ConflictRecord>> for ConflictListResponse {
    fn from(conflicts: Vec<ConflictRecord>) -> Self {
        let total = conflicts.len();
        Self { conflicts, total }
    }
}

/// Request body for resolving a conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConflictRequest {
    pub resolution: String,
    pub actor: String,
    /// `resolved` (default) or `ignored`
    #[serde(default)]
    pub status: Option<ConflictStatus>,
}

// =============================================================================
// Optimal-date search
// =============================================================================

/// Request body for the feasible-start-date search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimalDateRequest {
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub required_crew_ids: Vec<ResourceId>,
    #[serde(default)]
    pub required_equipment_ids: Vec<ResourceId>,
    pub estimated_days: u32,
    #[serde(default)]
    pub preferred_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub search_window_days: Option<u32>,
}

/// Search response, flattened to the `found` convention collaborators use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimalDateResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_from_now: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<DateSearchOutcome> for OptimalDateResponse {
    fn from(outcome: DateSearchOutcome) -> Self {
        match outcome {
            DateSearchOutcome::Found {
                start_date,
                end_date,
                days_from_now,
            } => Self {
                found: true,
                start_date: Some(start_date),
                end_date: Some(end_date),
                days_from_now: Some(days_from_now),
                message: None,
            },
            DateSearchOutcome::Exhausted { message } => Self {
                found: false,
                start_date: None,
                end_date: None,
                days_from_now: None,
                message: Some(message),
            },
        }
    }
}

/// Query parameters for the SSE change-event feed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventsQuery {
    /// Restrict the feed to one organization
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
}
