//! Repository traits for abstracting storage operations.
//!
//! These traits define the interface for all storage operations, allowing
//! different implementations (in-memory, SQL, ...) to be swapped via
//! dependency injection. The scheduling services only ever see
//! [`FullRepository`].

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::api::{
    AvailabilityEntryId, ConflictId, ConflictRecord, ConflictStatus, DateRange, OrganizationId,
    ResourceAvailabilityEntry, ResourceId, ResourceKind, ScheduleId, ScheduleRecord,
    ScheduleStatus, WorkOrder, WorkOrderId,
};

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Data validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<String> for RepositoryError {
    fn from(s: String) -> Self {
        RepositoryError::InternalError(s)
    }
}

impl From<&str> for RepositoryError {
    fn from(s: &str) -> Self {
        RepositoryError::InternalError(s.to_string())
    }
}

/// Work-order storage.
///
/// Work orders are owned by the wider platform; this trait covers the slice
/// the scheduler reads (hour estimates) and writes back (computed dates).
#[async_trait]
pub trait WorkOrderRepository: Send + Sync {
    /// Store a new work order and return its assigned ID.
    async fn store_work_order(&self, work_order: &WorkOrder) -> RepositoryResult<WorkOrderId>;

    /// Retrieve a work order by ID.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the work order doesn't exist
    async fn get_work_order(&self, work_order_id: WorkOrderId) -> RepositoryResult<WorkOrder>;

    /// Overwrite an existing work order (write-through of scheduled dates).
    async fn update_work_order(&self, work_order: &WorkOrder) -> RepositoryResult<()>;
}

/// Schedule-record storage.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Store a new schedule record and return its assigned ID.
    async fn store_schedule(&self, schedule: &ScheduleRecord) -> RepositoryResult<ScheduleId>;

    /// Retrieve a complete schedule record by ID.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the schedule doesn't exist
    async fn get_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<ScheduleRecord>;

    /// Overwrite an existing schedule record in place.
    ///
    /// Used by reschedule and status transitions; the record keeps its ID.
    async fn update_schedule(&self, schedule: &ScheduleRecord) -> RepositoryResult<()>;

    /// List schedules for an organization, optionally filtered by status.
    async fn list_schedules(
        &self,
        organization_id: OrganizationId,
        status: Option<ScheduleStatus>,
    ) -> RepositoryResult<Vec<ScheduleRecord>>;

    /// Schedules whose `[start, end]` range overlaps the given range.
    async fn get_schedules_by_date_range(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> RepositoryResult<Vec<ScheduleRecord>>;

    /// Schedules that have the given resource among their assignments.
    async fn get_schedules_for_resource(
        &self,
        organization_id: OrganizationId,
        resource_kind: ResourceKind,
        resource_id: ResourceId,
    ) -> RepositoryResult<Vec<ScheduleRecord>>;
}

/// Resource-calendar storage.
///
/// Deliberately a dumb per-day store: no cross-resource validation happens
/// here (that is the conflict detector's job).
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Insert or overwrite the entry for `(resource, date)`.
    ///
    /// At most one entry exists per resource-day; an existing entry keeps
    /// its ID and is overwritten in place.
    async fn upsert_availability(
        &self,
        entry: &ResourceAvailabilityEntry,
    ) -> RepositoryResult<AvailabilityEntryId>;

    /// Point read of one resource-day cell.
    ///
    /// # Returns
    /// * `Ok(None)` - No stored entry (callers apply the open-world default)
    async fn get_availability_entry(
        &self,
        organization_id: OrganizationId,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<ResourceAvailabilityEntry>>;

    /// Bulk read of entries in a date range.
    ///
    /// # Arguments
    /// * `resource_ids` - When `None`, all entries of the organization in
    ///   range are returned
    async fn query_availability(
        &self,
        organization_id: OrganizationId,
        resource_ids: Option<&[ResourceId]>,
        range: DateRange,
    ) -> RepositoryResult<Vec<ResourceAvailabilityEntry>>;

    /// Overwrite every entry reserved by the given schedule back to
    /// `Available`, clearing the link.
    ///
    /// Calendar entries are never deleted; release is an overwrite.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of entries released
    async fn release_schedule_reservations(
        &self,
        organization_id: OrganizationId,
        schedule_id: ScheduleId,
    ) -> RepositoryResult<usize>;
}

/// Conflict-record storage.
#[async_trait]
pub trait ConflictRepository: Send + Sync {
    /// Store a new conflict record and return its assigned ID.
    async fn store_conflict(&self, conflict: &ConflictRecord) -> RepositoryResult<ConflictId>;

    /// Retrieve a conflict record by ID.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the conflict doesn't exist
    async fn get_conflict(&self, conflict_id: ConflictId) -> RepositoryResult<ConflictRecord>;

    /// Overwrite an existing conflict record (human resolution).
    async fn update_conflict(&self, conflict: &ConflictRecord) -> RepositoryResult<()>;

    /// List conflicts for an organization, optionally filtered by status.
    async fn list_conflicts(
        &self,
        organization_id: OrganizationId,
        status: Option<ConflictStatus>,
    ) -> RepositoryResult<Vec<ConflictRecord>>;
}

/// Umbrella trait combining every storage concern of the subsystem.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust and allow
/// sharing across threads.
#[async_trait]
pub trait FullRepository:
    WorkOrderRepository + ScheduleRepository + AvailabilityRepository + ConflictRepository
{
    /// Check if the storage backend is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if the backend is healthy
    /// - `Ok(false)` if unhealthy but no error occurred
    async fn health_check(&self) -> RepositoryResult<bool>;
}
