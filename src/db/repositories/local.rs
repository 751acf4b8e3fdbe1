//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap structures, providing fast, deterministic, and
//! isolated execution.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::api::{
    AvailabilityEntryId, AvailabilityMetadata, AvailabilityStatus, ConflictId, ConflictRecord,
    ConflictStatus, DateRange, OrganizationId, ResourceAvailabilityEntry, ResourceId,
    ResourceKind, ScheduleId, ScheduleRecord, ScheduleStatus, WorkOrder, WorkOrderId,
};
use crate::db::repository::{
    AvailabilityRepository, ConflictRepository, FullRepository, RepositoryError,
    RepositoryResult, ScheduleRepository, WorkOrderRepository,
};

/// In-memory local repository.
///
/// Stores all data in HashMaps behind a single `RwLock`, making it ideal for
/// unit tests and local development that need isolation and speed. The
/// `(organization, resource, date)`-keyed availability map gives the
/// at-most-one-entry-per-resource-day invariant structurally: an upsert can
/// only overwrite.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    work_orders: HashMap<WorkOrderId, WorkOrder>,
    schedules: HashMap<ScheduleId, ScheduleRecord>,
    availability: HashMap<(OrganizationId, ResourceId, NaiveDate), ResourceAvailabilityEntry>,
    conflicts: HashMap<ConflictId, ConflictRecord>,

    // ID counters
    next_work_order_id: i64,
    next_schedule_id: i64,
    next_entry_id: i64,
    next_conflict_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            work_orders: HashMap::new(),
            schedules: HashMap::new(),
            availability: HashMap::new(),
            conflicts: HashMap::new(),
            next_work_order_id: 1,
            next_schedule_id: 1,
            next_entry_id: 1,
            next_conflict_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap();
        data.is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
    }

    /// Number of schedule records stored.
    pub fn schedule_count(&self) -> usize {
        self.data.read().unwrap().schedules.len()
    }

    /// Number of availability entries stored.
    pub fn availability_entry_count(&self) -> usize {
        self.data.read().unwrap().availability.len()
    }

    /// Helper to check health and return an error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        let data = self.data.read().unwrap();
        if !data.is_healthy {
            return Err(RepositoryError::ConnectionError(
                "Repository is not healthy".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkOrderRepository for LocalRepository {
    async fn store_work_order(&self, work_order: &WorkOrder) -> RepositoryResult<WorkOrderId> {
        self.check_health()?;

        let mut data = self.data.write().unwrap();
        let id = WorkOrderId::new(data.next_work_order_id);
        data.next_work_order_id += 1;

        let mut stored = work_order.clone();
        stored.id = Some(id);
        data.work_orders.insert(id, stored);

        Ok(id)
    }

    async fn get_work_order(&self, work_order_id: WorkOrderId) -> RepositoryResult<WorkOrder> {
        self.check_health()?;

        let data = self.data.read().unwrap();
        data.work_orders
            .get(&work_order_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("Work order {} not found", work_order_id))
            })
    }

    async fn update_work_order(&self, work_order: &WorkOrder) -> RepositoryResult<()> {
        self.check_health()?;

        let id = work_order.id.ok_or_else(|| {
            RepositoryError::ValidationError("Cannot update a work order without an ID".to_string())
        })?;

        let mut data = self.data.write().unwrap();
        if !data.work_orders.contains_key(&id) {
            return Err(RepositoryError::NotFound(format!(
                "Work order {} not found",
                id
            )));
        }
        data.work_orders.insert(id, work_order.clone());
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for LocalRepository {
    async fn store_schedule(&self, schedule: &ScheduleRecord) -> RepositoryResult<ScheduleId> {
        self.check_health()?;

        let mut data = self.data.write().unwrap();
        let id = ScheduleId::new(data.next_schedule_id);
        data.next_schedule_id += 1;

        let mut stored = schedule.clone();
        stored.id = Some(id);
        data.schedules.insert(id, stored);

        Ok(id)
    }

    async fn get_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<ScheduleRecord> {
        self.check_health()?;

        let data = self.data.read().unwrap();
        data.schedules.get(&schedule_id).cloned().ok_or_else(|| {
            RepositoryError::NotFound(format!("Schedule {} not found", schedule_id))
        })
    }

    async fn update_schedule(&self, schedule: &ScheduleRecord) -> RepositoryResult<()> {
        self.check_health()?;

        let id = schedule.id.ok_or_else(|| {
            RepositoryError::ValidationError("Cannot update a schedule without an ID".to_string())
        })?;

        let mut data = self.data.write().unwrap();
        if !data.schedules.contains_key(&id) {
            return Err(RepositoryError::NotFound(format!(
                "Schedule {} not found",
                id
            )));
        }
        data.schedules.insert(id, schedule.clone());
        Ok(())
    }

    async fn list_schedules(
        &self,
        organization_id: OrganizationId,
        status: Option<ScheduleStatus>,
    ) -> RepositoryResult<Vec<ScheduleRecord>> {
        self.check_health()?;

        let data = self.data.read().unwrap();
        let mut schedules: Vec<ScheduleRecord> = data
            .schedules
            .values()
            .filter(|s| s.organization_id == organization_id)
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect();
        schedules.sort_by_key(|s| s.id);
        Ok(schedules)
    }

    async fn get_schedules_by_date_range(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> RepositoryResult<Vec<ScheduleRecord>> {
        self.check_health()?;

        let data = self.data.read().unwrap();
        let mut schedules: Vec<ScheduleRecord> = data
            .schedules
            .values()
            .filter(|s| s.organization_id == organization_id)
            .filter(|s| s.date_range().overlaps(&range))
            .cloned()
            .collect();
        schedules.sort_by_key(|s| s.id);
        Ok(schedules)
    }

    async fn get_schedules_for_resource(
        &self,
        organization_id: OrganizationId,
        resource_kind: ResourceKind,
        resource_id: ResourceId,
    ) -> RepositoryResult<Vec<ScheduleRecord>> {
        self.check_health()?;

        let data = self.data.read().unwrap();
        let mut schedules: Vec<ScheduleRecord> = data
            .schedules
            .values()
            .filter(|s| s.organization_id == organization_id)
            .filter(|s| match resource_kind {
                ResourceKind::Crew => s.assigned_crew_ids.contains(&resource_id),
                ResourceKind::Equipment => s.assigned_equipment_ids.contains(&resource_id),
            })
            .cloned()
            .collect();
        schedules.sort_by_key(|s| s.id);
        Ok(schedules)
    }
}

#[async_trait]
impl AvailabilityRepository for LocalRepository {
    async fn upsert_availability(
        &self,
        entry: &ResourceAvailabilityEntry,
    ) -> RepositoryResult<AvailabilityEntryId> {
        self.check_health()?;

        let mut data = self.data.write().unwrap();
        let key = (entry.organization_id, entry.resource_id, entry.date);

        // Overwrite keeps the existing entry's ID so callers holding ids
        // from a prior range write stay valid.
        let id = match data.availability.get(&key).and_then(|e| e.id) {
            Some(existing) => existing,
            None => {
                let id = AvailabilityEntryId::new(data.next_entry_id);
                data.next_entry_id += 1;
                id
            }
        };

        let mut stored = entry.clone();
        stored.id = Some(id);
        data.availability.insert(key, stored);

        Ok(id)
    }

    async fn get_availability_entry(
        &self,
        organization_id: OrganizationId,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<ResourceAvailabilityEntry>> {
        self.check_health()?;

        let data = self.data.read().unwrap();
        Ok(data
            .availability
            .get(&(organization_id, resource_id, date))
            .cloned())
    }

    async fn query_availability(
        &self,
        organization_id: OrganizationId,
        resource_ids: Option<&[ResourceId]>,
        range: DateRange,
    ) -> RepositoryResult<Vec<ResourceAvailabilityEntry>> {
        self.check_health()?;

        let data = self.data.read().unwrap();
        let mut entries: Vec<ResourceAvailabilityEntry> = data
            .availability
            .values()
            .filter(|e| e.organization_id == organization_id)
            .filter(|e| range.contains(e.date))
            .filter(|e| resource_ids.is_none_or(|ids| ids.contains(&e.resource_id)))
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.resource_id, e.date));
        Ok(entries)
    }

    async fn release_schedule_reservations(
        &self,
        organization_id: OrganizationId,
        schedule_id: ScheduleId,
    ) -> RepositoryResult<usize> {
        self.check_health()?;

        let mut data = self.data.write().unwrap();
        let mut released = 0;
        for entry in data.availability.values_mut() {
            if entry.organization_id == organization_id
                && entry.metadata.linked_schedule_id == Some(schedule_id)
            {
                entry.status = AvailabilityStatus::Available;
                entry.metadata = AvailabilityMetadata::default();
                released += 1;
            }
        }
        Ok(released)
    }
}

#[async_trait]
impl ConflictRepository for LocalRepository {
    async fn store_conflict(&self, conflict: &ConflictRecord) -> RepositoryResult<ConflictId> {
        self.check_health()?;

        let mut data = self.data.write().unwrap();
        let id = ConflictId::new(data.next_conflict_id);
        data.next_conflict_id += 1;

        let mut stored = conflict.clone();
        stored.id = Some(id);
        data.conflicts.insert(id, stored);

        Ok(id)
    }

    async fn get_conflict(&self, conflict_id: ConflictId) -> RepositoryResult<ConflictRecord> {
        self.check_health()?;

        let data = self.data.read().unwrap();
        data.conflicts.get(&conflict_id).cloned().ok_or_else(|| {
            RepositoryError::NotFound(format!("Conflict {} not found", conflict_id))
        })
    }

    async fn update_conflict(&self, conflict: &ConflictRecord) -> RepositoryResult<()> {
        self.check_health()?;

        let id = conflict.id.ok_or_else(|| {
            RepositoryError::ValidationError("Cannot update a conflict without an ID".to_string())
        })?;

        let mut data = self.data.write().unwrap();
        if !data.conflicts.contains_key(&id) {
            return Err(RepositoryError::NotFound(format!(
                "Conflict {} not found",
                id
            )));
        }
        data.conflicts.insert(id, conflict.clone());
        Ok(())
    }

    async fn list_conflicts(
        &self,
        organization_id: OrganizationId,
        status: Option<ConflictStatus>,
    ) -> RepositoryResult<Vec<ConflictRecord>> {
        self.check_health()?;

        let data = self.data.read().unwrap();
        let mut conflicts: Vec<ConflictRecord> = data
            .conflicts
            .values()
            .filter(|c| c.organization_id == organization_id)
            .filter(|c| status.is_none_or(|wanted| c.status == wanted))
            .cloned()
            .collect();
        conflicts.sort_by_key(|c| c.id);
        Ok(conflicts)
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read().unwrap();
        Ok(data.is_healthy)
    }
}
