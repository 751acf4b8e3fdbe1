//! Schedule lifecycle orchestration.
//!
//! [`ScheduleManager`] owns the multi-step create/reschedule sequences and
//! the schedule state machine, invoking the timeline calculator and the
//! conflict detector as part of its workflow.
//!
//! # Concurrency
//!
//! Every scheduling mutation is a read-compute-write sequence across the
//! work-order, schedule, calendar, and conflict stores. Mutations for one
//! organization serialize behind a per-organization async mutex held for
//! the whole sequence, so two jobs cannot both claim the same search slot
//! before either writes its reservation. Reads never take the lock and may
//! observe a mutation mid-flight; conflicts are reconciled by the advisory
//! detector, not by read-time locking.

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{
    add_days, AvailabilityEntryId, AvailabilityMetadata, AvailabilitySnapshot,
    AvailabilityStatus, ConflictId, ConflictRecord, ConflictStatus, DailyTask, DateRange,
    DayStatus, OrganizationId, ProjectId, ResourceAvailabilityEntry, ResourceId, ResourceKind,
    RescheduleEvent, ScheduleId, ScheduleRecord, ScheduleStatus, WorkOrderId, WorkOrderStatus,
};
use crate::db::repository::{
    AvailabilityRepository, ConflictRepository, FullRepository, ScheduleRepository,
    WorkOrderRepository,
};
use crate::services::events::{ChangeKind, EventBus};
use crate::services::optimal_date::{DateSearchOutcome, DateSearchRequest};
use crate::services::{
    calendar, conflicts, map_lookup_err, optimal_date, timeline, SchedulingError,
    SchedulingResult,
};

/// Inputs for creating a schedule from an approved work order.
#[derive(Debug, Clone)]
pub struct CreateScheduleParams {
    pub organization_id: OrganizationId,
    pub work_order_id: WorkOrderId,
    pub project_id: ProjectId,
    pub scheduled_start_date: NaiveDate,
    pub assigned_crew_ids: Vec<ResourceId>,
    pub assigned_equipment_ids: Vec<ResourceId>,
    pub crew_leader_id: Option<ResourceId>,
}

/// Owner of the work-order scheduling workflow.
pub struct ScheduleManager {
    repo: Arc<dyn FullRepository>,
    events: EventBus,
    org_locks: Mutex<HashMap<OrganizationId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ScheduleManager {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self::with_events(repo, EventBus::new())
    }

    pub fn with_events(repo: Arc<dyn FullRepository>, events: EventBus) -> Self {
        Self {
            repo,
            events,
            org_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The change-event bus mutations publish to.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn repository(&self) -> &Arc<dyn FullRepository> {
        &self.repo
    }

    /// The mutation lock for one organization, created on first use.
    fn org_lock(&self, organization_id: OrganizationId) -> Arc<tokio::sync::Mutex<()>> {
        self.org_locks
            .lock()
            .entry(organization_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    // ==================== Mutations ====================

    /// Create a schedule for a work order.
    ///
    /// Loads the work order's hour estimate, computes the timeline, builds
    /// the day-by-day task skeleton, persists the record, writes the dates
    /// back to the work order, reserves the assigned equipment on the
    /// calendar, and records any conflicts the chosen dates surfaced.
    ///
    /// Crew availability is checked by the detector but crew members are
    /// not reserved on the calendar; only equipment is. Detected conflicts
    /// never fail the call; the schedule is returned alongside persisted
    /// unresolved conflict records. Empty crew or equipment lists are
    /// allowed; detection then simply has nothing to check.
    ///
    /// # Errors
    /// * `SchedulingError::NotFound` - The work order does not exist
    /// * `SchedulingError::InvalidDuration` - The work order's hour
    ///   estimate is not a positive finite number
    pub async fn create_schedule(
        &self,
        params: CreateScheduleParams,
    ) -> SchedulingResult<ScheduleRecord> {
        let lock = self.org_lock(params.organization_id);
        let _guard = lock.lock().await;

        let mut work_order = self
            .repo
            .get_work_order(params.work_order_id)
            .await
            .map_err(map_lookup_err)?;

        let timeline = timeline::calculate_timeline(work_order.estimated_total_hours)?;
        let start = params.scheduled_start_date;
        let end = add_days(start, timeline.total_scheduled_days);

        let mut schedule = ScheduleRecord {
            id: None,
            organization_id: params.organization_id,
            work_order_id: params.work_order_id,
            project_id: params.project_id,
            estimated_total_hours: work_order.estimated_total_hours,
            work_days: timeline.work_days,
            buffer_days: timeline.buffer_days,
            total_scheduled_days: timeline.total_scheduled_days,
            scheduled_start_date: start,
            scheduled_end_date: end,
            daily_tasks: build_daily_tasks(start, &timeline.daily_hours),
            assigned_crew_ids: params.assigned_crew_ids,
            assigned_equipment_ids: params.assigned_equipment_ids,
            crew_leader_id: params.crew_leader_id,
            status: ScheduleStatus::Scheduled,
            reschedule_history: Vec::new(),
        };

        let schedule_id = self.repo.store_schedule(&schedule).await?;
        schedule.id = Some(schedule_id);

        work_order.status = WorkOrderStatus::Scheduled;
        work_order.scheduled_start_date = Some(start);
        work_order.scheduled_end_date = Some(end);
        self.repo.update_work_order(&work_order).await?;

        // Detect against the calendar as it stands before this schedule's
        // own reservation lands; the range write below overwrites any
        // pre-existing closed entries on the reserved days.
        let detected = conflicts::detect_conflicts(self.repo.as_ref(), &schedule).await?;
        self.reserve_equipment(&schedule).await?;
        let conflict_count = self.persist_conflicts(&schedule, detected).await?;

        log::info!(
            "Created schedule {} for work order {} ({} work days + {} buffer, {} conflicts)",
            schedule_id,
            schedule.work_order_id,
            schedule.work_days,
            schedule.buffer_days,
            conflict_count
        );
        self.events.publish(
            schedule.organization_id,
            ChangeKind::ScheduleCreated,
            Some(schedule_id),
            None,
        );

        Ok(schedule)
    }

    /// Move a schedule to a new start date.
    ///
    /// The duration is not recalculated, only shifted: the end date is
    /// recomputed from the existing `total_scheduled_days`, every daily
    /// task moves to `new_start + i` with its status reset to `Pending`,
    /// and the prior dates are captured in the reschedule history. The
    /// equipment reservations move with the schedule and conflicts are
    /// re-detected against the new dates.
    pub async fn reschedule(
        &self,
        schedule_id: ScheduleId,
        new_start: NaiveDate,
        reason: impl Into<String>,
        actor: impl Into<String>,
    ) -> SchedulingResult<ScheduleRecord> {
        let mut schedule = self
            .repo
            .get_schedule(schedule_id)
            .await
            .map_err(map_lookup_err)?;
        let lock = self.org_lock(schedule.organization_id);
        let _guard = lock.lock().await;
        // Re-read under the lock; a competing mutation may have landed.
        schedule = self
            .repo
            .get_schedule(schedule_id)
            .await
            .map_err(map_lookup_err)?;

        let movable = schedule.status == ScheduleStatus::Rescheduled
            || schedule.status.can_transition(ScheduleStatus::Rescheduled);
        if !movable {
            return Err(SchedulingError::InvalidTransition {
                from: schedule.status,
                to: ScheduleStatus::Rescheduled,
            });
        }

        let original_start = schedule.scheduled_start_date;
        let original_end = schedule.scheduled_end_date;

        schedule.scheduled_start_date = new_start;
        schedule.scheduled_end_date = add_days(new_start, schedule.total_scheduled_days);
        for (i, task) in schedule.daily_tasks.iter_mut().enumerate() {
            task.date = add_days(new_start, i as u32);
            task.status = DayStatus::Pending;
        }
        schedule.reschedule_history.push(RescheduleEvent {
            original_start,
            original_end,
            reason: reason.into(),
            actor: actor.into(),
            timestamp: Utc::now(),
        });
        schedule.status = ScheduleStatus::Rescheduled;

        self.repo.update_schedule(&schedule).await?;

        // Move the calendar reservations along with the schedule,
        // re-detecting against the new dates before the new reservation
        // overwrites them.
        self.repo
            .release_schedule_reservations(schedule.organization_id, schedule_id)
            .await?;
        let detected = conflicts::detect_conflicts(self.repo.as_ref(), &schedule).await?;
        self.reserve_equipment(&schedule).await?;

        let mut work_order = self
            .repo
            .get_work_order(schedule.work_order_id)
            .await
            .map_err(map_lookup_err)?;
        work_order.scheduled_start_date = Some(schedule.scheduled_start_date);
        work_order.scheduled_end_date = Some(schedule.scheduled_end_date);
        self.repo.update_work_order(&work_order).await?;

        let conflict_count = self.persist_conflicts(&schedule, detected).await?;

        log::info!(
            "Rescheduled schedule {} from {} to {} ({} conflicts)",
            schedule_id,
            original_start,
            new_start,
            conflict_count
        );
        self.events.publish(
            schedule.organization_id,
            ChangeKind::ScheduleRescheduled,
            Some(schedule_id),
            None,
        );

        Ok(schedule)
    }

    /// Apply a schedule status transition.
    ///
    /// Transitions follow the state machine on [`ScheduleStatus`];
    /// cancelling a schedule explicitly releases its equipment
    /// reservations (calendar entries are shared state, not owned, so
    /// nothing cascades).
    ///
    /// # Errors
    /// * `SchedulingError::InvalidTransition` - The move is not legal
    pub async fn transition(
        &self,
        schedule_id: ScheduleId,
        new_status: ScheduleStatus,
    ) -> SchedulingResult<ScheduleRecord> {
        let mut schedule = self
            .repo
            .get_schedule(schedule_id)
            .await
            .map_err(map_lookup_err)?;
        let lock = self.org_lock(schedule.organization_id);
        let _guard = lock.lock().await;
        schedule = self
            .repo
            .get_schedule(schedule_id)
            .await
            .map_err(map_lookup_err)?;

        if !schedule.status.can_transition(new_status) {
            return Err(SchedulingError::InvalidTransition {
                from: schedule.status,
                to: new_status,
            });
        }

        schedule.status = new_status;
        self.repo.update_schedule(&schedule).await?;

        if new_status == ScheduleStatus::Cancelled {
            let released = self
                .repo
                .release_schedule_reservations(schedule.organization_id, schedule_id)
                .await?;
            log::info!(
                "Cancelled schedule {}, released {} calendar reservations",
                schedule_id,
                released
            );
        }

        self.events.publish(
            schedule.organization_id,
            ChangeKind::ScheduleStatusChanged,
            Some(schedule_id),
            None,
        );

        Ok(schedule)
    }

    /// Update the status of one work day (day-completion bookkeeping).
    ///
    /// # Errors
    /// * `SchedulingError::NotFound` - No task with that day number
    /// * `SchedulingError::InvalidInput` - The schedule is terminal
    pub async fn update_day_status(
        &self,
        schedule_id: ScheduleId,
        day_number: u32,
        status: DayStatus,
    ) -> SchedulingResult<ScheduleRecord> {
        let mut schedule = self
            .repo
            .get_schedule(schedule_id)
            .await
            .map_err(map_lookup_err)?;
        let lock = self.org_lock(schedule.organization_id);
        let _guard = lock.lock().await;
        schedule = self
            .repo
            .get_schedule(schedule_id)
            .await
            .map_err(map_lookup_err)?;

        if schedule.is_terminal() {
            return Err(SchedulingError::InvalidInput(format!(
                "Schedule {} is {:?}; day statuses can no longer change",
                schedule_id, schedule.status
            )));
        }

        let task = schedule
            .daily_tasks
            .iter_mut()
            .find(|t| t.day_number == day_number)
            .ok_or_else(|| {
                SchedulingError::NotFound(format!(
                    "Schedule {} has no day {}",
                    schedule_id, day_number
                ))
            })?;
        task.status = status;

        self.repo.update_schedule(&schedule).await?;
        self.events.publish(
            schedule.organization_id,
            ChangeKind::DayStatusChanged,
            Some(schedule_id),
            None,
        );

        Ok(schedule)
    }

    /// Write resource availability across a day range and notify.
    ///
    /// This is the calendar range-write (crew leave requests, maintenance
    /// flags, manual reservations) routed through the manager so that
    /// subscribers hear about it.
    pub async fn set_resource_availability(
        &self,
        organization_id: OrganizationId,
        resource_id: ResourceId,
        resource_kind: ResourceKind,
        range: DateRange,
        status: AvailabilityStatus,
        metadata: AvailabilityMetadata,
    ) -> SchedulingResult<Vec<AvailabilityEntryId>> {
        let entry_ids = calendar::set_availability(
            self.repo.as_ref(),
            organization_id,
            resource_id,
            resource_kind,
            range,
            status,
            metadata,
        )
        .await?;

        self.events
            .publish(organization_id, ChangeKind::AvailabilityChanged, None, None);
        Ok(entry_ids)
    }

    /// Resolve or ignore a conflict record.
    ///
    /// Conflict records are only ever mutated this way; they are an audit
    /// trail, so resolution annotates rather than deletes.
    ///
    /// # Errors
    /// * `SchedulingError::NotFound` - The conflict does not exist
    /// * `SchedulingError::InvalidInput` - `status` is `Unresolved`
    pub async fn resolve_conflict(
        &self,
        conflict_id: ConflictId,
        resolution: impl Into<String>,
        actor: impl Into<String>,
        status: ConflictStatus,
    ) -> SchedulingResult<ConflictRecord> {
        if status == ConflictStatus::Unresolved {
            return Err(SchedulingError::InvalidInput(
                "Resolution must set the conflict to resolved or ignored".to_string(),
            ));
        }

        let mut conflict = self
            .repo
            .get_conflict(conflict_id)
            .await
            .map_err(map_lookup_err)?;

        conflict.status = status;
        conflict.resolution = Some(resolution.into());
        conflict.resolved_by = Some(actor.into());
        conflict.resolved_at = Some(Utc::now());
        self.repo.update_conflict(&conflict).await?;

        self.events.publish(
            conflict.organization_id,
            ChangeKind::ConflictResolved,
            None,
            Some(conflict_id),
        );

        Ok(conflict)
    }

    // ==================== Queries ====================

    pub async fn get_schedule(&self, schedule_id: ScheduleId) -> SchedulingResult<ScheduleRecord> {
        self.repo
            .get_schedule(schedule_id)
            .await
            .map_err(map_lookup_err)
    }

    pub async fn list_schedules(
        &self,
        organization_id: OrganizationId,
        status: Option<ScheduleStatus>,
    ) -> SchedulingResult<Vec<ScheduleRecord>> {
        Ok(self.repo.list_schedules(organization_id, status).await?)
    }

    /// Schedules whose day range overlaps the given range.
    pub async fn get_schedules_by_date_range(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> SchedulingResult<Vec<ScheduleRecord>> {
        Ok(self
            .repo
            .get_schedules_by_date_range(organization_id, range)
            .await?)
    }

    pub async fn get_crew_schedules(
        &self,
        organization_id: OrganizationId,
        crew_id: ResourceId,
    ) -> SchedulingResult<Vec<ScheduleRecord>> {
        Ok(self
            .repo
            .get_schedules_for_resource(organization_id, ResourceKind::Crew, crew_id)
            .await?)
    }

    pub async fn get_equipment_schedules(
        &self,
        organization_id: OrganizationId,
        equipment_id: ResourceId,
    ) -> SchedulingResult<Vec<ScheduleRecord>> {
        Ok(self
            .repo
            .get_schedules_for_resource(organization_id, ResourceKind::Equipment, equipment_id)
            .await?)
    }

    pub async fn get_conflicts(
        &self,
        organization_id: OrganizationId,
        status: Option<ConflictStatus>,
    ) -> SchedulingResult<Vec<ConflictRecord>> {
        Ok(self.repo.list_conflicts(organization_id, status).await?)
    }

    pub async fn get_availability(
        &self,
        organization_id: OrganizationId,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> SchedulingResult<AvailabilitySnapshot> {
        calendar::get_availability(self.repo.as_ref(), organization_id, resource_id, date).await
    }

    pub async fn query_availability(
        &self,
        organization_id: OrganizationId,
        resource_ids: Option<&[ResourceId]>,
        range: DateRange,
    ) -> SchedulingResult<Vec<ResourceAvailabilityEntry>> {
        calendar::query_range(self.repo.as_ref(), organization_id, resource_ids, range).await
    }

    /// First feasible start date for a resource set, scanning from today.
    pub async fn find_optimal_start_date(
        &self,
        organization_id: OrganizationId,
        request: &DateSearchRequest,
    ) -> SchedulingResult<DateSearchOutcome> {
        optimal_date::find_optimal_start_date(
            self.repo.as_ref(),
            organization_id,
            request,
            Utc::now().date_naive(),
        )
        .await
    }

    // ==================== Internals ====================

    /// Reserve every assigned equipment unit across the schedule's full
    /// `[start, end]` range, linked back to the schedule.
    async fn reserve_equipment(&self, schedule: &ScheduleRecord) -> SchedulingResult<()> {
        for &equipment_id in &schedule.assigned_equipment_ids {
            calendar::set_availability(
                self.repo.as_ref(),
                schedule.organization_id,
                equipment_id,
                ResourceKind::Equipment,
                schedule.date_range(),
                AvailabilityStatus::Scheduled,
                AvailabilityMetadata {
                    linked_schedule_id: schedule.id,
                    ..Default::default()
                },
            )
            .await?;
        }
        Ok(())
    }

    /// Persist detected conflicts and notify subscribers.
    async fn persist_conflicts(
        &self,
        schedule: &ScheduleRecord,
        detected: Vec<ConflictRecord>,
    ) -> SchedulingResult<usize> {
        let count = detected.len();
        for conflict in detected {
            let conflict_id = self.repo.store_conflict(&conflict).await?;
            self.events.publish(
                schedule.organization_id,
                ChangeKind::ConflictRecorded,
                schedule.id,
                Some(conflict_id),
            );
        }
        Ok(count)
    }
}

fn build_daily_tasks(start: NaiveDate, daily_hours: &[f64]) -> Vec<DailyTask> {
    daily_hours
        .iter()
        .enumerate()
        .map(|(i, &hours)| DailyTask {
            day_number: i as u32 + 1,
            date: add_days(start, i as u32),
            hours_for_day: hours,
            task_refs: Vec::new(),
            status: DayStatus::Pending,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::WorkOrder;
    use crate::db::LocalRepository;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    const ORG: OrganizationId = OrganizationId(1);

    async fn seed_work_order(repo: &LocalRepository, hours: f64) -> WorkOrderId {
        repo.store_work_order(&WorkOrder {
            id: None,
            organization_id: ORG,
            project_id: ProjectId::new(1),
            customer_id: None,
            estimated_total_hours: hours,
            status: WorkOrderStatus::Pending,
            scheduled_start_date: None,
            scheduled_end_date: None,
        })
        .await
        .unwrap()
    }

    fn manager(repo: &LocalRepository) -> ScheduleManager {
        ScheduleManager::new(Arc::new(repo.clone()))
    }

    fn params(work_order_id: WorkOrderId, start: &str) -> CreateScheduleParams {
        CreateScheduleParams {
            organization_id: ORG,
            work_order_id,
            project_id: ProjectId::new(1),
            scheduled_start_date: day(start),
            assigned_crew_ids: vec![ResourceId::new(1)],
            assigned_equipment_ids: vec![ResourceId::new(10)],
            crew_leader_id: Some(ResourceId::new(1)),
        }
    }

    #[tokio::test]
    async fn test_create_schedule_builds_timeline() {
        let repo = LocalRepository::new();
        let mgr = manager(&repo);
        let wo = seed_work_order(&repo, 17.0).await;

        let schedule = mgr.create_schedule(params(wo, "2026-08-10")).await.unwrap();

        assert_eq!(schedule.work_days, 3);
        assert_eq!(schedule.buffer_days, 1);
        assert_eq!(schedule.total_scheduled_days, 4);
        assert_eq!(schedule.scheduled_end_date, day("2026-08-14"));
        assert_eq!(schedule.daily_tasks.len(), 3);
        assert_eq!(schedule.daily_tasks[2].hours_for_day, 1.0);
        assert_eq!(schedule.status, ScheduleStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_create_schedule_writes_through_to_work_order() {
        let repo = LocalRepository::new();
        let mgr = manager(&repo);
        let wo = seed_work_order(&repo, 8.0).await;

        mgr.create_schedule(params(wo, "2026-08-10")).await.unwrap();

        let work_order = repo.get_work_order(wo).await.unwrap();
        assert_eq!(work_order.status, WorkOrderStatus::Scheduled);
        assert_eq!(work_order.scheduled_start_date, Some(day("2026-08-10")));
        assert_eq!(work_order.scheduled_end_date, Some(day("2026-08-12")));
    }

    #[tokio::test]
    async fn test_create_reserves_equipment_but_not_crew() {
        let repo = LocalRepository::new();
        let mgr = manager(&repo);
        let wo = seed_work_order(&repo, 8.0).await;

        let schedule = mgr.create_schedule(params(wo, "2026-08-10")).await.unwrap();

        let equipment_day = repo
            .get_availability_entry(ORG, ResourceId::new(10), day("2026-08-11"))
            .await
            .unwrap()
            .expect("equipment day should be reserved");
        assert_eq!(equipment_day.status, AvailabilityStatus::Scheduled);
        assert_eq!(equipment_day.metadata.linked_schedule_id, schedule.id);

        // Crew is checked but never written back as a reservation.
        let crew_day = repo
            .get_availability_entry(ORG, ResourceId::new(1), day("2026-08-11"))
            .await
            .unwrap();
        assert!(crew_day.is_none());
    }

    #[tokio::test]
    async fn test_create_missing_work_order() {
        let repo = LocalRepository::new();
        let mgr = manager(&repo);

        let result = mgr
            .create_schedule(params(WorkOrderId::new(999), "2026-08-10"))
            .await;
        assert!(matches!(result, Err(SchedulingError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reschedule_shifts_without_recomputing() {
        let repo = LocalRepository::new();
        let mgr = manager(&repo);
        let wo = seed_work_order(&repo, 17.0).await;
        let schedule = mgr.create_schedule(params(wo, "2026-08-10")).await.unwrap();
        let schedule_id = schedule.id.unwrap();

        let moved = mgr
            .reschedule(schedule_id, day("2026-08-17"), "customer request", "dispatch")
            .await
            .unwrap();

        assert_eq!(moved.total_scheduled_days, 4);
        assert_eq!(
            moved.scheduled_end_date - moved.scheduled_start_date,
            schedule.scheduled_end_date - schedule.scheduled_start_date
        );
        assert_eq!(moved.reschedule_history.len(), 1);
        assert_eq!(moved.reschedule_history[0].original_start, day("2026-08-10"));
        assert_eq!(moved.status, ScheduleStatus::Rescheduled);
        for (i, task) in moved.daily_tasks.iter().enumerate() {
            assert_eq!(task.date, add_days(day("2026-08-17"), i as u32));
            assert_eq!(task.status, DayStatus::Pending);
        }

        // The old reservation days are released, the new ones held.
        let old_day = repo
            .get_availability_entry(ORG, ResourceId::new(10), day("2026-08-10"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(old_day.status, AvailabilityStatus::Available);
        let new_day = repo
            .get_availability_entry(ORG, ResourceId::new(10), day("2026-08-18"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(new_day.status, AvailabilityStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_terminal_schedule_rejects_mutation() {
        let repo = LocalRepository::new();
        let mgr = manager(&repo);
        let wo = seed_work_order(&repo, 8.0).await;
        let schedule = mgr.create_schedule(params(wo, "2026-08-10")).await.unwrap();
        let schedule_id = schedule.id.unwrap();

        mgr.transition(schedule_id, ScheduleStatus::Cancelled)
            .await
            .unwrap();

        let reschedule = mgr
            .reschedule(schedule_id, day("2026-09-01"), "late", "dispatch")
            .await;
        assert!(matches!(
            reschedule,
            Err(SchedulingError::InvalidTransition { .. })
        ));

        let day_update = mgr
            .update_day_status(schedule_id, 1, DayStatus::Completed)
            .await;
        assert!(matches!(day_update, Err(SchedulingError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_cancel_releases_reservations() {
        let repo = LocalRepository::new();
        let mgr = manager(&repo);
        let wo = seed_work_order(&repo, 8.0).await;
        let schedule = mgr.create_schedule(params(wo, "2026-08-10")).await.unwrap();

        mgr.transition(schedule.id.unwrap(), ScheduleStatus::Cancelled)
            .await
            .unwrap();

        let entry = repo
            .get_availability_entry(ORG, ResourceId::new(10), day("2026-08-10"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.status, AvailabilityStatus::Available);
        assert_eq!(entry.metadata.linked_schedule_id, None);
    }

    #[tokio::test]
    async fn test_transition_rejects_skipping_states() {
        let repo = LocalRepository::new();
        let mgr = manager(&repo);
        let wo = seed_work_order(&repo, 8.0).await;
        let schedule = mgr.create_schedule(params(wo, "2026-08-10")).await.unwrap();

        let result = mgr
            .transition(schedule.id.unwrap(), ScheduleStatus::Completed)
            .await;
        assert!(matches!(
            result,
            Err(SchedulingError::InvalidTransition {
                from: ScheduleStatus::Scheduled,
                to: ScheduleStatus::Completed,
            })
        ));
    }

    #[tokio::test]
    async fn test_update_day_status() {
        let repo = LocalRepository::new();
        let mgr = manager(&repo);
        let wo = seed_work_order(&repo, 17.0).await;
        let schedule = mgr.create_schedule(params(wo, "2026-08-10")).await.unwrap();
        let schedule_id = schedule.id.unwrap();

        let updated = mgr
            .update_day_status(schedule_id, 2, DayStatus::Completed)
            .await
            .unwrap();
        assert_eq!(updated.daily_tasks[1].status, DayStatus::Completed);
        assert_eq!(updated.daily_tasks[0].status, DayStatus::Pending);

        let missing = mgr.update_day_status(schedule_id, 9, DayStatus::Completed).await;
        assert!(matches!(missing, Err(SchedulingError::NotFound(_))));
    }
}
