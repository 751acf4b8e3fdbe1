//! Conflict detection: advisory scans of schedules against the calendar.
//!
//! Detection never blocks the write that produced it. Schedules are
//! tentative until confirmed, so a collision becomes an unresolved
//! [`ConflictRecord`] surfaced for a dispatcher to resolve, not an error.

use chrono::NaiveDate;

use crate::api::{
    ConflictRecord, ConflictStatus, ConflictType, ResourceId, ResourceKind, ScheduleRecord,
};
use crate::db::repository::FullRepository;
use crate::services::{calendar, SchedulingResult};

/// Scan a schedule's work days against the resource calendar.
///
/// For each day in `daily_tasks`, every assigned crew member and every
/// assigned equipment unit is checked; each closed resource-day yields one
/// unresolved record (`CrewUnavailable` / `EquipmentUnavailable`). Entries
/// reserved by the schedule itself are not counted against it.
///
/// This is an O(days × resources) scan. Double-booking detection against
/// other schedules' records would need a cross-schedule join and is an
/// extension point, not part of this pass.
pub async fn detect_conflicts(
    repo: &dyn FullRepository,
    schedule: &ScheduleRecord,
) -> SchedulingResult<Vec<ConflictRecord>> {
    let mut conflicts = Vec::new();

    for task in &schedule.daily_tasks {
        for &crew_id in &schedule.assigned_crew_ids {
            if !calendar::is_open_for(
                repo,
                schedule.organization_id,
                crew_id,
                task.date,
                schedule.id,
            )
            .await?
            {
                conflicts.push(unavailable_conflict(
                    schedule,
                    ConflictType::CrewUnavailable,
                    ResourceKind::Crew,
                    crew_id,
                    task.date,
                ));
            }
        }

        for &equipment_id in &schedule.assigned_equipment_ids {
            if !calendar::is_open_for(
                repo,
                schedule.organization_id,
                equipment_id,
                task.date,
                schedule.id,
            )
            .await?
            {
                conflicts.push(unavailable_conflict(
                    schedule,
                    ConflictType::EquipmentUnavailable,
                    ResourceKind::Equipment,
                    equipment_id,
                    task.date,
                ));
            }
        }
    }

    if !conflicts.is_empty() {
        log::warn!(
            "Detected {} conflicts for work order {}",
            conflicts.len(),
            schedule.work_order_id
        );
    }

    Ok(conflicts)
}

fn unavailable_conflict(
    schedule: &ScheduleRecord,
    conflict_type: ConflictType,
    resource_kind: ResourceKind,
    resource_id: ResourceId,
    conflict_date: NaiveDate,
) -> ConflictRecord {
    ConflictRecord {
        id: None,
        organization_id: schedule.organization_id,
        conflict_type,
        work_order_id: schedule.work_order_id,
        conflicting_work_order_id: None,
        conflict_date,
        resource_kind,
        resource_id,
        status: ConflictStatus::Unresolved,
        resolution: None,
        resolved_by: None,
        resolved_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        AvailabilityMetadata, AvailabilityStatus, DailyTask, DateRange, DayStatus,
        OrganizationId, ProjectId, ScheduleId, ScheduleStatus, WorkOrderId,
    };
    use crate::db::LocalRepository;
    use crate::services::calendar::set_availability;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn two_day_schedule(crew: &[i64], equipment: &[i64]) -> ScheduleRecord {
        let start = day("2026-07-06");
        ScheduleRecord {
            id: Some(ScheduleId::new(1)),
            organization_id: OrganizationId::new(1),
            work_order_id: WorkOrderId::new(100),
            project_id: ProjectId::new(1),
            estimated_total_hours: 12.0,
            work_days: 2,
            buffer_days: 1,
            total_scheduled_days: 3,
            scheduled_start_date: start,
            scheduled_end_date: day("2026-07-09"),
            daily_tasks: vec![
                DailyTask {
                    day_number: 1,
                    date: start,
                    hours_for_day: 8.0,
                    task_refs: vec![],
                    status: DayStatus::Pending,
                },
                DailyTask {
                    day_number: 2,
                    date: day("2026-07-07"),
                    hours_for_day: 4.0,
                    task_refs: vec![],
                    status: DayStatus::Pending,
                },
            ],
            assigned_crew_ids: crew.iter().map(|&id| ResourceId::new(id)).collect(),
            assigned_equipment_ids: equipment.iter().map(|&id| ResourceId::new(id)).collect(),
            crew_leader_id: None,
            status: ScheduleStatus::Scheduled,
            reschedule_history: vec![],
        }
    }

    #[tokio::test]
    async fn test_no_conflicts_on_open_calendar() {
        let repo = LocalRepository::new();
        let schedule = two_day_schedule(&[1, 2], &[10]);

        let conflicts = detect_conflicts(&repo, &schedule).await.unwrap();
        assert!(conflicts.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_equipment_yields_one_conflict() {
        let repo = LocalRepository::new();
        let schedule = two_day_schedule(&[1], &[10]);

        set_availability(
            &repo,
            schedule.organization_id,
            ResourceId::new(10),
            ResourceKind::Equipment,
            DateRange::single(day("2026-07-07")),
            AvailabilityStatus::Repair,
            AvailabilityMetadata::default(),
        )
        .await
        .unwrap();

        let conflicts = detect_conflicts(&repo, &schedule).await.unwrap();
        assert_eq!(conflicts.len(), 1);

        let conflict = &conflicts[0];
        assert_eq!(conflict.conflict_type, ConflictType::EquipmentUnavailable);
        assert_eq!(conflict.resource_kind, ResourceKind::Equipment);
        assert_eq!(conflict.resource_id, ResourceId::new(10));
        assert_eq!(conflict.conflict_date, day("2026-07-07"));
        assert_eq!(conflict.status, ConflictStatus::Unresolved);
    }

    #[tokio::test]
    async fn test_crew_leave_yields_conflict_per_day() {
        let repo = LocalRepository::new();
        let schedule = two_day_schedule(&[1], &[]);

        // On leave across both work days
        set_availability(
            &repo,
            schedule.organization_id,
            ResourceId::new(1),
            ResourceKind::Crew,
            DateRange::new(day("2026-07-06"), day("2026-07-07")).unwrap(),
            AvailabilityStatus::Unavailable,
            AvailabilityMetadata::default(),
        )
        .await
        .unwrap();

        let conflicts = detect_conflicts(&repo, &schedule).await.unwrap();
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts
            .iter()
            .all(|c| c.conflict_type == ConflictType::CrewUnavailable));
    }

    #[tokio::test]
    async fn test_own_reservation_is_not_a_conflict() {
        let repo = LocalRepository::new();
        let schedule = two_day_schedule(&[], &[10]);

        // The schedule's own equipment reservation, as written by the
        // create flow before detection runs.
        set_availability(
            &repo,
            schedule.organization_id,
            ResourceId::new(10),
            ResourceKind::Equipment,
            schedule.date_range(),
            AvailabilityStatus::Scheduled,
            AvailabilityMetadata {
                linked_schedule_id: schedule.id,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let conflicts = detect_conflicts(&repo, &schedule).await.unwrap();
        assert!(conflicts.is_empty());
    }

    #[tokio::test]
    async fn test_empty_assignments_check_nothing() {
        let repo = LocalRepository::new();
        let schedule = two_day_schedule(&[], &[]);
        let conflicts = detect_conflicts(&repo, &schedule).await.unwrap();
        assert!(conflicts.is_empty());
    }
}
