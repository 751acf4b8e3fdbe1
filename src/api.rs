//! Domain model for the scheduling subsystem.
//!
//! This file consolidates the core types shared across the repository,
//! service, and HTTP layers. All types derive Serialize/Deserialize for
//! JSON serialization.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Defines a newtype ID wrapper around `i64` and generates derives,
/// `Display`, `From` conversions, and `new`/`value` accessors.
macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for i64 {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl $name {
            pub fn new(value: i64) -> Self {
                $name(value)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }
    };
}

define_id_type!(OrganizationId);
define_id_type!(WorkOrderId);
define_id_type!(ProjectId);
define_id_type!(CustomerId);
define_id_type!(ScheduleId);
define_id_type!(ResourceId);
define_id_type!(AvailabilityEntryId);
define_id_type!(ConflictId);

// ============================================================================
// Calendar days
// ============================================================================

/// Inclusive range of calendar days `[start, end]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err(format!("Invalid date range: {} is before {}", end, start));
        }
        Ok(Self { start, end })
    }

    /// Single-day range.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// Number of days covered, inclusive of both endpoints.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Check if this range overlaps another (inclusive endpoints).
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Iterate every day of the range in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

// ============================================================================
// Resource availability
// ============================================================================

/// Kind of reservable resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Crew,
    Equipment,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Crew => write!(f, "crew"),
            ResourceKind::Equipment => write!(f, "equipment"),
        }
    }
}

/// Availability state of a resource for one calendar day.
///
/// Crew members use `Available`/`Unavailable`/`Partial`; equipment uses
/// `Available`/`Scheduled`/`InUse`/`Maintenance`/`Repair`/`Unavailable`.
/// The calendar stores whichever status it is handed without cross-checking
/// the resource kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
    Partial,
    Scheduled,
    InUse,
    Maintenance,
    Repair,
}

impl AvailabilityStatus {
    /// Whether a resource in this state can take on work.
    ///
    /// `Partial` counts as open: the partial window is metadata for the
    /// dispatcher, not a hard block.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            AvailabilityStatus::Available | AvailabilityStatus::Partial
        )
    }
}

/// Time-of-day window for a partially available crew member.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Maintenance details attached to an equipment calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceInfo {
    pub description: String,
    /// Expected day the unit returns to service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_return: Option<NaiveDate>,
}

/// Optional context carried by a calendar entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityMetadata {
    /// Reason for unavailability (leave request, breakdown, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
    /// Time-of-day window when status is `Partial`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_window: Option<PartialWindow>,
    /// Schedule that reserved this day (weak back-reference, not ownership)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_schedule_id: Option<ScheduleId>,
    /// Maintenance details when status is `Maintenance`/`Repair`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<MaintenanceInfo>,
}

/// One calendar cell: the availability of one resource on one day.
///
/// Invariant: at most one entry exists per (resource, date); range writes
/// overwrite in place. Absence of an entry means the resource is available
/// (open-world default).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAvailabilityEntry {
    /// Database ID (server-assigned)
    #[serde(default)]
    pub id: Option<AvailabilityEntryId>,
    pub organization_id: OrganizationId,
    pub resource_id: ResourceId,
    pub resource_kind: ResourceKind,
    /// Midnight-normalized calendar day
    pub date: NaiveDate,
    pub status: AvailabilityStatus,
    #[serde(flatten)]
    pub metadata: AvailabilityMetadata,
}

/// Point-read result for one resource on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySnapshot {
    pub available: bool,
    pub status: AvailabilityStatus,
    /// The stored entry, if any; `None` means the open-world default applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<ResourceAvailabilityEntry>,
}

// ============================================================================
// Schedule records
// ============================================================================

/// Derived timeline figures for a work order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Days of actual work at the nominal 8-hour day
    pub work_days: u32,
    /// Contingency days (10% of work days, rounded up)
    pub buffer_days: u32,
    /// `work_days + buffer_days`
    pub total_scheduled_days: u32,
    /// Hour allocation per work day; the last day absorbs the remainder
    pub daily_hours: Vec<f64>,
}

/// Status of one scheduled work day.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Pending,
    InProgress,
    Completed,
    Rescheduled,
}

/// One work day in a schedule's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTask {
    /// 1-based position in the schedule
    pub day_number: u32,
    pub date: NaiveDate,
    pub hours_for_day: f64,
    /// References to task records tracked elsewhere in the platform
    #[serde(default)]
    pub task_refs: Vec<String>,
    pub status: DayStatus,
}

/// Lifecycle state of a schedule record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Draft,
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Rescheduled,
}

impl ScheduleStatus {
    /// Whether this state admits no further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScheduleStatus::Completed | ScheduleStatus::Cancelled)
    }

    /// Legal transitions of the schedule state machine.
    ///
    /// `Draft → Scheduled → Confirmed → InProgress → Completed`, with
    /// `Rescheduled`/`Cancelled` reachable from any non-terminal working
    /// state and `Rescheduled` returning to `Scheduled` once re-confirmed.
    pub fn can_transition(&self, to: ScheduleStatus) -> bool {
        use ScheduleStatus::*;
        matches!(
            (self, to),
            (Draft, Scheduled)
                | (Draft, Cancelled)
                | (Scheduled, Confirmed)
                | (Scheduled, Rescheduled)
                | (Scheduled, Cancelled)
                | (Confirmed, InProgress)
                | (Confirmed, Rescheduled)
                | (Confirmed, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (Rescheduled, Scheduled)
                | (Rescheduled, Cancelled)
        )
    }
}

/// Audit entry appended every time a schedule is moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleEvent {
    pub original_start: NaiveDate,
    pub original_end: NaiveDate,
    pub reason: String,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
}

/// The timeline for one work order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRecord {
    /// Database ID (server-assigned)
    #[serde(default)]
    pub id: Option<ScheduleId>,
    pub organization_id: OrganizationId,
    pub work_order_id: WorkOrderId,
    pub project_id: ProjectId,
    pub estimated_total_hours: f64,
    pub work_days: u32,
    pub buffer_days: u32,
    /// Invariant: `work_days + buffer_days`
    pub total_scheduled_days: u32,
    pub scheduled_start_date: NaiveDate,
    /// Derived: `scheduled_start_date + total_scheduled_days`
    pub scheduled_end_date: NaiveDate,
    /// One entry per work day; buffer days carry no tasks
    pub daily_tasks: Vec<DailyTask>,
    pub assigned_crew_ids: Vec<ResourceId>,
    pub assigned_equipment_ids: Vec<ResourceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew_leader_id: Option<ResourceId>,
    pub status: ScheduleStatus,
    /// Append-only move history
    #[serde(default)]
    pub reschedule_history: Vec<RescheduleEvent>,
}

impl ScheduleRecord {
    /// The inclusive day range this schedule occupies on the calendar.
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.scheduled_start_date,
            end: self.scheduled_end_date,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// ============================================================================
// Conflicts
// ============================================================================

/// Classification of a detected resource collision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    CrewDoubleBooked,
    EquipmentDoubleBooked,
    CrewUnavailable,
    EquipmentUnavailable,
    InsufficientCrew,
    InsufficientEquipment,
    DateOverlap,
}

/// Resolution state of a conflict record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStatus {
    Unresolved,
    Resolved,
    Ignored,
}

/// A detected resource collision, kept as an audit record.
///
/// Conflicts are advisory data: they never block the write that produced
/// them and are only mutated by explicit human resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Database ID (server-assigned)
    #[serde(default)]
    pub id: Option<ConflictId>,
    pub organization_id: OrganizationId,
    pub conflict_type: ConflictType,
    pub work_order_id: WorkOrderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_work_order_id: Option<WorkOrderId>,
    pub conflict_date: NaiveDate,
    pub resource_kind: ResourceKind,
    pub resource_id: ResourceId,
    pub status: ConflictStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Work orders (external collaborator)
// ============================================================================

/// Scheduling-relevant state of a work order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    /// Approved for field execution, awaiting a schedule
    Pending,
    Scheduled,
}

/// The slice of a work order the scheduler reads and writes back.
///
/// Work orders are owned by the wider platform; the scheduler consumes the
/// hour estimate and writes the computed dates and status back through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    /// Database ID (server-assigned)
    #[serde(default)]
    pub id: Option<WorkOrderId>,
    pub organization_id: OrganizationId,
    pub project_id: ProjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    pub estimated_total_hours: f64,
    pub status: WorkOrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_end_date: Option<NaiveDate>,
}

/// Add whole calendar days to a date.
///
/// Saturates at the chrono date boundary, which is far outside any
/// realistic scheduling horizon.
pub fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_schedule_id_roundtrip() {
        let id = ScheduleId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(ScheduleId::from(42), id);
    }

    #[test]
    fn test_date_range_rejects_inverted() {
        assert!(DateRange::new(day("2026-03-10"), day("2026-03-09")).is_err());
    }

    #[test]
    fn test_date_range_days_inclusive() {
        let range = DateRange::new(day("2026-03-10"), day("2026-03-13")).unwrap();
        assert_eq!(range.num_days(), 4);
        let days: Vec<NaiveDate> = range.days().collect();
        assert_eq!(days.first(), Some(&day("2026-03-10")));
        assert_eq!(days.last(), Some(&day("2026-03-13")));
    }

    #[test]
    fn test_date_range_overlap() {
        let a = DateRange::new(day("2026-03-10"), day("2026-03-15")).unwrap();
        let b = DateRange::new(day("2026-03-15"), day("2026-03-20")).unwrap();
        let c = DateRange::new(day("2026-03-16"), day("2026-03-20")).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_status_open_states() {
        assert!(AvailabilityStatus::Available.is_open());
        assert!(AvailabilityStatus::Partial.is_open());
        assert!(!AvailabilityStatus::Scheduled.is_open());
        assert!(!AvailabilityStatus::Maintenance.is_open());
        assert!(!AvailabilityStatus::Unavailable.is_open());
    }

    #[test]
    fn test_schedule_state_machine_happy_path() {
        use ScheduleStatus::*;
        assert!(Draft.can_transition(Scheduled));
        assert!(Scheduled.can_transition(Confirmed));
        assert!(Confirmed.can_transition(InProgress));
        assert!(InProgress.can_transition(Completed));
    }

    #[test]
    fn test_schedule_state_machine_rejects_terminal_exits() {
        use ScheduleStatus::*;
        for to in [Draft, Scheduled, Confirmed, InProgress, Rescheduled, Cancelled] {
            assert!(!Completed.can_transition(to));
            assert!(!Cancelled.can_transition(to));
        }
    }

    #[test]
    fn test_reschedule_cycles_back_to_scheduled() {
        use ScheduleStatus::*;
        assert!(Scheduled.can_transition(Rescheduled));
        assert!(Rescheduled.can_transition(Scheduled));
        assert!(!Rescheduled.can_transition(Confirmed));
    }

    #[test]
    fn test_conflict_status_serialization() {
        let json = serde_json::to_string(&ConflictType::EquipmentUnavailable).unwrap();
        assert_eq!(json, "\"equipment_unavailable\"");
        let json = serde_json::to_string(&ConflictStatus::Unresolved).unwrap();
        assert_eq!(json, "\"unresolved\"");
    }
}
