//! Resource calendar operations.
//!
//! Thin service functions over the availability store. The calendar layer
//! performs no cross-resource validation; it is a fast per-day store with a
//! documented open-world default: a resource with no stored entry for a day
//! is available on that day.

use chrono::NaiveDate;

use crate::api::{
    AvailabilityEntryId, AvailabilityMetadata, AvailabilitySnapshot, AvailabilityStatus,
    DateRange, OrganizationId, ResourceAvailabilityEntry, ResourceId, ResourceKind, ScheduleId,
};
use crate::db::repository::{AvailabilityRepository, FullRepository};
use crate::services::SchedulingResult;

/// Write one availability status across an inclusive day range.
///
/// Every day in `[range.start, range.end]` is upserted: an existing entry
/// for that (resource, day) is overwritten in place, otherwise one is
/// created. Returns the affected entry IDs in day order.
pub async fn set_availability(
    repo: &dyn FullRepository,
    organization_id: OrganizationId,
    resource_id: ResourceId,
    resource_kind: ResourceKind,
    range: DateRange,
    status: AvailabilityStatus,
    metadata: AvailabilityMetadata,
) -> SchedulingResult<Vec<AvailabilityEntryId>> {
    let mut entry_ids = Vec::with_capacity(range.num_days() as usize);
    for date in range.days() {
        let entry = ResourceAvailabilityEntry {
            id: None,
            organization_id,
            resource_id,
            resource_kind,
            date,
            status,
            metadata: metadata.clone(),
        };
        entry_ids.push(repo.upsert_availability(&entry).await?);
    }

    log::debug!(
        "Set {} availability entries for {} {} to {:?}",
        entry_ids.len(),
        resource_kind,
        resource_id,
        status
    );
    Ok(entry_ids)
}

/// Point read of one resource-day, applying the open-world default.
///
/// No stored entry means `available: true` with status `Available`:
/// resources are assumed free until explicitly marked otherwise.
pub async fn get_availability(
    repo: &dyn FullRepository,
    organization_id: OrganizationId,
    resource_id: ResourceId,
    date: NaiveDate,
) -> SchedulingResult<AvailabilitySnapshot> {
    match repo
        .get_availability_entry(organization_id, resource_id, date)
        .await?
    {
        Some(entry) => Ok(AvailabilitySnapshot {
            available: entry.status.is_open(),
            status: entry.status,
            entry: Some(entry),
        }),
        None => Ok(AvailabilitySnapshot {
            available: true,
            status: AvailabilityStatus::Available,
            entry: None,
        }),
    }
}

/// Bulk read of calendar entries for rendering.
///
/// When `resource_ids` is `None`, all entries of the organization in range
/// are returned. Only stored entries come back; absent days are implicitly
/// available.
pub async fn query_range(
    repo: &dyn FullRepository,
    organization_id: OrganizationId,
    resource_ids: Option<&[ResourceId]>,
    range: DateRange,
) -> SchedulingResult<Vec<ResourceAvailabilityEntry>> {
    Ok(repo
        .query_availability(organization_id, resource_ids, range)
        .await?)
}

/// Whether a resource can take on work for `date`, optionally treating one
/// schedule's own reservations as open.
///
/// Checks made on behalf of a schedule must not count that schedule's own
/// calendar entries against it, or re-running detection on an already
/// reserved schedule would flag every reserved day.
pub(crate) async fn is_open_for(
    repo: &dyn FullRepository,
    organization_id: OrganizationId,
    resource_id: ResourceId,
    date: NaiveDate,
    ignore_schedule: Option<ScheduleId>,
) -> SchedulingResult<bool> {
    match repo
        .get_availability_entry(organization_id, resource_id, date)
        .await?
    {
        Some(entry) => {
            if ignore_schedule.is_some() && entry.metadata.linked_schedule_id == ignore_schedule {
                return Ok(true);
            }
            Ok(entry.status.is_open())
        }
        None => Ok(true),
    }
}
