//! Optimal-date search: earliest feasible start within a bounded window.
//!
//! First-fit by design: the scan returns the first date where every
//! required resource is free for the full job duration, and does not look
//! for a "better" later option. Exhausting the window is a normal business
//! outcome, represented as a typed result rather than an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{add_days, OrganizationId, ResourceId};
use crate::db::repository::FullRepository;
use crate::services::{calendar, SchedulingError, SchedulingResult};

/// How far ahead the scan looks when the caller does not say.
///
/// The bound keeps the synchronous request/response model responsive:
/// worst case is `window × estimated_days × resources` point reads.
pub const DEFAULT_SEARCH_WINDOW_DAYS: u32 = 90;

/// Parameters for a feasible-start-date search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateSearchRequest {
    #[serde(default)]
    pub required_crew_ids: Vec<ResourceId>,
    #[serde(default)]
    pub required_equipment_ids: Vec<ResourceId>,
    /// Days the job occupies, from the timeline calculation
    pub estimated_days: u32,
    /// Earliest acceptable start; defaults to the search day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_start_date: Option<NaiveDate>,
    /// Scan bound; defaults to [`DEFAULT_SEARCH_WINDOW_DAYS`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_window_days: Option<u32>,
}

/// Result of a feasible-start-date search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DateSearchOutcome {
    /// First date where all required resources are free for the duration
    Found {
        start_date: NaiveDate,
        end_date: NaiveDate,
        days_from_now: i64,
    },
    /// No feasible window inside the search bound, a normal outcome
    Exhausted { message: String },
}

impl DateSearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, DateSearchOutcome::Found { .. })
    }
}

/// Linear forward scan for the first date where every required crew member
/// and equipment unit is free for every day of the job.
///
/// Candidates run from `preferred_start_date` (or `today`) through the
/// search window; each candidate is abandoned at the first closed
/// resource-day. `days_from_now` in the result is relative to `today`.
///
/// # Errors
/// `SchedulingError::InvalidDuration` when `estimated_days` is zero.
pub async fn find_optimal_start_date(
    repo: &dyn FullRepository,
    organization_id: OrganizationId,
    request: &DateSearchRequest,
    today: NaiveDate,
) -> SchedulingResult<DateSearchOutcome> {
    if request.estimated_days == 0 {
        return Err(SchedulingError::InvalidDuration(
            "Estimated days must be at least 1".to_string(),
        ));
    }

    let window = request
        .search_window_days
        .unwrap_or(DEFAULT_SEARCH_WINDOW_DAYS);
    let base = request.preferred_start_date.unwrap_or(today);

    'candidates: for offset in 0..window {
        let candidate = add_days(base, offset);

        for day in 0..request.estimated_days {
            let date = add_days(candidate, day);

            for &crew_id in &request.required_crew_ids {
                if !calendar::is_open_for(repo, organization_id, crew_id, date, None).await? {
                    continue 'candidates;
                }
            }
            for &equipment_id in &request.required_equipment_ids {
                if !calendar::is_open_for(repo, organization_id, equipment_id, date, None).await? {
                    continue 'candidates;
                }
            }
        }

        // First fit: return immediately rather than scanning for a
        // better-ending or resource-balanced option.
        return Ok(DateSearchOutcome::Found {
            start_date: candidate,
            end_date: add_days(candidate, request.estimated_days),
            days_from_now: (candidate - today).num_days(),
        });
    }

    Ok(DateSearchOutcome::Exhausted {
        message: format!(
            "No start date within {} days of {} has all {} resources free for {} consecutive days",
            window,
            base,
            request.required_crew_ids.len() + request.required_equipment_ids.len(),
            request.estimated_days
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AvailabilityMetadata, AvailabilityStatus, DateRange, ResourceKind};
    use crate::db::LocalRepository;
    use crate::services::calendar::set_availability;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    const ORG: OrganizationId = OrganizationId(1);

    fn request(crew: &[i64], equipment: &[i64], estimated_days: u32) -> DateSearchRequest {
        DateSearchRequest {
            required_crew_ids: crew.iter().map(|&id| ResourceId::new(id)).collect(),
            required_equipment_ids: equipment.iter().map(|&id| ResourceId::new(id)).collect(),
            estimated_days,
            preferred_start_date: None,
            search_window_days: None,
        }
    }

    async fn block(
        repo: &LocalRepository,
        resource: i64,
        kind: ResourceKind,
        start: &str,
        end: &str,
    ) {
        set_availability(
            repo,
            ORG,
            ResourceId::new(resource),
            kind,
            DateRange::new(day(start), day(end)).unwrap(),
            AvailabilityStatus::Unavailable,
            AvailabilityMetadata::default(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_open_calendar_returns_preferred_date() {
        let repo = LocalRepository::new();
        let mut req = request(&[1], &[10], 3);
        req.preferred_start_date = Some(day("2026-08-10"));

        let outcome = find_optimal_start_date(&repo, ORG, &req, day("2026-08-04"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DateSearchOutcome::Found {
                start_date: day("2026-08-10"),
                end_date: day("2026-08-13"),
                days_from_now: 6,
            }
        );
    }

    #[tokio::test]
    async fn test_scan_skips_blocked_days() {
        let repo = LocalRepository::new();
        // Blocked for three days starting at the preferred date
        block(&repo, 10, ResourceKind::Equipment, "2026-08-04", "2026-08-06").await;

        let mut req = request(&[], &[10], 1);
        req.preferred_start_date = Some(day("2026-08-04"));

        let outcome = find_optimal_start_date(&repo, ORG, &req, day("2026-08-04"))
            .await
            .unwrap();

        match outcome {
            DateSearchOutcome::Found {
                start_date,
                days_from_now,
                ..
            } => {
                assert_eq!(start_date, day("2026-08-07"));
                assert_eq!(days_from_now, 3);
            }
            other => panic!("Expected a found outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duration_must_fit_entirely() {
        let repo = LocalRepository::new();
        // One blocked day in the middle of the otherwise open window
        block(&repo, 1, ResourceKind::Crew, "2026-08-06", "2026-08-06").await;

        let mut req = request(&[1], &[], 3);
        req.preferred_start_date = Some(day("2026-08-04"));

        let outcome = find_optimal_start_date(&repo, ORG, &req, day("2026-08-04"))
            .await
            .unwrap();

        // 08-04..08-06 and 08-05..08-07 both touch the blocked day; the
        // first clear 3-day run starts on 08-07.
        match outcome {
            DateSearchOutcome::Found { start_date, .. } => {
                assert_eq!(start_date, day("2026-08-07"))
            }
            other => panic!("Expected a found outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_window_exhaustion_is_a_normal_outcome() {
        let repo = LocalRepository::new();
        block(&repo, 10, ResourceKind::Equipment, "2026-08-04", "2026-12-31").await;

        let mut req = request(&[], &[10], 2);
        req.preferred_start_date = Some(day("2026-08-04"));
        req.search_window_days = Some(30);

        let outcome = find_optimal_start_date(&repo, ORG, &req, day("2026-08-04"))
            .await
            .unwrap();

        assert!(!outcome.is_found());
    }

    #[tokio::test]
    async fn test_zero_days_is_rejected() {
        let repo = LocalRepository::new();
        let req = request(&[1], &[], 0);
        let result = find_optimal_start_date(&repo, ORG, &req, day("2026-08-04")).await;
        assert!(matches!(result, Err(SchedulingError::InvalidDuration(_))));
    }

    #[tokio::test]
    async fn test_no_required_resources_finds_immediately() {
        let repo = LocalRepository::new();
        let req = request(&[], &[], 5);
        let outcome = find_optimal_start_date(&repo, ORG, &req, day("2026-08-04"))
            .await
            .unwrap();

        match outcome {
            DateSearchOutcome::Found { days_from_now, .. } => assert_eq!(days_from_now, 0),
            other => panic!("Expected a found outcome, got {:?}", other),
        }
    }
}
