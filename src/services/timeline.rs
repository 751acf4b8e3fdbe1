//! Timeline calculation: hour estimates to day allocations.
//!
//! Pure and deterministic; the only failure mode is a non-positive or
//! non-finite hours input.

use crate::api::Timeline;
use crate::services::{SchedulingError, SchedulingResult};

/// Nominal length of one field work day.
pub const NOMINAL_WORKDAY_HOURS: f64 = 8.0;

/// Fixed contingency added atop raw work days, rounded up.
pub const BUFFER_RATIO: f64 = 0.10;

/// Convert an estimated total of labor hours into a day-level timeline.
///
/// - `work_days = ceil(hours / 8)`
/// - `buffer_days = ceil(work_days * 0.10)`
/// - `total_scheduled_days = work_days + buffer_days`
///
/// The per-day allocation assigns `min(8, remaining)` hours to each work
/// day in order, so every day carries 8 hours except possibly the last.
///
/// # Errors
/// `SchedulingError::InvalidDuration` when `estimated_total_hours` is not a
/// positive finite number.
pub fn calculate_timeline(estimated_total_hours: f64) -> SchedulingResult<Timeline> {
    if !estimated_total_hours.is_finite() || estimated_total_hours <= 0.0 {
        return Err(SchedulingError::InvalidDuration(format!(
            "Estimated hours must be a positive finite number, got {}",
            estimated_total_hours
        )));
    }

    let work_days = (estimated_total_hours / NOMINAL_WORKDAY_HOURS).ceil() as u32;
    let buffer_days = (f64::from(work_days) * BUFFER_RATIO).ceil() as u32;

    let mut daily_hours = Vec::with_capacity(work_days as usize);
    let mut remaining = estimated_total_hours;
    for _ in 0..work_days {
        let hours = remaining.min(NOMINAL_WORKDAY_HOURS);
        daily_hours.push(hours);
        remaining -= hours;
    }

    Ok(Timeline {
        work_days,
        buffer_days,
        total_scheduled_days: work_days + buffer_days,
        daily_hours,
    })
}
