//! Service layer for scheduling business logic.
//!
//! This module contains the scheduling services that sit between the
//! repository layer and the HTTP handlers:
//!
//! - [`timeline`]: Pure hour-estimate to day-allocation calculation
//! - [`calendar`]: Resource calendar reads and range writes
//! - [`conflicts`]: Advisory conflict detection
//! - [`scheduler`]: Schedule lifecycle orchestration
//! - [`optimal_date`]: Bounded first-fit start-date search
//! - [`events`]: Change-event pub/sub for subscribable queries

pub mod calendar;

pub mod conflicts;

pub mod events;

pub mod optimal_date;

pub mod scheduler;

pub mod timeline;

pub use events::{ChangeEvent, ChangeKind, EventBus};
pub use optimal_date::{
    find_optimal_start_date, DateSearchOutcome, DateSearchRequest, DEFAULT_SEARCH_WINDOW_DAYS,
};
pub use scheduler::{CreateScheduleParams, ScheduleManager};
pub use timeline::{calculate_timeline, BUFFER_RATIO, NOMINAL_WORKDAY_HOURS};

use crate::api::ScheduleStatus;
use crate::db::repository::RepositoryError;

/// Result type for scheduling operations
pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// Error type for scheduling operations.
///
/// Detected conflicts are deliberately absent: conflicts are data, recorded
/// and queryable, never a failure of the write that produced them. Search
/// exhaustion is likewise a normal typed outcome
/// ([`optimal_date::DateSearchOutcome::Exhausted`]), not an error.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    /// Referenced work order, schedule, or conflict does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-positive or non-finite duration input
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Illegal schedule state-machine move
    #[error("Invalid status transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: ScheduleStatus,
        to: ScheduleStatus,
    },

    /// Malformed request input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage-layer failure, propagated untouched
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Map a repository lookup failure, surfacing `NotFound` as the domain
/// error and passing everything else through as a storage failure.
pub(crate) fn map_lookup_err(err: RepositoryError) -> SchedulingError {
    match err {
        RepositoryError::NotFound(msg) => SchedulingError::NotFound(msg),
        other => SchedulingError::Storage(other),
    }
}
