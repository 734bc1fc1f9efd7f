//! Time-lock policy
//!
//! Pure eligibility computation: the earliest instant at which a
//! transaction that has met its confirmation threshold may execute.
//! The threshold timestamp is captured once, the first time the
//! threshold is reached, and never recomputed afterwards.

use chrono::{DateTime, Duration, Utc};

/// Earliest permissible execution time
///
/// Non-emergency transactions wait `time_lock_secs` past the instant the
/// threshold was reached; emergency transactions (submitted by a
/// registered responder) are eligible immediately.
pub fn eligible_at(
    threshold_reached_at: DateTime<Utc>,
    time_lock_secs: u64,
    is_emergency: bool,
) -> DateTime<Utc> {
    if is_emergency {
        threshold_reached_at
    } else {
        threshold_reached_at + Duration::seconds(time_lock_secs as i64)
    }
}

/// Whether execution is permitted at `now`
pub fn is_eligible(
    now: DateTime<Utc>,
    threshold_reached_at: DateTime<Utc>,
    time_lock_secs: u64,
    is_emergency: bool,
) -> bool {
    now >= eligible_at(threshold_reached_at, time_lock_secs, is_emergency)
}
