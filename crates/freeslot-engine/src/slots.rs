//! Day slot grid -- the canonical ordered sequence of candidate slots.
//!
//! Partitions a day into fixed-width half-open slots starting at 00:00. The
//! grid never wraps past the day boundary: the final slot's upper bound is
//! capped at 23:59, so the last slot is [23:30, 23:59), one minute short of
//! a full width. The grid is weekday-independent and rebuilt on every call.

use chrono::NaiveTime;

/// Width of a candidate slot in minutes.
pub const SLOT_MINUTES: u32 = 30;

/// Upper bound of the last slot, in minutes from midnight (23:59).
const DAY_END_MINUTES: u32 = 23 * 60 + 59;

fn time_from_minutes(minutes: u32) -> NaiveTime {
    // Infallible for minutes < 1440, which the grid guarantees.
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        .unwrap_or(NaiveTime::MIN)
}

/// Produce the ordered slot grid covering one day: [00:00, 00:30), ...,
/// [23:00, 23:30), [23:30, 23:59). 48 slots, sorted by start time.
pub fn day_slots() -> Vec<(NaiveTime, NaiveTime)> {
    let mut slots = Vec::with_capacity((DAY_END_MINUTES / SLOT_MINUTES + 1) as usize);
    let mut start = 0u32;
    while start < DAY_END_MINUTES {
        let end = (start + SLOT_MINUTES).min(DAY_END_MINUTES);
        slots.push((time_from_minutes(start), time_from_minutes(end)));
        start += SLOT_MINUTES;
    }
    slots
}
