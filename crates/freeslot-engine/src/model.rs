//! Core data model -- users, groups, weekdays, and busy intervals.
//!
//! Time-of-day values are `chrono::NaiveTime` at minute precision; intervals
//! are half-open `[start, end)` within a single weekday. The model never
//! reasons about calendar dates or time zones, only the repeating 7-day week.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{EngineError, Result};

/// Opaque user identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque group identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The seven weekdays in grid order, Monday first (index 0).
pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Weekday as a persisted index in `[0, 6]`, 0 = Monday.
pub fn weekday_index(day: Weekday) -> u8 {
    day.num_days_from_monday() as u8
}

/// Inverse of [`weekday_index`]. Returns `None` for indices above 6.
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    ALL_WEEKDAYS.get(index as usize).copied()
}

/// Serde helpers representing a weekday as its `[0, 6]` index.
pub mod weekday_repr {
    use super::{weekday_from_index, weekday_index};
    use chrono::Weekday;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u8(weekday_index(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Weekday, D::Error> {
        let index = u8::deserialize(de)?;
        weekday_from_index(index)
            .ok_or_else(|| D::Error::custom(format!("weekday index out of range: {index}")))
    }
}

/// Strict half-open overlap test for two same-day time ranges.
///
/// Two ranges overlap iff `a_start < b_end && b_start < a_end`.
/// Ranges that merely touch at an endpoint do NOT overlap.
pub fn overlaps(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// A user-declared busy range on one weekday.
///
/// Uniqueness on `(user, weekday, start, end)` is enforced by the store
/// (idempotent insert). Overlap between a user's own intervals is allowed;
/// the aggregator treats it as redundant busy coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub user: UserId,
    #[serde(with = "weekday_repr")]
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl BusyInterval {
    /// Build a validated busy interval.
    ///
    /// # Errors
    /// Returns `EngineError::Validation` unless `start < end`.
    pub fn new(user: UserId, weekday: Weekday, start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if start >= end {
            return Err(EngineError::Validation(format!(
                "start {start} must be before end {end}"
            )));
        }
        Ok(Self {
            user,
            weekday,
            start,
            end,
        })
    }

    /// Does this interval overlap the half-open range `[start, end)`?
    pub fn overlaps_range(&self, start: NaiveTime, end: NaiveTime) -> bool {
        overlaps(self.start, self.end, start, end)
    }
}

/// An unvalidated busy-interval submission, as accepted by the bulk API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusyIntervalInput {
    #[serde(with = "weekday_repr")]
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// A scheduling group, consumed (not owned) by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub creator: UserId,
    pub members: Vec<UserId>,
}

impl Group {
    /// Creator ∪ members, deduplicated.
    pub fn effective_members(&self) -> BTreeSet<UserId> {
        let mut set: BTreeSet<UserId> = self.members.iter().copied().collect();
        set.insert(self.creator);
        set
    }
}
