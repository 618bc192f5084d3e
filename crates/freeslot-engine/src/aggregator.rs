//! Free-time aggregation -- derive a group's common free slots from the
//! union of all effective members' busy intervals.
//!
//! For each weekday independently, the aggregator fetches every member's busy
//! intervals in one bulk read, then scans the fixed slot grid: a slot is free
//! iff it overlaps no fetched busy interval. One busy member makes a slot
//! unfree for the whole group. Cost is O(S × B) per weekday for S grid slots
//! and B busy intervals; with S fixed at 48, B is the dominant cost driver
//! for groups with very large busy sets.

use chrono::Utc;
use log::debug;

use crate::error::Result;
use crate::model::{GroupId, ALL_WEEKDAYS};
use crate::slots::day_slots;
use crate::store::{FreeSlot, GroupDirectory, ScheduleStore};

/// Recompute and store the full free-slot set for one group.
///
/// The previous stored set is discarded and replaced atomically with the new
/// one (arena-style replace: the whole set is built in memory first). Calling
/// this twice with unchanged inputs yields the same stored set.
///
/// A group with zero effective members stores an empty set.
///
/// # Errors
/// Returns `EngineError::GroupNotFound` for an unknown group, or whatever
/// storage error the bulk reads/write report.
pub fn compute_group_free_slots<S>(store: &S, group: GroupId) -> Result<Vec<FreeSlot>>
where
    S: ScheduleStore + GroupDirectory,
{
    let members = store.effective_members(group)?;
    if members.is_empty() {
        store.replace_free_slots(group, Vec::new())?;
        return Ok(Vec::new());
    }

    let member_count = members.len();
    let grid = day_slots();
    let created_at = Utc::now();
    let mut free: Vec<FreeSlot> = Vec::new();

    for weekday in ALL_WEEKDAYS {
        // One bulk read per weekday, not per member.
        let busy = store.busy_for_members_on(&members, weekday)?;

        for &(slot_start, slot_end) in &grid {
            let slot_is_free = busy
                .iter()
                .all(|row| !row.overlaps_range(slot_start, slot_end));

            if slot_is_free {
                free.push(FreeSlot {
                    group,
                    weekday,
                    start: slot_start,
                    end: slot_end,
                    member_count,
                    created_at,
                });
            }
        }
    }

    debug!(
        "recomputed group {group}: {} free slots across {member_count} members",
        free.len()
    );

    store.replace_free_slots(group, free.clone())?;
    Ok(free)
}
