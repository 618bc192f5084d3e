//! Recalculation trigger -- fan a mutation out to every affected group.
//!
//! Each group's recomputation is an independent unit of work dispatched to
//! the rayon pool; a failure for one group is reported on its own and never
//! aborts siblings. Bulk busy-interval submissions fire the fan-out exactly
//! once, after the whole burst of writes has been applied.

use log::warn;
use rayon::prelude::*;

use crate::aggregator::compute_group_free_slots;
use crate::error::{EngineError, Result};
use crate::model::{BusyInterval, BusyIntervalInput, GroupId, UserId};
use crate::store::{FreeSlot, GroupDirectory, ScheduleStore};

/// Maximum busy intervals accepted in one bulk submission.
pub const MAX_BATCH_SIZE: usize = 100;

/// Outcome of one group's recomputation inside a fan-out.
#[derive(Debug)]
pub struct GroupRecalc {
    pub group: GroupId,
    pub result: Result<Vec<FreeSlot>>,
}

/// Summary of a bulk busy-interval submission.
#[derive(Debug)]
pub struct BatchSummary {
    /// Rows actually created.
    pub created: usize,
    /// Duplicate rows treated as successful no-ops.
    pub duplicates: usize,
    /// Per-item validation failures; valid items in the same batch still land.
    pub rejected: Vec<(usize, EngineError)>,
    /// Per-group recomputation outcomes from the single trigger firing.
    pub recalcs: Vec<GroupRecalc>,
}

fn recompute_groups<S>(store: &S, groups: &[GroupId]) -> Vec<GroupRecalc>
where
    S: ScheduleStore + GroupDirectory + Sync,
{
    groups
        .par_iter()
        .map(|&group| {
            let result = compute_group_free_slots(store, group).map_err(|err| {
                EngineError::Computation {
                    group,
                    message: err.to_string(),
                }
            });
            if let Err(err) = &result {
                warn!("{err}");
            }
            GroupRecalc { group, result }
        })
        .collect()
}

/// A user's busy intervals changed: recompute every group the user
/// participates in, as creator or member.
///
/// # Errors
/// Fails only when the user's group list cannot be resolved; per-group
/// recomputation failures are reported inside the returned list.
pub fn on_busy_interval_changed<S>(store: &S, user: UserId) -> Result<Vec<GroupRecalc>>
where
    S: ScheduleStore + GroupDirectory + Sync,
{
    let groups = store.groups_for_user(user)?;
    Ok(recompute_groups(store, &groups))
}

/// A group's membership changed: recompute that one group.
pub fn on_membership_changed<S>(store: &S, group: GroupId) -> Result<Vec<FreeSlot>>
where
    S: ScheduleStore + GroupDirectory,
{
    compute_group_free_slots(store, group)
}

/// Apply a burst of busy-interval inserts for one user, then fire the
/// recalculation fan-out exactly once.
///
/// Items failing `start < end` validation are collected in the summary
/// without sinking the rest of the batch. Duplicates of already-stored rows
/// are successful no-ops.
///
/// # Errors
/// Returns `EngineError::BatchTooLarge` for more than [`MAX_BATCH_SIZE`]
/// items; nothing is applied in that case.
pub fn submit_busy_intervals<S>(
    store: &S,
    user: UserId,
    batch: Vec<BusyIntervalInput>,
) -> Result<BatchSummary>
where
    S: ScheduleStore + GroupDirectory + Sync,
{
    if batch.len() > MAX_BATCH_SIZE {
        return Err(EngineError::BatchTooLarge {
            size: batch.len(),
            max: MAX_BATCH_SIZE,
        });
    }

    let mut created = 0;
    let mut duplicates = 0;
    let mut rejected = Vec::new();

    for (index, item) in batch.into_iter().enumerate() {
        match BusyInterval::new(user, item.weekday, item.start, item.end) {
            Ok(interval) => {
                if store.insert_busy_interval(interval)? {
                    created += 1;
                } else {
                    duplicates += 1;
                }
            }
            Err(err) => rejected.push((index, err)),
        }
    }

    let recalcs = on_busy_interval_changed(store, user)?;
    Ok(BatchSummary {
        created,
        duplicates,
        rejected,
        recalcs,
    })
}

/// Delete one busy interval and recompute the owner's groups.
///
/// Returns whether a row was actually removed, plus the per-group outcomes.
pub fn delete_busy_interval<S>(
    store: &S,
    interval: &BusyInterval,
) -> Result<(bool, Vec<GroupRecalc>)>
where
    S: ScheduleStore + GroupDirectory + Sync,
{
    let removed = store.remove_busy_interval(interval)?;
    let recalcs = on_busy_interval_changed(store, interval.user)?;
    Ok((removed, recalcs))
}

/// Delete every busy interval owned by the user and recompute their groups.
///
/// Returns the number of rows removed, plus the per-group outcomes.
pub fn clear_busy_intervals<S>(store: &S, user: UserId) -> Result<(usize, Vec<GroupRecalc>)>
where
    S: ScheduleStore + GroupDirectory + Sync,
{
    let removed = store.clear_busy_intervals(user)?;
    let recalcs = on_busy_interval_changed(store, user)?;
    Ok((removed, recalcs))
}
