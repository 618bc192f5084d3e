//! Storage seam for busy intervals and derived free slots.
//!
//! Two traits split the engine's external reads and writes: [`GroupDirectory`]
//! resolves group membership (owned by the membership collaborator), and
//! [`ScheduleStore`] covers busy-interval rows plus the derived free-slot
//! sets. [`MemoryStore`] implements both behind a single `RwLock`, so a
//! free-slot replacement is atomic from any reader's point of view.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{EngineError, Result};
use crate::model::{weekday_index, weekday_repr, BusyInterval, Group, GroupId, UserId};

/// A derived common free slot for a group.
///
/// Always regenerated wholesale from busy-interval data, never patched.
/// Unique within a group on `(weekday, start, end)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeSlot {
    pub group: GroupId,
    #[serde(with = "weekday_repr")]
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// Number of distinct effective members considered by the computation
    /// that produced this slot. A snapshot, not a live count.
    pub member_count: usize,
    pub created_at: DateTime<Utc>,
}

impl FreeSlot {
    /// Uniqueness key within a group's stored set.
    pub fn key(&self) -> (u8, NaiveTime, NaiveTime) {
        (weekday_index(self.weekday), self.start, self.end)
    }
}

/// Read access to group membership, provided by the membership collaborator.
pub trait GroupDirectory {
    fn group(&self, id: GroupId) -> Result<Group>;

    /// Creator ∪ members, deduplicated.
    fn effective_members(&self, id: GroupId) -> Result<BTreeSet<UserId>>;

    /// Every group the user participates in, as creator or member.
    /// Each group appears once.
    fn groups_for_user(&self, user: UserId) -> Result<Vec<GroupId>>;
}

/// Busy-interval rows and derived free-slot sets.
pub trait ScheduleStore {
    /// Idempotent insert. Returns `false` when an identical
    /// `(user, weekday, start, end)` row already exists (successful no-op).
    fn insert_busy_interval(&self, interval: BusyInterval) -> Result<bool>;

    /// Returns `false` when no matching row existed.
    fn remove_busy_interval(&self, interval: &BusyInterval) -> Result<bool>;

    /// Delete every busy interval owned by the user; returns the count removed.
    fn clear_busy_intervals(&self, user: UserId) -> Result<usize>;

    /// One bulk read per weekday: all busy intervals owned by any of the
    /// given members on that weekday, in no particular order.
    fn busy_for_members_on(
        &self,
        members: &BTreeSet<UserId>,
        weekday: Weekday,
    ) -> Result<Vec<BusyInterval>>;

    /// Atomically discard the group's stored free-slot set and install the
    /// new one. Duplicates on the uniqueness key within the batch are
    /// ignored rather than failing the whole write.
    fn replace_free_slots(&self, group: GroupId, slots: Vec<FreeSlot>) -> Result<()>;

    /// Stored slots for the group, ordered by weekday index then start time.
    fn free_slots_for(&self, group: GroupId) -> Result<Vec<FreeSlot>>;
}

#[derive(Default)]
struct StoreInner {
    groups: BTreeMap<GroupId, Group>,
    busy: BTreeMap<UserId, Vec<BusyInterval>>,
    free: BTreeMap<GroupId, Vec<FreeSlot>>,
}

/// In-memory store backing both storage traits.
///
/// One lock guards all tables; writers hold it only long enough to swap in
/// pre-built data, so concurrent recomputations racing on the same group are
/// safe (whichever bulk write commits last determines the stored set).
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a group definition.
    pub fn upsert_group(&self, group: Group) {
        let mut inner = self.inner.write();
        inner.groups.insert(group.id, group);
    }

    /// Remove a group and its derived free slots. Returns `false` when the
    /// group was unknown.
    pub fn remove_group(&self, id: GroupId) -> bool {
        let mut inner = self.inner.write();
        inner.free.remove(&id);
        inner.groups.remove(&id).is_some()
    }
}

impl GroupDirectory for MemoryStore {
    fn group(&self, id: GroupId) -> Result<Group> {
        self.inner
            .read()
            .groups
            .get(&id)
            .cloned()
            .ok_or(EngineError::GroupNotFound(id))
    }

    fn effective_members(&self, id: GroupId) -> Result<BTreeSet<UserId>> {
        Ok(self.group(id)?.effective_members())
    }

    fn groups_for_user(&self, user: UserId) -> Result<Vec<GroupId>> {
        let inner = self.inner.read();
        Ok(inner
            .groups
            .values()
            .filter(|g| g.creator == user || g.members.contains(&user))
            .map(|g| g.id)
            .collect())
    }
}

impl ScheduleStore for MemoryStore {
    fn insert_busy_interval(&self, interval: BusyInterval) -> Result<bool> {
        let mut inner = self.inner.write();
        let rows = inner.busy.entry(interval.user).or_default();
        if rows.contains(&interval) {
            return Ok(false);
        }
        rows.push(interval);
        Ok(true)
    }

    fn remove_busy_interval(&self, interval: &BusyInterval) -> Result<bool> {
        let mut inner = self.inner.write();
        let Some(rows) = inner.busy.get_mut(&interval.user) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| row != interval);
        Ok(rows.len() < before)
    }

    fn clear_busy_intervals(&self, user: UserId) -> Result<usize> {
        let mut inner = self.inner.write();
        Ok(inner.busy.remove(&user).map_or(0, |rows| rows.len()))
    }

    fn busy_for_members_on(
        &self,
        members: &BTreeSet<UserId>,
        weekday: Weekday,
    ) -> Result<Vec<BusyInterval>> {
        let inner = self.inner.read();
        Ok(members
            .iter()
            .filter_map(|user| inner.busy.get(user))
            .flatten()
            .filter(|row| row.weekday == weekday)
            .cloned()
            .collect())
    }

    fn replace_free_slots(&self, group: GroupId, slots: Vec<FreeSlot>) -> Result<()> {
        // Build the deduplicated, ordered set outside the lock; the write
        // itself is a single map insert.
        let mut seen: BTreeSet<(u8, NaiveTime, NaiveTime)> = BTreeSet::new();
        let mut deduped: Vec<FreeSlot> = Vec::with_capacity(slots.len());
        for slot in slots {
            if seen.insert(slot.key()) {
                deduped.push(slot);
            }
        }
        deduped.sort_by_key(|slot| slot.key());

        let mut inner = self.inner.write();
        inner.free.insert(group, deduped);
        Ok(())
    }

    fn free_slots_for(&self, group: GroupId) -> Result<Vec<FreeSlot>> {
        let inner = self.inner.read();
        Ok(inner.free.get(&group).cloned().unwrap_or_default())
    }
}
