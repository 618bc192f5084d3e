//! Property-based tests for the aggregation engine using proptest.
//!
//! These verify invariants that should hold for *any* busy schedule, not
//! just the fixed examples in `aggregator_tests.rs`.

use chrono::{NaiveTime, Weekday};
use proptest::prelude::*;
use std::collections::BTreeSet;

use freeslot_engine::compute_group_free_slots;
use freeslot_engine::model::{weekday_from_index, BusyInterval};
use freeslot_engine::store::ScheduleStore;
use freeslot_engine::{Group, GroupId, MemoryStore, UserId};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn minute_time(minutes: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap()
}

/// A valid busy interval on the minute grid: start < end, both within a day.
fn arb_interval() -> impl Strategy<Value = (Weekday, NaiveTime, NaiveTime)> {
    (0u8..7, 0u32..1438, 1u32..120).prop_map(|(day, start, len)| {
        let end = (start + len).min(1439);
        (
            weekday_from_index(day).unwrap(),
            minute_time(start),
            minute_time(end),
        )
    })
}

fn arb_schedule() -> impl Strategy<Value = Vec<(u8, Weekday, NaiveTime, NaiveTime)>> {
    prop::collection::vec(
        (1u8..4, arb_interval()).prop_map(|(user, (day, start, end))| (user, day, start, end)),
        0..20,
    )
}

fn seeded_store(schedule: &[(u8, Weekday, NaiveTime, NaiveTime)]) -> (MemoryStore, GroupId) {
    let store = MemoryStore::new();
    let id = GroupId(1);
    store.upsert_group(Group {
        id,
        creator: UserId(1),
        members: vec![UserId(2), UserId(3)],
    });
    for &(user, day, start, end) in schedule {
        let interval = BusyInterval::new(UserId(user as u64), day, start, end).unwrap();
        store.insert_busy_interval(interval).unwrap();
    }
    (store, id)
}

fn key_set(
    slots: &[freeslot_engine::FreeSlot],
) -> BTreeSet<(u8, NaiveTime, NaiveTime)> {
    slots.iter().map(|s| s.key()).collect()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// Recomputing with unchanged inputs yields an identical stored set.
    #[test]
    fn recomputation_is_idempotent(schedule in arb_schedule()) {
        let (store, group) = seeded_store(&schedule);

        let first = compute_group_free_slots(&store, group).unwrap();
        let second = compute_group_free_slots(&store, group).unwrap();

        prop_assert_eq!(key_set(&first), key_set(&second));
        prop_assert_eq!(
            key_set(&second),
            key_set(&store.free_slots_for(group).unwrap())
        );
    }

    /// Adding a busy interval never increases the free-slot set; removing
    /// it never decreases it.
    #[test]
    fn free_slots_are_monotone_in_busy_coverage(
        schedule in arb_schedule(),
        extra in arb_interval(),
    ) {
        let (store, group) = seeded_store(&schedule);
        let before = key_set(&compute_group_free_slots(&store, group).unwrap());

        let (day, start, end) = extra;
        let interval = BusyInterval::new(UserId(2), day, start, end).unwrap();
        let inserted = store.insert_busy_interval(interval.clone()).unwrap();
        let with_extra = key_set(&compute_group_free_slots(&store, group).unwrap());

        prop_assert!(with_extra.is_subset(&before));

        // Only a row this test actually created can be removed to restore
        // the original inputs; a duplicate insert was a no-op.
        if inserted {
            store.remove_busy_interval(&interval).unwrap();
            let after = key_set(&compute_group_free_slots(&store, group).unwrap());
            prop_assert_eq!(after, before);
        }
    }

    /// No stored free slot overlaps any member's busy interval.
    #[test]
    fn free_slots_never_overlap_busy_intervals(schedule in arb_schedule()) {
        let (store, group) = seeded_store(&schedule);
        let free = compute_group_free_slots(&store, group).unwrap();

        for slot in &free {
            for &(_user, day, start, end) in &schedule {
                if day == slot.weekday {
                    prop_assert!(
                        !(start < slot.end && slot.start < end),
                        "free slot {:?}-{:?} overlaps busy {:?}-{:?}",
                        slot.start, slot.end, start, end
                    );
                }
            }
        }
    }

    /// Every stored slot carries the member-count snapshot and the stored
    /// set is unique on its key.
    #[test]
    fn stored_set_is_unique_and_counts_members(schedule in arb_schedule()) {
        let (store, group) = seeded_store(&schedule);
        let free = compute_group_free_slots(&store, group).unwrap();

        prop_assert!(free.iter().all(|s| s.member_count == 3));
        prop_assert_eq!(key_set(&free).len(), free.len());
    }
}
