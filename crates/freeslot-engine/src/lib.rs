//! # freeslot-engine
//!
//! Finds time windows when every member of a group is simultaneously free,
//! given each member's declared busy intervals over a repeating 7-day week.
//!
//! The engine discretizes each day into 30-minute slots, marks a slot free
//! for a group iff no effective member (creator ∪ members) has a busy
//! interval overlapping it, and keeps the derived free-slot sets consistent
//! by full recomputation whenever busy intervals or membership change.
//!
//! ## Modules
//!
//! - [`model`] -- users, groups, weekdays, busy intervals, overlap test
//! - [`slots`] -- the canonical per-day slot grid
//! - [`aggregator`] -- common free-slot computation and atomic replacement
//! - [`trigger`] -- mutation fan-out: which groups to recompute, and when
//! - [`store`] -- storage traits plus the in-memory implementation
//! - [`error`] -- error types

pub mod aggregator;
pub mod error;
pub mod model;
pub mod slots;
pub mod store;
pub mod trigger;

pub use aggregator::compute_group_free_slots;
pub use error::EngineError;
pub use model::{BusyInterval, BusyIntervalInput, Group, GroupId, UserId};
pub use slots::day_slots;
pub use store::{FreeSlot, GroupDirectory, MemoryStore, ScheduleStore};
pub use trigger::{
    on_busy_interval_changed, on_membership_changed, submit_busy_intervals, MAX_BATCH_SIZE,
};
