//! `freeslot` CLI -- compute a group's common free time from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Compute free slots for every group in a schedule file (stdin → stdout)
//! cat schedule.json | freeslot compute
//!
//! # Compute from file to file
//! freeslot compute -i schedule.json -o free.json
//!
//! # Compute for a single group
//! freeslot compute -i schedule.json --group 1
//!
//! # Print the canonical day slot grid
//! freeslot slots
//! ```
//!
//! A schedule file holds the group definitions and every user's busy
//! intervals (weekday as an index in 0..=6, Monday = 0):
//!
//! ```json
//! {
//!   "groups": [{ "id": 1, "creator": 1, "members": [2, 3] }],
//!   "busy": [
//!     { "user": 2, "weekday": 0, "start": "09:00:00", "end": "10:00:00" }
//!   ]
//! }
//! ```

use anyhow::{bail, Context, Result};
use chrono::{NaiveTime, Weekday};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Read};

use freeslot_engine::model::weekday_repr;
use freeslot_engine::store::{FreeSlot, ScheduleStore};
use freeslot_engine::trigger::{submit_busy_intervals, BatchSummary};
use freeslot_engine::{day_slots, BusyIntervalInput, Group, GroupId, MemoryStore, UserId};

#[derive(Parser)]
#[command(
    name = "freeslot",
    version,
    about = "Common free-time computation for groups with weekly busy schedules"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute free slots from a schedule file
    Compute {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Compute only this group ID
        #[arg(short, long)]
        group: Option<u64>,
    },
    /// Print the canonical day slot grid as JSON
    Slots,
}

/// A busy-interval row in the schedule file.
#[derive(Debug, Deserialize)]
struct BusyRow {
    user: UserId,
    #[serde(with = "weekday_repr")]
    weekday: Weekday,
    start: NaiveTime,
    end: NaiveTime,
}

/// Top-level schedule file shape.
#[derive(Debug, Deserialize)]
struct ScheduleFile {
    groups: Vec<Group>,
    #[serde(default)]
    busy: Vec<BusyRow>,
}

/// Free-slot output for one group.
#[derive(Debug, Serialize)]
struct GroupFreeTime {
    group: GroupId,
    free: Vec<FreeSlot>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            input,
            output,
            group,
        } => {
            let text = read_input(input.as_deref())?;
            let schedule: ScheduleFile =
                serde_json::from_str(&text).context("failed to parse schedule JSON")?;
            let results = run_compute(schedule, group.map(GroupId))?;
            let json = serde_json::to_string_pretty(&results)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Slots => {
            let grid: Vec<(NaiveTime, NaiveTime)> = day_slots();
            println!("{}", serde_json::to_string_pretty(&grid)?);
        }
    }

    Ok(())
}

/// Load the schedule into an in-memory store, submit each user's busy
/// intervals as one batch (firing the recalculation trigger once per user),
/// then read the stored free slots back.
fn run_compute(schedule: ScheduleFile, only: Option<GroupId>) -> Result<Vec<GroupFreeTime>> {
    let store = MemoryStore::new();

    let mut group_ids: Vec<GroupId> = Vec::new();
    for group in schedule.groups {
        group_ids.push(group.id);
        store.upsert_group(group);
    }

    if let Some(wanted) = only {
        if !group_ids.contains(&wanted) {
            bail!("group {wanted} not present in the schedule file");
        }
        group_ids.retain(|&id| id == wanted);
    }

    // One batch per user, so each user's burst of rows triggers exactly one
    // recomputation fan-out.
    let mut per_user: BTreeMap<UserId, Vec<BusyIntervalInput>> = BTreeMap::new();
    for row in schedule.busy {
        per_user.entry(row.user).or_default().push(BusyIntervalInput {
            weekday: row.weekday,
            start: row.start,
            end: row.end,
        });
    }

    for (user, batch) in per_user {
        let summary: BatchSummary = submit_busy_intervals(&store, user, batch)
            .with_context(|| format!("busy-interval submission failed for user {user}"))?;
        for (index, err) in &summary.rejected {
            eprintln!("warning: user {user} interval {index} rejected: {err}");
        }
        for recalc in &summary.recalcs {
            if let Err(err) = &recalc.result {
                eprintln!("warning: {err}");
            }
        }
    }

    // Groups no submission touched (e.g., all members idle) still need one
    // computation pass to materialize their free slots.
    let mut results = Vec::with_capacity(group_ids.len());
    for id in group_ids {
        let mut free = store.free_slots_for(id)?;
        if free.is_empty() {
            free = freeslot_engine::compute_group_free_slots(&store, id)?;
        }
        results.push(GroupFreeTime { group: id, free });
    }

    Ok(results)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("failed to read {p}")),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, text: &str) -> Result<()> {
    match path {
        Some(p) => std::fs::write(p, text).with_context(|| format!("failed to write {p}")),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
