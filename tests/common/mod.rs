#![allow(dead_code)]

use stoptime::prelude::*;
use tracing_subscriber::EnvFilter;

pub const RUN: u32 = 300;
pub const DWELL: u32 = 60;

/// Installs a log subscriber writing to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn t(secs: u32) -> Time {
    Time::from_seconds(secs)
}

/// A trip leaving its first stop at `start`, running `RUN` seconds
/// between stops and dwelling `DWELL` seconds at each.
pub fn scheduled_trip(trip_id: &str, stops: &[&str], start: u32) -> ScheduledTrip {
    let stop_times = stops
        .iter()
        .enumerate()
        .map(|(i, stop_id)| {
            let arrival = start + i as u32 * RUN;
            ScheduledStop::new(*stop_id, t(arrival), t(arrival + DWELL))
        })
        .collect();
    ScheduledTrip {
        trip_id: (*trip_id).into(),
        stop_times,
    }
}

pub const LINE: [&str; 5] = ["X", "A", "B", "C", "Y"];
pub const SHUTTLE: [&str; 3] = ["Q", "R", "S"];

/// Pattern 0 runs `LINE` with trips `t1` (08:00) and `t2` (09:00),
/// pattern 1 runs `SHUTTLE` with trip `s1` (08:20).
pub fn schedule() -> Schedule {
    Schedule::from_trips(vec![
        scheduled_trip("t1", &LINE, 28_800),
        scheduled_trip("s1", &SHUTTLE, 30_000),
        scheduled_trip("t2", &LINE, 32_400),
    ])
    .unwrap()
}

pub fn predicted(trip_id: &str, stop_id: &str, stop_seq: u32, arrive: u32, depart: u32) -> Update {
    Update::new(trip_id, stop_id, stop_seq, t(arrive), t(depart), UpdateStatus::Predicted)
}

pub fn with_status(mut update: Update, status: UpdateStatus) -> Update {
    update.status = status;
    update
}

/// A block for `trip_id` calling at `stops` in order, one minute apart.
pub fn block(trip_id: &str, stops: &[&str]) -> UpdateBlock {
    let updates = stops
        .iter()
        .enumerate()
        .map(|(i, stop_id)| {
            let time = 28_800 + i as u32 * 60;
            predicted(trip_id, stop_id, i as u32 + 1, time, time)
        })
        .collect();
    UpdateBlock::new(trip_id, updates)
}
