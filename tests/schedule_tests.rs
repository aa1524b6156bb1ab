mod common;

use common::*;
use stoptime::{pattern, prelude::*, shared::Duration, timetable};

#[test]
fn trips_with_the_same_stops_share_a_pattern() {
    let schedule = schedule();
    assert_eq!(schedule.patterns().len(), 2);

    let line = schedule.pattern_by_trip_id("t2").unwrap();
    assert_eq!(line.index, 0);
    assert_eq!(line.stop_count(), 5);
    assert_eq!(line.hop_count(), 4);
    assert_eq!(line.stop_id(1), Some("A"));
    assert_eq!(line.trip_index("t1"), Some(0));
    assert_eq!(line.trip_index("t2"), Some(1));

    let shuttle = schedule.pattern_by_trip_id("s1").unwrap();
    assert_eq!(shuttle.index, 1);
    assert!(schedule.pattern_by_trip_id("ghost").is_none());
}

#[test]
fn initial_snapshot_is_committed_and_empty() {
    let snapshot = schedule().initial_snapshot();
    assert!(snapshot.is_committed());
    assert!(snapshot.is_empty());
    assert!(!snapshot.is_dirty());
}

#[test]
fn scheduled_timetable_aggregates() {
    let schedule = schedule();
    let timetable = schedule.pattern(0).unwrap().scheduled();
    assert_eq!(timetable.trip_count(), 2);
    assert_eq!(timetable.hop_count(), 4);
    assert_eq!(timetable.departure_time(0, 0), t(28_800 + DWELL));
    assert_eq!(timetable.arrival_time(0, 0), t(28_800 + RUN));
    assert_eq!(
        timetable.best_running_time(0),
        Some(Duration::from_seconds(RUN - DWELL))
    );
    assert_eq!(timetable.best_dwell_time(2), Some(Duration::from_seconds(DWELL)));
    assert_eq!(timetable.best_dwell_time(0), None);
    assert_eq!(timetable.min_departure(), Some(t(28_800 + DWELL)));
    assert_eq!(timetable.max_arrival(), Some(t(32_400 + 4 * RUN)));
}

#[test]
fn next_departure_finds_the_first_trip_still_to_leave() {
    let schedule = schedule();
    let timetable = schedule.pattern(0).unwrap().scheduled();
    let at_b = |after: u32| timetable.next_departure(2, t(after));
    assert_eq!(at_b(0), Some((0, t(28_800 + 2 * RUN + DWELL))));
    assert_eq!(at_b(29_461), Some((1, t(32_400 + 2 * RUN + DWELL))));
    assert_eq!(at_b(40_000), None);
    // Nothing leaves the last stop
    assert_eq!(timetable.next_departure(4, t(0)), None);
}

#[test]
fn pattern_needs_two_stops() {
    let result = TripPattern::new(0, "p", vec!["A".into()], Vec::new());
    assert!(matches!(result, Err(pattern::Error::TooFewStops(_))));
}

#[test]
fn trip_rows_must_fit_the_pattern() {
    let trip = TripTimes::new("t1", vec![t(10)], vec![t(20)]);
    let result = TripPattern::new(0, "p", vec!["A".into(), "B".into(), "C".into()], vec![trip]);
    assert!(matches!(
        result,
        Err(pattern::Error::Timetable(timetable::Error::HopCountMismatch {
            expected: 2,
            found: 1,
            ..
        }))
    ));
}

#[test]
fn scheduled_times_must_run_forward() {
    let trip = TripTimes::new("t1", vec![t(30)], vec![t(20)]);
    let result = TripPattern::new(0, "p", vec!["A".into(), "B".into()], vec![trip]);
    assert!(matches!(
        result,
        Err(pattern::Error::Timetable(timetable::Error::IncoherentTimes(_)))
    ));
}

#[test]
fn trip_ids_are_unique_within_a_pattern() {
    let trips = vec![
        TripTimes::new("t1", vec![t(10)], vec![t(20)]),
        TripTimes::new("t1", vec![t(30)], vec![t(40)]),
    ];
    let result = TripPattern::new(0, "p", vec!["A".into(), "B".into()], trips);
    assert!(matches!(
        result,
        Err(pattern::Error::Timetable(timetable::Error::DuplicateTrip(_)))
    ));
}

#[test]
fn a_trip_belongs_to_one_pattern() {
    let first = TripPattern::new(
        0,
        "p0",
        vec!["A".into(), "B".into()],
        vec![TripTimes::new("t1", vec![t(10)], vec![t(20)])],
    )
    .unwrap();
    let second = TripPattern::new(
        1,
        "p1",
        vec!["B".into(), "C".into()],
        vec![TripTimes::new("t1", vec![t(30)], vec![t(40)])],
    )
    .unwrap();
    let result = Schedule::from_patterns(vec![first, second]);
    assert!(matches!(result, Err(pattern::Error::TripInManyPatterns(_))));

    let result = Schedule::from_patterns(vec![second_at(5)]);
    assert!(matches!(
        result,
        Err(pattern::Error::IndexMismatch { position: 0, index: 5 })
    ));
}

fn second_at(index: u32) -> TripPattern {
    TripPattern::new(
        index,
        "p",
        vec!["B".into(), "C".into()],
        vec![TripTimes::new("t9", vec![t(30)], vec![t(40)])],
    )
    .unwrap()
}
