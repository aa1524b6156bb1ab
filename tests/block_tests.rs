mod common;

use common::*;
use stoptime::prelude::*;

#[test]
fn split_groups_updates_per_trip_in_stop_order() {
    let updates = vec![
        predicted("t2", "B", 3, 100, 110),
        predicted("t1", "C", 4, 300, 310),
        predicted("t1", "A", 2, 100, 110),
        predicted("s1", "R", 2, 50, 60),
        predicted("t2", "A", 2, 40, 50),
        predicted("t1", "B", 3, 200, 210),
    ];
    let blocks = UpdateBlock::split_by_trip(updates);

    let trips: Vec<_> = blocks.iter().map(|block| block.trip_id.as_ref()).collect();
    assert_eq!(trips, vec!["s1", "t1", "t2"]);
    let t1: Vec<_> = blocks[1]
        .updates()
        .iter()
        .map(|update| update.stop_id.as_ref())
        .collect();
    assert_eq!(t1, vec!["A", "B", "C"]);
    assert!(blocks.iter().all(|block| block.is_sane()));
}

#[test]
fn splitting_again_reproduces_the_blocks() {
    let updates = vec![
        predicted("t2", "B", 3, 100, 110),
        predicted("t1", "A", 2, 100, 110),
        predicted("t2", "A", 2, 40, 50),
        predicted("t1", "B", 3, 200, 210),
    ];
    let blocks = UpdateBlock::split_by_trip(updates);
    let mut flattened: Vec<Update> = blocks
        .iter()
        .flat_map(|block| block.updates().to_vec())
        .collect();
    flattened.reverse();
    assert_eq!(UpdateBlock::split_by_trip(flattened), blocks);
}

#[test]
fn split_of_nothing_is_empty() {
    assert!(UpdateBlock::split_by_trip(Vec::new()).is_empty());
}

#[test]
fn repeated_stop_sequence_is_not_sane() {
    let block = UpdateBlock::new(
        "t1",
        vec![predicted("t1", "A", 2, 100, 110), predicted("t1", "B", 2, 200, 210)],
    );
    assert!(!block.is_sane());
}

#[test]
fn arrival_before_previous_departure_is_not_sane() {
    let block = UpdateBlock::new(
        "t1",
        vec![predicted("t1", "A", 2, 100, 150), predicted("t1", "B", 3, 140, 160)],
    );
    assert!(!block.is_sane());
}

#[test]
fn foreign_trip_is_not_sane() {
    let block = UpdateBlock::new(
        "t1",
        vec![predicted("t1", "A", 2, 100, 110), predicted("t2", "B", 3, 200, 210)],
    );
    assert!(!block.is_sane());
}

#[test]
fn gaps_in_stop_sequence_are_sane() {
    let block = UpdateBlock::new(
        "t1",
        vec![
            predicted("t1", "A", 2, 100, 110),
            predicted("t1", "B", 5, 200, 210),
            predicted("t1", "C", 9, 300, 0),
        ],
    );
    assert!(block.is_sane());
}

#[test]
fn negative_dwell_is_fixed() {
    let mut block = UpdateBlock::new(
        "t1",
        vec![predicted("t1", "A", 2, 100, 90), predicted("t1", "B", 3, 200, 210)],
    );
    assert!(block.filter(false, true, false));
    let fixed = &block.updates()[0];
    assert_eq!(fixed.arrive, t(90));
    assert_eq!(fixed.depart, t(90));
    assert_eq!(block.len(), 2);
}

#[test]
fn zero_departure_is_not_a_negative_dwell() {
    let mut block = UpdateBlock::new(
        "t1",
        vec![predicted("t1", "A", 2, 100, 110), predicted("t1", "B", 3, 200, 0)],
    );
    assert!(!block.filter(true, true, true));
    assert_eq!(block.updates()[1].arrive, t(200));
}

#[test]
fn duplicate_stop_keeps_earliest_departure() {
    let updates = vec![
        predicted("t1", "S1", 3, 40, 60),
        predicted("t1", "S1", 3, 40, 50),
        predicted("t1", "S2", 4, 100, 110),
    ];
    let mut block = UpdateBlock::split_by_trip(updates).remove(0);
    assert!(block.filter(false, false, true));
    assert_eq!(block.len(), 2);
    assert_eq!(block.updates()[0].stop_id.as_ref(), "S1");
    assert_eq!(block.updates()[0].depart, t(50));
}

#[test]
fn passed_stops_are_dropped() {
    let mut block = UpdateBlock::new(
        "t1",
        vec![
            with_status(predicted("t1", "A", 2, 100, 110), UpdateStatus::Passed),
            predicted("t1", "B", 3, 200, 210),
        ],
    );
    assert!(block.filter(true, false, false));
    assert_eq!(block.len(), 1);
    assert_eq!(block.updates()[0].stop_id.as_ref(), "B");
}

#[test]
fn duplicates_compare_against_surviving_updates() {
    // The passed update in between is removed, so the two A updates become neighbours
    let mut block = UpdateBlock::new(
        "t1",
        vec![
            predicted("t1", "A", 2, 100, 110),
            with_status(predicted("t1", "B", 3, 150, 160), UpdateStatus::Passed),
            predicted("t1", "A", 4, 200, 210),
        ],
    );
    assert!(block.filter(true, true, true));
    assert_eq!(block.len(), 1);
    assert_eq!(block.updates()[0].depart, t(110));
}

#[test]
fn disabled_filters_change_nothing() {
    let original = UpdateBlock::new(
        "t1",
        vec![
            with_status(predicted("t1", "A", 2, 100, 90), UpdateStatus::Passed),
            predicted("t1", "A", 3, 200, 210),
        ],
    );
    let mut block = original.clone();
    assert!(!block.filter(false, false, false));
    assert_eq!(block, original);
}

#[test]
fn display_shows_when_the_block_was_received() {
    let mut block = block("t1", &["A", "B"]);
    assert!(!block.to_string().contains("received"));

    block.timestamp = Some(chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap());
    let text = block.to_string();
    assert!(text.starts_with("tripId: t1\nreceived: 2023-11-14T22:13:20+00:00\n"));
    assert_eq!(text.lines().count(), 4);
}
