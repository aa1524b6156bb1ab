use std::{collections::HashMap, sync::Arc};

use thiserror::Error;

mod builder;
mod resolver;
pub use builder::*;
pub use resolver::*;

use crate::{
    pattern::TripTimes,
    shared::{Duration, Time},
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("This timetable snapshot was already committed for reading")]
    AlreadyCommitted,
    #[error("Trip {0} is not part of this timetable")]
    UnknownTrip(Arc<str>),
    #[error("Trip {0} appears more than once in the same timetable")]
    DuplicateTrip(Arc<str>),
    #[error("Trip {trip_id} has {found} hops, expected {expected}")]
    HopCountMismatch {
        trip_id: Arc<str>,
        expected: usize,
        found: usize,
    },
    #[error("Times for trip {0} would run backwards")]
    IncoherentTimes(Arc<str>),
    #[error("Block for trip {trip_id} starts at stop {start} but the pattern has {stops} stops")]
    StopIndexOutOfRange {
        trip_id: Arc<str>,
        start: usize,
        stops: usize,
    },
}

/// A finalized, indexed table of arrival and departure times for every trip of one pattern.
///
/// There is no way to mutate a `Timetable`. A real-time change starts from
/// [`Timetable::to_builder`], edits the copy and calls [`TimetableBuilder::finish`]
/// to get a new instance.
#[derive(Debug)]
pub struct Timetable {
    pattern_index: u32,
    stops: Arc<[Arc<str>]>,
    trips: Box<[TripTimes]>,
    trip_lookup: HashMap<Arc<str>, u32>,
    /// Fastest scheduled run over each hop across all running trips.
    best_running_times: Box<[Option<Duration>]>,
    /// Shortest dwell at each stop across all running trips.
    best_dwell_times: Box<[Option<Duration>]>,
    min_departure: Option<Time>,
    max_arrival: Option<Time>,
}

impl Timetable {
    /// Copies this timetable into a builder owned by the caller.
    pub fn to_builder(&self) -> TimetableBuilder {
        TimetableBuilder::from_rows(self.pattern_index, self.stops.clone(), self.trips.to_vec())
    }

    pub fn pattern_index(&self) -> u32 {
        self.pattern_index
    }

    pub fn stops(&self) -> &[Arc<str>] {
        &self.stops
    }

    pub fn hop_count(&self) -> usize {
        self.stops.len().saturating_sub(1)
    }

    pub fn trips(&self) -> &[TripTimes] {
        &self.trips
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn trip_index(&self, trip_id: &str) -> Option<usize> {
        self.trip_lookup.get(trip_id).map(|idx| *idx as usize)
    }

    pub fn trip_times(&self, trip: usize) -> &TripTimes {
        &self.trips[trip]
    }

    pub fn trip_times_by_id(&self, trip_id: &str) -> Option<&TripTimes> {
        Some(&self.trips[self.trip_index(trip_id)?])
    }

    pub fn departure_time(&self, hop: usize, trip: usize) -> Time {
        self.trips[trip].departure(hop)
    }

    pub fn arrival_time(&self, hop: usize, trip: usize) -> Time {
        self.trips[trip].arrival(hop)
    }

    pub fn best_running_time(&self, hop: usize) -> Option<Duration> {
        self.best_running_times.get(hop).copied().flatten()
    }

    pub fn best_dwell_time(&self, stop: usize) -> Option<Duration> {
        self.best_dwell_times.get(stop).copied().flatten()
    }

    /// Earliest departure from the first stop of any running trip.
    pub fn min_departure(&self) -> Option<Time> {
        self.min_departure
    }

    /// Latest arrival at the last stop of any running trip.
    pub fn max_arrival(&self) -> Option<Time> {
        self.max_arrival
    }

    /// Finds the running trip that leaves the stop at position `stop` first, no earlier than `after`.
    pub fn next_departure(&self, stop: usize, after: Time) -> Option<(usize, Time)> {
        let mut earliest: Option<(usize, Time)> = None;
        for (trip_idx, trip) in self.trips.iter().enumerate() {
            if trip.is_canceled() {
                continue;
            }
            let Some(departure) = trip.departure_at(stop) else {
                continue;
            };
            // Make sure we don't try to catch a trip that has already left
            if departure < after {
                continue;
            }
            match earliest {
                Some((_, time_to_beat)) if departure >= time_to_beat => {}
                _ => earliest = Some((trip_idx, departure)),
            }
        }
        earliest
    }

    /// Indexes the rows and computes the per-hop and per-stop aggregates.
    pub(crate) fn index(pattern_index: u32, stops: Arc<[Arc<str>]>, trips: Vec<TripTimes>) -> Self {
        let hops = stops.len().saturating_sub(1);
        let trip_lookup = trips
            .iter()
            .enumerate()
            .map(|(i, trip)| (trip.trip_id.clone(), i as u32))
            .collect();

        let mut best_running_times: Vec<Option<Duration>> = vec![None; hops];
        let mut best_dwell_times: Vec<Option<Duration>> = vec![None; stops.len()];
        let mut min_departure: Option<Time> = None;
        let mut max_arrival: Option<Time> = None;
        for trip in trips.iter().filter(|trip| !trip.is_canceled()) {
            for (hop, best) in best_running_times.iter_mut().enumerate() {
                let running = trip.running_time(hop);
                *best = Some(best.map_or(running, |best| best.min(running)));
            }
            for (stop, best) in best_dwell_times.iter_mut().enumerate() {
                if let Some(dwell) = trip.dwell_time(stop) {
                    *best = Some(best.map_or(dwell, |best| best.min(dwell)));
                }
            }
            if let Some(departure) = trip.departure_at(0) {
                min_departure = Some(min_departure.map_or(departure, |min| min.min(departure)));
            }
            if let Some(arrival) = trip.arrival_at(hops) {
                max_arrival = Some(max_arrival.map_or(arrival, |max| max.max(arrival)));
            }
        }

        Self {
            pattern_index,
            stops,
            trips: trips.into(),
            trip_lookup,
            best_running_times: best_running_times.into(),
            best_dwell_times: best_dwell_times.into(),
            min_departure,
            max_arrival,
        }
    }
}
