use std::{collections::HashMap, sync::Arc, time::Instant};

use tracing::debug;

use crate::{
    pattern::{self, TripPattern, TripTimes},
    shared::Time,
    timetable::TimetableResolver,
};

/// One call of a scheduled trip at a stop.
#[derive(Debug, Clone)]
pub struct ScheduledStop {
    pub stop_id: Arc<str>,
    pub arrival: Time,
    pub departure: Time,
}

impl ScheduledStop {
    pub fn new(stop_id: impl Into<Arc<str>>, arrival: Time, departure: Time) -> Self {
        Self {
            stop_id: stop_id.into(),
            arrival,
            departure,
        }
    }
}

/// A trip as it comes out of the static feed, stop calls already in sequence order.
#[derive(Debug, Clone)]
pub struct ScheduledTrip {
    pub trip_id: Arc<str>,
    pub stop_times: Vec<ScheduledStop>,
}

/// The immutable set of trip patterns for a network.
#[derive(Debug, Default)]
pub struct Schedule {
    patterns: Box<[TripPattern]>,
    trip_to_pattern: HashMap<Arc<str>, u32>,
}

impl Schedule {
    /// Groups trips into patterns.
    /// Trips calling at exactly the same stops in the same order share a pattern.
    pub fn from_trips(trips: Vec<ScheduledTrip>) -> Result<Self, pattern::Error> {
        debug!("Generating trip patterns...");
        let now = Instant::now();

        // Keep the order in which stop sequences are first seen so pattern indexes are stable
        let mut signatures: HashMap<Vec<Arc<str>>, usize> = HashMap::new();
        let mut groups: Vec<(Vec<Arc<str>>, Vec<TripTimes>)> = Vec::new();
        for trip in trips {
            let signature: Vec<Arc<str>> = trip
                .stop_times
                .iter()
                .map(|stop_time| stop_time.stop_id.clone())
                .collect();
            let stop_times: Vec<_> = trip
                .stop_times
                .iter()
                .map(|stop_time| (stop_time.arrival, stop_time.departure))
                .collect();
            let times = TripTimes::from_stop_times(trip.trip_id, &stop_times);
            let group = *signatures.entry(signature.clone()).or_insert_with(|| {
                groups.push((signature, Vec::new()));
                groups.len() - 1
            });
            groups[group].1.push(times);
        }

        let patterns = groups
            .into_iter()
            .enumerate()
            .map(|(i, (stops, trips))| {
                TripPattern::new(i as u32, format!("pattern-{i}"), stops, trips)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let schedule = Self::from_patterns(patterns)?;
        debug!(
            "Generating {} trip patterns took {:?}",
            schedule.patterns.len(),
            now.elapsed()
        );
        Ok(schedule)
    }

    /// Wraps already built patterns. Each pattern's index must equal its position.
    pub fn from_patterns(patterns: Vec<TripPattern>) -> Result<Self, pattern::Error> {
        let mut trip_to_pattern: HashMap<Arc<str>, u32> = HashMap::new();
        for (position, pattern) in patterns.iter().enumerate() {
            if pattern.index as usize != position {
                return Err(pattern::Error::IndexMismatch {
                    position,
                    index: pattern.index,
                });
            }
            for trip in pattern.scheduled().trips() {
                if trip_to_pattern
                    .insert(trip.trip_id.clone(), pattern.index)
                    .is_some()
                {
                    return Err(pattern::Error::TripInManyPatterns(trip.trip_id.clone()));
                }
            }
        }
        Ok(Self {
            patterns: patterns.into(),
            trip_to_pattern,
        })
    }

    pub fn patterns(&self) -> &[TripPattern] {
        &self.patterns
    }

    pub fn pattern(&self, index: u32) -> Option<&TripPattern> {
        self.patterns.get(index as usize)
    }

    /// Gets the pattern the given trip runs on.
    /// If no trip with the given id was found None is returned.
    pub fn pattern_by_trip_id(&self, trip_id: &str) -> Option<&TripPattern> {
        let index = self.trip_to_pattern.get(trip_id)?;
        self.pattern(*index)
    }

    /// The first snapshot handed to searches: committed, with no modified timetables.
    pub fn initial_snapshot(&self) -> TimetableResolver {
        TimetableResolver::committed()
    }
}
