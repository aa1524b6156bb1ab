use std::sync::Arc;

use thiserror::Error;

mod schedule;
mod trip_times;
pub use schedule::*;
pub use trip_times::*;

use crate::timetable::{self, Timetable, TimetableBuilder};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Pattern {0} needs at least two stops")]
    TooFewStops(Arc<str>),
    #[error("Pattern at position {position} carries index {index}")]
    IndexMismatch { position: usize, index: u32 },
    #[error("Trip {0} is assigned to more than one pattern")]
    TripInManyPatterns(Arc<str>),
    #[error("Timetable error: {0}")]
    Timetable(#[from] timetable::Error),
}

/// A stop sequence shared by one or more trips, together with
/// the originally scheduled times of those trips.
///
/// Patterns are built once with the rest of the network and never change.
/// Real-time changes live in [`crate::timetable::TimetableResolver`] snapshots.
#[derive(Debug, Clone)]
pub struct TripPattern {
    /// Key of this pattern inside its [`Schedule`].
    pub index: u32,
    pub id: Arc<str>,
    stops: Arc<[Arc<str>]>,
    scheduled: Arc<Timetable>,
}

impl TripPattern {
    pub fn new(
        index: u32,
        id: impl Into<Arc<str>>,
        stops: Vec<Arc<str>>,
        trips: Vec<TripTimes>,
    ) -> Result<Self, self::Error> {
        let id = id.into();
        if stops.len() < 2 {
            return Err(Error::TooFewStops(id));
        }
        let stops: Arc<[Arc<str>]> = stops.into();
        let mut builder = TimetableBuilder::new(index, stops.clone());
        for trip in trips {
            builder.add_trip(trip)?;
        }
        Ok(Self {
            index,
            id,
            stops,
            scheduled: Arc::new(builder.finish()),
        })
    }

    pub fn stops(&self) -> &[Arc<str>] {
        &self.stops
    }

    pub fn stop_id(&self, index: usize) -> Option<&str> {
        self.stops.get(index).map(|id| id.as_ref())
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn hop_count(&self) -> usize {
        self.stops.len() - 1
    }

    /// The timetable as originally scheduled, before any real-time update.
    pub fn scheduled(&self) -> &Arc<Timetable> {
        &self.scheduled
    }

    pub fn trip_index(&self, trip_id: &str) -> Option<usize> {
        self.scheduled.trip_index(trip_id)
    }
}
