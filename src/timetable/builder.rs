use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::{
    pattern::TripTimes,
    realtime::{UpdateBlock, UpdateStatus},
    timetable::{self, Timetable},
};

/// A timetable that is still being written to.
///
/// Builders are owned by exactly one writer. Once [`finish`](Self::finish) is called
/// the rows are indexed into an immutable [`Timetable`] and the builder is gone.
#[derive(Debug, Clone)]
pub struct TimetableBuilder {
    pattern_index: u32,
    stops: Arc<[Arc<str>]>,
    trips: Vec<TripTimes>,
}

impl TimetableBuilder {
    /// Creates an empty timetable for a pattern with the given stops.
    pub fn new(pattern_index: u32, stops: Arc<[Arc<str>]>) -> Self {
        Self::from_rows(pattern_index, stops, Vec::new())
    }

    pub(crate) fn from_rows(
        pattern_index: u32,
        stops: Arc<[Arc<str>]>,
        trips: Vec<TripTimes>,
    ) -> Self {
        Self {
            pattern_index,
            stops,
            trips,
        }
    }

    pub fn pattern_index(&self) -> u32 {
        self.pattern_index
    }

    pub fn hop_count(&self) -> usize {
        self.stops.len().saturating_sub(1)
    }

    pub fn trips(&self) -> &[TripTimes] {
        &self.trips
    }

    /// Linear scan, builders are not indexed until they are finished.
    pub fn trip_index(&self, trip_id: &str) -> Option<usize> {
        self.trips
            .iter()
            .position(|trip| trip.trip_id.as_ref() == trip_id)
    }

    pub fn trip_times(&self, trip: usize) -> &TripTimes {
        &self.trips[trip]
    }

    /// Adds a scheduled trip to the table.
    pub fn add_trip(&mut self, trip: TripTimes) -> Result<(), timetable::Error> {
        let found = trip.hop_count();
        if found != self.hop_count() {
            return Err(timetable::Error::HopCountMismatch {
                trip_id: trip.trip_id,
                expected: self.hop_count(),
                found,
            });
        }
        if self.trip_index(&trip.trip_id).is_some() {
            return Err(timetable::Error::DuplicateTrip(trip.trip_id));
        }
        if !trip.is_coherent() {
            return Err(timetable::Error::IncoherentTimes(trip.trip_id));
        }
        self.trips.push(trip);
        Ok(())
    }

    /// Marks a trip as not running. Its times are kept as they were.
    pub fn cancel_trip(&mut self, trip_id: &str) -> Result<(), timetable::Error> {
        let trip = self
            .trip_index(trip_id)
            .ok_or_else(|| timetable::Error::UnknownTrip(trip_id.into()))?;
        self.trips[trip].set_canceled(true);
        Ok(())
    }

    /// Writes an aligned update block into the row of its trip.
    ///
    /// The update at block position `ui` describes the stop at pattern position
    /// `start + ui`. Positions past the end of the pattern and updates whose stop does
    /// not match the pattern stop are skipped. A zero arrival or departure means the
    /// time was not observed and the current value is kept, except that a departure
    /// is never left before an observed arrival. Canceled updates keep their stop's
    /// times. A block made only of canceled updates cancels the trip.
    ///
    /// The row is left untouched and an error returned when the result would run
    /// backwards in time. Returns the number of stops that were written.
    pub fn update(&mut self, block: &UpdateBlock, start: usize) -> Result<usize, timetable::Error> {
        let trip = self
            .trip_index(&block.trip_id)
            .ok_or_else(|| timetable::Error::UnknownTrip(block.trip_id.clone()))?;
        if start >= self.stops.len() {
            return Err(timetable::Error::StopIndexOutOfRange {
                trip_id: block.trip_id.clone(),
                start,
                stops: self.stops.len(),
            });
        }

        let updates = block.updates();
        if !updates.is_empty()
            && updates
                .iter()
                .all(|update| update.status == UpdateStatus::Canceled)
        {
            debug!("Canceling trip {}", block.trip_id);
            self.trips[trip].set_canceled(true);
            return Ok(0);
        }

        let mut times = self.trips[trip].clone();
        let mut written = 0;
        for (ui, update) in updates.iter().enumerate() {
            let stop = start + ui;
            let Some(stop_id) = self.stops.get(stop) else {
                trace!("Update {ui} for trip {} runs past the pattern", block.trip_id);
                break;
            };
            if *stop_id != update.stop_id {
                trace!(
                    "Skipping update for stop {} aligned with pattern stop {}",
                    update.stop_id, stop_id
                );
                continue;
            }
            if update.status == UpdateStatus::Canceled {
                continue;
            }
            if !update.arrive.is_zero() {
                times.set_arrival_at(stop, update.arrive);
            }
            if !update.depart.is_zero() {
                times.set_departure_at(stop, update.depart);
            } else if let Some(departure) = times.departure_at(stop)
                && departure < update.arrive
            {
                // The vehicle cannot leave before it arrived
                times.set_departure_at(stop, update.arrive);
            }
            written += 1;
        }

        if !times.is_coherent() {
            warn!(
                "Rejected update block for trip {}, times would run backwards",
                block.trip_id
            );
            return Err(timetable::Error::IncoherentTimes(block.trip_id.clone()));
        }
        times.set_canceled(false);
        self.trips[trip] = times;
        Ok(written)
    }

    /// Indexes the rows and freezes them into a [`Timetable`].
    pub fn finish(self) -> Timetable {
        Timetable::index(self.pattern_index, self.stops, self.trips)
    }
}
