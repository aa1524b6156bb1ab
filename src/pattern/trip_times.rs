use std::sync::Arc;

use crate::shared::{Duration, Time};

/// Arrival and departure times for one trip of a pattern.
///
/// Times are stored per hop: `departures[h]` is the departure from stop `h`
/// and `arrivals[h]` the arrival at stop `h + 1`. A pattern with `n` stops
/// therefore has `n - 1` entries in each array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripTimes {
    pub trip_id: Arc<str>,
    departures: Box<[Time]>,
    arrivals: Box<[Time]>,
    canceled: bool,
}

impl TripTimes {
    /// Builds a row from per-hop departures and arrivals.
    /// Both slices must have the same length.
    pub fn new(trip_id: impl Into<Arc<str>>, departures: Vec<Time>, arrivals: Vec<Time>) -> Self {
        debug_assert_eq!(departures.len(), arrivals.len());
        Self {
            trip_id: trip_id.into(),
            departures: departures.into(),
            arrivals: arrivals.into(),
            canceled: false,
        }
    }

    /// Builds a row from `(arrival, departure)` pairs, one per stop.
    /// The arrival at the first stop and the departure at the last stop are ignored.
    pub fn from_stop_times(trip_id: impl Into<Arc<str>>, stop_times: &[(Time, Time)]) -> Self {
        let hops = stop_times.len().saturating_sub(1);
        let departures = stop_times.iter().take(hops).map(|(_, dep)| *dep).collect();
        let arrivals = stop_times.iter().skip(1).map(|(arr, _)| *arr).collect();
        Self::new(trip_id, departures, arrivals)
    }

    pub fn hop_count(&self) -> usize {
        self.departures.len()
    }

    pub fn departure(&self, hop: usize) -> Time {
        self.departures[hop]
    }

    pub fn arrival(&self, hop: usize) -> Time {
        self.arrivals[hop]
    }

    /// Arrival at the stop at position `stop`, `None` for the first stop.
    pub fn arrival_at(&self, stop: usize) -> Option<Time> {
        stop.checked_sub(1)
            .and_then(|hop| self.arrivals.get(hop).copied())
    }

    /// Departure from the stop at position `stop`, `None` for the last stop.
    pub fn departure_at(&self, stop: usize) -> Option<Time> {
        self.departures.get(stop).copied()
    }

    pub fn running_time(&self, hop: usize) -> Duration {
        self.arrivals[hop] - self.departures[hop]
    }

    /// Time spent at an intermediate stop, `None` at either end of the trip.
    pub fn dwell_time(&self, stop: usize) -> Option<Duration> {
        Some(self.departure_at(stop)? - self.arrival_at(stop)?)
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// True when the vehicle never moves backwards in time along the trip.
    pub fn is_coherent(&self) -> bool {
        let runs_forward = self
            .departures
            .iter()
            .zip(self.arrivals.iter())
            .all(|(dep, arr)| dep <= arr);
        let dwells_forward = self
            .arrivals
            .iter()
            .zip(self.departures.iter().skip(1))
            .all(|(arr, dep)| arr <= dep);
        runs_forward && dwells_forward
    }

    pub(crate) fn set_arrival_at(&mut self, stop: usize, time: Time) {
        if let Some(hop) = stop.checked_sub(1)
            && let Some(arrival) = self.arrivals.get_mut(hop)
        {
            *arrival = time;
        }
    }

    pub(crate) fn set_departure_at(&mut self, stop: usize, time: Time) {
        if let Some(departure) = self.departures.get_mut(stop) {
            *departure = time;
        }
    }

    pub(crate) fn set_canceled(&mut self, canceled: bool) {
        self.canceled = canceled;
    }
}
