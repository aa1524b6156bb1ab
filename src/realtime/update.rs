use std::{cmp::Ordering, fmt, sync::Arc};

use crate::shared::Time;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateStatus {
    /// Times copied from the plan, no live information.
    Scheduled,
    /// Live prediction for a stop the vehicle has not reached yet.
    #[default]
    Predicted,
    /// The vehicle is at the stop.
    Arrived,
    /// The vehicle already left the stop.
    Passed,
    /// The vehicle will not call at the stop.
    Canceled,
    Unknown,
}

impl UpdateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Predicted => "PREDICTED",
            Self::Arrived => "ARRIVED",
            Self::Passed => "PASSED",
            Self::Canceled => "CANCELED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parses a status name, ignoring case. A few names used by common feeds are accepted too.
    /// A blank name is not a status, callers fall back to the default.
    pub fn from_name(name: &str) -> Option<Self> {
        let status = match name.trim().to_ascii_uppercase().as_str() {
            "SCHEDULED" | "PLANNED" => Self::Scheduled,
            "PREDICTED" | "PREDICTION" | "DRIVING" => Self::Predicted,
            "ARRIVED" => Self::Arrived,
            "PASSED" | "DEPARTED" => Self::Passed,
            "CANCELED" | "CANCELLED" | "CANCEL" => Self::Canceled,
            "UNKNOWN" => Self::Unknown,
            _ => return None,
        };
        Some(status)
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One real-time observation of a trip at a stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub trip_id: Arc<str>,
    pub stop_id: Arc<str>,
    /// Position of the stop in the trip's schedule, increasing but not always sequential.
    pub stop_seq: u32,
    pub arrive: Time,
    /// Zero when no departure is known, which only happens at the last stop.
    pub depart: Time,
    pub status: UpdateStatus,
}

impl Update {
    pub fn new(
        trip_id: impl Into<Arc<str>>,
        stop_id: impl Into<Arc<str>>,
        stop_seq: u32,
        arrive: Time,
        depart: Time,
        status: UpdateStatus,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            stop_id: stop_id.into(),
            stop_seq,
            arrive,
            depart,
            status,
        }
    }

    /// Orders by trip, then stop sequence, then departure.
    ///
    /// Duplicate stops end up earliest departure first, which is what
    /// the duplicate filter keeps.
    pub fn ordering(&self, other: &Self) -> Ordering {
        self.trip_id
            .cmp(&other.trip_id)
            .then(self.stop_seq.cmp(&other.stop_seq))
            .then(self.depart.cmp(&other.depart))
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} seq {:>3} stop {} A{} D{} {}",
            self.trip_id,
            self.stop_seq,
            self.stop_id,
            self.arrive.as_seconds(),
            self.depart.as_seconds(),
            self.status
        )
    }
}
