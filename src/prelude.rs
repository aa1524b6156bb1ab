pub use crate::{
    pattern::{Schedule, ScheduledStop, ScheduledTrip, TripPattern, TripTimes},
    realtime::{
        SnapshotSource, StoptimeUpdater, Update, UpdateBlock, UpdateStats, UpdateStatus,
        UpdaterConfig,
    },
    shared::{Duration, Time},
    timetable::{Timetable, TimetableBuilder, TimetableResolver},
};
