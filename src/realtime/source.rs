use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::{
    pattern::Schedule,
    realtime::{self, StoptimeUpdater, Update, UpdateStats},
    timetable::TimetableResolver,
};

/// Holds the committed snapshot searches should currently use.
///
/// Readers take an `Arc` to the snapshot and keep it for the whole search.
/// Publishing a new snapshot only swaps the pointer, snapshots already handed
/// out stay valid and unchanged. Writers are serialized so at most one write
/// session runs at a time.
#[derive(Debug)]
pub struct SnapshotSource {
    current: RwLock<Arc<TimetableResolver>>,
    writer: Mutex<()>,
}

impl SnapshotSource {
    /// Starts from the schedule's initial snapshot.
    pub fn new(schedule: &Schedule) -> Self {
        Self {
            current: RwLock::new(Arc::new(schedule.initial_snapshot())),
            writer: Mutex::new(()),
        }
    }

    /// The snapshot to use for a search.
    pub fn snapshot(&self) -> Arc<TimetableResolver> {
        self.current.read().clone()
    }

    /// Makes a committed resolver the current snapshot and returns it.
    ///
    /// Waits for a running [`update`](Self::update) to publish first.
    pub fn publish(
        &self,
        resolver: TimetableResolver,
    ) -> Result<Arc<TimetableResolver>, realtime::Error> {
        let _writer = self.writer.lock();
        self.swap(resolver)
    }

    /// Applies a batch of updates on top of the current snapshot and publishes the result.
    pub fn update(
        &self,
        schedule: &Schedule,
        updater: &StoptimeUpdater,
        updates: Vec<Update>,
    ) -> Result<UpdateStats, realtime::Error> {
        let _writer = self.writer.lock();
        let current = self.snapshot();
        let (resolver, stats) = updater.apply(schedule, &current, updates)?;
        self.swap(resolver)?;
        Ok(stats)
    }

    /// Caller must hold the writer lock.
    fn swap(&self, resolver: TimetableResolver) -> Result<Arc<TimetableResolver>, realtime::Error> {
        if !resolver.is_committed() {
            return Err(realtime::Error::NotCommitted);
        }
        let snapshot = Arc::new(resolver);
        *self.current.write() = snapshot.clone();
        debug!("Published {snapshot}");
        Ok(snapshot)
    }
}
