use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::realtime::{Update, UpdateStatus};

/// All updates for one trip on one service day, ordered by stop position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBlock {
    pub trip_id: Arc<str>,
    /// When the block was received, set by the driver applying it.
    pub timestamp: Option<DateTime<Utc>>,
    updates: Vec<Update>,
}

impl UpdateBlock {
    /// Wraps updates as given, without sorting or checking them.
    pub fn new(trip_id: impl Into<Arc<str>>, updates: Vec<Update>) -> Self {
        Self {
            trip_id: trip_id.into(),
            timestamp: None,
            updates,
        }
    }

    /// Splits a batch of updates for any number of trips into one block per trip.
    pub fn split_by_trip(mut updates: Vec<Update>) -> Vec<UpdateBlock> {
        updates.par_sort_by(Update::ordering);
        let mut blocks: Vec<UpdateBlock> = Vec::new();
        for update in updates {
            match blocks.last_mut() {
                Some(block) if block.trip_id == update.trip_id => block.updates.push(update),
                _ => blocks.push(UpdateBlock::new(update.trip_id.clone(), vec![update])),
            }
        }
        blocks
    }

    pub fn updates(&self) -> &[Update] {
        &self.updates
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Removes or repairs implausible updates in one pass over the block.
    ///
    /// - `drop_passed` removes updates for stops the vehicle already left.
    /// - `fix_negative_dwells` sets the arrival to the departure when the vehicle
    ///   would leave before it arrives. A zero departure is left alone since it
    ///   marks the last stop of a trip.
    /// - `drop_duplicate_stops` removes an update for the same stop as the update
    ///   kept just before it. Thanks to the block ordering the kept one has the
    ///   earliest departure, the safer choice for depart-after searches.
    ///
    /// Returns true if the block was changed.
    pub fn filter(
        &mut self,
        drop_passed: bool,
        fix_negative_dwells: bool,
        drop_duplicate_stops: bool,
    ) -> bool {
        let before = self.updates.len();
        let mut passed = 0;
        let mut duplicates = 0;
        let mut negative_dwells = 0;
        let mut prev_stop: Option<Arc<str>> = None;
        let trip_id = &self.trip_id;
        self.updates.retain_mut(|update| {
            if drop_passed && update.status == UpdateStatus::Passed {
                passed += 1;
                return false;
            }
            if drop_duplicate_stops && prev_stop.as_ref() == Some(&update.stop_id) {
                warn!(
                    "Filtered duplicate stop {} from update for trip {trip_id}",
                    update.stop_id
                );
                duplicates += 1;
                return false;
            }
            if fix_negative_dwells && update.depart < update.arrive && !update.depart.is_zero() {
                warn!(
                    "Filtered negative dwell time at stop {} in update for trip {trip_id}",
                    update.stop_id
                );
                update.arrive = update.depart;
                negative_dwells += 1;
            }
            prev_stop = Some(update.stop_id.clone());
            true
        });

        let rejected = before - self.updates.len();
        debug!(
            "Filtered block for trip {}: {} accepted, {rejected} rejected ({passed} passed, {duplicates} duplicate), {negative_dwells} negative dwells fixed",
            self.trip_id,
            self.updates.len()
        );
        rejected > 0 || negative_dwells > 0
    }

    /// Checks that the block is internally coherent:
    /// every update belongs to the block's trip, stop sequence numbers increase,
    /// and no arrival comes before the previous departure.
    ///
    /// Sequence numbers may skip values, real feeds do.
    pub fn is_sane(&self) -> bool {
        if self
            .updates
            .iter()
            .any(|update| update.trip_id != self.trip_id)
        {
            return false;
        }

        let mut increasing = true;
        let mut sequential = true;
        let mut coherent = true;
        for pair in self.updates.windows(2) {
            let (prev, update) = (&pair[0], &pair[1]);
            if update.stop_seq <= prev.stop_seq {
                increasing = false;
            }
            if prev.stop_seq.checked_add(1) != Some(update.stop_seq) {
                sequential = false;
            }
            if update.arrive < prev.depart {
                coherent = false;
            }
        }
        if !sequential {
            trace!("Stop sequence for trip {} is not sequential", self.trip_id);
        }
        increasing && coherent
    }
}

impl fmt::Display for UpdateBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tripId: {}", self.trip_id)?;
        if let Some(timestamp) = self.timestamp {
            writeln!(f, "received: {}", timestamp.to_rfc3339())?;
        }
        for update in &self.updates {
            writeln!(f, "{update}")?;
        }
        Ok(())
    }
}
