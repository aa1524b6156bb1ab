//! Alignment of update blocks against the stop sequence of a trip pattern.
//!
//! Updates usually cover only part of a trip and are not aligned with either end of it.
//! Stop sequence numbers increase but are not always sequential, and a route can
//! call at the same stop twice when it loops, so neither the sequence numbers nor a
//! single stop id is enough to place a block. Instead the block's stop ids are
//! compared, in order, against every offset into the pattern.

use tracing::{debug, trace, warn};

use crate::{pattern::TripPattern, realtime::UpdateBlock};

impl UpdateBlock {
    /// Finds the position in the pattern's stop sequence of the block's first update.
    ///
    /// A match of the whole block is tried first. When there is none, every offset
    /// is scored by how many updates it explains and the best one wins.
    /// Returns `None` when no offset explains a single update, after logging
    /// the pattern next to the block.
    pub fn find_update_stop_index(&self, pattern: &TripPattern) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let result = self.match_block_simple(pattern).or_else(|| {
            debug!("Simple block matching failed, trying fuzzy matching");
            self.match_block_fuzzy(pattern)
        });
        if let Some(index) = result {
            debug!("Found matching stop block at index {index}");
            return Some(index);
        }
        self.log_match_failure(pattern);
        None
    }

    /// First offset at which every update matches the pattern stop it lands on.
    fn match_block_simple(&self, pattern: &TripPattern) -> Option<usize> {
        let stops = pattern.stops();
        let updates = self.updates();
        // The whole block has to fit in the pattern
        let high = stops.len().checked_sub(updates.len())?;
        (0..=high).find(|&pi| {
            trace!("--- {pi}");
            updates.iter().enumerate().all(|(ui, update)| {
                let stop_id = &stops[pi + ui];
                trace!("{stop_id} == {}", update.stop_id);
                *stop_id == update.stop_id
            })
        })
    }

    /// Offset that matches the most updates. Ties go to the latest offset.
    ///
    /// Updates that fall past the end of the pattern or land on another stop
    /// are skipped without lowering the score.
    fn match_block_fuzzy(&self, pattern: &TripPattern) -> Option<usize> {
        let stops = pattern.stops();
        let updates = self.updates();
        let scores: Vec<usize> = (0..stops.len())
            .map(|pi| {
                trace!("--- {pi}");
                updates
                    .iter()
                    .zip(&stops[pi..])
                    .filter(|(update, stop_id)| {
                        trace!("{stop_id} == {}", update.stop_id);
                        **stop_id == update.stop_id
                    })
                    .count()
            })
            .collect();
        debug!("Fuzzy matching scores: {scores:?}");

        let mut best: Option<(usize, usize)> = None;
        for (pi, score) in scores.into_iter().enumerate() {
            // Test equality so we keep the latest match
            if best.is_none_or(|(_, best_score)| score >= best_score) {
                best = Some((pi, score));
            }
        }
        match best {
            Some((pi, score)) if score > 0 => Some(pi),
            _ => None,
        }
    }

    fn log_match_failure(&self, pattern: &TripPattern) {
        warn!(
            "Update block matching failed completely for trip {} on pattern {}",
            self.trip_id, pattern.id
        );
        let scheduled = pattern.scheduled();
        let trip = scheduled.trip_index(&self.trip_id);
        for (i, stop_id) in pattern.stops().iter().enumerate() {
            let times = trip.map(|trip| scheduled.trip_times(trip));
            let arrival = times
                .and_then(|times| times.arrival_at(i))
                .map_or(0, |time| time.as_seconds());
            let departure = times
                .and_then(|times| times.departure_at(i))
                .map_or(0, |time| time.as_seconds());
            let update = self
                .updates()
                .get(i)
                .map_or_else(|| "--".to_string(), |update| update.to_string());
            warn!("Stop {i:02} {stop_id} A{arrival} D{departure} >>> {update}");
        }
    }
}
