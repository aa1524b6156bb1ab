use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    pattern::Schedule,
    realtime::{self, Update, UpdateBlock},
    timetable::TimetableResolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Drop updates for stops the vehicle already left.
    pub drop_passed: bool,
    /// Move arrivals back to the departure when a vehicle would leave before arriving.
    pub fix_negative_dwells: bool,
    /// Keep only the earliest departure when a stop is reported twice in a row.
    pub drop_duplicate_stops: bool,
    /// Skip incoherent blocks instead of failing the whole batch.
    pub skip_insane_blocks: bool,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            drop_passed: true,
            fix_negative_dwells: true,
            drop_duplicate_stops: true,
            skip_insane_blocks: true,
        }
    }
}

/// Counters for one batch of updates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStats {
    /// Blocks the batch was split into.
    pub blocks: usize,
    /// Blocks written into a timetable.
    pub applied: usize,
    /// Blocks changed by filtering.
    pub filtered: usize,
    /// Blocks left without updates after filtering.
    pub empty: usize,
    pub insane: usize,
    pub unknown_trip: usize,
    /// Blocks that could not be aligned with their pattern.
    pub unmatched: usize,
    /// Blocks that would have made a trip run backwards.
    pub rejected: usize,
    /// Patterns with a new timetable.
    pub patterns: usize,
}

/// Applies batches of real-time updates to timetable snapshots.
#[derive(Debug, Default, Clone)]
pub struct StoptimeUpdater {
    config: UpdaterConfig,
}

impl StoptimeUpdater {
    pub fn new(config: UpdaterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Runs a full write session on top of `current` and returns the committed result.
    /// `current` itself is never touched, readers holding it keep their view.
    pub fn apply(
        &self,
        schedule: &Schedule,
        current: &TimetableResolver,
        updates: Vec<Update>,
    ) -> Result<(TimetableResolver, UpdateStats), realtime::Error> {
        let mut resolver = current.mutable_copy();
        let stats = self.apply_to(schedule, &mut resolver, updates)?;
        resolver.commit()?;
        Ok((resolver, stats))
    }

    /// Writes a batch into an open resolver without committing it.
    pub fn apply_to(
        &self,
        schedule: &Schedule,
        resolver: &mut TimetableResolver,
        updates: Vec<Update>,
    ) -> Result<UpdateStats, realtime::Error> {
        let now = Instant::now();
        let received = Utc::now();
        let update_count = updates.len();
        let blocks = UpdateBlock::split_by_trip(updates);
        let mut stats = UpdateStats {
            blocks: blocks.len(),
            ..Default::default()
        };

        for mut block in blocks {
            block.timestamp = Some(received);
            if block.filter(
                self.config.drop_passed,
                self.config.fix_negative_dwells,
                self.config.drop_duplicate_stops,
            ) {
                stats.filtered += 1;
            }
            if block.is_empty() {
                stats.empty += 1;
                continue;
            }
            if !block.is_sane() {
                if !self.config.skip_insane_blocks {
                    return Err(realtime::Error::InsaneBlock(block.trip_id));
                }
                warn!("Skipping incoherent update block:\n{block}");
                stats.insane += 1;
                continue;
            }
            let Some(pattern) = schedule.pattern_by_trip_id(&block.trip_id) else {
                warn!("No pattern found for trip {}", block.trip_id);
                stats.unknown_trip += 1;
                continue;
            };
            let Some(start) = block.find_update_stop_index(pattern) else {
                stats.unmatched += 1;
                continue;
            };
            match resolver.modify(pattern)?.update(&block, start) {
                Ok(written) => {
                    debug!(
                        "Applied {written} stops of trip {} at index {start}",
                        block.trip_id
                    );
                    stats.applied += 1;
                }
                Err(err) => {
                    warn!("Could not apply update block: {err}");
                    stats.rejected += 1;
                }
            }
        }

        stats.patterns = resolver.dirty_count();
        info!(
            "Applied {} of {} update blocks ({update_count} updates) to {} patterns in {:?}",
            stats.applied,
            stats.blocks,
            stats.patterns,
            now.elapsed()
        );
        Ok(stats)
    }
}
