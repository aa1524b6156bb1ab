use std::{collections::HashMap, fmt, sync::Arc, time::Instant};

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::{
    pattern::TripPattern,
    timetable::{self, Timetable, TimetableBuilder},
};

/// Maps each trip pattern to the timetable currently in effect for it.
///
/// All real-time updates are written into a resolver before it is handed to any
/// search. A single resolver should back a whole search and stay unchanged for
/// its duration, so that relative times of every trip stay consistent, not only
/// the ones that were boarded.
///
/// A resolver is either open, with a set of dirty timetables owned by the single
/// writer, or committed. Committed resolvers are never written again and can be
/// shared between any number of readers. A new write session starts from
/// [`mutable_copy`](Self::mutable_copy).
#[derive(Debug)]
pub struct TimetableResolver {
    /// Only patterns with at least one committed modification are present.
    timetables: HashMap<u32, Arc<Timetable>>,
    /// `None` once committed.
    dirty: Option<HashMap<u32, TimetableBuilder>>,
}

impl Default for TimetableResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TimetableResolver {
    /// Creates an open resolver with no modified timetables.
    pub fn new() -> Self {
        Self {
            timetables: HashMap::new(),
            dirty: Some(HashMap::new()),
        }
    }

    /// Creates a committed resolver with no modified timetables,
    /// every pattern resolves to its scheduled timetable.
    pub fn committed() -> Self {
        Self {
            timetables: HashMap::new(),
            dirty: None,
        }
    }

    /// Returns the updated timetable for the pattern if this snapshot has one,
    /// or the scheduled timetable if it does not.
    ///
    /// On an open resolver this still returns the last committed timetable,
    /// uncommitted changes are only reachable through [`modify`](Self::modify).
    pub fn resolve<'a>(&'a self, pattern: &'a TripPattern) -> &'a Arc<Timetable> {
        self.timetables
            .get(&pattern.index)
            .unwrap_or_else(|| pattern.scheduled())
    }

    /// Returns the timetable this write session owns for the pattern.
    ///
    /// The first call for a pattern copies the currently resolved timetable,
    /// later calls in the same session return that same copy so several trips
    /// of one pattern can be updated together.
    pub fn modify(&mut self, pattern: &TripPattern) -> Result<&mut TimetableBuilder, timetable::Error> {
        let dirty = self
            .dirty
            .as_mut()
            .ok_or(timetable::Error::AlreadyCommitted)?;
        let timetables = &self.timetables;
        let builder = dirty.entry(pattern.index).or_insert_with(|| {
            trace!("Copying timetable for pattern {}", pattern.id);
            timetables
                .get(&pattern.index)
                .unwrap_or_else(|| pattern.scheduled())
                .to_builder()
        });
        Ok(builder)
    }

    /// Finalizes every dirty timetable and seals this resolver for reading.
    pub fn commit(&mut self) -> Result<(), timetable::Error> {
        let dirty = self.dirty.take().ok_or(timetable::Error::AlreadyCommitted)?;
        let now = Instant::now();
        let count = dirty.len();
        // Indexing dominates the cost of a commit
        let finished: Vec<(u32, Timetable)> = dirty
            .into_par_iter()
            .map(|(pattern, builder)| (pattern, builder.finish()))
            .collect();
        self.timetables.extend(
            finished
                .into_iter()
                .map(|(pattern, timetable)| (pattern, Arc::new(timetable))),
        );
        debug!("Committing {count} timetables took {:?}", now.elapsed());
        Ok(())
    }

    /// Starts a new write session on top of this snapshot.
    ///
    /// Timetables are shared with this resolver, nothing is copied
    /// until the new session modifies a pattern.
    pub fn mutable_copy(&self) -> Self {
        Self {
            timetables: self.timetables.clone(),
            dirty: Some(HashMap::new()),
        }
    }

    /// True if the current write session holds uncommitted modifications.
    pub fn is_dirty(&self) -> bool {
        self.dirty.as_ref().is_some_and(|dirty| !dirty.is_empty())
    }

    /// Number of timetables copied by the current write session.
    pub fn dirty_count(&self) -> usize {
        self.dirty.as_ref().map_or(0, |dirty| dirty.len())
    }

    pub fn is_committed(&self) -> bool {
        self.dirty.is_none()
    }

    /// Number of patterns with a modified timetable in this snapshot.
    pub fn len(&self) -> usize {
        self.timetables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timetables.is_empty()
    }
}

impl fmt::Display for TimetableResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dirty {
            Some(dirty) => write!(
                f,
                "Timetable snapshot: {} timetables ({} dirty)",
                self.timetables.len(),
                dirty.len()
            ),
            None => write!(
                f,
                "Timetable snapshot: {} timetables (committed)",
                self.timetables.len()
            ),
        }
    }
}
