use std::{
    fs::File,
    io::{self, Read},
    path::Path,
    time::Instant,
};

use csv::ReaderBuilder;
use thiserror::Error;
use tracing::debug;

mod config;
pub mod models;
pub use config::*;
use models::*;

use crate::{
    realtime::{Update, UpdateStatus},
    shared::Time,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid time {time:?} for trip {trip_id}")]
    InvalidTime { trip_id: String, time: String },
    #[error("Invalid status {status:?} for trip {trip_id}")]
    InvalidStatus { trip_id: String, status: String },
}

/// Reads a file of flat update records.
pub fn read_updates_from_path<P: AsRef<Path>>(
    path: P,
    config: &self::Config,
) -> Result<Vec<Update>, self::Error> {
    let file = File::open(path)?;
    read_updates(file, config)
}

/// Reads flat update records, in any order and for any number of trips.
pub fn read_updates<R: Read>(reader: R, config: &self::Config) -> Result<Vec<Update>, self::Error> {
    let now = Instant::now();
    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.has_headers)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut updates = Vec::new();
    for record in reader.deserialize() {
        let record: FeedRecord = record?;
        updates.push(record.try_into()?);
    }
    debug!("Reading {} updates took {:?}", updates.len(), now.elapsed());
    Ok(updates)
}

impl TryFrom<FeedRecord> for Update {
    type Error = self::Error;

    fn try_from(value: FeedRecord) -> Result<Self, Self::Error> {
        let arrive = parse_time(&value.trip_id, value.arrival_time.as_deref())?;
        let depart = parse_time(&value.trip_id, value.departure_time.as_deref())?;
        let status = match value
            .status
            .as_deref()
            .map(str::trim)
            .filter(|status| !status.is_empty())
        {
            None => UpdateStatus::default(),
            Some(name) => {
                UpdateStatus::from_name(name).ok_or_else(|| Error::InvalidStatus {
                    trip_id: value.trip_id.clone(),
                    status: name.to_string(),
                })?
            }
        };
        Ok(Update::new(
            value.trip_id,
            value.stop_id,
            value.stop_sequence,
            arrive,
            depart,
            status,
        ))
    }
}

/// Accepts `HH:MM:SS` or plain seconds. Missing or empty means zero.
fn parse_time(trip_id: &str, time: Option<&str>) -> Result<Time, self::Error> {
    let Some(time) = time.map(str::trim).filter(|time| !time.is_empty()) else {
        return Ok(Time::ZERO);
    };
    time.parse::<u32>()
        .ok()
        .map(Time::from_seconds)
        .or_else(|| Time::from_hms(time))
        .ok_or_else(|| Error::InvalidTime {
            trip_id: trip_id.to_string(),
            time: time.to_string(),
        })
}
