use serde::{Deserialize, Serialize};

/// One row of a flat real-time update file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FeedRecord {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    /// `HH:MM:SS` or seconds since the start of the service day, empty when unknown.
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
