use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Fixed ground-station site, loaded at startup and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub station_id: u32,
    pub origin_lat: f64,
    pub origin_lon: f64,
}

impl StationConfig {
    pub fn origin(&self) -> GeoPoint {
        GeoPoint::new(self.origin_lat, self.origin_lon)
    }
}

/// One decoded bearing+distance observation. Owned by its station buffer
/// until consumed by a match or evicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReport {
    pub station_id: u32,
    pub distance_km: f64,
    pub bearing_deg: f64,
    /// Event timestamp carried in the transport payload, not arrival time.
    pub received_at: DateTime<Utc>,
    /// Original sentence, retained for audit.
    pub raw_text: String,
    /// Position projected from the station origin, cached at ingest.
    pub projected: GeoPoint,
}
