use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::report::RawReport;
use crate::geo::GeoPoint;

/// Tuple of exactly one report per configured station, selected by the
/// correlator. Reports are ordered by ascending station id.
#[derive(Debug, Clone)]
pub struct MatchedEvent {
    pub reports: Vec<RawReport>,
    pub time_spread: Duration,
}

impl MatchedEvent {
    pub fn time_spread_ms(&self) -> f64 {
        self.time_spread.num_microseconds().unwrap_or(0) as f64 / 1000.0
    }
}

/// A matched tuple collapsed into one combined position.
#[derive(Debug, Clone)]
pub struct FusedEvent {
    pub matched: MatchedEvent,
    pub combined: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationFix {
    pub station_id: u32,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedFix {
    pub lat: f64,
    pub lon: f64,
}

/// Record handed to broadcast and persistence collaborators, one per
/// accepted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikeRecord {
    pub timestamps: Vec<String>,
    pub time_difference_ms: f64,
    pub rpi_coords: Vec<StationFix>,
    pub combined_coords: CombinedFix,
}

impl FusedEvent {
    pub fn to_record(&self) -> StrikeRecord {
        StrikeRecord {
            timestamps: self
                .matched
                .reports
                .iter()
                .map(|report| report.received_at.to_rfc3339())
                .collect(),
            time_difference_ms: self.matched.time_spread_ms(),
            rpi_coords: self
                .matched
                .reports
                .iter()
                .map(|report| StationFix {
                    station_id: report.station_id,
                    lat: report.projected.lat_deg,
                    lon: report.projected.lon_deg,
                })
                .collect(),
            combined_coords: CombinedFix {
                lat: self.combined.lat_deg,
                lon: self.combined.lon_deg,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn report(station_id: u32, offset_ms: i64) -> RawReport {
        RawReport {
            station_id,
            distance_km: 12.0,
            bearing_deg: 45.0,
            received_at: Utc.with_ymd_and_hms(2024, 5, 14, 18, 3, 5).unwrap()
                + Duration::milliseconds(offset_ms),
            raw_text: "$WIMLI,7,7,045.0*4D".to_string(),
            projected: GeoPoint::new(38.1, 23.7),
        }
    }

    #[test]
    fn record_carries_schema_fields() {
        let fused = FusedEvent {
            matched: MatchedEvent {
                reports: vec![report(1, 0), report(2, 150), report(3, 200)],
                time_spread: Duration::milliseconds(200),
            },
            combined: GeoPoint::new(38.5, 24.2),
        };

        let record = fused.to_record();
        assert_eq!(record.timestamps.len(), 3);
        assert_eq!(record.time_difference_ms, 200.0);
        assert_eq!(record.rpi_coords[1].station_id, 2);
        assert_eq!(record.combined_coords.lat, 38.5);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("rpi_coords").is_some());
        assert!(json.get("combined_coords").is_some());
        assert!(json.get("time_difference_ms").is_some());
    }
}
