use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use stormcore::geo::{self, GeoPoint};
use stormcore::nmea::sentence::MILES_TO_KM;
use stormcore::records::StationConfig;

/// Configuration for generating one synthetic strike burst.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub strike_lat: f64,
    pub strike_lon: f64,
    /// Event time of the first station's report; defaults to now.
    pub base_time: Option<DateTime<Utc>>,
    /// Timestamp fan-out between consecutive stations.
    pub spread_ms: i64,
    pub distance_jitter_miles: f64,
    pub seed: u64,
    pub description: Option<String>,
    pub scenario: Option<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            strike_lat: 38.6,
            strike_lon: 24.6,
            base_time: None,
            spread_ms: 100,
            distance_jitter_miles: 0.0,
            seed: 0,
            description: None,
            scenario: None,
        }
    }
}

fn wimli_checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, byte| acc ^ byte)
}

/// Formats a detector sentence: corrected distance, raw distance, bearing,
/// XOR checksum over the body between `$` and `*`.
fn wimli_sentence(distance_miles: f64, bearing_deg: f64) -> String {
    let body = format!(
        "WIMLI,{:.0},{:.0},{:05.1}",
        distance_miles, distance_miles, bearing_deg
    );
    format!("${}*{:02X}", body, wimli_checksum(&body))
}

/// Builds one `(station_id, payload)` item per station for a strike at the
/// scenario position, as each station would have observed and reported it.
pub fn build_station_payloads(
    config: &ScenarioConfig,
    stations: &[StationConfig],
) -> anyhow::Result<Vec<(u32, String)>> {
    if stations.is_empty() {
        anyhow::bail!("scenario requires at least one station");
    }

    let strike = GeoPoint::new(config.strike_lat, config.strike_lon);
    let base_time = config.base_time.unwrap_or_else(Utc::now);
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut payloads = Vec::with_capacity(stations.len());
    for (slot, station) in stations.iter().enumerate() {
        let (distance_km, bearing_deg) = geo::distance_bearing(station.origin(), strike);
        let jitter = if config.distance_jitter_miles > 0.0 {
            rng.gen_range(-config.distance_jitter_miles..config.distance_jitter_miles)
        } else {
            0.0
        };
        let distance_miles = distance_km / MILES_TO_KM + jitter;
        let timestamp = base_time + Duration::milliseconds(config.spread_ms * slot as i64);
        let payload = format!(
            "{}\n{}",
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            wimli_sentence(distance_miles, bearing_deg),
        );
        payloads.push((station.station_id, payload));
    }
    Ok(payloads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stormcore::nmea::{parse_wimli, scan_sentences, split_payload};

    fn stations() -> Vec<StationConfig> {
        vec![
            StationConfig {
                station_id: 1,
                origin_lat: 38.002729,
                origin_lon: 23.675644,
            },
            StationConfig {
                station_id: 2,
                origin_lat: 38.35,
                origin_lon: 23.95,
            },
        ]
    }

    fn fixed_scenario() -> ScenarioConfig {
        ScenarioConfig {
            base_time: Some(Utc.with_ymd_and_hms(2024, 5, 14, 18, 3, 5).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn payloads_parse_back_through_the_core() {
        let payloads = build_station_payloads(&fixed_scenario(), &stations()).unwrap();
        assert_eq!(payloads.len(), 2);

        let (received_at, body) = split_payload(&payloads[0].1).unwrap();
        assert_eq!(received_at.timestamp(), 1715709785);

        let sentences = scan_sentences(body);
        assert_eq!(sentences.len(), 1);
        let reading = parse_wimli(sentences[0]).unwrap();

        let (expected_km, expected_bearing) = geo::distance_bearing(
            GeoPoint::new(38.002729, 23.675644),
            GeoPoint::new(38.6, 24.6),
        );
        // Distances round to whole miles on the wire.
        assert!((reading.distance_km - expected_km).abs() < MILES_TO_KM);
        assert!((reading.bearing_deg - expected_bearing).abs() < 0.1);
    }

    #[test]
    fn timestamps_fan_out_by_spread() {
        let payloads = build_station_payloads(&fixed_scenario(), &stations()).unwrap();
        let (first, _) = split_payload(&payloads[0].1).unwrap();
        let (second, _) = split_payload(&payloads[1].1).unwrap();
        assert_eq!((second - first).num_milliseconds(), 100);
    }

    #[test]
    fn same_seed_reproduces_the_burst() {
        let mut scenario = fixed_scenario();
        scenario.distance_jitter_miles = 2.0;
        scenario.seed = 13;
        let first = build_station_payloads(&scenario, &stations()).unwrap();
        let second = build_station_payloads(&scenario, &stations()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_station_table_is_rejected() {
        assert!(build_station_payloads(&fixed_scenario(), &[]).is_err());
    }
}
