pub mod actor;

pub use actor::{spawn, EngineCommand, EngineHandle};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;

use crate::correlate::{correlator, StationBuffers};
use crate::fusion::FusionEstimator;
use crate::geo::{self, GeoPoint};
use crate::nmea::{payload, sentence};
use crate::prelude::{EngineConfig, EngineError, EngineResult, EventSink};
use crate::records::report::RawReport;
use crate::telemetry::{LogManager, MetricsRecorder};

/// Owns the station buffers and drives parse, projection, correlation,
/// fusion, and sink delivery for every inbound payload. All mutation goes
/// through `&mut self`, so one engine instance is one exclusion domain.
pub struct CorrelationEngine {
    origins: BTreeMap<u32, GeoPoint>,
    window: Duration,
    retention: Duration,
    buffers: StationBuffers,
    estimator: FusionEstimator,
    sink: Arc<dyn EventSink>,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl CorrelationEngine {
    pub fn new(
        config: &EngineConfig,
        sink: Arc<dyn EventSink>,
        metrics: Arc<MetricsRecorder>,
    ) -> EngineResult<Self> {
        if config.stations.is_empty() {
            return Err(EngineError::Internal("no stations configured".into()));
        }
        let origins: BTreeMap<u32, GeoPoint> = config
            .stations
            .iter()
            .map(|station| (station.station_id, station.origin()))
            .collect();
        if origins.len() != config.stations.len() {
            return Err(EngineError::Internal(
                "duplicate station ids in configuration".into(),
            ));
        }

        Ok(Self {
            buffers: StationBuffers::new(origins.keys().copied()),
            estimator: FusionEstimator::new(&config.stations, config.propagation_kms),
            window: config.time_window(),
            retention: config.retention(),
            origins,
            sink,
            metrics,
            logger: LogManager::new("correlation-engine"),
        })
    }

    /// Decodes one transport payload and appends every valid reading to
    /// the owning station's buffer. Returns the number of reports
    /// appended; individual sentence failures are logged and skipped, so
    /// ingestion never halts on malformed input.
    pub fn ingest_payload(&mut self, station_id: u32, text: &str) -> usize {
        self.metrics.record_payload();
        let Some(origin) = self.origins.get(&station_id).copied() else {
            self.metrics.record_parse_failure();
            self.logger
                .warn(&format!("payload from unconfigured station {}", station_id));
            return 0;
        };
        let (received_at, body) = match payload::split_payload(text) {
            Ok(parts) => parts,
            Err(err) => {
                self.metrics.record_parse_failure();
                self.logger.warn(&err.to_string());
                return 0;
            }
        };

        let mut appended = 0;
        for raw in sentence::scan_sentences(body) {
            match sentence::parse_wimli(raw) {
                Ok(reading) => {
                    let projected =
                        geo::project_from(origin, reading.distance_km, reading.bearing_deg);
                    let report = RawReport {
                        station_id,
                        distance_km: reading.distance_km,
                        bearing_deg: reading.bearing_deg,
                        received_at,
                        raw_text: raw.to_string(),
                        projected,
                    };
                    match self.buffers.push(report) {
                        Ok(()) => {
                            self.metrics.record_report();
                            appended += 1;
                        }
                        Err(err) => {
                            self.metrics.record_parse_failure();
                            self.logger.warn(&err.to_string());
                        }
                    }
                }
                Err(err) => {
                    self.metrics.record_parse_failure();
                    self.logger.warn(&err.to_string());
                }
            }
        }
        appended
    }

    /// Evicts stale reports, then runs correlation until no acceptable
    /// tuple remains. Returns the number of records delivered to the sink.
    pub fn evaluate(&mut self) -> usize {
        let evicted = self.buffers.evict_stale(self.retention);
        if evicted > 0 {
            self.logger
                .record(&format!("evicted {} stale reports", evicted));
        }

        let mut delivered = 0;
        while let Some(matched) = correlator::take_match(&mut self.buffers, self.window) {
            match self.estimator.fuse(matched) {
                Ok(fused) => {
                    let record = fused.to_record();
                    self.logger.record(&format!(
                        "fused event at ({:.5}, {:.5}), spread {:.1} ms",
                        record.combined_coords.lat,
                        record.combined_coords.lon,
                        record.time_difference_ms
                    ));
                    self.metrics.record_fused();
                    match self.sink.deliver(&record) {
                        Ok(()) => delivered += 1,
                        Err(err) => {
                            self.metrics.record_sink_failure();
                            self.logger.warn(&err.to_string());
                        }
                    }
                }
                Err(err) => {
                    // The matched reports stay consumed; they are not
                    // re-buffered.
                    self.metrics.record_fusion_failure();
                    self.logger.warn(&err.to_string());
                }
            }
        }
        delivered
    }

    pub fn pending_reports(&self) -> usize {
        self.buffers.pending_total()
    }
}
