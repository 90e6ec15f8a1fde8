use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::records::report::StationConfig;
use crate::records::strike::StrikeRecord;

/// Runtime configuration shared by the correlation and fusion engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub stations: Vec<StationConfig>,
    /// Maximum timestamp spread for a station tuple to count as one event.
    pub time_window_secs: f64,
    /// Accumulation delay before evaluating; 0 evaluates on every arrival.
    pub debounce_secs: f64,
    /// Age ceiling after which an unmatched report is dropped.
    pub retention_secs: f64,
    /// Signal propagation speed in km/s.
    pub propagation_kms: f64,
}

impl EngineConfig {
    pub fn time_window(&self) -> Duration {
        Duration::microseconds((self.time_window_secs * 1e6) as i64)
    }

    pub fn retention(&self) -> Duration {
        Duration::microseconds((self.retention_secs * 1e6) as i64)
    }
}

/// Common error type for the ingest/correlate/fuse pipeline.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("sentence rejected: {0}")]
    Parse(String),
    #[error("fusion failed: {0}")]
    Fusion(String),
    #[error("sink delivery failed: {0}")]
    Sink(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Consumer of finished fused events (broadcast, persistence). A failed
/// delivery is reported to the caller but the record is never re-queued.
pub trait EventSink: Send + Sync {
    fn deliver(&self, record: &StrikeRecord) -> EngineResult<()>;
}
