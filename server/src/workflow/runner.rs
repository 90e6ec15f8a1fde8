use crate::workflow::config::ServerConfig;
use anyhow::Context;
use std::sync::{Arc, Mutex};
use stormcore::engine::CorrelationEngine;
use stormcore::prelude::{EngineResult, EventSink};
use stormcore::records::StrikeRecord;
use stormcore::telemetry::{MetricsRecorder, MetricsSnapshot};

/// Sink keeping fused records in memory for offline runs and tests.
#[derive(Default)]
pub struct CollectingSink {
    records: Mutex<Vec<StrikeRecord>>,
}

impl CollectingSink {
    pub fn take(&self) -> Vec<StrikeRecord> {
        std::mem::take(&mut *self.records.lock().unwrap())
    }
}

impl EventSink for CollectingSink {
    fn deliver(&self, record: &StrikeRecord) -> EngineResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct RunSummary {
    pub records: Vec<StrikeRecord>,
    pub reports_buffered: usize,
    pub metrics: MetricsSnapshot,
}

/// Feeds a recorded or generated payload sequence through a synchronous
/// correlation engine, evaluating after every arrival (immediate policy).
#[derive(Clone)]
pub struct Runner {
    config: ServerConfig,
}

impl Runner {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, feed: &[(u32, String)]) -> anyhow::Result<RunSummary> {
        let sink = Arc::new(CollectingSink::default());
        let metrics = Arc::new(MetricsRecorder::new());
        let mut engine = CorrelationEngine::new(
            &self.config.to_engine_config(),
            sink.clone(),
            metrics.clone(),
        )
        .context("constructing correlation engine")?;

        let mut reports_buffered = 0;
        for (station_id, payload) in feed {
            reports_buffered += engine.ingest_payload(*station_id, payload);
            engine.evaluate();
        }

        Ok(RunSummary {
            records: sink.take(),
            reports_buffered,
            metrics: metrics.snapshot(),
        })
    }
}
