use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::CorrelationEngine;
use crate::prelude::{EngineConfig, EngineError, EngineResult, EventSink};
use crate::telemetry::MetricsRecorder;

const COMMAND_QUEUE_DEPTH: usize = 64;

/// Commands accepted by the correlation actor.
#[derive(Debug)]
pub enum EngineCommand {
    Ingest { station_id: u32, payload: String },
    Evaluate,
    Shutdown,
}

/// Cloneable handle feeding the single correlation actor through a bounded
/// queue. Ingestion callbacks enqueue and return; slow evaluation applies
/// backpressure instead of racing over the buffers.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub async fn ingest(&self, station_id: u32, payload: String) -> EngineResult<()> {
        self.tx
            .send(EngineCommand::Ingest {
                station_id,
                payload,
            })
            .await
            .map_err(|_| EngineError::Internal("correlation actor stopped".into()))
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(EngineCommand::Shutdown).await;
    }
}

/// Spawns the correlation actor. All buffer mutation and evaluation runs
/// on the single consumer task, which serializes the exclusion domain.
///
/// With `debounce_secs > 0` an arrival schedules one delayed `Evaluate`
/// unless one is already pending, letting near-simultaneous reports from
/// the other stations land first; with 0 every arrival evaluates
/// immediately. Both policies converge to the same acceptance decisions.
pub fn spawn(
    config: EngineConfig,
    sink: Arc<dyn EventSink>,
    metrics: Arc<MetricsRecorder>,
) -> EngineResult<(EngineHandle, JoinHandle<()>)> {
    let mut engine = CorrelationEngine::new(&config, sink, metrics)?;
    let (tx, mut rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let debounce = config.debounce_secs;
    let scheduler = tx.clone();

    let join = tokio::spawn(async move {
        let mut evaluation_pending = false;
        while let Some(command) = rx.recv().await {
            match command {
                EngineCommand::Ingest {
                    station_id,
                    payload,
                } => {
                    engine.ingest_payload(station_id, &payload);
                    if debounce <= 0.0 {
                        engine.evaluate();
                    } else if !evaluation_pending {
                        evaluation_pending = true;
                        let scheduler = scheduler.clone();
                        tokio::spawn(async move {
                            tokio::time::sleep(Duration::from_secs_f64(debounce)).await;
                            // A stale evaluation that finds nothing new is
                            // a no-op, so delivery failure here is benign.
                            let _ = scheduler.send(EngineCommand::Evaluate).await;
                        });
                    }
                }
                EngineCommand::Evaluate => {
                    evaluation_pending = false;
                    engine.evaluate();
                }
                EngineCommand::Shutdown => {
                    engine.evaluate();
                    break;
                }
            }
        }
    });

    Ok((EngineHandle { tx }, join))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{payload_at, test_config, CollectingSink};

    #[tokio::test]
    async fn immediate_policy_fuses_a_burst() {
        let sink = Arc::new(CollectingSink::new());
        let (handle, join) = spawn(
            test_config(0.4, 0.0),
            sink.clone(),
            Arc::new(MetricsRecorder::new()),
        )
        .unwrap();

        handle.ingest(1, payload_at(0)).await.unwrap();
        handle.ingest(2, payload_at(100)).await.unwrap();
        handle.ingest(3, payload_at(200)).await.unwrap();
        handle.shutdown().await;
        join.await.unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].time_difference_ms, 200.0);
    }

    #[tokio::test]
    async fn debounced_policy_reaches_the_same_decision() {
        let sink = Arc::new(CollectingSink::new());
        let (handle, join) = spawn(
            test_config(0.4, 0.05),
            sink.clone(),
            Arc::new(MetricsRecorder::new()),
        )
        .unwrap();

        handle.ingest(1, payload_at(0)).await.unwrap();
        handle.ingest(2, payload_at(100)).await.unwrap();
        handle.ingest(3, payload_at(200)).await.unwrap();
        // Nothing fuses until the scheduled evaluation fires.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(sink.records().len(), 1);

        handle.shutdown().await;
        join.await.unwrap();
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn ingest_fails_after_shutdown() {
        let sink = Arc::new(CollectingSink::new());
        let (handle, join) = spawn(
            test_config(0.4, 0.0),
            sink,
            Arc::new(MetricsRecorder::new()),
        )
        .unwrap();
        handle.shutdown().await;
        join.await.unwrap();
        assert!(handle.ingest(1, payload_at(0)).await.is_err());
    }
}
