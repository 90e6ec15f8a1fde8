use std::sync::Mutex;

use serde::Serialize;

/// Point-in-time view of the pipeline counters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MetricsSnapshot {
    pub payloads_received: usize,
    pub reports_buffered: usize,
    pub parse_failures: usize,
    pub events_fused: usize,
    pub fusion_failures: usize,
    pub sink_failures: usize,
}

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }

    pub fn record_payload(&self) {
        self.update(|m| m.payloads_received += 1);
    }

    pub fn record_report(&self) {
        self.update(|m| m.reports_buffered += 1);
    }

    pub fn record_parse_failure(&self) {
        self.update(|m| m.parse_failures += 1);
    }

    pub fn record_fused(&self) {
        self.update(|m| m.events_fused += 1);
    }

    pub fn record_fusion_failure(&self) {
        self.update(|m| m.fusion_failures += 1);
    }

    pub fn record_sink_failure(&self) {
        self.update(|m| m.sink_failures += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().map(|metrics| *metrics).unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = MetricsRecorder::new();
        metrics.record_payload();
        metrics.record_payload();
        metrics.record_report();
        metrics.record_parse_failure();
        metrics.record_fused();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.payloads_received, 2);
        assert_eq!(snapshot.reports_buffered, 1);
        assert_eq!(snapshot.parse_failures, 1);
        assert_eq!(snapshot.events_fused, 1);
        assert_eq!(snapshot.fusion_failures, 0);
    }
}
