use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};

use crate::prelude::{EngineError, EngineResult};
use crate::records::report::RawReport;

/// Per-station queues of pending reports, insertion order preserved
/// (oldest first). A report lives in exactly one queue until it is
/// consumed by a match or evicted.
pub struct StationBuffers {
    pending: BTreeMap<u32, VecDeque<RawReport>>,
    latest_seen: Option<DateTime<Utc>>,
}

impl StationBuffers {
    pub fn new(station_ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            pending: station_ids
                .into_iter()
                .map(|id| (id, VecDeque::new()))
                .collect(),
            latest_seen: None,
        }
    }

    pub fn push(&mut self, report: RawReport) -> EngineResult<()> {
        let queue = self.pending.get_mut(&report.station_id).ok_or_else(|| {
            EngineError::Parse(format!(
                "report for unconfigured station {}",
                report.station_id
            ))
        })?;
        self.latest_seen = Some(match self.latest_seen {
            Some(seen) => seen.max(report.received_at),
            None => report.received_at,
        });
        queue.push_back(report);
        Ok(())
    }

    /// True when a full one-per-station tuple could exist.
    pub fn all_populated(&self) -> bool {
        self.pending.values().all(|queue| !queue.is_empty())
    }

    pub fn pending_total(&self) -> usize {
        self.pending.values().map(VecDeque::len).sum()
    }

    /// Queues in ascending station-id order, the engine's stable iteration
    /// order.
    pub fn queues(&self) -> impl Iterator<Item = (u32, &VecDeque<RawReport>)> {
        self.pending.iter().map(|(id, queue)| (*id, queue))
    }

    /// Drops reports older than `retention` relative to the newest event
    /// timestamp seen on any station. Event time, not wall clock, so
    /// replayed feeds evict identically.
    pub fn evict_stale(&mut self, retention: Duration) -> usize {
        let Some(latest) = self.latest_seen else {
            return 0;
        };
        let cutoff = latest - retention;
        let mut dropped = 0;
        for queue in self.pending.values_mut() {
            let before = queue.len();
            queue.retain(|report| report.received_at >= cutoff);
            dropped += before - queue.len();
        }
        dropped
    }

    /// Removes one report per listed station in a single step. The indices
    /// must come from the same buffer snapshot that produced them.
    pub fn remove_selection(&mut self, selection: &[(u32, usize)]) -> Vec<RawReport> {
        let mut taken = Vec::with_capacity(selection.len());
        for &(station_id, index) in selection {
            if let Some(queue) = self.pending.get_mut(&station_id) {
                if let Some(report) = queue.remove(index) {
                    taken.push(report);
                }
            }
        }
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use chrono::TimeZone;

    fn report(station_id: u32, offset_secs: i64) -> RawReport {
        RawReport {
            station_id,
            distance_km: 40.0,
            bearing_deg: 90.0,
            received_at: Utc.with_ymd_and_hms(2024, 5, 14, 18, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
            raw_text: "$WIMLI,25,25,090.0*4E".to_string(),
            projected: GeoPoint::new(38.0, 24.1),
        }
    }

    #[test]
    fn rejects_unconfigured_station() {
        let mut buffers = StationBuffers::new([1, 2]);
        assert!(buffers.push(report(9, 0)).is_err());
        assert_eq!(buffers.pending_total(), 0);
    }

    #[test]
    fn populated_only_when_every_station_has_a_report() {
        let mut buffers = StationBuffers::new([1, 2, 3]);
        buffers.push(report(1, 0)).unwrap();
        buffers.push(report(2, 0)).unwrap();
        assert!(!buffers.all_populated());
        buffers.push(report(3, 1)).unwrap();
        assert!(buffers.all_populated());
    }

    #[test]
    fn evicts_reports_past_the_retention_ceiling() {
        let mut buffers = StationBuffers::new([1, 2]);
        buffers.push(report(1, 0)).unwrap();
        buffers.push(report(2, 45)).unwrap();
        let dropped = buffers.evict_stale(Duration::seconds(30));
        assert_eq!(dropped, 1);
        assert_eq!(buffers.pending_total(), 1);
        assert!(!buffers.all_populated());
    }

    #[test]
    fn eviction_without_reports_is_a_noop() {
        let mut buffers = StationBuffers::new([1]);
        assert_eq!(buffers.evict_stale(Duration::seconds(30)), 0);
    }
}
