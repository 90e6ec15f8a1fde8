use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use super::buffer::StationBuffers;
use crate::records::report::RawReport;
use crate::records::strike::MatchedEvent;

/// Finds and consumes the one-report-per-station tuple with the smallest
/// timestamp spread, provided that spread stays within `window`. Returns
/// `None` when any station is still empty or the best tuple exceeds the
/// window; in both cases every report stays buffered.
pub fn take_match(buffers: &mut StationBuffers, window: Duration) -> Option<MatchedEvent> {
    if !buffers.all_populated() {
        return None;
    }

    let (selection, time_spread) = {
        let queues: Vec<(u32, &VecDeque<RawReport>)> = buffers.queues().collect();
        best_selection(&queues)?
    };
    if time_spread > window {
        return None;
    }

    let reports = buffers.remove_selection(&selection);
    Some(MatchedEvent {
        reports,
        time_spread,
    })
}

/// Exhaustive Cartesian-product search over the pending queues. Buffer
/// sizes stay in small single digits under normal load, so enumeration is
/// fine; ties keep the first-found tuple under the stable station/queue
/// iteration order.
fn best_selection(
    queues: &[(u32, &VecDeque<RawReport>)],
) -> Option<(Vec<(u32, usize)>, Duration)> {
    let mut cursor = vec![0usize; queues.len()];
    let mut best: Option<(Vec<(u32, usize)>, Duration)> = None;

    loop {
        let mut earliest: Option<DateTime<Utc>> = None;
        let mut latest: Option<DateTime<Utc>> = None;
        for (slot, &(_, queue)) in queues.iter().enumerate() {
            let ts = queue[cursor[slot]].received_at;
            earliest = Some(earliest.map_or(ts, |e| e.min(ts)));
            latest = Some(latest.map_or(ts, |l| l.max(ts)));
        }
        if let (Some(earliest), Some(latest)) = (earliest, latest) {
            let spread = latest - earliest;
            if best.as_ref().map_or(true, |(_, s)| spread < *s) {
                let selection = queues
                    .iter()
                    .enumerate()
                    .map(|(slot, &(station_id, _))| (station_id, cursor[slot]))
                    .collect();
                best = Some((selection, spread));
            }
        }

        // Advance the odometer; done once the leftmost slot wraps.
        let mut slot = queues.len();
        loop {
            if slot == 0 {
                return best;
            }
            slot -= 1;
            cursor[slot] += 1;
            if cursor[slot] < queues[slot].1.len() {
                break;
            }
            cursor[slot] = 0;
        }
    }
}
