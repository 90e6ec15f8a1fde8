use std::collections::BTreeMap;

use nalgebra::Vector3;

use super::solver::solve_tdoa;
use crate::geo::{self, GeoPoint};
use crate::prelude::{EngineError, EngineResult};
use crate::records::report::StationConfig;
use crate::records::strike::{FusedEvent, MatchedEvent};

/// Minimum tuple size for the hyperbolic solve to be determined.
pub const MIN_STATIONS: usize = 3;

/// Collapses a matched tuple into one combined position. The TDOA anchors
/// are the station origins; the per-station projected positions only seed
/// the iteration.
pub struct FusionEstimator {
    origins: BTreeMap<u32, GeoPoint>,
    propagation_kms: f64,
}

impl FusionEstimator {
    pub fn new(stations: &[StationConfig], propagation_kms: f64) -> Self {
        Self {
            origins: stations
                .iter()
                .map(|station| (station.station_id, station.origin()))
                .collect(),
            propagation_kms,
        }
    }

    pub fn fuse(&self, matched: MatchedEvent) -> EngineResult<FusedEvent> {
        if matched.reports.len() < MIN_STATIONS {
            return Err(EngineError::Fusion(format!(
                "need {} stations for multilateration, matched {}",
                MIN_STATIONS,
                matched.reports.len()
            )));
        }

        let mut anchors = Vec::with_capacity(matched.reports.len());
        for report in &matched.reports {
            let origin = self.origins.get(&report.station_id).ok_or_else(|| {
                EngineError::Fusion(format!("no origin for station {}", report.station_id))
            })?;
            anchors.push(geo::to_ecef(*origin));
        }

        // Arrival-time differences of each station against the first,
        // inferred from the reported propagation distances.
        let reference_km = matched.reports[0].distance_km;
        let tdoas: Vec<f64> = matched.reports[1..]
            .iter()
            .map(|report| (report.distance_km - reference_km) / self.propagation_kms)
            .collect();

        // Each projected position is an independent coarse estimate of the
        // event location; their centroid seeds the solve.
        let mut initial = Vector3::zeros();
        for report in &matched.reports {
            initial += geo::to_ecef(report.projected);
        }
        initial /= matched.reports.len() as f64;

        let solution = solve_tdoa(&anchors, &tdoas, self.propagation_kms, initial)?;
        Ok(FusedEvent {
            combined: geo::to_geodetic(&solution),
            matched,
        })
    }
}
