use nalgebra::{Matrix3, Vector3};

use crate::geo::EARTH_RADIUS_KM;
use crate::prelude::{EngineError, EngineResult};

const MAX_ITERATIONS: usize = 50;
const CONVERGENCE_KM: f64 = 1e-6;

/// Solves the hyperbolic multilateration system: finds the point whose
/// ranges to the anchors differ by `propagation_kms * tdoa` relative to
/// the first anchor, constrained to the earth sphere. `tdoas_s` holds the
/// arrival-time differences of anchors `1..n` against anchor `0`, in
/// seconds.
///
/// Gauss-Newton on the residuals `|p - x_i| - |p - x_0| - c*dt_i` plus the
/// surface residual `|p| - R`; the normal equations are solved per step,
/// so four or more anchors are handled in the least-squares sense.
pub fn solve_tdoa(
    anchors: &[Vector3<f64>],
    tdoas_s: &[f64],
    propagation_kms: f64,
    initial: Vector3<f64>,
) -> EngineResult<Vector3<f64>> {
    if anchors.len() < 3 || tdoas_s.len() != anchors.len() - 1 {
        return Err(EngineError::Fusion(format!(
            "need at least three anchors with matching time differences, got {} anchors / {} tdoas",
            anchors.len(),
            tdoas_s.len()
        )));
    }
    if initial.norm() < 1.0 {
        return Err(EngineError::Fusion(
            "initial estimate degenerate (at sphere center)".into(),
        ));
    }

    let mut position = initial * (EARTH_RADIUS_KM / initial.norm());

    for _ in 0..MAX_ITERATIONS {
        let reference = position - anchors[0];
        let reference_range = reference.norm();
        if reference_range < CONVERGENCE_KM {
            return Err(EngineError::Fusion(
                "estimate collapsed onto the reference anchor".into(),
            ));
        }
        let reference_dir = reference / reference_range;

        let mut normal = Matrix3::zeros();
        let mut gradient = Vector3::zeros();

        for (anchor, &tdoa) in anchors[1..].iter().zip(tdoas_s) {
            let leg = position - anchor;
            let range = leg.norm();
            if range < CONVERGENCE_KM {
                return Err(EngineError::Fusion("estimate collapsed onto an anchor".into()));
            }
            let row = leg / range - reference_dir;
            let residual = (range - reference_range) - propagation_kms * tdoa;
            normal += row * row.transpose();
            gradient += row * residual;
        }

        // Surface constraint keeps the three-unknown system determined.
        let radial = position / position.norm();
        normal += radial * radial.transpose();
        gradient += radial * (position.norm() - EARTH_RADIUS_KM);

        if normal.determinant().abs() < 1e-12 {
            return Err(EngineError::Fusion(
                "degenerate station geometry (ill-conditioned normal matrix)".into(),
            ));
        }
        let step = normal.lu().solve(&gradient).ok_or_else(|| {
            EngineError::Fusion("degenerate station geometry (singular normal matrix)".into())
        })?;

        position -= step;
        if step.norm() < CONVERGENCE_KM {
            return Ok(position);
        }
    }

    Err(EngineError::Fusion("multilateration did not converge".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{to_ecef, GeoPoint};

    const C_KMS: f64 = 300_000.0;

    fn athens_anchors() -> Vec<Vector3<f64>> {
        vec![
            to_ecef(GeoPoint::new(38.002729, 23.675644)),
            to_ecef(GeoPoint::new(38.35, 23.95)),
            to_ecef(GeoPoint::new(37.75, 24.15)),
        ]
    }

    fn tdoas_for(source: &Vector3<f64>, anchors: &[Vector3<f64>]) -> Vec<f64> {
        let reference = (source - anchors[0]).norm();
        anchors[1..]
            .iter()
            .map(|anchor| ((source - anchor).norm() - reference) / C_KMS)
            .collect()
    }

    #[test]
    fn recovers_source_from_exact_time_differences() {
        let anchors = athens_anchors();
        let truth = to_ecef(GeoPoint::new(38.6, 24.6));
        let tdoas = tdoas_for(&truth, &anchors);

        // Start a few kilometers off the true position.
        let initial = truth + Vector3::new(3.0, -4.0, 2.0);
        let solution = solve_tdoa(&anchors, &tdoas, C_KMS, initial).unwrap();
        assert!((solution - truth).norm() < 0.1);
    }

    #[test]
    fn solution_stays_on_the_sphere() {
        let anchors = athens_anchors();
        let truth = to_ecef(GeoPoint::new(38.4, 23.2));
        let tdoas = tdoas_for(&truth, &anchors);
        let solution = solve_tdoa(&anchors, &tdoas, C_KMS, truth).unwrap();
        assert!((solution.norm() - EARTH_RADIUS_KM).abs() < 1e-3);
    }

    #[test]
    fn coincident_anchors_are_degenerate() {
        let anchor = to_ecef(GeoPoint::new(38.002729, 23.675644));
        let anchors = vec![anchor, anchor, anchor];
        let initial = to_ecef(GeoPoint::new(38.5, 24.0));
        assert!(solve_tdoa(&anchors, &[0.0, 0.0], C_KMS, initial).is_err());
    }

    #[test]
    fn rejects_short_anchor_list() {
        let anchors = athens_anchors();
        assert!(solve_tdoa(&anchors[..2].to_vec(), &[0.0], C_KMS, anchors[0]).is_err());
        assert!(solve_tdoa(&anchors, &[0.0], C_KMS, anchors[0]).is_err());
    }
}
