use nalgebra::Vector3;

use super::{GeoPoint, EARTH_RADIUS_KM};

/// Geographic position to Cartesian coordinates on the R-sphere.
pub fn to_ecef(point: GeoPoint) -> Vector3<f64> {
    let lat = point.lat_deg.to_radians();
    let lon = point.lon_deg.to_radians();
    Vector3::new(
        EARTH_RADIUS_KM * lat.cos() * lon.cos(),
        EARTH_RADIUS_KM * lat.cos() * lon.sin(),
        EARTH_RADIUS_KM * lat.sin(),
    )
}

/// Cartesian coordinates back to geographic degrees.
pub fn to_geodetic(v: &Vector3<f64>) -> GeoPoint {
    let lat = v.z.atan2((v.x * v.x + v.y * v.y).sqrt()).to_degrees();
    let lon = v.y.atan2(v.x).to_degrees();
    GeoPoint::new(lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_coordinates() {
        let point = GeoPoint::new(38.002729, 23.675644);
        let back = to_geodetic(&to_ecef(point));
        assert!((back.lat_deg - point.lat_deg).abs() < 1e-9);
        assert!((back.lon_deg - point.lon_deg).abs() < 1e-9);
    }

    #[test]
    fn ecef_lies_on_the_sphere() {
        let v = to_ecef(GeoPoint::new(-33.9, 151.2));
        assert!((v.norm() - EARTH_RADIUS_KM).abs() < 1e-9);
    }
}
