use super::{GeoPoint, EARTH_RADIUS_KM};

/// Direct geodesic problem on a spherical earth: the point reached from
/// `origin` after travelling `distance_km` along `bearing_deg` (clockwise
/// from true north).
pub fn project_from(origin: GeoPoint, distance_km: f64, bearing_deg: f64) -> GeoPoint {
    let bearing = bearing_deg.to_radians();
    let lat = origin.lat_deg.to_radians();
    let lon = origin.lon_deg.to_radians();
    let angular = distance_km / EARTH_RADIUS_KM;

    let new_lat = (lat.sin() * angular.cos() + lat.cos() * angular.sin() * bearing.cos()).asin();
    let new_lon = lon
        + (bearing.sin() * angular.sin() * lat.cos())
            .atan2(angular.cos() - lat.sin() * new_lat.sin());

    GeoPoint::new(new_lat.to_degrees(), new_lon.to_degrees())
}

/// Inverse problem: great-circle distance in kilometers and initial bearing
/// in degrees (0-360) from `from` to `to`.
pub fn distance_bearing(from: GeoPoint, to: GeoPoint) -> (f64, f64) {
    let lat1 = from.lat_deg.to_radians();
    let lat2 = to.lat_deg.to_radians();
    let dlat = (to.lat_deg - from.lat_deg).to_radians();
    let dlon = (to.lon_deg - from.lon_deg).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let distance = 2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt());

    let bearing = (dlon.sin() * lat2.cos())
        .atan2(lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos())
        .to_degrees();

    (distance, (bearing + 360.0) % 360.0)
}
