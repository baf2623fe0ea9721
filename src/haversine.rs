//! Great-circle distance and planar interpolation between coordinates.
//!
//! Interpolation is linear in latitude/longitude space, which is accurate
//! enough over the few hundred metres separating route samples.

use crate::coordinate::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two points in meters.
pub fn haversine_meters(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = lat2_rad - lat1_rad;
    let delta_lng = to.longitude.to_radians() - from.longitude.to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Point at `ratio` of the way from `from` to `to`.
///
/// `ratio` is clamped to [0, 1], so the result always lies on the segment.
pub fn interpolate(from: Coordinate, to: Coordinate, ratio: f64) -> Coordinate {
    let ratio = ratio.clamp(0.0, 1.0);
    Coordinate::new(
        from.latitude + (to.latitude - from.latitude) * ratio,
        from.longitude + (to.longitude - from.longitude) * ratio,
    )
}
