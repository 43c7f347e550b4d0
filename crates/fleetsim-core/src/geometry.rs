//! Navigation geometry: bearings, distances, and interpolation.
//!
//! Two distance metrics live side by side:
//!
//! - [`haversine_distance_nm`] is a great-circle distance and is used to
//!   find the waypoint nearest to a vessel when its simulation starts.
//! - [`planar_distance_nm`] treats latitude/longitude as a flat grid
//!   (one degree = 60 nautical miles) and is used to size segments for
//!   per-tick progress. It ignores meridian convergence, so east-west legs
//!   away from the equator are overestimated.
//!
//! All functions here are pure and deterministic.

use fleetsim_types::{GeoPoint, Waypoint};

/// Mean Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Nautical miles per degree of arc on the planar grid.
pub const NM_PER_DEGREE: f64 = 60.0;

/// Initial (forward) bearing from `from` to `to` in degrees, in `[0, 360)`.
///
/// Uses the spherical forward-azimuth formula. Coincident points yield 0.
pub fn bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lng = (to.longitude - from.longitude).to_radians();

    let x = d_lng.sin() * lat2.cos();
    let y = lat1.cos().mul_add(lat2.sin(), -(lat1.sin() * lat2.cos() * d_lng.cos()));

    normalize_degrees(x.atan2(y).to_degrees())
}

/// Great-circle distance in nautical miles (haversine formula).
pub fn haversine_distance_nm(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lng = (to.longitude - from.longitude).to_radians();

    let a = (lat1.cos() * lat2.cos())
        .mul_add((d_lng / 2.0).sin().powi(2), (d_lat / 2.0).sin().powi(2));
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_NM * c
}

/// Flat-grid distance in nautical miles: Euclidean distance in degree
/// space scaled by [`NM_PER_DEGREE`].
pub fn planar_distance_nm(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = to.latitude - from.latitude;
    let d_lng = to.longitude - from.longitude;
    d_lat.hypot(d_lng) * NM_PER_DEGREE
}

/// Linear interpolation between two points. `fraction` is clamped to `[0, 1]`.
pub fn interpolate(from: GeoPoint, to: GeoPoint, fraction: f64) -> GeoPoint {
    let t = fraction.clamp(0.0, 1.0);
    GeoPoint::new(
        (to.latitude - from.latitude).mul_add(t, from.latitude),
        (to.longitude - from.longitude).mul_add(t, from.longitude),
    )
}

/// Index of the waypoint closest to `position` by great-circle distance.
///
/// Ties resolve to the lowest index. Returns `None` for an empty slice or
/// when no distance is comparable (non-finite coordinates everywhere).
pub fn nearest_waypoint_index(waypoints: &[Waypoint], position: GeoPoint) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, wp) in waypoints.iter().enumerate() {
        let dist = haversine_distance_nm(position, wp.point);
        if dist.is_nan() {
            continue;
        }
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((idx, dist)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Segment index a simulation should start on.
///
/// Starts one waypoint before the nearest one so the leg leading into it
/// is not skipped. Vessels without a known position start at 0.
pub fn starting_index(waypoints: &[Waypoint], position: Option<GeoPoint>) -> usize {
    position
        .and_then(|p| nearest_waypoint_index(waypoints, p))
        .map_or(0, |nearest| nearest.saturating_sub(1))
}

fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round tiny negatives up to exactly 360.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
