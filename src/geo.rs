// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Mean radius of Earth, in miles.
const EARTH_RADIUS: f64 = 3963.0;

/// Calculates the great-circle distance between two lon-lat positions
/// on Earth using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in miles.
///
/// Symmetric in its arguments and satisfies the triangle inequality, which
/// makes it usable both as the edge cost and as the A* heuristic
/// (see [find_route](crate::find_route)).
pub fn distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let sin_dphi_half = (dphi * 0.5).sin();
    let sin_dlambda_half = (dlambda * 0.5).sin();

    let a = sin_dphi_half * sin_dphi_half
        + phi1.cos() * phi2.cos() * sin_dlambda_half * sin_dlambda_half;
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS * c
}

/// Calculates the initial bearing between two lon-lat positions, in degrees
/// within (-180, 180]. 0 is due north, positive clockwise (east).
///
/// The initial bearing is the angle that, if followed in a straight line
/// along a great-circle arc from the first point, would take you to the
/// second point. [Turn classification](crate::narrate::Turn::classify)
/// relies on this range.
pub fn bearing(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let lambda1 = lon1.to_radians();
    let lambda2 = lon2.to_radians();

    let y = (lambda2 - lambda1).sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * (lambda2 - lambda1).cos();

    y.atan2(x).to_degrees()
}
