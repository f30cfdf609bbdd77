//! Zip-distance: the proximity metric used for sorting and radius filters
//!
//! Distance is the absolute difference between two 5-digit postal codes read
//! as integers. It is an ordering heuristic, not a geographic distance;
//! nearby numbers usually mean nearby areas within a region. Radius filters
//! convert miles to an allowed zip delta with a fixed empirical factor.

/// Zip-distance between two 5-digit postal code values
pub fn zip_distance(a: u32, b: u32) -> u32 {
    a.abs_diff(b)
}

/// Largest zip delta considered within `miles`
pub fn radius_to_zip_delta(miles: f64, delta_per_mile: f64) -> f64 {
    (miles * delta_per_mile).max(0.0)
}

/// True when `distance` falls within the delta allowed for `miles`
pub fn within_radius(distance: u32, miles: f64, delta_per_mile: f64) -> bool {
    f64::from(distance) <= radius_to_zip_delta(miles, delta_per_mile)
}
