//! Coordinate validation and map-center math.

use crate::error::CoreError;

/// Fallback map-center coordinates used when geocoding fails or a scope
/// has no geolocated issues (Ahmedabad city center).
pub const FALLBACK_COORDINATES: (f64, f64) = (23.0225, 72.5714);

/// Validate that a coordinate pair is on the globe.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), CoreError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(CoreError::Validation(format!(
            "Invalid latitude {latitude}. Must be between -90 and 90"
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(CoreError::Validation(format!(
            "Invalid longitude {longitude}. Must be between -180 and 180"
        )));
    }
    Ok(())
}

/// Mean coordinate of the given points, or the fallback center when the
/// slice is empty.
pub fn map_center(points: &[(f64, f64)]) -> (f64, f64) {
    if points.is_empty() {
        return FALLBACK_COORDINATES;
    }
    let n = points.len() as f64;
    let (lat_sum, lon_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.0, lon + p.1));
    (lat_sum / n, lon_sum / n)
}
