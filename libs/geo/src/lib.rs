//! WGS84 geodesy helpers shared by the placehub services.
//!
//! The search engine treats the store's geospatial operators (point type,
//! distance, radius containment) as an external capability; this crate holds
//! the pure math that stays on the application side: coordinate validation,
//! great-circle distance, and the bounding box used to prefilter radius
//! queries over plain latitude/longitude columns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A WGS84 point. Longitude first on the wire matches the store's
/// `POINT(lng lat)` convention, but the constructor takes (lat, lng) to
/// mirror how coordinates arrive in requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&latitude) || !latitude.is_finite() {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) || !longitude.is_finite() {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Great-circle distance between two points in meters (haversine formula).
///
/// Good to well under 0.5% against the ellipsoidal distance the store
/// computes, which is all the prefilter and the tests need.
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Axis-aligned bounding box in degrees, used as an index-friendly
/// prefilter before the exact radius containment test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Smallest box guaranteed to contain the circle of `radius_m` meters
    /// around `center`. Latitude bounds are clamped at the poles; longitude
    /// spans the full range near them rather than attempting antimeridian
    /// splitting, which the prefilter does not need to be tight about.
    pub fn around(center: GeoPoint, radius_m: f64) -> Self {
        let lat_delta = (radius_m / EARTH_RADIUS_M).to_degrees();
        let min_lat = (center.latitude - lat_delta).max(-90.0);
        let max_lat = (center.latitude + lat_delta).min(90.0);

        let cos_lat = center.latitude.to_radians().cos();
        let lng_delta = if cos_lat <= f64::EPSILON {
            180.0
        } else {
            (radius_m / (EARTH_RADIUS_M * cos_lat)).to_degrees()
        };
        let min_lng = (center.longitude - lng_delta).max(-180.0);
        let max_lng = (center.longitude + lng_delta).min(180.0);

        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }
}
