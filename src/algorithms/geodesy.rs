//! Geodesic helpers for short-range geographic <-> metric conversion
//!
//! The conversions here decouple the latitude and longitude axes and are only
//! meant for distances from meters up to a few kilometers:
//! - Meter to radian conversion with empirical per-axis constants
//! - Bearing projection (only ever used along bearings 0 and 90)
//! - Axis-decoupled translation between two points and its inverse
//! - Haversine great-circle distance

use crate::core::{
    Coordinate, GeoPoint, LocalOffset, EARTH_MEAN_RADIUS, METERS_PER_LATITUDE_RADIAN,
    METERS_PER_LONGITUDE_RADIAN,
};

/// Bearing used to project along the latitude axis
pub const BEARING_NORTH: f64 = 0.0;

/// Bearing used to project along the longitude axis
pub const BEARING_EAST: f64 = 90.0;

pub fn meters_to_latitude_radians(meters: f64) -> f64 {
    meters / METERS_PER_LATITUDE_RADIAN
}

pub fn meters_to_longitude_radians(meters: f64) -> f64 {
    meters / METERS_PER_LONGITUDE_RADIAN
}

/// Project `coordinate` by `distance_m` along `bearing_degrees`.
///
/// The bearing value enters the trig terms unconverted. The longitude constant
/// is calibrated against that, so bearing 90 lands within about 2% of the true
/// eastward distance at mid latitudes.
pub fn project(coordinate: &Coordinate, bearing_degrees: f64, distance_m: f64) -> Coordinate {
    let dist_lat = meters_to_latitude_radians(distance_m);
    let dist_lon = meters_to_longitude_radians(distance_m);
    let bearing = bearing_degrees;

    let lat1 = coordinate.latitude.to_radians();
    let lon1 = coordinate.longitude.to_radians();

    let lat2 = (lat1.sin() * dist_lat.cos() + lat1.cos() * dist_lat.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * dist_lon.sin() * lat1.cos())
            .atan2(dist_lon.cos() - lat1.sin() * lat2.sin());

    Coordinate::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Haversine distance in meters between two coordinates
pub fn great_circle_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let half_dlat = (lat2 - lat1) / 2.0;
    let half_dlon = (to.longitude - from.longitude).to_radians() / 2.0;

    let h = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    2.0 * EARTH_MEAN_RADIUS * h.sqrt().min(1.0).asin()
}

/// Offset from `from` to `to`, measured through the point sharing `from`'s
/// latitude and `to`'s longitude.
pub fn translation(from: &GeoPoint, to: &GeoPoint) -> LocalOffset {
    let inbetween = Coordinate::new(from.latitude, to.longitude);

    let mut latitude_delta = great_circle_distance(&to.coordinate(), &inbetween);
    if to.latitude < inbetween.latitude {
        latitude_delta = -latitude_delta;
    }

    let mut longitude_delta = great_circle_distance(&from.coordinate(), &inbetween);
    if from.longitude > inbetween.longitude {
        longitude_delta = -longitude_delta;
    }

    LocalOffset::new(latitude_delta, longitude_delta, to.altitude - from.altitude)
}

/// Move `point` by `offset`. Accuracy and timestamp are carried over.
pub fn apply(offset: &LocalOffset, point: &GeoPoint) -> GeoPoint {
    let coordinate = point.coordinate();
    let north = project(&coordinate, BEARING_NORTH, offset.latitude_translation);
    let east = project(&coordinate, BEARING_EAST, offset.longitude_translation);

    GeoPoint {
        latitude: north.latitude,
        longitude: east.longitude,
        altitude: point.altitude + offset.altitude_translation,
        ..*point
    }
}
