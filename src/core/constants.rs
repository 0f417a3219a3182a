//! Physical constants and system parameters

/// Radius around the current tracking position inside which tracking data is
/// trusted (scene units, treated as meters)
pub const SCENE_LIMIT: f64 = 100.0;

/// Meters per radian of latitude used by geodesic projection.
/// Empirical local approximation, not a true Earth radius.
pub const METERS_PER_LATITUDE_RADIAN: f64 = 6_360_500.0;

/// Meters per radian of longitude used by geodesic projection.
/// Calibrated together with the bearing handling in `geodesy::project`.
pub const METERS_PER_LONGITUDE_RADIAN: f64 = 5_602_900.0;

/// Mean Earth radius in meters, used for great-circle distances
pub const EARTH_MEAN_RADIUS: f64 = 6_371_008.8;

/// Distance (meters) beyond which confirmed anchors are pulled in and scaled down
pub const TELESCOPE_DISTANCE: f64 = 100.0;

/// Annotation scale per meter of adjusted distance
pub const ANNOTATION_DISTANCE_SCALE: f64 = 0.181;

/// Distance (meters) beyond which annotations shrink further
pub const FAR_ANNOTATION_DISTANCE: f64 = 3000.0;

/// Extra shrink applied to annotations past `FAR_ANNOTATION_DISTANCE`
pub const FAR_ANNOTATION_SHRINK: f64 = 0.75;

/// Annotation pivot offset, in multiples of the annotation scale
pub const ANNOTATION_PIVOT_FACTOR: f64 = 1.1;

/// Default update tick interval (milliseconds), 10 Hz
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 100;
