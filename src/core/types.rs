//! Core data types for geo-anchored scene tracking

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Point or displacement in the tracking frame.
/// x = east, y = up, z = south (negated geographic north).
pub type TrackingVector = Vector3<f64>;

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Absolute geographic fix with accuracy and capture time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: f64,
    /// Horizontal accuracy radius in meters (lower is better)
    #[serde(default)]
    pub horizontal_accuracy: f64,
    /// Vertical accuracy in meters
    #[serde(default)]
    pub vertical_accuracy: f64,
    /// Capture time, milliseconds since epoch
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl GeoPoint {
    /// Point with zero accuracy radius and zero timestamp
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            horizontal_accuracy: 0.0,
            vertical_accuracy: 0.0,
            timestamp_ms: 0,
        }
    }

    pub fn with_accuracy(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_accuracy = horizontal;
        self.vertical_accuracy = vertical;
        self
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Great-circle distance in meters, altitude ignored
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        crate::algorithms::geodesy::great_circle_distance(&self.coordinate(), &other.coordinate())
    }
}

/// Metric displacement between two geographic points in a locally flat frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalOffset {
    /// Meters north (positive) or south (negative)
    pub latitude_translation: f64,
    /// Meters east (positive) or west (negative)
    pub longitude_translation: f64,
    /// Meters up (positive) or down (negative)
    pub altitude_translation: f64,
}

impl LocalOffset {
    pub fn new(latitude_translation: f64, longitude_translation: f64, altitude_translation: f64) -> Self {
        Self {
            latitude_translation,
            longitude_translation,
            altitude_translation,
        }
    }

    /// Tracking-frame displacement for this offset (north maps to -z)
    pub fn to_tracking(&self) -> TrackingVector {
        TrackingVector::new(
            self.longitude_translation,
            self.altitude_translation,
            -self.latitude_translation,
        )
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.latitude_translation * factor,
            self.longitude_translation * factor,
            self.altitude_translation * factor,
        )
    }
}

/// Camera pose reported by the tracking subsystem
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingPose {
    pub position: TrackingVector,
    pub orientation: UnitQuaternion<f64>,
}

impl TrackingPose {
    pub fn new(position: TrackingVector, orientation: UnitQuaternion<f64>) -> Self {
        Self { position, orientation }
    }

    /// Pose at `position` with identity orientation
    pub fn at(position: TrackingVector) -> Self {
        Self::new(position, UnitQuaternion::identity())
    }

    /// Orientation as (roll, pitch, yaw) in radians
    pub fn euler_angles(&self) -> (f64, f64, f64) {
        self.orientation.euler_angles()
    }
}

/// Compass reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingReading {
    /// Heading relative to magnetic north (degrees)
    pub magnetic_heading: f64,
    /// Heading relative to true north (degrees)
    pub true_heading: f64,
    /// Accuracy in degrees; negative means the true heading is invalid
    pub accuracy: f64,
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl HeadingReading {
    pub fn new(magnetic_heading: f64, true_heading: f64, accuracy: f64) -> Self {
        Self {
            magnetic_heading,
            true_heading,
            accuracy,
            timestamp_ms: 0,
        }
    }

    /// Reading that only carries a true heading
    pub fn true_north(true_heading: f64) -> Self {
        Self::new(0.0, true_heading, 0.0)
    }

    /// True heading when it is valid, magnetic heading otherwise
    pub fn effective_heading(&self) -> f64 {
        if self.accuracy >= 0.0 {
            self.true_heading
        } else {
            self.magnetic_heading
        }
    }
}

/// How the current geographic location is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMode {
    /// Trust the location provider exclusively
    GeoOnly,
    /// Fuse provider fixes with the tracking frame
    #[default]
    Fused,
}
