//! Tracking-frame vector helpers
//!
//! Component-wise arithmetic, scaling, `dot`, `component_mul` and `norm` come
//! from nalgebra. This module adds the geometric queries the scene logic needs,
//! written against fixed-arity `SVector` so the 3- and 4-component forms share
//! one implementation with the dimension checked at compile time.

use crate::core::TrackingVector;
use nalgebra::{Point2, SVector};

/// 4-component tracking vector (homogeneous points, quaternion-like data)
pub type TrackingVector4 = SVector<f64, 4>;

pub fn midpoint<const D: usize>(a: &SVector<f64, D>, b: &SVector<f64, D>) -> SVector<f64, D> {
    (a + b) / 2.0
}

pub fn magnitude<const D: usize>(v: &SVector<f64, D>) -> f64 {
    v.dot(v).sqrt()
}

/// Euclidean distance from `a` to `b`
pub fn distance<const D: usize>(a: &SVector<f64, D>, b: &SVector<f64, D>) -> f64 {
    magnitude(&(b - a))
}

/// Projection onto the ground plane as (east, north)
pub fn ground_point(v: &TrackingVector) -> Point2<f64> {
    Point2::new(v.x, -v.z)
}

/// Distance ignoring the vertical (y) axis
pub fn planar_distance(a: &TrackingVector, b: &TrackingVector) -> f64 {
    nalgebra::distance(&ground_point(a), &ground_point(b))
}

/// Whether `point` lies within `radius` of `center` on the ground plane (inclusive)
pub fn is_within(point: &TrackingVector, radius: f64, center: &TrackingVector) -> bool {
    planar_distance(point, center) <= radius
}
