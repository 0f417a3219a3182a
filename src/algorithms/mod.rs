//! Coordinate and geometry algorithms

pub mod geodesy;
pub mod vectors;
pub mod path;

pub use geodesy::{apply, great_circle_distance, project, translation};
pub use vectors::{distance, is_within, magnitude, midpoint, planar_distance, TrackingVector4};
pub use path::{path_segments, PathSegment};
