//! Segment geometry for drawing a path through tracking-frame points

use crate::algorithms::vectors::{distance, midpoint};
use crate::core::TrackingVector;

/// Straight edge between two consecutive path vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub start: TrackingVector,
    pub end: TrackingVector,
    /// Edge length in scene units
    pub length: f64,
    /// Placement point for the edge geometry
    pub midpoint: TrackingVector,
}

impl PathSegment {
    pub fn new(start: TrackingVector, end: TrackingVector) -> Self {
        Self {
            start,
            end,
            length: distance(&start, &end),
            midpoint: midpoint(&start, &end),
        }
    }
}

/// One segment per consecutive pair of `points`
pub fn path_segments(points: &[TrackingVector]) -> Vec<PathSegment> {
    points
        .windows(2)
        .map(|pair| PathSegment::new(pair[0], pair[1]))
        .collect()
}

/// Sum of segment lengths
pub fn path_length(points: &[TrackingVector]) -> f64 {
    path_segments(points).iter().map(|segment| segment.length).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_between_consecutive_points() {
        let points = vec![
            TrackingVector::new(0.0, 0.0, 0.0),
            TrackingVector::new(0.0, 0.0, -10.0),
            TrackingVector::new(6.0, 0.0, -18.0),
        ];

        let segments = path_segments(&points);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].length, 10.0);
        assert_eq!(segments[0].midpoint, TrackingVector::new(0.0, 0.0, -5.0));
        assert_eq!(segments[1].length, 10.0);
        assert_eq!(segments[1].midpoint, TrackingVector::new(3.0, 0.0, -14.0));
        assert_eq!(path_length(&points), 20.0);
    }

    #[test]
    fn test_degenerate_paths() {
        assert!(path_segments(&[]).is_empty());
        assert!(path_segments(&[TrackingVector::zeros()]).is_empty());
        assert_eq!(path_length(&[TrackingVector::zeros()]), 0.0);
    }
}
