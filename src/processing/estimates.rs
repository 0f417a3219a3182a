//! Location estimates pairing geographic fixes with tracking positions
//!
//! Each estimate records where the tracking frame put the device at the moment a
//! fix arrived. Estimates are only trusted while the device stays near them, so
//! the store is pruned by planar distance before every selection.

use crate::algorithms::geodesy;
use crate::algorithms::vectors::planar_distance;
use crate::core::{GeoPoint, LocalOffset, TrackingVector};
use std::cmp::Ordering;

/// A geographic fix and the tracking position captured at the same instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationEstimate {
    pub real_world_location: GeoPoint,
    pub virtual_position: TrackingVector,
}

impl LocationEstimate {
    pub fn new(real_world_location: GeoPoint, virtual_position: TrackingVector) -> Self {
        Self {
            real_world_location,
            virtual_position,
        }
    }

    /// Planar distance from the recorded tracking position to `position`
    pub fn distance_to(&self, position: &TrackingVector) -> f64 {
        planar_distance(&self.virtual_position, position)
    }

    /// Metric offset from the recorded tracking position to `position`
    pub fn location_translation(&self, position: &TrackingVector) -> LocalOffset {
        LocalOffset::new(
            self.virtual_position.z - position.z,
            position.x - self.virtual_position.x,
            position.y - self.virtual_position.y,
        )
    }

    /// Geographic location of a tracking-frame `position`, referenced on this estimate
    pub fn translated_location(&self, position: &TrackingVector) -> GeoPoint {
        let offset = self.location_translation(position);
        geodesy::apply(&offset, &self.real_world_location)
    }

    pub fn horizontal_accuracy(&self) -> f64 {
        self.real_world_location.horizontal_accuracy
    }
}

/// Ordering used for best-estimate selection: most accurate first, then most recent
pub fn compare_estimates(a: &LocationEstimate, b: &LocationEstimate) -> Ordering {
    a.horizontal_accuracy()
        .total_cmp(&b.horizontal_accuracy())
        .then_with(|| {
            b.real_world_location
                .timestamp_ms
                .cmp(&a.real_world_location.timestamp_ms)
        })
}

/// Unordered buffer of location estimates
#[derive(Debug, Clone, Default)]
pub struct LocationEstimateStore {
    estimates: Vec<LocationEstimate>,
}

impl LocationEstimateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an estimate for `location` observed at `position`
    pub fn record(&mut self, location: GeoPoint, position: TrackingVector) -> LocationEstimate {
        let estimate = LocationEstimate::new(location, position);
        self.estimates.push(estimate);

        log::debug!(
            "Recorded estimate lat={:.7} lon={:.7} acc={:.1}m at ({:.2}, {:.2}, {:.2}); {} held",
            location.latitude,
            location.longitude,
            location.horizontal_accuracy,
            position.x,
            position.y,
            position.z,
            self.estimates.len()
        );

        estimate
    }

    /// Drop every estimate farther than `limit` from `position` on the ground
    /// plane. Returns the removed estimates.
    pub fn prune_stale(&mut self, position: &TrackingVector, limit: f64) -> Vec<LocationEstimate> {
        let (kept, removed): (Vec<_>, Vec<_>) = self
            .estimates
            .drain(..)
            .partition(|estimate| estimate.distance_to(position) <= limit);
        self.estimates = kept;

        if !removed.is_empty() {
            log::debug!(
                "Pruned {} stale estimates beyond {:.1}m; {} held",
                removed.len(),
                limit,
                self.estimates.len()
            );
        }

        removed
    }

    /// Most accurate estimate, most recent among equals
    pub fn best(&self) -> Option<&LocationEstimate> {
        self.estimates.iter().min_by(|a, b| compare_estimates(a, b))
    }

    /// Estimates sorted by selection order
    pub fn ranked(&self) -> Vec<LocationEstimate> {
        let mut ranked = self.estimates.clone();
        ranked.sort_by(compare_estimates);
        ranked
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocationEstimate> {
        self.estimates.iter()
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    pub fn clear(&mut self) {
        self.estimates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fix(accuracy: f64, timestamp_ms: u64) -> GeoPoint {
        GeoPoint::new(32.0723327, 34.7953844, 0.0)
            .with_accuracy(accuracy, accuracy)
            .with_timestamp(timestamp_ms)
    }

    #[test]
    fn test_best_on_empty_store() {
        let store = LocationEstimateStore::new();
        assert!(store.best().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_best_prefers_accuracy_regardless_of_order() {
        let mut forward = LocationEstimateStore::new();
        forward.record(fix(5.0, 1), TrackingVector::zeros());
        forward.record(fix(10.0, 2), TrackingVector::zeros());

        let mut backward = LocationEstimateStore::new();
        backward.record(fix(10.0, 2), TrackingVector::zeros());
        backward.record(fix(5.0, 1), TrackingVector::zeros());

        assert_eq!(forward.best().unwrap().horizontal_accuracy(), 5.0);
        assert_eq!(backward.best().unwrap().horizontal_accuracy(), 5.0);
    }

    #[test]
    fn test_best_breaks_ties_by_recency() {
        let mut store = LocationEstimateStore::new();
        store.record(fix(5.0, 100), TrackingVector::zeros());
        store.record(fix(5.0, 200), TrackingVector::zeros());
        store.record(fix(5.0, 150), TrackingVector::zeros());

        assert_eq!(store.best().unwrap().real_world_location.timestamp_ms, 200);

        let ranked = store.ranked();
        let timestamps: Vec<u64> = ranked.iter().map(|e| e.real_world_location.timestamp_ms).collect();
        assert_eq!(timestamps, vec![200, 150, 100]);
    }

    #[test]
    fn test_prune_removes_distant_estimates() {
        let mut store = LocationEstimateStore::new();
        for i in 0..5 {
            store.record(fix(5.0, i), TrackingVector::new(i as f64, 0.0, 0.0));
        }

        let removed = store.prune_stale(&TrackingVector::new(0.0, 0.0, -500.0), 100.0);

        assert_eq!(removed.len(), 5);
        assert!(store.is_empty());
        assert!(store.best().is_none());
    }

    #[test]
    fn test_prune_keeps_boundary_and_ignores_height() {
        let mut store = LocationEstimateStore::new();
        store.record(fix(5.0, 1), TrackingVector::new(0.0, 80.0, -100.0));
        store.record(fix(5.0, 2), TrackingVector::new(0.0, 0.0, -101.0));

        let removed = store.prune_stale(&TrackingVector::zeros(), 100.0);

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].real_world_location.timestamp_ms, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_location_translation_axes() {
        let estimate = LocationEstimate::new(fix(5.0, 1), TrackingVector::new(1.0, 2.0, 3.0));
        let offset = estimate.location_translation(&TrackingVector::new(4.0, 7.0, -7.0));

        assert_eq!(offset.latitude_translation, 10.0);
        assert_eq!(offset.longitude_translation, 3.0);
        assert_eq!(offset.altitude_translation, 5.0);
    }

    #[test]
    fn test_translated_location_moves_north_for_negative_z() {
        let origin = fix(5.0, 1);
        let estimate = LocationEstimate::new(origin, TrackingVector::zeros());

        let north = estimate.translated_location(&TrackingVector::new(0.0, 0.0, -50.0));

        assert!(north.latitude > origin.latitude);
        assert_relative_eq!(north.longitude, origin.longitude, epsilon = 1e-9);
        assert_relative_eq!(origin.distance_to(&north), 50.0, epsilon = 0.5);
        assert_eq!(north.horizontal_accuracy, origin.horizontal_accuracy);
    }
}
