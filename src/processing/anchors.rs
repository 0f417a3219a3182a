//! Anchor registry: placement, confirmation and per-tick pose updates
//!
//! Anchors are virtual objects with a geographic location. Their tracking-frame
//! position and scale are derived here every tick and must not be written by
//! callers. Two placement modes exist:
//! - confirmed anchors, whose location is known up front
//! - tagged anchors, placed at the device's current position and confirmed
//!   later, once the device has moved beyond the scene limit

use crate::algorithms::geodesy;
use crate::algorithms::vectors::{is_within, planar_distance};
use crate::core::{
    EstimationMode, GeoPoint, TrackingVector, ANNOTATION_DISTANCE_SCALE, ANNOTATION_PIVOT_FACTOR,
    FAR_ANNOTATION_DISTANCE, FAR_ANNOTATION_SHRINK, SCENE_LIMIT, TELESCOPE_DISTANCE,
};
use crate::processing::estimates::LocationEstimateStore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry-assigned anchor identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(u64);

impl AnchorId {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

/// Billboarded sub-element drawn at an anchor.
///
/// Billboard constraints ignore the anchor's own scale, so the scale computed
/// for the anchor is applied here instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotation {
    /// Follow the anchor's telescoping scale instead of distance-based sizing
    pub scale_relative_to_distance: bool,
    scale: f64,
    pivot_offset: f64,
}

impl Annotation {
    pub fn new(scale_relative_to_distance: bool) -> Self {
        Self {
            scale_relative_to_distance,
            scale: 1.0,
            pivot_offset: 0.0,
        }
    }

    /// Uniform scale of the sub-element
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Vertical pivot translation placing the sub-element on its base
    pub fn pivot_offset(&self) -> f64 {
        self.pivot_offset
    }
}

/// Placed virtual object
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    /// Geographic location, absent until known
    pub location: Option<GeoPoint>,
    /// Whether `location` has been validated by a geographic fix
    pub confirmed_location: bool,
    /// Recompute position and scale every tick
    pub continually_update_position_and_scale: bool,
    /// Keep re-placing by geography even within the telescoping distance
    pub continually_adjust_node_position_when_within_range: bool,
    /// Optional billboarded annotation
    pub annotation: Option<Annotation>,
    position: TrackingVector,
    scale: f64,
    adjusted_distance: Option<f64>,
}

impl Anchor {
    /// Anchor whose location is known precisely
    pub fn confirmed(location: GeoPoint) -> Self {
        Self {
            location: Some(location),
            confirmed_location: true,
            ..Self::unplaced()
        }
    }

    /// Anchor without a location, to be tagged at the current position
    pub fn unplaced() -> Self {
        Self {
            location: None,
            confirmed_location: false,
            continually_update_position_and_scale: true,
            continually_adjust_node_position_when_within_range: true,
            annotation: None,
            position: TrackingVector::zeros(),
            scale: 1.0,
            adjusted_distance: None,
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_continuous_updates(mut self, enabled: bool) -> Self {
        self.continually_update_position_and_scale = enabled;
        self
    }

    pub fn with_adjust_within_range(mut self, enabled: bool) -> Self {
        self.continually_adjust_node_position_when_within_range = enabled;
        self
    }

    /// Tracking-frame position
    pub fn position(&self) -> TrackingVector {
        self.position
    }

    /// Uniform scale of the anchor node
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Distance used for display sizing after the last update
    pub fn adjusted_distance(&self) -> Option<f64> {
        self.adjusted_distance
    }
}

/// Inputs for one registry pass
#[derive(Debug, Clone, Copy)]
pub struct SceneSnapshot<'a> {
    pub tracking_position: Option<TrackingVector>,
    pub current_location: Option<GeoPoint>,
    pub estimates: &'a LocationEstimateStore,
}

/// Pose computed for one anchor during an update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseUpdate {
    pub id: AnchorId,
    pub position: TrackingVector,
    pub scale: f64,
    pub adjusted_distance: f64,
    /// Geodesic distance between the anchor and the device (meters)
    pub distance: f64,
}

/// Owner of all placed anchors
#[derive(Debug, Clone)]
pub struct AnchorRegistry {
    anchors: Vec<(AnchorId, Anchor)>,
    next_id: u64,
    mode: EstimationMode,
    scene_limit: f64,
}

impl Default for AnchorRegistry {
    fn default() -> Self {
        Self::new(EstimationMode::default(), SCENE_LIMIT)
    }
}

impl AnchorRegistry {
    pub fn new(mode: EstimationMode, scene_limit: f64) -> Self {
        Self {
            anchors: Vec::new(),
            next_id: 1,
            mode,
            scene_limit,
        }
    }

    pub fn mode(&self) -> EstimationMode {
        self.mode
    }

    pub fn scene_limit(&self) -> f64 {
        self.scene_limit
    }

    pub fn get(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors.iter().find(|(key, _)| *key == id).map(|(_, anchor)| anchor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnchorId, &Anchor)> {
        self.anchors.iter().map(|(id, anchor)| (*id, anchor))
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Insert an anchor with a known, confirmed location and place it
    /// immediately. Returns `None` if the anchor has no location or is not
    /// confirmed.
    pub fn add_confirmed(&mut self, anchor: Anchor, snapshot: &SceneSnapshot<'_>) -> Option<AnchorId> {
        if anchor.location.is_none() || !anchor.confirmed_location {
            log::warn!("Rejected anchor: confirmed placement requires a confirmed location");
            return None;
        }

        let id = self.insert(anchor);
        self.update_pose(id, snapshot, true);
        log::info!("Added confirmed {}", id);
        Some(id)
    }

    /// Place `anchor` at the device's current position and location.
    /// Returns `None` when either is unavailable.
    pub fn tag_current_location(&mut self, mut anchor: Anchor, snapshot: &SceneSnapshot<'_>) -> Option<AnchorId> {
        let position = snapshot.tracking_position?;
        let location = snapshot.current_location?;

        anchor.location = Some(location);
        anchor.confirmed_location = self.mode == EstimationMode::GeoOnly;
        anchor.position = position;

        let id = self.insert(anchor);
        log::info!(
            "Tagged {} at lat={:.7} lon={:.7} (confirmed: {})",
            id,
            location.latitude,
            location.longitude,
            self.mode == EstimationMode::GeoOnly
        );
        Some(id)
    }

    /// Remove an anchor; absent ids are ignored
    pub fn remove(&mut self, id: AnchorId) -> Option<Anchor> {
        let index = self.anchors.iter().position(|(key, _)| *key == id)?;
        let (_, anchor) = self.anchors.remove(index);
        log::info!("Removed {}", id);
        Some(anchor)
    }

    pub fn clear(&mut self) -> Vec<AnchorId> {
        let ids = self.anchors.drain(..).map(|(id, _)| id).collect::<Vec<_>>();
        if !ids.is_empty() {
            log::info!("Removed all {} anchors", ids.len());
        }
        ids
    }

    /// Best-known location of an anchor.
    ///
    /// Confirmed anchors, and every anchor in geo-only mode, keep their stored
    /// location. Otherwise a current estimate replaces it when strictly more
    /// accurate.
    pub fn resolved_location(&self, anchor: &Anchor, estimates: &LocationEstimateStore) -> Option<GeoPoint> {
        if anchor.confirmed_location || self.mode == EstimationMode::GeoOnly {
            return anchor.location;
        }

        match (estimates.best(), anchor.location) {
            (Some(best), None) => Some(best.translated_location(&anchor.position)),
            (Some(best), Some(stored)) if best.horizontal_accuracy() < stored.horizontal_accuracy => {
                Some(best.translated_location(&anchor.position))
            }
            (_, stored) => stored,
        }
    }

    /// Confirm every unconfirmed anchor outside the scene limit of the device.
    /// Returns the confirmed ids.
    pub fn confirm_distant_unconfirmed(&mut self, snapshot: &SceneSnapshot<'_>) -> Vec<AnchorId> {
        let Some(current_position) = snapshot.tracking_position else {
            return Vec::new();
        };

        let distant: Vec<(AnchorId, Option<GeoPoint>)> = self
            .anchors
            .iter()
            .filter(|(_, anchor)| !anchor.confirmed_location)
            .filter(|(_, anchor)| !is_within(&anchor.position, self.scene_limit, &current_position))
            .map(|(id, anchor)| (*id, self.resolved_location(anchor, snapshot.estimates)))
            .collect();

        let mut confirmed = Vec::new();
        for (id, location) in distant {
            let Some(location) = location else {
                log::trace!("{} has no resolvable location yet", id);
                continue;
            };
            if let Some(anchor) = self.get_mut(id) {
                anchor.location = Some(location);
                anchor.confirmed_location = true;
                log::info!(
                    "Confirmed {} at lat={:.7} lon={:.7} acc={:.1}m",
                    id,
                    location.latitude,
                    location.longitude,
                    location.horizontal_accuracy
                );
                confirmed.push(id);
            }
        }

        confirmed
    }

    /// Recompute the pose of every continuously updating anchor
    pub fn update_all(&mut self, snapshot: &SceneSnapshot<'_>) -> Vec<PoseUpdate> {
        let ids: Vec<AnchorId> = self
            .anchors
            .iter()
            .filter(|(_, anchor)| anchor.continually_update_position_and_scale)
            .map(|(id, _)| *id)
            .collect();

        ids.into_iter()
            .filter_map(|id| self.update_pose(id, snapshot, false))
            .collect()
    }

    /// Recompute one anchor's pose. Skipped (returns `None`) when the device
    /// pose, the device location or the anchor location is unavailable.
    pub fn update_pose(&mut self, id: AnchorId, snapshot: &SceneSnapshot<'_>, initial_setup: bool) -> Option<PoseUpdate> {
        let (Some(current_position), Some(current_location)) =
            (snapshot.tracking_position, snapshot.current_location)
        else {
            log::trace!("Skipping update of {}: no pose or location", id);
            return None;
        };

        let anchor_location = {
            let anchor = self.get(id)?;
            self.resolved_location(anchor, snapshot.estimates)?
        };

        let offset = geodesy::translation(&current_location, &anchor_location);
        let distance = anchor_location.distance_to(&current_location);

        let anchor = self.get_mut(id)?;
        let adjusted_distance;

        if anchor.confirmed_location
            && (distance > TELESCOPE_DISTANCE
                || anchor.continually_adjust_node_position_when_within_range
                || initial_setup)
        {
            if distance > TELESCOPE_DISTANCE {
                // Pull distant anchors in to the telescoping radius and shrink them
                let scale = TELESCOPE_DISTANCE / distance;
                adjusted_distance = distance * scale;
                anchor.position = current_position + offset.scaled(scale).to_tracking();
                anchor.scale = scale;
            } else {
                adjusted_distance = distance;
                anchor.position = current_position + offset.to_tracking();
                anchor.scale = 1.0;
            }
        } else {
            // Location not trusted yet: keep the tracking placement
            adjusted_distance = planar_distance(&current_position, &anchor.position);
            anchor.scale = 1.0;
        }

        if let Some(annotation) = anchor.annotation.as_mut() {
            let applied_scale = anchor.scale;
            anchor.scale = 1.0;

            let scale = if annotation.scale_relative_to_distance {
                applied_scale
            } else {
                let mut scale = adjusted_distance * ANNOTATION_DISTANCE_SCALE;
                if distance > FAR_ANNOTATION_DISTANCE {
                    scale *= FAR_ANNOTATION_SHRINK;
                }
                scale
            };

            annotation.scale = scale;
            annotation.pivot_offset = -ANNOTATION_PIVOT_FACTOR * scale;
        }

        anchor.adjusted_distance = Some(adjusted_distance);

        Some(PoseUpdate {
            id,
            position: anchor.position,
            scale: anchor.scale,
            adjusted_distance,
            distance,
        })
    }

    fn insert(&mut self, anchor: Anchor) -> AnchorId {
        let id = AnchorId(self.next_id);
        self.next_id += 1;
        self.anchors.push((id, anchor));
        id
    }

    fn get_mut(&mut self, id: AnchorId) -> Option<&mut Anchor> {
        self.anchors.iter_mut().find(|(key, _)| *key == id).map(|(_, anchor)| anchor)
    }
}
