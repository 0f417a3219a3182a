//! Session driver
//!
//! Owns the estimate store, the anchor registry and the location provider, and
//! sequences the three inputs of a running scene on one thread:
//! - tracking frames, which bootstrap the first estimate
//! - provider fixes, which prune and then record estimates
//! - the update tick, which prunes, confirms distant anchors and re-places
//!   every continuously updating anchor
//!
//! Within a [`SceneSession::step`] the tracking frame is always applied before
//! the provider is drained, so a fix arriving in the same step is recorded
//! against the new pose.

use crate::api::events::{CallbackHandle, EventCallback, EventDispatcher, SceneEvent};
use crate::core::{EstimationMode, GeoPoint, HeadingReading, TrackingPose, TrackingVector};
use crate::hardware::{LocationProvider, ProviderResult, ProviderStatus, ProviderUpdate};
use crate::processing::{Anchor, AnchorId, AnchorRegistry, LocationEstimateStore, PoseUpdate, SceneSnapshot};
use crate::utils::{ConfigError, SessionConfig};
use std::time::{Duration, Instant};

/// Degrees applied per scene heading nudge
const SCENE_HEADING_STEP_DEGREES: f64 = 1.0;

/// Outcome of one update tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// Estimates pruned for being outside the prune radius
    pub pruned: usize,
    /// Tagged anchors confirmed during this tick
    pub confirmed: Vec<AnchorId>,
    /// Poses recomputed during this tick
    pub updates: Vec<PoseUpdate>,
}

/// Geo-anchored scene session
pub struct SceneSession {
    config: SessionConfig,
    provider: Box<dyn LocationProvider>,
    estimates: LocationEstimateStore,
    registry: AnchorRegistry,
    pose: Option<TrackingPose>,
    last_fix: Option<GeoPoint>,
    heading: Option<HeadingReading>,
    scene_heading_offset: f64,
    did_fetch_initial_location: bool,
    running: bool,
    last_tick: Option<Instant>,
    events: EventDispatcher,
}

impl SceneSession {
    pub fn new(config: SessionConfig, provider: Box<dyn LocationProvider>) -> Result<Self, ConfigError> {
        config.validate()?;

        let registry = AnchorRegistry::new(config.estimation_mode, config.scene_limit_m);
        Ok(Self {
            config,
            provider,
            estimates: LocationEstimateStore::new(),
            registry,
            pose: None,
            last_fix: None,
            heading: None,
            scene_heading_offset: 0.0,
            did_fetch_initial_location: false,
            running: false,
            last_tick: None,
            events: EventDispatcher::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start the provider and enable the update tick
    pub fn run(&mut self) -> ProviderResult<()> {
        self.provider.start()?;
        self.running = true;
        self.last_tick = None;

        log::info!(
            "Scene session running ({:?}, scene limit {:.0}m, tick {}ms)",
            self.config.estimation_mode,
            self.config.scene_limit_m,
            self.config.update_interval_ms
        );
        self.events.dispatch(&SceneEvent::StateChanged { running: true });
        Ok(())
    }

    /// Stop ticking; inputs are still accepted
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        log::info!("Scene session paused");
        self.events.dispatch(&SceneEvent::StateChanged { running: false });
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn provider_status(&self) -> ProviderStatus {
        self.provider.status()
    }

    // Inputs

    /// New tracking frame. Records the first estimate as soon as both a pose
    /// and a provider fix exist.
    pub fn on_tracking_frame(&mut self, pose: TrackingPose) {
        self.pose = Some(pose);

        if !self.did_fetch_initial_location {
            if let Some(fix) = self.provider.current_fix() {
                self.record_estimate(fix, pose.position);
            }
        }
    }

    /// New geographic fix: prune, then record against the current pose
    pub fn on_location_fix(&mut self, fix: GeoPoint) {
        self.last_fix = Some(fix);

        let Some(position) = self.current_tracking_position() else {
            log::trace!("Fix received before any tracking frame; not recorded");
            return;
        };

        self.prune_estimates(&position);
        self.record_estimate(fix, position);
    }

    pub fn on_heading(&mut self, reading: HeadingReading) {
        self.heading = Some(reading);
        self.events.dispatch(&SceneEvent::HeadingUpdated {
            heading: reading.effective_heading(),
            accuracy: reading.accuracy,
        });
    }

    /// Drain the provider and dispatch its updates. Returns how many were handled.
    pub fn pump_provider(&mut self) -> ProviderResult<usize> {
        let updates = self.provider.poll()?;
        let count = updates.len();

        for update in updates {
            match update {
                ProviderUpdate::Fix(fix) => self.on_location_fix(fix),
                ProviderUpdate::Heading(reading) => self.on_heading(reading),
            }
        }

        Ok(count)
    }

    /// One pass of the main loop: frame, provider, then the tick if due
    pub fn step(&mut self, pose: Option<TrackingPose>, now: Instant) -> Option<TickSummary> {
        if let Some(pose) = pose {
            self.on_tracking_frame(pose);
        }

        if self.running {
            if let Err(error) = self.pump_provider() {
                log::warn!("Location provider poll failed: {}", error);
            }
        }

        self.advance(now)
    }

    // Ticking

    /// Run a tick if the session is running and the update interval has
    /// elapsed since the previous one
    pub fn advance(&mut self, now: Instant) -> Option<TickSummary> {
        if !self.running {
            return None;
        }

        let interval = Duration::from_millis(self.config.update_interval_ms);
        if let Some(last) = self.last_tick {
            if now.saturating_duration_since(last) < interval {
                return None;
            }
        }

        self.last_tick = Some(now);
        Some(self.tick())
    }

    /// Prune stale estimates, confirm distant tagged anchors and re-place
    /// every continuously updating anchor
    pub fn tick(&mut self) -> TickSummary {
        let mut summary = TickSummary::default();

        if let Some(position) = self.current_tracking_position() {
            summary.pruned = self.prune_estimates(&position);
        }

        let snapshot = SceneSnapshot {
            tracking_position: self.current_tracking_position(),
            current_location: self.current_location(),
            estimates: &self.estimates,
        };

        summary.confirmed = self.registry.confirm_distant_unconfirmed(&snapshot);
        for id in &summary.confirmed {
            if let Some(location) = self.registry.get(*id).and_then(|anchor| anchor.location) {
                self.events.dispatch(&SceneEvent::AnchorConfirmed { id: *id, location });
            }
        }

        summary.updates = self.registry.update_all(&snapshot);
        for update in &summary.updates {
            self.events.dispatch(&SceneEvent::AnchorPoseUpdated(*update));
        }

        summary
    }

    // Queries

    /// Best-known device location: the latest provider fix in geo-only mode,
    /// the best estimate translated to the current pose when fused
    pub fn current_location(&self) -> Option<GeoPoint> {
        match self.config.estimation_mode {
            EstimationMode::GeoOnly => self.last_fix.or_else(|| self.provider.current_fix()),
            EstimationMode::Fused => {
                let position = self.current_tracking_position()?;
                let best = self.estimates.best()?;
                Some(best.translated_location(&position))
            }
        }
    }

    pub fn current_pose(&self) -> Option<TrackingPose> {
        self.pose
    }

    pub fn current_tracking_position(&self) -> Option<TrackingVector> {
        self.pose.map(|pose| pose.position)
    }

    /// Device orientation as (roll, pitch, yaw) in radians
    pub fn current_euler_angles(&self) -> Option<(f64, f64, f64)> {
        self.pose.map(|pose| pose.euler_angles())
    }

    pub fn heading(&self) -> Option<HeadingReading> {
        self.heading
    }

    pub fn estimates(&self) -> &LocationEstimateStore {
        &self.estimates
    }

    // Anchors

    /// Place `anchor` at the device's current position and location
    pub fn tag_current_location(&mut self, anchor: Anchor) -> Option<AnchorId> {
        let snapshot = SceneSnapshot {
            tracking_position: self.current_tracking_position(),
            current_location: self.current_location(),
            estimates: &self.estimates,
        };
        self.registry.tag_current_location(anchor, &snapshot)
    }

    /// Add an anchor with a confirmed location and place it immediately
    pub fn add_confirmed(&mut self, anchor: Anchor) -> Option<AnchorId> {
        let snapshot = SceneSnapshot {
            tracking_position: self.current_tracking_position(),
            current_location: self.current_location(),
            estimates: &self.estimates,
        };
        self.registry.add_confirmed(anchor, &snapshot)
    }

    pub fn remove_anchor(&mut self, id: AnchorId) -> Option<Anchor> {
        self.registry.remove(id)
    }

    /// Returns the removed ids
    pub fn remove_all_anchors(&mut self) -> Vec<AnchorId> {
        self.registry.clear()
    }

    pub fn anchor(&self, id: AnchorId) -> Option<&Anchor> {
        self.registry.get(id)
    }

    pub fn anchors(&self) -> impl Iterator<Item = (AnchorId, &Anchor)> {
        self.registry.iter()
    }

    // Scene heading correction

    /// Yaw offset (degrees) a renderer applies to the scene root
    pub fn scene_heading_offset(&self) -> f64 {
        self.scene_heading_offset
    }

    pub fn move_scene_heading_clockwise(&mut self) -> f64 {
        self.scene_heading_offset -= SCENE_HEADING_STEP_DEGREES;
        self.scene_heading_offset
    }

    pub fn move_scene_heading_anticlockwise(&mut self) -> f64 {
        self.scene_heading_offset += SCENE_HEADING_STEP_DEGREES;
        self.scene_heading_offset
    }

    pub fn reset_scene_heading(&mut self) {
        self.scene_heading_offset = 0.0;
    }

    // Notifications

    pub fn register_event_callback(&mut self, callback: EventCallback) -> CallbackHandle {
        self.events.register(callback)
    }

    pub fn unregister_callback(&mut self, handle: CallbackHandle) -> bool {
        self.events.unregister(handle)
    }

    fn record_estimate(&mut self, fix: GeoPoint, position: TrackingVector) {
        let estimate = self.estimates.record(fix, position);
        self.did_fetch_initial_location = true;
        self.events.dispatch(&SceneEvent::EstimateAdded {
            position: estimate.virtual_position,
            location: estimate.real_world_location,
        });
    }

    fn prune_estimates(&mut self, position: &TrackingVector) -> usize {
        let removed = self.estimates.prune_stale(position, self.config.prune_radius());
        for estimate in &removed {
            self.events.dispatch(&SceneEvent::EstimateRemoved {
                position: estimate.virtual_position,
                location: estimate.real_world_location,
            });
        }
        removed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{channel, MockLocationSet, ProviderFeed, ScriptedProvider};
    use approx::assert_relative_eq;
    use std::sync::{Arc, Mutex};

    fn office() -> GeoPoint {
        GeoPoint::new(32.0723327, 34.7953844, 0.0).with_accuracy(5.0, 5.0)
    }

    fn live_session(config: SessionConfig) -> (ProviderFeed, SceneSession) {
        let (feed, provider) = channel();
        let session = SceneSession::new(config, Box::new(provider)).unwrap();
        (feed, session)
    }

    fn recorder(session: &mut SceneSession) -> Arc<Mutex<Vec<SceneEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        session.register_event_callback(Box::new(move |event| sink.lock().unwrap().push(event.clone())));
        events
    }

    #[test]
    fn test_rejects_invalid_config() {
        let (_feed, provider) = channel();
        let config = SessionConfig::new().with_scene_limit(-1.0);
        assert!(SceneSession::new(config, Box::new(provider)).is_err());
    }

    #[test]
    fn test_first_frame_bootstraps_estimate() {
        let provider = ScriptedProvider::new(MockLocationSet::TelAvivOfficeToAzrieli);
        let mut session = SceneSession::new(SessionConfig::default(), Box::new(provider)).unwrap();

        // No fix before the provider starts
        session.on_tracking_frame(TrackingPose::at(TrackingVector::zeros()));
        assert!(session.estimates().is_empty());

        session.run().unwrap();
        session.on_tracking_frame(TrackingPose::at(TrackingVector::new(0.0, 0.0, -1.0)));
        assert_eq!(session.estimates().len(), 1);

        // Bootstrap happens once
        session.on_tracking_frame(TrackingPose::at(TrackingVector::new(0.0, 0.0, -2.0)));
        assert_eq!(session.estimates().len(), 1);

        let best = session.estimates().best().unwrap();
        assert_eq!(best.virtual_position, TrackingVector::new(0.0, 0.0, -1.0));
        assert_eq!(best.real_world_location.latitude, 32.0723327);
    }

    #[test]
    fn test_fix_without_pose_is_not_recorded() {
        let (_feed, mut session) = live_session(SessionConfig::default());

        session.on_location_fix(office());
        assert!(session.estimates().is_empty());

        session.on_tracking_frame(TrackingPose::at(TrackingVector::zeros()));
        session.on_location_fix(office());
        assert_eq!(session.estimates().len(), 1);
    }

    #[test]
    fn test_fix_prunes_before_recording() {
        let (_feed, mut session) = live_session(SessionConfig::default());
        let events = recorder(&mut session);

        session.on_tracking_frame(TrackingPose::at(TrackingVector::zeros()));
        session.on_location_fix(office());

        session.on_tracking_frame(TrackingPose::at(TrackingVector::new(0.0, 0.0, -250.0)));
        session.on_location_fix(office().with_timestamp(10));

        assert_eq!(session.estimates().len(), 1);
        let kinds: Vec<&str> = events
            .lock()
            .unwrap()
            .iter()
            .map(|event| match event {
                SceneEvent::EstimateAdded { .. } => "added",
                SceneEvent::EstimateRemoved { .. } => "removed",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["added", "removed", "added"]);
    }

    #[test]
    fn test_current_location_by_mode() {
        let (_feed, mut fused) = live_session(SessionConfig::default());
        fused.on_location_fix(office());
        assert!(fused.current_location().is_none());

        fused.on_tracking_frame(TrackingPose::at(TrackingVector::zeros()));
        fused.on_location_fix(office());
        fused.on_tracking_frame(TrackingPose::at(TrackingVector::new(0.0, 0.0, -30.0)));

        let location = fused.current_location().unwrap();
        assert!(location.latitude > office().latitude);
        assert_relative_eq!(location.distance_to(&office()), 30.0, epsilon = 0.5);

        let config = SessionConfig::new().with_estimation_mode(EstimationMode::GeoOnly);
        let (_feed, mut geo_only) = live_session(config);
        geo_only.on_location_fix(office());
        assert_eq!(geo_only.current_location(), Some(office()));
    }

    #[test]
    fn test_pump_dispatches_provider_updates() {
        let (feed, mut session) = live_session(SessionConfig::default());
        session.run().unwrap();
        session.on_tracking_frame(TrackingPose::at(TrackingVector::zeros()));

        feed.push_heading(HeadingReading::new(10.0, 12.0, 3.0)).unwrap();
        feed.push_fix(office()).unwrap();

        assert_eq!(session.pump_provider().unwrap(), 2);
        assert_eq!(session.estimates().len(), 1);
        assert_eq!(session.heading().unwrap().effective_heading(), 12.0);
    }

    #[test]
    fn test_advance_respects_interval_and_pause() {
        let (_feed, mut session) = live_session(SessionConfig::new().with_update_interval(100));
        let start = Instant::now();

        assert!(session.advance(start).is_none());

        session.run().unwrap();
        assert!(session.advance(start).is_some());
        assert!(session.advance(start + Duration::from_millis(50)).is_none());
        assert!(session.advance(start + Duration::from_millis(100)).is_some());

        session.pause();
        assert!(!session.is_running());
        assert!(session.advance(start + Duration::from_millis(500)).is_none());
    }

    #[test]
    fn test_tick_updates_confirmed_anchor() {
        let (_feed, mut session) = live_session(SessionConfig::default());
        let events = recorder(&mut session);
        session.on_tracking_frame(TrackingPose::at(TrackingVector::zeros()));
        session.on_location_fix(office());

        let target = GeoPoint::new(32.0750, 34.7953844, 0.0);
        let id = session.add_confirmed(Anchor::confirmed(target)).unwrap();

        let summary = session.tick();
        assert_eq!(summary.updates.len(), 1);
        assert_eq!(summary.updates[0].id, id);
        assert!(summary.updates[0].scale < 1.0);

        let poses = events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| matches!(event, SceneEvent::AnchorPoseUpdated(_)))
            .count();
        assert_eq!(poses, 1);
    }

    #[test]
    fn test_tag_requires_pose_and_location() {
        let (_feed, mut session) = live_session(SessionConfig::default());
        assert!(session.tag_current_location(Anchor::unplaced()).is_none());

        session.on_tracking_frame(TrackingPose::at(TrackingVector::zeros()));
        assert!(session.tag_current_location(Anchor::unplaced()).is_none());

        session.on_location_fix(office());
        let id = session.tag_current_location(Anchor::unplaced()).unwrap();
        assert!(!session.anchor(id).unwrap().confirmed_location);
    }

    #[test]
    fn test_remove_anchors() {
        let (_feed, mut session) = live_session(SessionConfig::default());
        session.on_tracking_frame(TrackingPose::at(TrackingVector::zeros()));
        session.on_location_fix(office());

        let first = session.add_confirmed(Anchor::confirmed(office())).unwrap();
        let second = session.add_confirmed(Anchor::confirmed(office())).unwrap();

        assert!(session.remove_anchor(first).is_some());
        assert_eq!(session.remove_all_anchors(), vec![second]);
        assert_eq!(session.anchors().count(), 0);
    }

    #[test]
    fn test_scene_heading_offset() {
        let (_feed, mut session) = live_session(SessionConfig::default());

        assert_eq!(session.move_scene_heading_clockwise(), -1.0);
        assert_eq!(session.move_scene_heading_clockwise(), -2.0);
        assert_eq!(session.move_scene_heading_anticlockwise(), -1.0);

        session.reset_scene_heading();
        assert_eq!(session.scene_heading_offset(), 0.0);
    }

    #[test]
    fn test_euler_angles_follow_pose() {
        let (_feed, mut session) = live_session(SessionConfig::default());
        assert!(session.current_euler_angles().is_none());

        let orientation = nalgebra::UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5);
        session.on_tracking_frame(TrackingPose::new(TrackingVector::zeros(), orientation));

        let (roll, pitch, yaw) = session.current_euler_angles().unwrap();
        assert_relative_eq!(roll, 0.0, epsilon = 1e-12);
        assert_relative_eq!(pitch, 0.0, epsilon = 1e-12);
        assert_relative_eq!(yaw, 0.5, epsilon = 1e-12);
    }
}
