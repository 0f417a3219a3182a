//! Scene notifications for UI and rendering consumers
//!
//! Consumers register callbacks and receive every [`SceneEvent`] in
//! registration order, on the thread that drives the session.

use crate::core::{GeoPoint, TrackingVector};
use crate::processing::{AnchorId, PoseUpdate};

/// Callback function type for scene events
pub type EventCallback = Box<dyn Fn(&SceneEvent) + Send>;

/// Notifications emitted by the session
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// New location estimate recorded
    EstimateAdded {
        position: TrackingVector,
        location: GeoPoint,
    },
    /// Estimate pruned for being too far from the device
    EstimateRemoved {
        position: TrackingVector,
        location: GeoPoint,
    },
    /// Tagged anchor's location replaced by a confirmed one
    AnchorConfirmed {
        id: AnchorId,
        location: GeoPoint,
    },
    /// Anchor position and scale recomputed
    AnchorPoseUpdated(PoseUpdate),
    /// Compass heading received
    HeadingUpdated {
        heading: f64,
        accuracy: f64,
    },
    /// Session started or paused
    StateChanged {
        running: bool,
    },
}

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Registered callbacks, invoked in registration order
#[derive(Default)]
pub struct EventDispatcher {
    callback_counter: u32,
    callbacks: Vec<(CallbackHandle, EventCallback)>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, callback: EventCallback) -> CallbackHandle {
        self.callback_counter += 1;
        let handle = CallbackHandle(self.callback_counter);
        self.callbacks.push((handle, callback));
        handle
    }

    /// Returns false if the handle was not registered
    pub fn unregister(&mut self, handle: CallbackHandle) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(registered, _)| *registered != handle);
        self.callbacks.len() != before
    }

    pub fn dispatch(&self, event: &SceneEvent) {
        for (_, callback) in &self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_dispatch_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            dispatcher.register(Box::new(move |_event| seen.lock().unwrap().push(tag)));
        }

        dispatcher.dispatch(&SceneEvent::StateChanged { running: true });

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_unregister() {
        let count = Arc::new(Mutex::new(0));
        let mut dispatcher = EventDispatcher::new();

        let counter = Arc::clone(&count);
        let handle = dispatcher.register(Box::new(move |_event| *counter.lock().unwrap() += 1));
        assert_eq!(handle.id(), 1);

        assert!(dispatcher.unregister(handle));
        assert!(!dispatcher.unregister(handle));
        assert!(dispatcher.is_empty());

        dispatcher.dispatch(&SceneEvent::StateChanged { running: false });
        assert_eq!(*count.lock().unwrap(), 0);
    }
}
