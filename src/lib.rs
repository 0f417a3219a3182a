//! Geo-anchored scene engine
//!
//! Reconciles absolute geographic fixes with a locally precise tracking frame
//! so that virtual anchors with a known latitude and longitude can be placed
//! in a live 3D scene, and so that the device's own location can be estimated
//! more precisely than raw fixes allow.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod hardware;
pub mod api;
pub mod utils;

// Re-export commonly used types
pub use core::{EstimationMode, GeoPoint, HeadingReading, LocalOffset, TrackingPose, TrackingVector, SCENE_LIMIT};
pub use algorithms::{apply, great_circle_distance, path_segments, translation, PathSegment};
pub use processing::{Anchor, AnchorId, AnchorRegistry, Annotation, LocationEstimate, LocationEstimateStore, PoseUpdate};
pub use hardware::{
    channel, ChannelProvider, LocationProvider, MockLocationSet, ProviderError, ProviderFeed, ProviderResult,
    ProviderUpdate, ScriptedProvider,
};
pub use api::{CallbackHandle, SceneEvent, SceneSession, TickSummary};
pub use utils::{ConfigError, SessionConfig};
