//! Location fusion and anchor processing

pub mod estimates;
pub mod anchors;

pub use estimates::{LocationEstimate, LocationEstimateStore};
pub use anchors::{Anchor, AnchorId, AnchorRegistry, Annotation, PoseUpdate, SceneSnapshot};
