//! Location provider capability trait and status

use crate::core::{GeoPoint, HeadingReading};
use crate::hardware::ProviderResult;

/// Update delivered by a location provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProviderUpdate {
    Fix(GeoPoint),
    Heading(HeadingReading),
}

/// Source of geographic fixes and compass headings.
///
/// Implementations are polled from the session's thread; any cross-thread
/// delivery happens inside the provider.
pub trait LocationProvider {
    /// Begin delivering fixes and headings
    fn start(&mut self) -> ProviderResult<()>;

    /// Most recent fix, if any
    fn current_fix(&self) -> Option<GeoPoint>;

    /// Most recent heading, if any
    fn current_heading(&self) -> Option<HeadingReading>;

    /// Drain updates received since the last poll (non-blocking)
    fn poll(&mut self) -> ProviderResult<Vec<ProviderUpdate>>;

    /// Delivery counters
    fn status(&self) -> ProviderStatus;
}

/// Provider delivery counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderStatus {
    pub started: bool,
    pub fixes_received: u32,
    pub headings_received: u32,
    pub last_fix_time: Option<u64>,
}

impl ProviderStatus {
    /// Record an update in the counters
    pub fn observe(&mut self, update: &ProviderUpdate) {
        match update {
            ProviderUpdate::Fix(fix) => {
                self.fixes_received += 1;
                self.last_fix_time = Some(fix.timestamp_ms);
            }
            ProviderUpdate::Heading(_) => self.headings_received += 1,
        }
    }
}
