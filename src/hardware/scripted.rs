//! Scripted provider replaying a preset walk, for testing and demos

use crate::algorithms::geodesy;
use crate::core::{GeoPoint, HeadingReading, LocalOffset};
use crate::hardware::{LocationProvider, ProviderError, ProviderResult, ProviderStatus, ProviderUpdate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Horizontal accuracy reported for the start location (meters)
const START_ACCURACY_M: f64 = 10.0;

/// Horizontal accuracy reported for path fixes (meters)
const PATH_ACCURACY_M: f64 = 5.0;

/// Preset walks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockLocationSet {
    /// Short walk from the Tel Aviv office towards Azrieli
    TelAvivOfficeToAzrieli,
}

impl MockLocationSet {
    pub fn start_location(&self) -> GeoPoint {
        match self {
            MockLocationSet::TelAvivOfficeToAzrieli => GeoPoint::new(32.0723327, 34.7953844, 0.0),
        }
    }

    pub fn start_heading(&self) -> HeadingReading {
        match self {
            MockLocationSet::TelAvivOfficeToAzrieli => HeadingReading::true_north(200.0),
        }
    }

    pub fn path_points(&self) -> Vec<GeoPoint> {
        match self {
            MockLocationSet::TelAvivOfficeToAzrieli => vec![
                GeoPoint::new(32.0723807, 34.7954753, 0.0),
                GeoPoint::new(32.0730221, 34.7955921, 0.0),
                GeoPoint::new(32.0724242, 34.7946299, 0.0),
                GeoPoint::new(32.0723249, 34.7945177, 0.0),
                GeoPoint::new(32.0728956, 34.7934293, 0.0),
            ],
        }
    }
}

/// Provider that emits one path point per poll
pub struct ScriptedProvider {
    location_set: MockLocationSet,
    remaining: VecDeque<GeoPoint>,
    current_fix: Option<GeoPoint>,
    current_heading: Option<HeadingReading>,
    heading_pending: bool,
    clock_ms: u64,
    step_ms: u64,
    jitter: Option<(StdRng, f64)>,
    status: ProviderStatus,
}

impl ScriptedProvider {
    pub fn new(location_set: MockLocationSet) -> Self {
        Self {
            location_set,
            remaining: location_set.path_points().into(),
            current_fix: None,
            current_heading: None,
            heading_pending: false,
            clock_ms: 0,
            step_ms: 1000,
            jitter: None,
            status: ProviderStatus::default(),
        }
    }

    /// Time between consecutive path fixes
    pub fn with_step(mut self, step_ms: u64) -> Self {
        self.step_ms = step_ms;
        self
    }

    /// Displace every path fix by up to `meters` north and east, reproducibly
    pub fn with_jitter(mut self, meters: f64, seed: u64) -> Self {
        self.jitter = Some((StdRng::seed_from_u64(seed), meters.abs()));
        self
    }

    pub fn location_set(&self) -> MockLocationSet {
        self.location_set
    }

    /// Path fixes not yet delivered
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_finished(&self) -> bool {
        self.remaining.is_empty()
    }

    fn next_fix(&mut self) -> Option<GeoPoint> {
        let point = self.remaining.pop_front()?;
        self.clock_ms += self.step_ms;

        let point = match self.jitter.as_mut() {
            Some((rng, meters)) if *meters > 0.0 => {
                let offset = LocalOffset::new(
                    rng.gen_range(-*meters..=*meters),
                    rng.gen_range(-*meters..=*meters),
                    0.0,
                );
                geodesy::apply(&offset, &point)
            }
            _ => point,
        };

        Some(
            point
                .with_accuracy(PATH_ACCURACY_M, PATH_ACCURACY_M)
                .with_timestamp(self.clock_ms),
        )
    }
}

impl LocationProvider for ScriptedProvider {
    fn start(&mut self) -> ProviderResult<()> {
        let start = self
            .location_set
            .start_location()
            .with_accuracy(START_ACCURACY_M, START_ACCURACY_M)
            .with_timestamp(self.clock_ms);

        self.current_fix = Some(start);
        self.current_heading = Some(self.location_set.start_heading());
        self.heading_pending = true;
        self.status.started = true;
        Ok(())
    }

    fn current_fix(&self) -> Option<GeoPoint> {
        self.current_fix
    }

    fn current_heading(&self) -> Option<HeadingReading> {
        self.current_heading
    }

    fn poll(&mut self) -> ProviderResult<Vec<ProviderUpdate>> {
        if !self.status.started {
            return Err(ProviderError::NotStarted);
        }

        let mut updates = Vec::new();
        if self.heading_pending {
            self.heading_pending = false;
            if let Some(heading) = self.current_heading {
                updates.push(ProviderUpdate::Heading(heading));
            }
        }

        if let Some(fix) = self.next_fix() {
            self.current_fix = Some(fix);
            updates.push(ProviderUpdate::Fix(fix));
        }

        for update in &updates {
            self.status.observe(update);
        }

        Ok(updates)
    }

    fn status(&self) -> ProviderStatus {
        self.status.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_reports_start_location() {
        let mut provider = ScriptedProvider::new(MockLocationSet::TelAvivOfficeToAzrieli);
        assert!(provider.current_fix().is_none());
        assert_eq!(provider.poll(), Err(ProviderError::NotStarted));

        provider.start().unwrap();

        let fix = provider.current_fix().unwrap();
        assert_eq!(fix.latitude, 32.0723327);
        assert_eq!(fix.longitude, 34.7953844);
        assert_eq!(provider.current_heading().unwrap().effective_heading(), 200.0);
    }

    #[test]
    fn test_replays_path_in_order() {
        let mut provider = ScriptedProvider::new(MockLocationSet::TelAvivOfficeToAzrieli).with_step(500);
        provider.start().unwrap();

        let first = provider.poll().unwrap();
        assert_eq!(first.len(), 2);
        assert!(matches!(first[0], ProviderUpdate::Heading(_)));

        let mut fixes = Vec::new();
        for update in first.into_iter().chain((0..10).flat_map(|_| provider.poll().unwrap())) {
            if let ProviderUpdate::Fix(fix) = update {
                fixes.push(fix);
            }
        }

        let expected = MockLocationSet::TelAvivOfficeToAzrieli.path_points();
        assert_eq!(fixes.len(), expected.len());
        for (index, (fix, point)) in fixes.iter().zip(&expected).enumerate() {
            assert_eq!(fix.latitude, point.latitude);
            assert_eq!(fix.longitude, point.longitude);
            assert_eq!(fix.timestamp_ms, (index as u64 + 1) * 500);
            assert_eq!(fix.horizontal_accuracy, PATH_ACCURACY_M);
        }

        assert!(provider.is_finished());
        assert!(provider.poll().unwrap().is_empty());
        assert_eq!(provider.status().fixes_received, 5);
    }

    #[test]
    fn test_jitter_is_bounded_and_reproducible() {
        let run = |seed| {
            let mut provider =
                ScriptedProvider::new(MockLocationSet::TelAvivOfficeToAzrieli).with_jitter(3.0, seed);
            provider.start().unwrap();
            let mut fixes = Vec::new();
            while !provider.is_finished() {
                for update in provider.poll().unwrap() {
                    if let ProviderUpdate::Fix(fix) = update {
                        fixes.push(fix);
                    }
                }
            }
            fixes
        };

        let first = run(7);
        assert_eq!(first, run(7));

        for (fix, point) in first.iter().zip(MockLocationSet::TelAvivOfficeToAzrieli.path_points()) {
            // Diagonal of a 3 m box plus projection error
            assert!(fix.distance_to(&point) < 5.0);
        }
    }
}
