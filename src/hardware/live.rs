//! Live provider fed from platform callbacks over a channel
//!
//! Platform location callbacks run on their own thread and push into a
//! [`ProviderFeed`]; the session drains the matching [`ChannelProvider`] on its
//! own thread, so core state is never touched concurrently.

use crate::core::{GeoPoint, HeadingReading};
use crate::hardware::{LocationProvider, ProviderError, ProviderResult, ProviderStatus, ProviderUpdate};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Sending half handed to platform callbacks
#[derive(Debug, Clone)]
pub struct ProviderFeed {
    sender: Sender<ProviderUpdate>,
}

impl ProviderFeed {
    pub fn push_fix(&self, fix: GeoPoint) -> ProviderResult<()> {
        self.sender
            .send(ProviderUpdate::Fix(fix))
            .map_err(|_| ProviderError::Disconnected)
    }

    pub fn push_heading(&self, heading: HeadingReading) -> ProviderResult<()> {
        self.sender
            .send(ProviderUpdate::Heading(heading))
            .map_err(|_| ProviderError::Disconnected)
    }
}

/// Provider backed by a platform location service
#[derive(Debug)]
pub struct ChannelProvider {
    receiver: Receiver<ProviderUpdate>,
    current_fix: Option<GeoPoint>,
    current_heading: Option<HeadingReading>,
    status: ProviderStatus,
}

/// Create a connected feed/provider pair
pub fn channel() -> (ProviderFeed, ChannelProvider) {
    let (sender, receiver) = mpsc::channel();
    let provider = ChannelProvider {
        receiver,
        current_fix: None,
        current_heading: None,
        status: ProviderStatus::default(),
    };
    (ProviderFeed { sender }, provider)
}

impl LocationProvider for ChannelProvider {
    fn start(&mut self) -> ProviderResult<()> {
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
        loop {
            match self.receiver.try_recv() {
                Ok(update) => {
                    match update {
                        ProviderUpdate::Fix(fix) => self.current_fix = Some(fix),
                        ProviderUpdate::Heading(heading) => self.current_heading = Some(heading),
                    }
                    self.status.observe(&update);
                    updates.push(update);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if updates.is_empty() {
                        return Err(ProviderError::Disconnected);
                    }
                    break;
                }
            }
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
    use std::thread;

    #[test]
    fn test_poll_before_start() {
        let (_feed, mut provider) = channel();
        assert_eq!(provider.poll(), Err(ProviderError::NotStarted));
    }

    #[test]
    fn test_updates_cross_threads() {
        let (feed, mut provider) = channel();
        provider.start().unwrap();

        let handle = thread::spawn(move || {
            feed.push_heading(HeadingReading::true_north(90.0)).unwrap();
            feed.push_fix(GeoPoint::new(32.0, 34.0, 0.0).with_timestamp(10)).unwrap();
            feed.push_fix(GeoPoint::new(32.1, 34.1, 0.0).with_timestamp(20)).unwrap();
        });
        handle.join().unwrap();

        let updates = provider.poll().unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(provider.current_fix().unwrap().latitude, 32.1);
        assert_eq!(provider.current_heading().unwrap().true_heading, 90.0);

        let status = provider.status();
        assert_eq!(status.fixes_received, 2);
        assert_eq!(status.headings_received, 1);
        assert_eq!(status.last_fix_time, Some(20));
    }

    #[test]
    fn test_disconnect_after_drain() {
        let (feed, mut provider) = channel();
        provider.start().unwrap();

        feed.push_fix(GeoPoint::new(32.0, 34.0, 0.0)).unwrap();
        drop(feed);

        assert_eq!(provider.poll().unwrap().len(), 1);
        assert_eq!(provider.poll(), Err(ProviderError::Disconnected));
        assert!(provider.current_fix().is_some());
    }

    #[test]
    fn test_feed_reports_dropped_provider() {
        let (feed, provider) = channel();
        drop(provider);

        assert_eq!(
            feed.push_fix(GeoPoint::new(32.0, 34.0, 0.0)),
            Err(ProviderError::Disconnected)
        );
    }
}
