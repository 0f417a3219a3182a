//! Location provider abstraction
//!
//! Geographic fixes and compass headings come from a [`LocationProvider`]. Two
//! implementations are available: a channel-fed provider for live platform
//! services and a scripted provider that replays a preset walk.

pub mod provider;
pub mod live;
pub mod scripted;
pub mod error;

pub use provider::{LocationProvider, ProviderStatus, ProviderUpdate};
pub use live::{channel, ChannelProvider, ProviderFeed};
pub use scripted::{MockLocationSet, ScriptedProvider};
pub use error::{ProviderError, ProviderResult};
