//! Session-facing API
//!
//! [`SceneSession`] is the entry point for platform glue: it accepts tracking
//! frames, location fixes and compass readings, runs the update tick, and
//! reports changes through registered [`SceneEvent`] callbacks.

pub mod events;
pub mod session;

pub use events::{CallbackHandle, EventCallback, EventDispatcher, SceneEvent};
pub use session::{SceneSession, TickSummary};
