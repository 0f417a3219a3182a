//! Core types and constants for geo-anchored scene tracking

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
