//! QuakeSee Core - Domain models, format codecs, and coordinate handling
//!
//! This crate contains everything the dashboard needs that does not touch
//! the network: earthquake/station/waveform models, readers and writers for
//! the seismological interchange formats, and the selection-rectangle
//! coordinate sync.

pub mod catalog;
pub mod error;
pub mod geo;
pub mod models;
pub mod station;
pub mod waveform;

pub use error::{QuakeError, Result};

/// Crate version, surfaced by the About screen.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
