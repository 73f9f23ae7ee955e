//! Core domain models

mod event;
mod station;

pub use event::Event;
pub use station::{Inventory, Station};
