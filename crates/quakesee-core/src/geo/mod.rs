//! Coordinate handling for the map selection rectangle

pub mod mercator;
pub mod selection;

pub use selection::{GeoRect, MapSelection, MercatorRect};
