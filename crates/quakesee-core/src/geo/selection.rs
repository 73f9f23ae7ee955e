//! Selection rectangle with two synchronized representations
//!
//! The bulk-fetch rectangle is edited from two sides: numeric degree inputs
//! and a box drawn on a Web-Mercator map. Both representations live in one
//! struct and every setter re-derives the other exactly once, so the
//! update-feedback loop the observer pattern invites cannot happen here.

use serde::{Deserialize, Serialize};

use crate::error::{QuakeError, Result};
use crate::geo::mercator;

/// Geographic bounds in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl GeoRect {
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.south) || !(-90.0..=90.0).contains(&self.north) {
            return Err(QuakeError::Selection(format!(
                "latitude bounds out of range: {} .. {}",
                self.south, self.north
            )));
        }
        if !(-180.0..=180.0).contains(&self.west) || !(-180.0..=180.0).contains(&self.east) {
            return Err(QuakeError::Selection(format!(
                "longitude bounds out of range: {} .. {}",
                self.west, self.east
            )));
        }
        if self.south >= self.north {
            return Err(QuakeError::Selection(format!(
                "south bound {} is not below north bound {}",
                self.south, self.north
            )));
        }
        if self.west >= self.east {
            return Err(QuakeError::Selection(format!(
                "west bound {} is not left of east bound {}",
                self.west, self.east
            )));
        }
        Ok(())
    }
}

/// The same rectangle in projected display coordinates (EPSG:3857 metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MercatorRect {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

/// Both representations, kept mutually consistent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapSelection {
    geographic: GeoRect,
    mercator: MercatorRect,
}

impl MapSelection {
    pub fn from_geographic(rect: GeoRect) -> Result<Self> {
        rect.validate()?;
        Ok(Self {
            geographic: rect,
            mercator: derive_mercator(&rect),
        })
    }

    pub fn set_geographic(&mut self, rect: GeoRect) -> Result<()> {
        rect.validate()?;
        self.geographic = rect;
        self.mercator = derive_mercator(&rect);
        Ok(())
    }

    /// Accepts a box drawn on the map; derived latitudes are clamped into
    /// [-90, 90] by the inverse projection.
    pub fn set_mercator(&mut self, rect: MercatorRect) {
        self.mercator = rect;
        self.geographic = GeoRect {
            south: mercator::y_to_lat(rect.bottom),
            north: mercator::y_to_lat(rect.top),
            west: mercator::x_to_lon(rect.left),
            east: mercator::x_to_lon(rect.right),
        };
    }

    pub fn geographic(&self) -> GeoRect {
        self.geographic
    }

    pub fn mercator(&self) -> MercatorRect {
        self.mercator
    }
}

impl Default for MapSelection {
    /// The original dashboard's default window over the Indonesian
    /// archipelago.
    fn default() -> Self {
        let rect = GeoRect {
            south: -10.0,
            north: 6.0,
            west: 95.0,
            east: 141.0,
        };
        Self {
            geographic: rect,
            mercator: derive_mercator(&rect),
        }
    }
}

fn derive_mercator(rect: &GeoRect) -> MercatorRect {
    MercatorRect {
        left: mercator::lon_to_x(rect.west),
        right: mercator::lon_to_x(rect.east),
        bottom: mercator::lat_to_y(rect.south),
        top: mercator::lat_to_y(rect.north),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geographic_edit_rederives_display_coordinates() {
        let mut sel = MapSelection::default();
        sel.set_geographic(GeoRect {
            south: -5.0,
            north: 5.0,
            west: 100.0,
            east: 120.0,
        })
        .unwrap();

        let m = sel.mercator();
        assert!((m.left - mercator::lon_to_x(100.0)).abs() < 1e-9);
        assert!((m.top - mercator::lat_to_y(5.0)).abs() < 1e-9);
    }

    #[test]
    fn display_edit_rederives_geographic_bounds() {
        let mut sel = MapSelection::default();
        let rect = MercatorRect {
            left: mercator::lon_to_x(95.0),
            right: mercator::lon_to_x(141.0),
            bottom: mercator::lat_to_y(-10.0),
            top: mercator::lat_to_y(6.0),
        };
        sel.set_mercator(rect);

        let g = sel.geographic();
        assert!((g.south + 10.0).abs() < 1e-9);
        assert!((g.north - 6.0).abs() < 1e-9);
        assert!((g.west - 95.0).abs() < 1e-9);
        assert!((g.east - 141.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_display_box_clamps_latitude() {
        let mut sel = MapSelection::default();
        sel.set_mercator(MercatorRect {
            left: 0.0,
            right: 1.0,
            bottom: -1e30,
            top: 1e30,
        });
        assert_eq!(sel.geographic().south, -90.0);
        assert_eq!(sel.geographic().north, 90.0);
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        let mut sel = MapSelection::default();
        let err = sel.set_geographic(GeoRect {
            south: 10.0,
            north: -10.0,
            west: 0.0,
            east: 1.0,
        });
        assert!(err.is_err());
        // A failed edit leaves both representations untouched
        assert_eq!(sel, MapSelection::default());
    }
}
