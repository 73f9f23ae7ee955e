//! Spherical Web-Mercator transforms (EPSG:4326 <-> EPSG:3857)
//!
//! The map widget works in projected display coordinates; everything else
//! works in degrees. Only this one CRS pair is ever needed, so the
//! closed-form spherical formulas are used directly.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// WGS84 equatorial radius, the Web-Mercator sphere radius.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

pub fn lon_to_x(lon: f64) -> f64 {
    EARTH_RADIUS_M * lon.to_radians()
}

pub fn lat_to_y(lat: f64) -> f64 {
    EARTH_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln()
}

pub fn x_to_lon(x: f64) -> f64 {
    (x / EARTH_RADIUS_M).to_degrees()
}

/// Inverse latitude, clamped so a derived value always stays a valid
/// geographic latitude.
pub fn y_to_lat(y: f64) -> f64 {
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees();
    lat.clamp(-90.0, 90.0)
}
