//! Station metadata codecs
//!
//! Import and export paths for inventory data: CSV, FDSN station text,
//! StationXML, SEISAN `.hyp`, and KML.

pub mod csv;
pub mod kml;
pub mod seisan;
pub mod stationxml;
pub mod text;
