//! Earthquake catalog codecs
//!
//! Readers and writers for the catalog interchange formats the dashboard
//! consumes and produces: the ISC CATCSV dump, the flattened `.events`
//! table, QuakeML, and the FDSN event text format.

pub mod events_csv;
pub mod fdsn_text;
pub mod isc;
pub mod quakeml;
