//! Web service clients for earthquake catalogs, station metadata and
//! waveform data.
//!
//! `isc` talks to the ISC bulletin CGI and assembles chunked bulk
//! downloads; `event`, `station` and `dataselect` cover the three FDSN
//! web services. All clients are generic over the [`http::HttpGet`] port
//! so tests can substitute canned responses.

pub mod chunk;
pub mod dataselect;
pub mod event;
pub mod http;
pub mod isc;
pub mod station;

pub use http::{HttpGet, ReqwestHttp};
