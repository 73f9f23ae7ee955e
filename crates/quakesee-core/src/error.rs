//! Error types for QuakeSee

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuakeError {
    // Outbound service errors
    #[error("Transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Service returned HTTP {status} for {url}")]
    Service { status: u16, url: String },

    // Format errors
    #[error("Malformed catalog data: {0}")]
    CatalogFormat(String),

    #[error("Malformed station metadata: {0}")]
    StationFormat(String),

    #[error("Malformed miniSEED data: {0}")]
    MseedFormat(String),

    #[error("XML error: {0}")]
    Xml(String),

    // Selection-rectangle errors
    #[error("Invalid selection: {0}")]
    Selection(String),

    // Archive errors
    #[error("Archive error: {0}")]
    Archive(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QuakeError>;
