use axum::Json;

use crate::dto::{AboutResponse, ComponentVersion};

/// The About screen payload: program blurb plus the component table.
pub async fn about() -> Json<AboutResponse> {
    Json(AboutResponse {
        name: "QuakeSee",
        version: env!("CARGO_PKG_VERSION"),
        description: "QuakeSee is an application for visualizing earthquake data, including \
                      event locations, station metadata, and waveforms from various seismic \
                      station networks.",
        disclaimer: "We are not responsible for any data processing errors that may occur in \
                     this program. Users are encouraged to verify processing results before \
                     making decisions based on the information provided.",
        developer: "The QuakeSee Development Team - Yudha Styawan",
        contact: "yudhastyawan26@gmail.com",
        components: vec![
            ComponentVersion {
                name: "quakesee-core",
                version: quakesee_core::VERSION,
                description: "Catalog, station and waveform formats",
            },
            ComponentVersion {
                name: "quakesee-fdsn",
                version: env!("CARGO_PKG_VERSION"),
                description: "ISC and FDSN web service clients",
            },
            ComponentVersion {
                name: "quakesee-api",
                version: env!("CARGO_PKG_VERSION"),
                description: "Browser-facing HTTP server",
            },
        ],
    })
}
