use std::env;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

/// API server configuration
///
/// Layered: built-in defaults, then the TOML file named by
/// `QUAKESEE_CONFIG` (if any), then `QUAKESEE_*` environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    /// Base URL of the FDSN data centre (event, station, dataselect).
    pub fdsn_url: String,
    /// Base URL of the ISC bulletin CGI.
    pub isc_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            cors_origin: "http://localhost:3000".to_string(),
            fdsn_url: quakesee_fdsn::event::DEFAULT_BASE_URL.to_string(),
            isc_url: quakesee_fdsn::isc::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// TOML shape of the config file; every field optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    port: Option<u16>,
    cors_origin: Option<String>,
    fdsn_url: Option<String>,
    isc_url: Option<String>,
}

impl ApiConfig {
    /// Load configuration from the environment (and the optional file it
    /// points at).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("QUAKESEE_CONFIG") {
            config.apply_file(Path::new(&path));
        }

        if let Some(port) = env::var("QUAKESEE_PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        if let Ok(origin) = env::var("QUAKESEE_CORS_ORIGIN") {
            config.cors_origin = origin;
        }
        if let Ok(url) = env::var("QUAKESEE_FDSN_URL") {
            config.fdsn_url = url;
        }
        if let Ok(url) = env::var("QUAKESEE_ISC_URL") {
            config.isc_url = url;
        }

        config
    }

    fn apply_file(&mut self, path: &Path) {
        let parsed: FileConfig = match std::fs::read_to_string(path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "config file ignored, not valid TOML");
                    return;
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config file ignored, not readable");
                return;
            }
        };

        if let Some(port) = parsed.port {
            self.port = port;
        }
        if let Some(origin) = parsed.cors_origin {
            self.cors_origin = origin;
        }
        if let Some(url) = parsed.fdsn_url {
            self.fdsn_url = url;
        }
        if let Some(url) = parsed.isc_url {
            self.isc_url = url;
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
