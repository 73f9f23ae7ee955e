//! HTTP transport port

use async_trait::async_trait;
use quakesee_core::{QuakeError, Result};

/// Port for issuing GET requests
///
/// Clients in this crate depend on this trait rather than a concrete
/// HTTP stack, so tests can run against canned byte responses.
#[async_trait]
pub trait HttpGet: Send + Sync {
    /// Fetch a URL and return the response body
    ///
    /// A non-success status is an error; the body is returned as raw
    /// bytes since waveform endpoints serve binary payloads.
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest-backed transport
pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestHttp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpGet for ReqwestHttp {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| QuakeError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuakeError::Service {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| QuakeError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(body.to_vec())
    }
}
