//! Blocking HTTP implementation of the asset fetch capability.

use deckguide_core::AssetFetcher;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches remote assets over HTTP. Every failure is logged and reported as
/// a missing asset.
pub struct HttpFetcher {
    client: Option<reqwest::blocking::Client>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("deckguide/", env!("CARGO_PKG_VERSION")))
            .build();
        match client {
            Ok(client) => Self {
                client: Some(client),
            },
            Err(e) => {
                log::warn!("HTTP client unavailable, remote assets disabled: {}", e);
                Self { client: None }
            }
        }
    }

    pub fn with_timeout_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let client = self.client.as_ref()?;
        log::debug!("GET {}", url);

        let response = match client.get(url).send() {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Failed to fetch {}: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            log::warn!("Failed to fetch {}: HTTP {}", url, status);
            return None;
        }

        match response.bytes() {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                log::warn!("Failed to read response body from {}: {}", url, e);
                None
            }
        }
    }
}
