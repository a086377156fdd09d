use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::core::error::AddressError;
use crate::models::scan::ScanId;

/// Result fetch budget used when nothing else is configured.
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub fetch_attempts: u32,
    pub retry_delay: Duration,
    pub still_scanning_repolls: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 3001,
            tls: false,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            retry_delay: Duration::from_millis(500),
            still_scanning_repolls: 0,
        }
    }
}

impl Settings {
    pub fn base_url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        // Bare IPv6 literals need brackets in the authority part.
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("{}://[{}]:{}", scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}", scheme, self.host, self.port)
        }
    }

    /// Parsed service root. Fails for hosts that do not form a valid URL.
    pub fn base(&self) -> Result<Url, AddressError> {
        let address = self.base_url();
        let url = Url::parse(&address).map_err(|e| AddressError {
            address: address.clone(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(AddressError {
                address,
                reason: String::from("not a hierarchical URL"),
            });
        }
        Ok(url)
    }

    pub fn upload_url(&self) -> Result<Url, AddressError> {
        self.endpoint(&["api", "upload"])
    }

    pub fn status_url(&self, id: &ScanId) -> Result<Url, AddressError> {
        self.endpoint(&["api", "scan-status", id.as_str()])
    }

    pub fn result_url(&self, id: &ScanId) -> Result<Url, AddressError> {
        self.endpoint(&["api", "scan-result", id.as_str()])
    }

    /// Job ids are opaque, so each one is pushed as a single
    /// percent-encoded path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AddressError> {
        let mut url = self.base()?;
        url.path_segments_mut()
            .map_err(|()| AddressError {
                address: self.base_url(),
                reason: String::from("not a hierarchical URL"),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build the shared HTTP client.
    ///
    /// Only the connect phase is bounded here: the progress stream is
    /// long-lived, so whole-request timeouts are applied per request by the
    /// upload and fetch paths instead.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(concat!("scanlens/", env!("CARGO_PKG_VERSION")))
            .build()
    }
}
