use std::path::PathBuf;

use thiserror::Error;

/// The configured host and port do not form a usable service URL.
#[derive(Debug, Error)]
#[error("invalid service address {address}: {reason}")]
pub struct AddressError {
    pub address: String,
    pub reason: String,
}

/// Upload failure. The `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport failure")]
    Network(#[source] reqwest::Error),
    #[error("{0}")]
    Rejected(String),
    #[error("upload failed with status {0}")]
    Status(u16),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error("could not read {name}: {source}")]
    File {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StreamError {
    /// A single push message that could not be decoded. Never fatal.
    #[error("malformed progress message: {0}")]
    Decode(String),
    #[error("could not open progress stream: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("progress stream refused with status {0}")]
    Status(u16),
    #[error("progress stream disconnected: {0}")]
    Disrupted(#[source] reqwest::Error),
    #[error(transparent)]
    Address(#[from] AddressError),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("result request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("result request returned status {0}")]
    Status(u16),
    #[error("result body could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error("result unavailable after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("a scan is already in progress; reset before starting another")]
    ScanInFlight,
    #[error("cannot scan {path}: {source}")]
    InvalidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
