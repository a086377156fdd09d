use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use tokio_util::io::ReaderStream;

use crate::config::settings::Settings;
use crate::models::scan::{ScanId, SelectedFile};
use crate::models::wire::{ErrorBody, UploadResponse};

use super::error::TransportError;

/// Highest fraction reported before the server has answered.
pub const MAX_IN_FLIGHT_FRACTION: u8 = 99;

/// Uploads one file per call. Holds no per-upload state.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    settings: Settings,
}

impl Transport {
    pub fn new(client: Client, settings: Settings) -> Self {
        Self { client, settings }
    }

    /// Stream `file` to `POST /api/upload` as a multipart form.
    ///
    /// `on_progress` receives fractions in `0..=99` as chunks are handed to
    /// the connection. Completion is only signalled by the return value,
    /// after the server has responded.
    pub async fn upload<F>(&self, file: &SelectedFile, on_progress: F) -> Result<ScanId, TransportError>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let url = self.settings.upload_url()?;
        let handle = tokio::fs::File::open(&file.path)
            .await
            .map_err(|source| TransportError::File {
                name: file.name.clone(),
                source,
            })?;

        let total = file.size;
        let mut sent: u64 = 0;
        on_progress(0);
        let chunks = ReaderStream::new(handle).inspect_ok(move |chunk| {
            sent += chunk.len() as u64;
            on_progress(upload_fraction(sent, total));
        });

        let part = Part::stream_with_length(Body::wrap_stream(chunks), total)
            .file_name(file.name.clone());
        let form = Form::new().part("file", part);

        tracing::info!("Uploading {} ({} bytes)", file.name, total);
        let response = self
            .client
            .post(url)
            .timeout(self.settings.request_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Upload of {} failed: {}", file.name, e);
                TransportError::Network(e)
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(TransportError::Network)?;

        if status.is_success() {
            return match serde_json::from_slice::<UploadResponse>(&body) {
                Ok(accepted) => {
                    tracing::info!("Upload accepted as job {}", accepted.scan_id);
                    Ok(accepted.scan_id)
                }
                Err(e) => {
                    tracing::warn!("Upload response without a job id: {}", e);
                    Err(TransportError::Status(status.as_u16()))
                }
            };
        }

        match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(rejection) => {
                tracing::warn!("Upload rejected ({}): {}", status, rejection.error);
                Err(TransportError::Rejected(rejection.error))
            }
            Err(_) => {
                tracing::warn!("Upload failed with unparseable body ({})", status);
                Err(TransportError::Status(status.as_u16()))
            }
        }
    }
}

/// Map bytes handed to the connection onto the upload scale, capped at 99.
pub fn upload_fraction(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = sent.saturating_mul(100) / total;
    pct.min(MAX_IN_FLIGHT_FRACTION as u64) as u8
}
