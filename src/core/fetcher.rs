use reqwest::{Client, Url};

use crate::config::settings::Settings;
use crate::models::report::{ScanOutcome, ScanReport};
use crate::models::scan::ScanId;

use super::error::FetchError;

/// Pulls the final verdict for a completed job.
///
/// Fetching performs no mutation on either side, so calling it again for the
/// same job id is safe and yields the same outcome.
#[derive(Clone)]
pub struct ResultFetcher {
    client: Client,
    settings: Settings,
}

impl ResultFetcher {
    pub fn new(client: Client, settings: Settings) -> Self {
        Self { client, settings }
    }

    /// GET the result with a bounded retry budget and exponential backoff.
    ///
    /// Network errors, non-success statuses and undecodable bodies all count
    /// against the budget. Once it is spent the last error is returned
    /// wrapped in [`FetchError::Exhausted`].
    pub async fn fetch(&self, id: &ScanId) -> Result<ScanOutcome, FetchError> {
        // An unusable address will not get better by retrying.
        let url = self.settings.result_url(id)?;
        let attempts = self.settings.fetch_attempts.max(1);
        let mut delay = self.settings.retry_delay;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.fetch_once(&url).await {
                Ok(report) => {
                    let outcome = ScanOutcome::from(report);
                    tracing::info!(
                        "Fetched result for job {} on attempt {}: {}",
                        id,
                        attempt,
                        outcome.label()
                    );
                    return Ok(outcome);
                }
                Err(e) => {
                    tracing::warn!(
                        "Result fetch for job {} failed (attempt {}/{}): {}",
                        id,
                        attempt,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        let last = last_error.unwrap_or(FetchError::Status(0));
        tracing::error!("Giving up on result for job {} after {} attempts", id, attempts);
        Err(FetchError::Exhausted {
            attempts,
            last: Box::new(last),
        })
    }

    async fn fetch_once(&self, url: &Url) -> Result<ScanReport, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await.map_err(FetchError::Network)?;
        serde_json::from_slice(&body).map_err(FetchError::Decode)
    }
}
