use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Client;

use crate::config::settings::Settings;
use crate::models::scan::{ProgressEvent, ScanId};
use crate::models::wire::ProgressUpdate;

use super::error::StreamError;
use super::sse::SseDecoder;

/// Opens progress subscriptions keyed by job id.
#[derive(Clone)]
pub struct EventStreamConsumer {
    client: Client,
    settings: Settings,
}

impl EventStreamConsumer {
    pub fn new(client: Client, settings: Settings) -> Self {
        Self { client, settings }
    }

    /// Connect to `GET /api/scan-status/{id}`.
    ///
    /// No timeout is applied: a quiet stream is a stalled scan, not a
    /// failed one.
    pub async fn subscribe(&self, id: &ScanId) -> Result<EventStream, StreamError> {
        let url = self.settings.status_url(id)?;
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(StreamError::Connect)?;

        if !response.status().is_success() {
            return Err(StreamError::Status(response.status().as_u16()));
        }

        tracing::info!("Subscribed to progress stream for job {}", id);
        let body = response.bytes_stream().map_ok(Vec::from).boxed();
        Ok(EventStream::from_chunks(id.clone(), body))
    }
}

/// A lazy, non-restartable sequence of progress events for one job.
///
/// Ends after yielding the first event with `fraction >= 100` (the
/// connection is dropped locally at that point), after one transport error,
/// or when the server closes the connection.
pub struct EventStream {
    id: ScanId,
    body: Option<BoxStream<'static, reqwest::Result<Vec<u8>>>>,
    decoder: SseDecoder,
    dropped: usize,
    finished: bool,
}

impl EventStream {
    pub fn from_chunks(id: ScanId, body: BoxStream<'static, reqwest::Result<Vec<u8>>>) -> Self {
        Self {
            id,
            body: Some(body),
            decoder: SseDecoder::new(),
            dropped: 0,
            finished: false,
        }
    }

    pub fn id(&self) -> &ScanId {
        &self.id
    }

    pub fn is_closed(&self) -> bool {
        self.body.is_none()
    }

    /// Number of push messages discarded because they failed to decode.
    pub fn dropped_messages(&self) -> usize {
        self.dropped
    }

    /// Close the connection. Safe to call any number of times.
    pub fn close(&mut self) {
        if self.body.take().is_some() {
            tracing::debug!("Closed progress stream for job {}", self.id);
        }
    }

    pub async fn next(&mut self) -> Option<Result<ProgressEvent, StreamError>> {
        if self.finished {
            return None;
        }
        loop {
            while let Some(payload) = self.decoder.next_message() {
                match decode_message(&payload) {
                    Ok(event) => {
                        if event.is_complete() {
                            self.finished = true;
                            self.close();
                        }
                        return Some(Ok(event));
                    }
                    Err(e) => {
                        self.dropped += 1;
                        tracing::warn!("Dropping push message for job {}: {}", self.id, e);
                    }
                }
            }

            let body = self.body.as_mut()?;
            match body.next().await {
                Some(Ok(chunk)) => self.decoder.feed(&chunk),
                Some(Err(e)) => {
                    tracing::warn!("Progress stream for job {} failed: {}", self.id, e);
                    self.finished = true;
                    self.close();
                    return Some(Err(StreamError::Disrupted(e)));
                }
                None => {
                    // Server hung up; anything still buffered is delivered
                    // before the stream reports its end.
                    self.decoder.finish();
                    self.finished = true;
                    self.close();
                    if let Some(payload) = self.decoder.next_message() {
                        return self.deliver_trailing(payload);
                    }
                    return None;
                }
            }
        }
    }

    fn deliver_trailing(&mut self, payload: String) -> Option<Result<ProgressEvent, StreamError>> {
        match decode_message(&payload) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                self.dropped += 1;
                tracing::warn!("Dropping push message for job {}: {}", self.id, e);
                None
            }
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Decode one `data:` payload into a progress event.
pub fn decode_message(payload: &str) -> Result<ProgressEvent, StreamError> {
    serde_json::from_str::<ProgressUpdate>(payload)
        .map(ProgressEvent::from)
        .map_err(|e| StreamError::Decode(e.to_string()))
}
