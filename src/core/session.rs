use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::settings::Settings;
use crate::models::scan::{ScanId, SelectedFile};

use super::error::ClientError;
use super::events::{Event, EventReceiver, EventSender};
use super::fetcher::ResultFetcher;
use super::orchestrator::{Command, Orchestrator, ScanPhase};
use super::stream::EventStreamConsumer;
use super::transport::Transport;

/// Runs the orchestrator's commands on the tokio runtime.
///
/// Background tasks report back through the event channel; the owner of the
/// receiver passes each event to [`Session::handle`]. All tasks of one scan
/// share a cancellation token that [`Session::reset`] fires, which drops an
/// open progress stream and abandons pending uploads and fetches.
pub struct Session {
    scan: Orchestrator,
    settings: Settings,
    transport: Transport,
    consumer: EventStreamConsumer,
    fetcher: ResultFetcher,
    event_tx: EventSender,
    cancel: CancellationToken,
    repolls_left: u32,
}

impl Session {
    pub fn new(settings: Settings, event_tx: EventSender) -> Result<Self, ClientError> {
        // Reject a bad host up front instead of on the first request.
        settings.base()?;
        let client = settings.http_client()?;
        Ok(Self {
            scan: Orchestrator::new(),
            transport: Transport::new(client.clone(), settings.clone()),
            consumer: EventStreamConsumer::new(client.clone(), settings.clone()),
            fetcher: ResultFetcher::new(client, settings.clone()),
            settings,
            event_tx,
            cancel: CancellationToken::new(),
            repolls_left: 0,
        })
    }

    pub fn state(&self) -> &Orchestrator {
        &self.scan
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start scanning `path`. Fails if a scan is already active or the path
    /// is not a readable regular file.
    pub fn start(&mut self, path: &Path) -> Result<(), ClientError> {
        if self.scan.phase() != ScanPhase::Idle {
            return Err(ClientError::ScanInFlight);
        }
        let file = SelectedFile::from_path(path).map_err(|source| ClientError::InvalidFile {
            path: path.to_path_buf(),
            source,
        })?;
        let generation = self.scan.begin(file.clone())?;
        self.repolls_left = self.settings.still_scanning_repolls;
        self.spawn_upload(generation, file);
        Ok(())
    }

    pub fn handle(&mut self, event: Event) {
        let still_scanning = matches!(&event, Event::FetchCompleted { outcome, .. } if !outcome.is_final());

        if let Some(command) = self.scan.apply(event) {
            self.execute(command, Duration::ZERO);
        }

        if still_scanning && self.repolls_left > 0 {
            if let Some(command) = self.scan.refetch() {
                self.repolls_left -= 1;
                tracing::info!("Re-polling result, {} re-polls left", self.repolls_left);
                self.execute(command, self.settings.retry_delay);
            }
        }
    }

    /// Fetch the verdict again after the service reported it still running.
    pub fn refetch(&mut self) {
        if let Some(command) = self.scan.refetch() {
            self.execute(command, Duration::ZERO);
        }
    }

    /// Cancel every task of the current scan and return to `Idle`.
    pub fn reset(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.repolls_left = 0;
        self.scan.reset();
    }

    pub fn dismiss_error(&mut self) {
        self.scan.dismiss_error();
    }

    /// Feed events from `events` until the scan needs user action.
    pub async fn run_until_settled(&mut self, events: &mut EventReceiver) {
        while !self.scan.is_settled() {
            match events.recv().await {
                Some(event) => self.handle(event),
                None => break,
            }
        }
    }

    fn execute(&self, command: Command, delay: Duration) {
        match command {
            Command::OpenStream(id) => self.spawn_stream(id),
            Command::FetchResult(id) => self.spawn_fetch(id, delay),
        }
    }

    fn spawn_upload(&self, generation: u64, file: SelectedFile) {
        let transport = self.transport.clone();
        let tx = self.event_tx.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let progress_tx = tx.clone();
            let upload = transport.upload(&file, move |fraction| {
                let _ = progress_tx.send(Event::UploadProgress { generation, fraction });
            });

            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                result = upload => result,
            };

            let event = match result {
                Ok(id) => Event::UploadAccepted { generation, id },
                Err(e) => Event::UploadRejected {
                    generation,
                    reason: e.to_string(),
                },
            };
            let _ = tx.send(event);
        });
    }

    fn spawn_stream(&self, id: ScanId) {
        let consumer = self.consumer.clone();
        let tx = self.event_tx.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Progress stream task for job {} cancelled", id);
                }
                _ = forward_stream(consumer, id.clone(), tx) => {}
            }
        });
    }

    fn spawn_fetch(&self, id: ScanId, delay: Duration) {
        let fetcher = self.fetcher.clone();
        let tx = self.event_tx.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let fetch = async {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                fetcher.fetch(&id).await
            };

            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                result = fetch => result,
            };

            let event = match result {
                Ok(outcome) => Event::FetchCompleted { id, outcome },
                Err(e) => Event::FetchFailed {
                    id,
                    cause: e.to_string(),
                },
            };
            let _ = tx.send(event);
        });
    }
}

/// Pump one subscription into the event channel, then report how it ended.
async fn forward_stream(consumer: EventStreamConsumer, id: ScanId, tx: EventSender) {
    let mut stream = match consumer.subscribe(&id).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("Could not subscribe to job {}: {}", id, e);
            let _ = tx.send(Event::StreamClosed {
                id,
                error: Some(e.to_string()),
            });
            return;
        }
    };

    let mut completed = false;
    let mut error = None;
    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => {
                completed = event.is_complete();
                if tx.send(Event::Progress { id: id.clone(), event }).is_err() {
                    return;
                }
            }
            Err(e) => {
                error = Some(e.to_string());
                break;
            }
        }
    }

    if !completed && error.is_none() {
        error = Some(String::from("progress stream ended before the scan completed"));
    }
    if stream.dropped_messages() > 0 {
        tracing::info!(
            "Job {}: {} malformed push messages were dropped",
            stream.id(),
            stream.dropped_messages()
        );
    }
    let _ = tx.send(Event::StreamClosed { id, error });
}
