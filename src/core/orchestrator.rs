//! Lifecycle of the single in-flight scan.
//!
//! The orchestrator is a plain state object: background tasks never touch
//! it, they only produce [`Event`]s which the owner feeds to
//! [`Orchestrator::apply`]. Transitions that need I/O return a [`Command`]
//! for the caller to execute. Every event is checked against the live
//! upload generation or job id first, so results that arrive after a reset
//! are discarded.

use crate::models::report::ScanOutcome;
use crate::models::scan::{LogLine, ScanId, ScanJob, ScanProgress, SelectedFile};

use super::error::ClientError;
use super::events::Event;
use super::log_buffer::LogBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Uploading,
    AwaitingEvents,
    Scanning,
    Completed,
    UploadRejected,
    FetchFailed,
}

impl ScanPhase {
    pub fn label(self) -> &'static str {
        match self {
            ScanPhase::Idle => "Idle",
            ScanPhase::Uploading => "Uploading",
            ScanPhase::AwaitingEvents => "Waiting for events",
            ScanPhase::Scanning => "Scanning",
            ScanPhase::Completed => "Completed",
            ScanPhase::UploadRejected => "Upload rejected",
            ScanPhase::FetchFailed => "Result unavailable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Upload,
    Stream,
    Fetch,
}

/// A dismissible error shown to the user, with the file that was being scanned.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub cause: String,
    pub file: Option<SelectedFile>,
}

/// I/O the owner must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenStream(ScanId),
    FetchResult(ScanId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Orchestrator {
    phase: ScanPhase,
    generation: u64,
    file: Option<SelectedFile>,
    job: Option<ScanJob>,
    progress: ScanProgress,
    log: LogBuffer,
    outcome: Option<ScanOutcome>,
    error: Option<ErrorNotice>,
    completion_seen: bool,
    stream_open: bool,
    fetch_pending: bool,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            phase: ScanPhase::Idle,
            generation: 0,
            file: None,
            job: None,
            progress: ScanProgress::default(),
            log: LogBuffer::new(),
            outcome: None,
            error: None,
            completion_seen: false,
            stream_open: false,
            fetch_pending: false,
        }
    }

    /// Accept a file and enter `Uploading`.
    ///
    /// Returns the generation the upload task must tag its events with.
    /// Only allowed from `Idle`.
    pub fn begin(&mut self, file: SelectedFile) -> Result<u64, ClientError> {
        if self.phase != ScanPhase::Idle {
            return Err(ClientError::ScanInFlight);
        }
        self.generation += 1;
        self.error = None;
        self.progress = ScanProgress {
            fraction: 0.0,
            message: format!("Uploading {}", file.name),
        };
        tracing::info!("Starting scan of {} ({} bytes)", file.name, file.size);
        self.file = Some(file);
        self.phase = ScanPhase::Uploading;
        Ok(self.generation)
    }

    pub fn apply(&mut self, event: Event) -> Option<Command> {
        match event {
            Event::UploadProgress { generation, fraction } => {
                if self.is_live_upload(generation) {
                    self.progress.fraction = f64::from(fraction.min(99));
                }
                None
            }
            Event::UploadAccepted { generation, id } => {
                if !self.is_live_upload(generation) {
                    tracing::debug!("Ignoring stale upload acceptance for job {}", id);
                    return None;
                }
                tracing::info!("Job {} accepted, opening progress stream", id);
                self.job = Some(ScanJob::new(id.clone()));
                self.phase = ScanPhase::AwaitingEvents;
                self.progress = ScanProgress {
                    fraction: 0.0,
                    message: String::from("Upload complete, waiting for analysis"),
                };
                self.stream_open = true;
                Some(Command::OpenStream(id))
            }
            Event::UploadRejected { generation, reason } => {
                if !self.is_live_upload(generation) {
                    return None;
                }
                tracing::warn!("Upload rejected: {}", reason);
                self.phase = ScanPhase::UploadRejected;
                self.error = Some(ErrorNotice {
                    kind: ErrorKind::Upload,
                    cause: reason,
                    file: self.file.clone(),
                });
                None
            }
            Event::Progress { id, event } => {
                if !self.is_live_job(&id)
                    || self.completion_seen
                    || !matches!(self.phase, ScanPhase::AwaitingEvents | ScanPhase::Scanning)
                {
                    tracing::debug!("Ignoring progress event for job {}", id);
                    return None;
                }
                tracing::debug!("Job {} at {:.0}%: {}", id, event.fraction, event.message);
                self.log.append(LogLine::from_event(&event));
                self.progress = ScanProgress {
                    fraction: event.fraction,
                    message: event.message.clone(),
                };
                self.phase = ScanPhase::Scanning;

                if event.is_complete() {
                    tracing::info!("Job {} reported completion, fetching result", id);
                    self.completion_seen = true;
                    self.stream_open = false;
                    self.fetch_pending = true;
                    return Some(Command::FetchResult(id));
                }
                None
            }
            Event::StreamClosed { id, error } => {
                if !self.is_live_job(&id) || !self.stream_open {
                    return None;
                }
                self.stream_open = false;
                if self.completion_seen {
                    return None;
                }
                tracing::warn!(
                    "Progress stream for job {} ended at {:.0}% before completion",
                    id,
                    self.progress.fraction
                );
                if let Some(cause) = error {
                    self.error = Some(ErrorNotice {
                        kind: ErrorKind::Stream,
                        cause,
                        file: self.file.clone(),
                    });
                }
                None
            }
            Event::FetchCompleted { id, outcome } => {
                if !self.is_live_job(&id) || !self.fetch_pending {
                    return None;
                }
                self.fetch_pending = false;
                if outcome.is_final() {
                    tracing::info!("Job {} completed: {}", id, outcome.label());
                    self.phase = ScanPhase::Completed;
                } else {
                    tracing::info!("Job {} result says the analysis is still running", id);
                }
                self.outcome = Some(outcome);
                None
            }
            Event::FetchFailed { id, cause } => {
                if !self.is_live_job(&id) || !self.fetch_pending {
                    return None;
                }
                tracing::error!("Result for job {} unavailable: {}", id, cause);
                self.fetch_pending = false;
                self.phase = ScanPhase::FetchFailed;
                self.outcome = Some(ScanOutcome::ErrorInfo {
                    cause: cause.clone(),
                });
                self.error = Some(ErrorNotice {
                    kind: ErrorKind::Fetch,
                    cause,
                    file: self.file.clone(),
                });
                None
            }
        }
    }

    /// Ask for the verdict again when the last fetch said the analysis was
    /// still running.
    pub fn refetch(&mut self) -> Option<Command> {
        let still_scanning = matches!(self.outcome, Some(ScanOutcome::StillScanning(_)));
        if !still_scanning || self.fetch_pending {
            return None;
        }
        let id = self.job.as_ref()?.id.clone();
        self.fetch_pending = true;
        Some(Command::FetchResult(id))
    }

    /// Drop everything and return to `Idle`. Returns `false` when already idle.
    pub fn reset(&mut self) -> bool {
        if self.phase == ScanPhase::Idle {
            return false;
        }
        tracing::info!("Resetting scan state");
        // Bumping the generation invalidates an upload still in flight.
        self.generation += 1;
        self.phase = ScanPhase::Idle;
        self.file = None;
        self.job = None;
        self.progress = ScanProgress::default();
        self.log.clear();
        self.outcome = None;
        self.error = None;
        self.completion_seen = false;
        self.stream_open = false;
        self.fetch_pending = false;
        true
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn is_live_upload(&self, generation: u64) -> bool {
        self.phase == ScanPhase::Uploading && generation == self.generation
    }

    fn is_live_job(&self, id: &ScanId) -> bool {
        self.job.as_ref().is_some_and(|job| &job.id == id)
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn job(&self) -> Option<&ScanJob> {
        self.job.as_ref()
    }

    pub fn progress(&self) -> &ScanProgress {
        &self.progress
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn outcome(&self) -> Option<&ScanOutcome> {
        self.outcome.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorNotice> {
        self.error.as_ref()
    }

    pub fn is_stream_open(&self) -> bool {
        self.stream_open
    }

    pub fn is_fetch_pending(&self) -> bool {
        self.fetch_pending
    }

    /// The stream ended before reporting completion; the last progress is
    /// all there is.
    pub fn is_stalled(&self) -> bool {
        matches!(self.phase, ScanPhase::AwaitingEvents | ScanPhase::Scanning)
            && !self.stream_open
            && !self.completion_seen
    }

    /// Nothing further will happen without user action.
    pub fn is_settled(&self) -> bool {
        match self.phase {
            ScanPhase::Uploading => false,
            ScanPhase::AwaitingEvents | ScanPhase::Scanning => {
                !self.stream_open && !self.fetch_pending
            }
            _ => true,
        }
    }
}
