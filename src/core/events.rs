use tokio::sync::mpsc;

use crate::models::report::ScanOutcome;
use crate::models::scan::{ProgressEvent, ScanId};

/// Results produced by the background upload, stream and fetch tasks.
///
/// Upload events carry the generation they were started under because no
/// job id exists yet; everything after acceptance is keyed by job id. The
/// orchestrator ignores events that do not match the live scan.
#[derive(Debug, Clone)]
pub enum Event {
    // Transport
    UploadProgress { generation: u64, fraction: u8 },
    UploadAccepted { generation: u64, id: ScanId },
    UploadRejected { generation: u64, reason: String },

    // Event stream
    Progress { id: ScanId, event: ProgressEvent },
    StreamClosed { id: ScanId, error: Option<String> },

    // Result fetch
    FetchCompleted { id: ScanId, outcome: ScanOutcome },
    FetchFailed { id: ScanId, cause: String },
}

pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
