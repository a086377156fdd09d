//! JSON bodies exchanged with the analysis service.

use serde::{Deserialize, Serialize};

use super::scan::{ProgressEvent, ScanId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "scanId")]
    pub scan_id: ScanId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Payload of one `data:` message on the status stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub progress: f64,
    pub message: String,
}

impl From<ProgressUpdate> for ProgressEvent {
    fn from(update: ProgressUpdate) -> Self {
        ProgressEvent::new(update.progress, update.message)
    }
}
