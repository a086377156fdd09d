use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Opaque job identifier handed out by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(CompactString);

impl ScanId {
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScanId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The one live server-side unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanJob {
    pub id: ScanId,
    pub created_at: DateTime<Local>,
}

impl ScanJob {
    pub fn new(id: ScanId) -> Self {
        Self {
            id,
            created_at: Local::now(),
        }
    }
}

/// The file the user picked, with the metadata kept for error display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(path: PathBuf, name: impl Into<String>, size: u64) -> Self {
        Self {
            path,
            name: name.into(),
            size,
        }
    }

    /// Stat `path` and reject anything that is not a regular file.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Ok(Self::new(path.to_path_buf(), name, metadata.len()))
    }
}

/// One decoded push message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub fraction: f64,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(fraction: f64, message: impl Into<String>) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 100.0),
            message: message.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.fraction >= 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanProgress {
    pub fraction: f64,
    pub message: String,
}

impl ScanProgress {
    pub fn percent(&self) -> u16 {
        self.fraction.round().clamp(0.0, 100.0) as u16
    }
}

/// An immutable line of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: DateTime<Local>,
    pub text: CompactString,
}

impl LogLine {
    pub fn new(text: impl Into<CompactString>) -> Self {
        Self {
            timestamp: Local::now(),
            text: text.into(),
        }
    }

    pub fn from_event(event: &ProgressEvent) -> Self {
        Self::new(event.message.as_str())
    }

    pub fn display(&self) -> String {
        format!("{} {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}
