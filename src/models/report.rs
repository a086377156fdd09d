use serde::{Deserialize, Serialize};

/// Final verdict payload returned by `GET /api/scan-result/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub status: ReportStatus,
    #[serde(default)]
    pub threats: Vec<Threat>,
    #[serde(default)]
    pub stats: ScanStats,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_info: Option<FileInfo>,
    /// Structural detail (sections, imports, ...) when the service provides it.
    #[serde(
        default,
        alias = "staticAnalysis",
        skip_serializing_if = "Option::is_none"
    )]
    pub static_analysis: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Safe,
    Unsafe,
    Suspicious,
    Scanning,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threat {
    #[serde(rename = "type")]
    pub threat_type: String,
    pub details: String,
    pub severity: Severity,
    #[serde(rename = "threatId")]
    pub threat_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Malicious,
    Suspicious,
    Neutral,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanStats {
    #[serde(rename = "threatsFound")]
    pub threats_found: usize,
    pub malicious: usize,
    pub suspicious: usize,
    pub neutral: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub size: u64,
    pub sha256: String,
}

/// Outcome of one job, produced by the result fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ScanOutcome {
    Safe(ScanReport),
    Unsafe(ScanReport),
    Suspicious(ScanReport),
    StillScanning(ScanReport),
    ErrorInfo { cause: String },
}

impl ScanOutcome {
    pub fn report(&self) -> Option<&ScanReport> {
        match self {
            ScanOutcome::Safe(r)
            | ScanOutcome::Unsafe(r)
            | ScanOutcome::Suspicious(r)
            | ScanOutcome::StillScanning(r) => Some(r),
            ScanOutcome::ErrorInfo { .. } => None,
        }
    }

    /// `StillScanning` means the fetch returned before the analysis finished.
    pub fn is_final(&self) -> bool {
        !matches!(self, ScanOutcome::StillScanning(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScanOutcome::Safe(_) => "SAFE",
            ScanOutcome::Unsafe(_) => "UNSAFE",
            ScanOutcome::Suspicious(_) => "SUSPICIOUS",
            ScanOutcome::StillScanning(_) => "SCANNING",
            ScanOutcome::ErrorInfo { .. } => "ERROR",
        }
    }
}

impl From<ScanReport> for ScanOutcome {
    fn from(report: ScanReport) -> Self {
        match report.status {
            ReportStatus::Safe => ScanOutcome::Safe(report),
            ReportStatus::Unsafe => ScanOutcome::Unsafe(report),
            ReportStatus::Suspicious => ScanOutcome::Suspicious(report),
            ReportStatus::Scanning => ScanOutcome::StillScanning(report),
            ReportStatus::Error => ScanOutcome::ErrorInfo {
                cause: report
                    .logs
                    .last()
                    .cloned()
                    .unwrap_or_else(|| String::from("remote analysis failed")),
            },
            ReportStatus::Unknown => ScanOutcome::ErrorInfo {
                cause: String::from("service returned an unrecognized scan status"),
            },
        }
    }
}
